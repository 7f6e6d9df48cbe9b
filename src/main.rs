use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use scamlink::{ScamlinkConfig, run_pipeline};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scamlink")]
#[command(about = "Link victim scam reports to official records and to each other")]
struct Cli {
    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Victim report CSV (default: victim_reports.csv)
    #[arg(long)]
    victims: Option<PathBuf>,

    /// Official scam record CSV (default: official_scam_records.csv)
    #[arg(long)]
    official: Option<PathBuf>,

    /// Minimum score for victim-to-official matches
    #[arg(long)]
    cross_threshold: Option<f64>,

    /// Minimum score for victim-to-victim matches
    #[arg(long)]
    within_threshold: Option<f64>,

    /// Score rows on all cores
    #[arg(long)]
    parallel: bool,

    /// Only score pairs sharing a strong identifier
    #[arg(long)]
    blocking: bool,

    /// Output format for the match lists
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<ScamlinkConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ScamlinkConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScamlinkConfig::default(),
    };
    cfg.apply_env_overrides()
        .context("applying SCAMLINK_* environment overrides")?;

    if let Some(path) = &cli.victims {
        cfg.inputs.victims = path.clone();
    }
    if let Some(path) = &cli.official {
        cfg.inputs.official = path.clone();
    }
    if let Some(threshold) = cli.cross_threshold {
        cfg.matcher.cross_threshold = threshold;
    }
    if let Some(threshold) = cli.within_threshold {
        cfg.matcher.within_threshold = threshold;
    }
    cfg.matcher.parallel |= cli.parallel;
    cfg.matcher.blocking |= cli.blocking;

    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let cfg = load_config(&cli)?;
    let run = run_pipeline(&cfg).context("matching failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => run.write_report(&mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &run)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
