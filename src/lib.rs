//! Workspace umbrella crate for scamlink.
//!
//! Ties the stages together so a caller can go from two CSV exports to ranked
//! match lists with one call:
//!
//! 1. `ingest` loads the victim and official collections;
//! 2. `canonical` normalizes every field;
//! 3. `semantic` builds the text similarity oracle;
//! 4. `matcher` runs the cross pass (victim × official) and the within pass
//!    (victim pairs), each with its own threshold.
//!
//! [`run_pipeline`] does all of it from a [`ScamlinkConfig`];
//! [`match_collections`] starts from records already in memory.

pub mod config;

pub use canonical::{
    CanonicalError, Field, FieldClass, FieldKind, FieldValue, NormalizeConfig, NormalizedRecord,
    RawRecord, RecordRef, normalize_collection, normalize_record,
};
pub use config::{ConfigLoadError, InputsConfig, ScamlinkConfig};
pub use ingest::{IngestError, load_collection, load_raw_records, read_raw_records};
pub use matcher::{
    MatchConfig, MatchError, MatchHit, MatchMode, MatchReport, MatchStats, Matcher, ScoreWeights,
};
pub use semantic::{
    SemanticConfig, SemanticError, SimilarityOracle, build_oracle, constant_oracle,
};

use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{Level, info};

/// Label given to records loaded from the victim report file.
pub const VICTIM_LABEL: &str = "Victim";
/// Label given to records loaded from the official record file.
pub const OFFICIAL_LABEL: &str = "Official";

pub const CROSS_HEADER: &str = "--- Cross Database Matches ---";
pub const WITHIN_HEADER: &str = "--- Victim-to-Victim Matches ---";

/// Errors that can occur while running the pipeline.
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigLoadError),
    Ingest(IngestError),
    Semantic(SemanticError),
    Match(MatchError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(err) => write!(f, "configuration failure: {err}"),
            PipelineError::Ingest(err) => write!(f, "ingest failure: {err}"),
            PipelineError::Semantic(err) => write!(f, "semantic backend failure: {err}"),
            PipelineError::Match(err) => write!(f, "matcher failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            PipelineError::Ingest(err) => Some(err),
            PipelineError::Semantic(err) => Some(err),
            PipelineError::Match(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value)
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        PipelineError::Ingest(value)
    }
}

impl From<SemanticError> for PipelineError {
    fn from(value: SemanticError) -> Self {
        PipelineError::Semantic(value)
    }
}

impl From<MatchError> for PipelineError {
    fn from(value: MatchError) -> Self {
        PipelineError::Match(value)
    }
}

/// Outcome of both passes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchRun {
    pub victims: usize,
    pub official: usize,
    pub cross: MatchReport,
    pub within: MatchReport,
}

impl MatchRun {
    /// Print both sections in report form.
    pub fn write_report<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n{CROSS_HEADER}")?;
        for hit in &self.cross.hits {
            writeln!(out, "{hit}")?;
        }
        writeln!(out, "\n{WITHIN_HEADER}")?;
        for hit in &self.within.hits {
            writeln!(out, "{hit}")?;
        }
        Ok(())
    }

    pub fn to_report_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_report(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Run both passes over collections already in memory, using the thresholds
/// carried by `cfg`.
pub fn match_collections(
    victims: &[NormalizedRecord],
    official: &[NormalizedRecord],
    oracle: Arc<dyn SimilarityOracle>,
    cfg: &MatchConfig,
) -> Result<MatchRun, PipelineError> {
    let matcher = Matcher::new(oracle, cfg.clone())?;
    let cross = matcher.cross_match_report(victims, official, cfg.cross_threshold);
    let within = matcher.within_match_report(victims, cfg.within_threshold);
    Ok(MatchRun {
        victims: victims.len(),
        official: official.len(),
        cross,
        within,
    })
}

/// Load both collections named by `cfg.inputs` and match them with the
/// oracle described by `cfg.semantic`.
pub fn run_pipeline(cfg: &ScamlinkConfig) -> Result<MatchRun, PipelineError> {
    cfg.validate()?;
    let oracle = build_oracle(&cfg.semantic)?;
    run_pipeline_with_oracle(cfg, oracle)
}

/// Like [`run_pipeline`] but with a caller-supplied oracle.
pub fn run_pipeline_with_oracle(
    cfg: &ScamlinkConfig,
    oracle: Arc<dyn SimilarityOracle>,
) -> Result<MatchRun, PipelineError> {
    let span = tracing::span!(Level::INFO, "scamlink.run", name = ?cfg.name);
    let _guard = span.enter();
    let start = Instant::now();

    let victims = load_collection(&cfg.inputs.victims, VICTIM_LABEL, &cfg.normalize)?;
    let official = load_collection(&cfg.inputs.official, OFFICIAL_LABEL, &cfg.normalize)?;
    let run = match_collections(&victims, &official, oracle, &cfg.matcher)?;

    info!(
        victims = run.victims,
        official = run.official,
        cross_hits = run.cross.hits.len(),
        within_hits = run.within.hits.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "run_complete"
    );
    Ok(run)
}
