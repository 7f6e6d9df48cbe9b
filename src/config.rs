//! YAML configuration for a scamlink run.
//!
//! One file describes the inputs and every stage: normalization, the semantic
//! oracle, and the matcher. Every section is optional and falls back to its
//! defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "state cyber cell"
//!
//! inputs:
//!   victims: "data/victim_reports.csv"
//!   official: "data/official_scam_records.csv"
//!
//! normalize:
//!   version: 1
//!   delimiter: "|"
//!   country_code: "+91"
//!   null_tokens: ["nan"]
//!
//! semantic:
//!   mode: "stub"
//!   dimension: 384
//!
//! matcher:
//!   version: "v1"
//!   cross_threshold: 0.5
//!   within_threshold: 0.3
//!   parallel: true
//!   blocking: false
//! ```
//!
//! ## Environment overrides
//!
//! Applied by [`ScamlinkConfig::apply_env_overrides`] after the file is read:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SCAMLINK_VICTIMS_PATH` | `inputs.victims` |
//! | `SCAMLINK_OFFICIAL_PATH` | `inputs.official` |
//! | `SCAMLINK_CROSS_THRESHOLD` | `matcher.cross_threshold` |
//! | `SCAMLINK_WITHIN_THRESHOLD` | `matcher.within_threshold` |
//! | `SCAMLINK_SEMANTIC_MODE` | `semantic.mode` |
//! | `SCAMLINK_SEMANTIC_API_URL` | `semantic.api_url` |
//! | `SCAMLINK_SEMANTIC_API_TOKEN` | `semantic.api_auth_header` as `Bearer <token>` |

use std::fs;
use std::path::{Path, PathBuf};

use canonical::NormalizeConfig;
use matcher::MatchConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_VICTIMS_PATH: &str = "SCAMLINK_VICTIMS_PATH";
pub const ENV_OFFICIAL_PATH: &str = "SCAMLINK_OFFICIAL_PATH";
pub const ENV_CROSS_THRESHOLD: &str = "SCAMLINK_CROSS_THRESHOLD";
pub const ENV_WITHIN_THRESHOLD: &str = "SCAMLINK_WITHIN_THRESHOLD";
pub const ENV_SEMANTIC_MODE: &str = "SCAMLINK_SEMANTIC_MODE";
pub const ENV_SEMANTIC_API_URL: &str = "SCAMLINK_SEMANTIC_API_URL";
pub const ENV_SEMANTIC_API_TOKEN: &str = "SCAMLINK_SEMANTIC_API_TOKEN";

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level configuration for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ScamlinkConfig {
    /// Configuration format version.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub inputs: InputsConfig,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub matcher: MatchConfig,
}

/// Where the two report collections live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputsConfig {
    #[serde(default = "default_victims_path")]
    pub victims: PathBuf,

    #[serde(default = "default_official_path")]
    pub official: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            victims: default_victims_path(),
            official: default_official_path(),
        }
    }
}

impl Default for ScamlinkConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            inputs: InputsConfig::default(),
            normalize: NormalizeConfig::default(),
            semantic: SemanticConfig::default(),
            matcher: MatchConfig::default(),
        }
    }
}

impl ScamlinkConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: ScamlinkConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SCAMLINK_*` overrides from the process environment, then
    /// re-validate.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigLoadError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_VICTIMS_PATH) {
            self.inputs.victims = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_OFFICIAL_PATH) {
            self.inputs.official = PathBuf::from(path);
        }
        if let Some(raw) = get(ENV_CROSS_THRESHOLD) {
            self.matcher.cross_threshold = parse_threshold(ENV_CROSS_THRESHOLD, &raw)?;
        }
        if let Some(raw) = get(ENV_WITHIN_THRESHOLD) {
            self.matcher.within_threshold = parse_threshold(ENV_WITHIN_THRESHOLD, &raw)?;
        }
        if let Some(mode) = get(ENV_SEMANTIC_MODE) {
            self.semantic.mode = mode.trim().to_string();
        }
        if let Some(url) = get(ENV_SEMANTIC_API_URL) {
            self.semantic.api_url = Some(url.trim().to_string());
        }
        if let Some(token) = get(ENV_SEMANTIC_API_TOKEN) {
            self.semantic.api_auth_header = Some(format!("Bearer {}", token.trim()));
        }

        self.validate()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.inputs.victims.as_os_str().is_empty() {
            return Err(ConfigLoadError::MissingField("inputs.victims".into()));
        }
        if self.inputs.official.as_os_str().is_empty() {
            return Err(ConfigLoadError::MissingField("inputs.official".into()));
        }

        self.normalize
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("normalize: {e}")))?;
        self.semantic
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("semantic: {e}")))?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))?;

        Ok(())
    }
}

fn parse_threshold(key: &str, raw: &str) -> Result<f64, ConfigLoadError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ConfigLoadError::Validation(format!("{key}={raw:?}: {e}")))
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_victims_path() -> PathBuf {
    PathBuf::from("victim_reports.csv")
}

fn default_official_path() -> PathBuf {
    PathBuf::from("official_scam_records.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
inputs:
  victims: "v.csv"
normalize:
  country_code: "+1"
matcher:
  cross_threshold: 0.6
"#;

        let config = ScamlinkConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("test config"));
        assert_eq!(config.inputs.victims, PathBuf::from("v.csv"));
        assert_eq!(config.inputs.official, PathBuf::from("official_scam_records.csv"));
        assert_eq!(config.normalize.country_code, "+1");
        assert_eq!(config.normalize.delimiter, "|");
        assert!((config.matcher.cross_threshold - 0.6).abs() < 1e-6);
        assert!((config.matcher.within_threshold - 0.3).abs() < 1e-6);
        assert_eq!(config.semantic.mode, "stub");
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"version: \"1\"\n").unwrap();

        let config = ScamlinkConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config, ScamlinkConfig { version: "1".into(), ..Default::default() });
    }

    #[test]
    fn test_default_config() {
        let config = ScamlinkConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.validate().is_ok());
        assert_eq!(config.inputs.victims, PathBuf::from("victim_reports.csv"));
    }

    #[test]
    fn test_unsupported_version() {
        let err = ScamlinkConfig::from_yaml("version: \"2\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2"));
    }

    #[test]
    fn test_stage_validation() {
        let err = ScamlinkConfig::from_yaml("matcher:\n  within_threshold: 1.5\n").unwrap_err();
        assert!(err.to_string().contains("within_threshold"));

        let err = ScamlinkConfig::from_yaml("semantic:\n  mode: \"api\"\n").unwrap_err();
        assert!(err.to_string().contains("api_url"));

        let err = ScamlinkConfig::from_yaml("normalize:\n  delimiter: \"\"\n").unwrap_err();
        assert!(err.to_string().starts_with("validation error: normalize"));
    }

    #[test]
    fn test_missing_input_path() {
        let err = ScamlinkConfig::from_yaml("inputs:\n  victims: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingField(f) if f == "inputs.victims"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ScamlinkConfig::default();
        config
            .apply_overrides_from(lookup(&[
                (ENV_CROSS_THRESHOLD, "0.65"),
                (ENV_WITHIN_THRESHOLD, " "),
                (ENV_VICTIMS_PATH, "/data/v.csv"),
                (ENV_SEMANTIC_MODE, "api"),
                (ENV_SEMANTIC_API_URL, "https://embed.example/v1"),
                (ENV_SEMANTIC_API_TOKEN, "tok"),
            ]))
            .unwrap();

        assert!((config.matcher.cross_threshold - 0.65).abs() < 1e-6);
        assert!((config.matcher.within_threshold - 0.3).abs() < 1e-6);
        assert_eq!(config.inputs.victims, PathBuf::from("/data/v.csv"));
        assert_eq!(config.semantic.api_url.as_deref(), Some("https://embed.example/v1"));
        assert_eq!(config.semantic.api_auth_header.as_deref(), Some("Bearer tok"));
    }

    #[test]
    fn test_env_override_rejects_bad_values() {
        let mut config = ScamlinkConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[(ENV_CROSS_THRESHOLD, "high")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CROSS_THRESHOLD));

        let mut config = ScamlinkConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[(ENV_WITHIN_THRESHOLD, "2.0")]))
            .unwrap_err();
        assert!(err.to_string().contains("within_threshold"));
    }

    #[test]
    fn test_full_yaml_roundtrip() {
        let mut config = ScamlinkConfig::default();
        config.name = Some("production".into());
        config.matcher = config.matcher.with_parallel(true).with_blocking(true);

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = ScamlinkConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
