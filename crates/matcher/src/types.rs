use std::fmt;

use canonical::RecordRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which enumeration produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every record of one collection against every record of another.
    Cross,
    /// Every unordered pair within one collection.
    Within,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::Cross => "cross",
            MatchMode::Within => "within",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class contributions used by the pairwise scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreWeights {
    /// Added for each strong identifier field with a shared value.
    #[serde(default = "ScoreWeights::default_strong")]
    pub strong: f64,
    #[serde(default = "ScoreWeights::default_medium")]
    pub medium: f64,
    #[serde(default = "ScoreWeights::default_weak")]
    pub weak: f64,
    /// Multiplier applied to a free-text similarity that clears `text_min_similarity`.
    #[serde(default = "ScoreWeights::default_text")]
    pub text: f64,
    /// Similarities at or below this contribute nothing.
    #[serde(default = "ScoreWeights::default_text_min_similarity")]
    pub text_min_similarity: f64,
    /// Upper bound on the final score.
    #[serde(default = "ScoreWeights::default_cap")]
    pub cap: f64,
}

impl ScoreWeights {
    pub(crate) fn default_strong() -> f64 {
        0.7
    }

    pub(crate) fn default_medium() -> f64 {
        0.3
    }

    pub(crate) fn default_weak() -> f64 {
        0.2
    }

    pub(crate) fn default_text() -> f64 {
        0.1
    }

    pub(crate) fn default_text_min_similarity() -> f64 {
        0.3
    }

    pub(crate) fn default_cap() -> f64 {
        1.0
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let named = [
            ("strong", self.strong),
            ("medium", self.medium),
            ("weak", self.weak),
            ("text", self.text),
            ("text_min_similarity", self.text_min_similarity),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchError::InvalidConfig(format!(
                    "weights.{name} must be a finite value >= 0.0"
                )));
            }
        }
        if !(self.cap > 0.0 && self.cap <= 1.0) {
            return Err(MatchError::InvalidConfig(
                "weights.cap must be in (0.0, 1.0]".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            strong: Self::default_strong(),
            medium: Self::default_medium(),
            weak: Self::default_weak(),
            text: Self::default_text(),
            text_min_similarity: Self::default_text_min_similarity(),
            cap: Self::default_cap(),
        }
    }
}

/// Matcher configuration.
///
/// Thresholds here are the defaults used by callers such as the CLI; the
/// enumeration methods take the threshold explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Configuration schema version.
    #[serde(default = "MatchConfig::default_version")]
    pub version: String,
    /// Minimum score for victim-to-official matches.
    #[serde(default = "MatchConfig::default_cross_threshold")]
    pub cross_threshold: f64,
    /// Minimum score for victim-to-victim matches.
    #[serde(default = "MatchConfig::default_within_threshold")]
    pub within_threshold: f64,
    #[serde(default)]
    pub weights: ScoreWeights,
    /// Score rows on the rayon pool. Output is identical either way.
    #[serde(default)]
    pub parallel: bool,
    /// Only score pairs that share at least one strong identifier value.
    /// Pairs linked solely by categorical or free-text evidence are skipped.
    #[serde(default)]
    pub blocking: bool,
}

impl MatchConfig {
    pub(crate) fn default_version() -> String {
        "v1".to_string()
    }

    pub(crate) fn default_cross_threshold() -> f64 {
        0.5
    }

    pub(crate) fn default_within_threshold() -> f64 {
        0.3
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.version.trim().is_empty() {
            return Err(MatchError::InvalidConfig(
                "config.version must not be empty".into(),
            ));
        }
        for (name, value) in [
            ("cross_threshold", self.cross_threshold),
            ("within_threshold", self.within_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }
        self.weights.validate()
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            cross_threshold: Self::default_cross_threshold(),
            within_threshold: Self::default_within_threshold(),
            weights: ScoreWeights::default(),
            parallel: false,
            blocking: false,
        }
    }
}

/// Score and rationale for one record pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PairScore {
    /// Bounded to `[0, weights.cap]`.
    pub score: f64,
    /// One entry per contributing field, strong → medium → weak → text.
    pub reasons: Vec<String>,
}

/// A retained pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchHit {
    pub left: RecordRef,
    pub right: RecordRef,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl MatchHit {
    pub fn reasons_joined(&self) -> String {
        self.reasons.join("; ")
    }
}

impl fmt::Display for MatchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <--> {} | Score: {:.2} | Reasons: {}",
            self.left,
            self.right,
            self.score,
            self.reasons_joined()
        )
    }
}

/// Counters for one enumeration pass. `pairs_scored - hits` pairs fell
/// below the threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchStats {
    pub mode: MatchMode,
    /// Pairs the exhaustive pass would score.
    pub candidate_pairs: usize,
    /// Pairs actually scored (fewer than `candidate_pairs` under blocking).
    pub pairs_scored: usize,
    pub hits: usize,
    pub elapsed_micros: u64,
}

/// Ranked hits plus the counters that produced them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchReport {
    pub hits: Vec<MatchHit>,
    pub stats: MatchStats,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = MatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.cross_threshold, 0.5);
        assert_eq!(cfg.within_threshold, 0.3);
        assert!(!cfg.parallel);
        assert!(!cfg.blocking);
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let cfg = MatchConfig {
            cross_threshold: 1.5,
            ..MatchConfig::default()
        };
        let MatchError::InvalidConfig(msg) = cfg.validate().expect_err("config should be invalid");
        assert!(msg.contains("cross_threshold"), "{msg}");

        let cfg = MatchConfig {
            within_threshold: f64::NAN,
            ..MatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_weight_rejected() {
        let cfg = MatchConfig {
            weights: ScoreWeights {
                medium: -0.1,
                ..ScoreWeights::default()
            },
            ..MatchConfig::default()
        };
        let MatchError::InvalidConfig(msg) = cfg.validate().expect_err("config should be invalid");
        assert!(msg.contains("weights.medium"), "{msg}");
    }

    #[test]
    fn cap_above_one_rejected() {
        let weights = ScoreWeights {
            cap: 1.2,
            ..ScoreWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: MatchConfig = serde_json::from_str(r#"{"blocking": true}"#).unwrap();
        assert!(cfg.blocking);
        assert_eq!(cfg.weights, ScoreWeights::default());
        assert_eq!(cfg.version, "v1");
    }

    #[test]
    fn hit_display_matches_report_format() {
        let hit = MatchHit {
            left: RecordRef::new("Victim", 0),
            right: RecordRef::new("Official", 2),
            score: 0.76,
            reasons: vec!["same phones".into(), "description similarity 0.60".into()],
        };
        assert_eq!(
            hit.to_string(),
            "Victim 0 <--> Official 2 | Score: 0.76 | Reasons: same phones; description similarity 0.60"
        );
    }
}
