//! Configuration for field normalization.
//!
//! [`NormalizeConfig`] pins the three knobs the normalizer depends on: the
//! multi-value delimiter, the country-code prefix stripped from phone numbers,
//! and the sentinel tokens treated as "no value".
//!
//! # Versioning
//!
//! Any change to normalization behaviour must bump `version`. Two record sets
//! normalized under different versions are not guaranteed to be comparable.
//!
//! # Examples
//!
//! ```rust
//! use canonical::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert_eq!(config.delimiter, "|");
//! assert_eq!(config.country_code, "+91");
//! assert!(config.validate().is_ok());
//! ```

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Configuration for the field normalizer.
///
/// Cheap to clone and serde-friendly so it can be embedded in the
/// top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Behaviour version. Version 0 is reserved and rejected.
    #[serde(default = "NormalizeConfig::default_version")]
    pub version: u32,

    /// Separator between entries of a multi-valued field.
    #[serde(default = "NormalizeConfig::default_delimiter")]
    pub delimiter: String,

    /// Country-code prefix stripped from phone numbers. May be empty.
    #[serde(default = "NormalizeConfig::default_country_code")]
    pub country_code: String,

    /// Tokens that mean "missing" (compared case-insensitively).
    #[serde(default = "NormalizeConfig::default_null_tokens")]
    pub null_tokens: Vec<String>,
}

impl NormalizeConfig {
    fn default_version() -> u32 {
        1
    }

    fn default_delimiter() -> String {
        "|".to_string()
    }

    fn default_country_code() -> String {
        "+91".to_string()
    }

    fn default_null_tokens() -> Vec<String> {
        vec!["nan".to_string()]
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(CanonicalError::InvalidConfig(
                "delimiter must not be empty".into(),
            ));
        }
        if self.delimiter.trim().is_empty() {
            return Err(CanonicalError::InvalidConfig(
                "delimiter must not be whitespace".into(),
            ));
        }
        // Hyphens and whitespace are removed before the prefix is matched.
        if self
            .country_code
            .chars()
            .any(|c| c == '-' || c.is_whitespace())
        {
            return Err(CanonicalError::InvalidConfig(
                "country_code must not contain hyphens or whitespace".into(),
            ));
        }
        if self.null_tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(CanonicalError::InvalidConfig(
                "null_tokens must not contain blank entries".into(),
            ));
        }
        Ok(())
    }

    /// True if `token` is one of the configured "no value" sentinels.
    pub fn is_null_token(&self, token: &str) -> bool {
        self.null_tokens
            .iter()
            .any(|null| null.eq_ignore_ascii_case(token))
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            delimiter: Self::default_delimiter(),
            country_code: Self::default_country_code(),
            null_tokens: Self::default_null_tokens(),
        }
    }
}

/// Shared default configuration used by the convenience entry points.
pub(crate) fn default_config() -> &'static NormalizeConfig {
    static DEFAULT: OnceLock<NormalizeConfig> = OnceLock::new();
    DEFAULT.get_or_init(NormalizeConfig::default)
}
