use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;
use crate::SemanticError;

/// Selects and configures the embedding backend behind the text oracle.
///
/// # Example
/// ```no_run
/// use semantic::{build_oracle, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: "api".into(),
///     api_url: Some("https://router.huggingface.co/hf-inference/models/sentence-transformers/all-mpnet-base-v2/pipeline/feature-extraction".into()),
///     api_auth_header: Some("Bearer hf_xxx".into()),
///     api_provider: Some("hf".into()),
///     ..Default::default()
/// };
///
/// let _oracle = build_oracle(&cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// `"stub"` (deterministic hashing embedder) or `"api"` (remote HTTP).
    pub mode: String,
    /// Label reported in logs; sent as `model` to OpenAI-style endpoints.
    pub model_name: String,
    /// Vector width for the stub embedder.
    pub dimension: usize,
    /// Endpoint for `"api"` mode.
    pub api_url: Option<String>,
    /// Authorization header (e.g. `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// `"hf"`, `"openai"`, or `"custom"` (default).
    pub api_provider: Option<String>,
    pub api_timeout_secs: Option<u64>,
    /// Texts per embedding request during cache warm-up.
    pub batch_size: usize,
    /// L2-normalize vectors returned by the backend.
    pub normalize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            model_name: "all-mpnet-base-v2".into(),
            dimension: 384,
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            api_timeout_secs: Some(30),
            batch_size: 32,
            normalize: true,
            retry_config: None,
        }
    }
}

impl SemanticConfig {
    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.mode.as_str() {
            "stub" => {
                if self.dimension == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "dimension must be greater than zero".into(),
                    ));
                }
            }
            "api" => {
                if self.api_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                    return Err(SemanticError::InvalidConfig(
                        "api_url is required for api mode".into(),
                    ));
                }
            }
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown mode '{other}', expected 'stub' or 'api'"
                )))
            }
        }
        if self.batch_size == 0 {
            return Err(SemanticError::InvalidConfig(
                "batch_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_stub() {
        let cfg = SemanticConfig::default();
        assert_eq!(cfg.mode, "stub");
        assert_eq!(cfg.model_name, "all-mpnet-base-v2");
        assert_eq!(cfg.batch_size, 32);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn api_mode_requires_url() {
        let mut cfg = SemanticConfig {
            mode: "api".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        cfg.api_url = Some("https://embed.example/v1".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_mode_and_zero_sizes() {
        let bad_mode = SemanticConfig {
            mode: "onnx".into(),
            ..Default::default()
        };
        assert!(bad_mode.validate().is_err());

        let zero_dim = SemanticConfig {
            dimension: 0,
            ..Default::default()
        };
        assert!(zero_dim.validate().is_err());

        let zero_batch = SemanticConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(zero_batch.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SemanticConfig =
            serde_json::from_str(r#"{"mode":"api","api_url":"http://x","retry_config":{"max_retries":1}}"#)
                .unwrap();
        assert_eq!(cfg.dimension, 384);
        assert_eq!(cfg.retry_config.map(|r| r.max_retries), Some(1));
    }
}
