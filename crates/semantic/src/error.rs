use thiserror::Error;

/// Errors surfaced by embedders and fallible oracles.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g. `api` mode without an endpoint).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Transport failure or non-success status from the embedding endpoint.
    /// `status` is `None` when no response was received.
    #[error("http error{}: {message}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Http { status: Option<u16>, message: String },
    /// The endpoint answered but the body could not be turned into vectors.
    #[error("unexpected embedding response: {0}")]
    Response(String),
}

impl SemanticError {
    /// Transport errors, `429`, and `5xx` are worth retrying; everything else
    /// will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SemanticError::Http { status: None, .. } => true,
            SemanticError::Http {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}
