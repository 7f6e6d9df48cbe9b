use thiserror::Error;

/// Errors that can occur while configuring field normalization.
///
/// Normalizing a value never fails; only an inconsistent
/// [`NormalizeConfig`](crate::NormalizeConfig) is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
