//! scamlink text similarity
//!
//! The scorer compares free-text fields (descriptions, profile details, ...)
//! through a [`SimilarityOracle`]. This crate defines that seam and the
//! backends behind it.
//!
//! We support two embedding modes:
//!
//! - **Stub mode** - [`HashingEmbedder`], a deterministic hashed bag of words.
//!   No model files, no network. Good for tests and offline runs.
//! - **API mode** - [`HttpEmbedder`], posts batches to a Hugging Face, OpenAI,
//!   or custom endpoint and retries transient failures.
//!
//! Either one sits behind [`EmbeddingOracle`], which caches one vector per
//! distinct text and answers cosine similarity clamped to
//! `[0, 1]`. Tests usually skip embeddings entirely and use [`FnOracle`].
//!
//! ## Failure behaviour
//!
//! Oracles never fail the scorer. An embedding error is logged and the pair
//! gets similarity `0.0`; see [`NeutralOnError`] for wrapping custom backends.
//!
//! ## Quick example
//!
//! ```rust
//! use canonical::{Field, RecordRef};
//! use semantic::{build_oracle, SemanticConfig, SimilarityOracle, TextRef};
//!
//! let oracle = build_oracle(&SemanticConfig::default()).unwrap();
//! let (v, o) = (RecordRef::new("Victim", 0), RecordRef::new("Official", 0));
//! let a = TextRef::new(&v, Field::Description, "asked to pay customs fee for parcel");
//! let b = TextRef::new(&o, Field::Description, "parcel held, customs fee demanded");
//! let sim = oracle.similarity(&a, &b);
//! assert!((0.0..=1.0).contains(&sim));
//! ```
//!
//! ## Env vars to know
//!
//! - `SCAMLINK_SEMANTIC_API_URL` - Override the API endpoint
//! - `SCAMLINK_SEMANTIC_API_TOKEN` - Bearer token for the endpoint
//!
//! Both are applied by the root `scamlink` config loader.

pub mod config;
pub mod error;
pub mod retry;
mod serde_millis;

mod api;
mod cache;
mod embedder;
mod normalize;
mod oracle;
mod stub;

use std::sync::Arc;

use tracing::info;

pub use crate::api::HttpEmbedder;
pub use crate::cache::EmbeddingOracle;
pub use crate::config::SemanticConfig;
pub use crate::embedder::Embedder;
pub use crate::error::SemanticError;
pub use crate::normalize::cosine_similarity;
pub use crate::oracle::{
    constant_oracle, sanitize_similarity, FallibleOracle, FnOracle, NeutralOnError,
    SimilarityOracle, TextRef,
};
pub use crate::retry::RetryConfig;
pub use crate::stub::HashingEmbedder;

/// Build the embedder selected by `cfg.mode`.
pub fn build_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn Embedder>, SemanticError> {
    cfg.validate()?;
    let embedder: Arc<dyn Embedder> = match cfg.mode.as_str() {
        "api" => Arc::new(HttpEmbedder::from_config(cfg)?),
        _ => Arc::new(
            HashingEmbedder::new(cfg.dimension)
                .with_model_name(cfg.model_name.clone())
                .with_normalize(cfg.normalize),
        ),
    };
    info!(mode = %cfg.mode, model = embedder.model_name(), "semantic_backend_ready");
    Ok(embedder)
}

/// Build a caching embedding oracle for `cfg`.
pub fn build_oracle(cfg: &SemanticConfig) -> Result<Arc<EmbeddingOracle>, SemanticError> {
    let embedder = build_embedder(cfg)?;
    Ok(Arc::new(
        EmbeddingOracle::new(embedder).with_batch_size(cfg.batch_size),
    ))
}
