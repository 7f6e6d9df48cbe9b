//! The similarity oracle seam used by the scorer.

use canonical::{Field, RecordRef};
use tracing::warn;

use crate::SemanticError;

/// A free-text value together with where it came from.
///
/// The origin is for logging and tracing only. Oracles must answer from the
/// text alone so that `score(a, b)` depends on nothing but the two records.
#[derive(Debug, Clone, Copy)]
pub struct TextRef<'a> {
    pub record: &'a RecordRef,
    pub field: Field,
    pub text: &'a str,
}

impl<'a> TextRef<'a> {
    pub fn new(record: &'a RecordRef, field: Field, text: &'a str) -> Self {
        Self {
            record,
            field,
            text,
        }
    }
}

/// Scores how alike two text snippets are.
///
/// Implementations must return a value in `[0, 1]` and be deterministic for
/// the lifetime of a matching run.
pub trait SimilarityOracle: Send + Sync {
    fn similarity(&self, a: &TextRef<'_>, b: &TextRef<'_>) -> f32;

    /// Called once before enumeration with every text that may be compared.
    fn prepare(&self, _texts: &[TextRef<'_>]) {}
}

/// An oracle backend that can fail. Wrap in [`NeutralOnError`] to use it
/// as a [`SimilarityOracle`].
pub trait FallibleOracle: Send + Sync {
    fn try_similarity(&self, a: &TextRef<'_>, b: &TextRef<'_>) -> Result<f32, SemanticError>;

    fn try_prepare(&self, _texts: &[TextRef<'_>]) -> Result<(), SemanticError> {
        Ok(())
    }
}

/// Clamp into `[0, 1]`; NaN becomes `0.0`.
pub fn sanitize_similarity(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Adapts a [`FallibleOracle`], answering `0.0` on error.
#[derive(Debug)]
pub struct NeutralOnError<O> {
    inner: O,
}

impl<O> NeutralOnError<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: FallibleOracle> SimilarityOracle for NeutralOnError<O> {
    fn similarity(&self, a: &TextRef<'_>, b: &TextRef<'_>) -> f32 {
        match self.inner.try_similarity(a, b) {
            Ok(sim) => sanitize_similarity(sim),
            Err(err) => {
                warn!(
                    error = %err,
                    left = %a.record,
                    right = %b.record,
                    field = %a.field,
                    "oracle_failure_neutral"
                );
                0.0
            }
        }
    }

    fn prepare(&self, texts: &[TextRef<'_>]) {
        if let Err(err) = self.inner.try_prepare(texts) {
            warn!(error = %err, texts = texts.len(), "oracle_prepare_failed");
        }
    }
}

/// Oracle backed by a plain function of the two texts.
///
/// ```rust
/// use canonical::{Field, RecordRef};
/// use semantic::{FnOracle, SimilarityOracle, TextRef};
///
/// let oracle = FnOracle::new(|a: &str, b: &str| if a == b { 1.0 } else { 0.0 });
/// let r = RecordRef::new("Victim", 0);
/// let t = TextRef::new(&r, Field::Description, "same");
/// assert_eq!(oracle.similarity(&t, &t), 1.0);
/// ```
pub struct FnOracle<F> {
    f: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&str, &str) -> f32 + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> SimilarityOracle for FnOracle<F>
where
    F: Fn(&str, &str) -> f32 + Send + Sync,
{
    fn similarity(&self, a: &TextRef<'_>, b: &TextRef<'_>) -> f32 {
        sanitize_similarity((self.f)(a.text, b.text))
    }
}

/// Oracle that returns the same similarity for every pair.
pub fn constant_oracle(value: f32) -> FnOracle<impl Fn(&str, &str) -> f32 + Send + Sync> {
    FnOracle::new(move |_: &str, _: &str| value)
}
