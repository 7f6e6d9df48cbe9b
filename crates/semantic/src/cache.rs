use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use fxhash::FxHashSet;
use tracing::{debug, warn};

use crate::embedder::Embedder;
use crate::normalize::cosine_similarity;
use crate::oracle::{sanitize_similarity, SimilarityOracle, TextRef};
use crate::SemanticError;

/// Cosine-similarity oracle over cached embeddings.
///
/// Embeddings are keyed by the text itself, so equal texts share one vector
/// whichever record or collection they come from. [`warm`] encodes
/// everything up front in batches; anything it missed is embedded on first
/// use. Concurrent scorers share the cache without extra locking.
///
/// [`warm`]: EmbeddingOracle::warm
pub struct EmbeddingOracle {
    embedder: Arc<dyn Embedder>,
    cache: DashMap<Arc<str>, Arc<Vec<f32>>>,
    batch_size: usize,
}

impl EmbeddingOracle {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            cache: DashMap::new(),
            batch_size: 32,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Embed every non-empty text not already cached. Identical texts are
    /// sent to the embedder once. Returns the number of distinct texts
    /// embedded.
    pub fn warm(&self, texts: &[TextRef<'_>]) -> Result<usize, SemanticError> {
        let start = Instant::now();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut order: Vec<&str> = Vec::new();
        for t in texts {
            if t.text.trim().is_empty() || self.cache.contains_key(t.text) {
                continue;
            }
            if seen.insert(t.text) {
                order.push(t.text);
            }
        }

        for chunk in order.chunks(self.batch_size) {
            let vectors = self.embedder.embed_batch(chunk)?;
            if vectors.len() != chunk.len() {
                return Err(SemanticError::Response(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    chunk.len()
                )));
            }
            for (text, vector) in chunk.iter().zip(vectors) {
                self.cache.insert(Arc::from(*text), Arc::new(vector));
            }
        }

        debug!(
            model = self.embedder.model_name(),
            requested = texts.len(),
            embedded = order.len(),
            cached = self.cache.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "embedding_cache_warm"
        );
        Ok(order.len())
    }

    fn vector_for(&self, text: &TextRef<'_>) -> Result<Arc<Vec<f32>>, SemanticError> {
        if let Some(hit) = self.cache.get(text.text) {
            return Ok(Arc::clone(hit.value()));
        }
        let vector = Arc::new(self.embedder.embed(text.text)?);
        self.cache.insert(Arc::from(text.text), Arc::clone(&vector));
        Ok(vector)
    }

    /// Similarity that surfaces embedder failures instead of hiding them.
    pub fn try_similarity(&self, a: &TextRef<'_>, b: &TextRef<'_>) -> Result<f32, SemanticError> {
        if a.text.trim().is_empty() || b.text.trim().is_empty() {
            return Ok(0.0);
        }
        let va = self.vector_for(a)?;
        let vb = self.vector_for(b)?;
        Ok(sanitize_similarity(cosine_similarity(&va, &vb)))
    }
}

impl SimilarityOracle for EmbeddingOracle {
    fn similarity(&self, a: &TextRef<'_>, b: &TextRef<'_>) -> f32 {
        match self.try_similarity(a, b) {
            Ok(sim) => sim,
            Err(err) => {
                warn!(
                    error = %err,
                    left = %a.record,
                    right = %b.record,
                    field = %a.field,
                    "embedding_failure_neutral"
                );
                0.0
            }
        }
    }

    fn prepare(&self, texts: &[TextRef<'_>]) {
        if let Err(err) = self.warm(texts) {
            warn!(error = %err, texts = texts.len(), "embedding_cache_warm_failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::HashingEmbedder;
    use canonical::{Field, RecordRef};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how many texts reach the embedder.
    struct Counting {
        inner: HashingEmbedder,
        texts: AtomicUsize,
        batches: AtomicUsize,
    }

    impl Counting {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: HashingEmbedder::new(64),
                texts: AtomicUsize::new(0),
                batches: AtomicUsize::new(0),
            })
        }
    }

    impl Embedder for Counting {
        fn model_name(&self) -> &str {
            "counting"
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
            self.texts.fetch_add(texts.len(), Ordering::SeqCst);
            self.batches.fetch_add(1, Ordering::SeqCst);
            self.inner.embed_batch(texts)
        }
    }

    struct Broken;

    impl Embedder for Broken {
        fn model_name(&self) -> &str {
            "broken"
        }

        fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
            Err(SemanticError::Http {
                status: Some(500),
                message: "down".into(),
            })
        }
    }

    #[test]
    fn warm_deduplicates_identical_texts() {
        let counting = Counting::new();
        let oracle = EmbeddingOracle::new(counting.clone()).with_batch_size(2);
        let refs: Vec<RecordRef> = (0..4).map(|i| RecordRef::new("Victim", i)).collect();
        let texts = [
            TextRef::new(&refs[0], Field::Description, "otp fraud"),
            TextRef::new(&refs[1], Field::Description, "otp fraud"),
            TextRef::new(&refs[2], Field::Description, "loan app"),
            TextRef::new(&refs[3], Field::Description, "   "),
            TextRef::new(&refs[0], Field::ProfileDetails, "posed as police"),
        ];
        assert_eq!(oracle.warm(&texts).unwrap(), 3);
        assert_eq!(counting.texts.load(Ordering::SeqCst), 3);
        assert_eq!(counting.batches.load(Ordering::SeqCst), 2);
        assert_eq!(oracle.len(), 3);

        // Already cached: nothing new is embedded.
        assert_eq!(oracle.warm(&texts).unwrap(), 0);
        assert_eq!(counting.texts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn similarity_uses_cache_and_fills_misses() {
        let counting = Counting::new();
        let oracle = EmbeddingOracle::new(counting.clone());
        let v = RecordRef::new("Victim", 0);
        let o = RecordRef::new("Official", 0);
        let a = TextRef::new(&v, Field::Description, "courier customs fee");
        let b = TextRef::new(&o, Field::Description, "courier customs fee");

        let sim = oracle.similarity(&a, &b);
        assert!((sim - 1.0).abs() < 1e-5);
        assert_eq!(counting.texts.load(Ordering::SeqCst), 2);

        let again = oracle.similarity(&b, &a);
        assert_eq!(sim, again);
        assert_eq!(counting.texts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn same_position_in_same_label_collections_does_not_share_vectors() {
        let oracle = EmbeddingOracle::new(Arc::new(HashingEmbedder::new(64)));
        let first = RecordRef::new("Victim", 0);
        let second = RecordRef::new("Victim", 0);
        let a = TextRef::new(&first, Field::Description, "lottery prize claim fee");
        let b = TextRef::new(&second, Field::Description, "courier parcel customs duty");
        oracle.warm(&[a]).unwrap();

        let sim = oracle.similarity(&a, &b);
        assert!(sim < 0.99, "distinct texts scored {sim}");
        assert_eq!(oracle.len(), 2);
    }

    #[test]
    fn empty_text_short_circuits() {
        let oracle = EmbeddingOracle::new(Counting::new());
        let r = RecordRef::new("Victim", 0);
        let a = TextRef::new(&r, Field::Description, "");
        let b = TextRef::new(&r, Field::ProfileDetails, "something");
        assert_eq!(oracle.similarity(&a, &b), 0.0);
        assert!(oracle.is_empty());
    }

    #[test]
    fn embedder_failure_is_neutral() {
        let oracle = EmbeddingOracle::new(Arc::new(Broken));
        let r = RecordRef::new("Victim", 0);
        let a = TextRef::new(&r, Field::Description, "x");
        assert_eq!(oracle.similarity(&a, &a), 0.0);
        assert!(oracle.try_similarity(&a, &a).is_err());
        oracle.prepare(&[a]);
        assert!(oracle.is_empty());
    }

    #[test]
    fn similarity_is_within_unit_interval() {
        let oracle = EmbeddingOracle::new(Arc::new(HashingEmbedder::new(8)));
        let r = RecordRef::new("Victim", 0);
        let s = RecordRef::new("Victim", 1);
        let a = TextRef::new(&r, Field::Description, "alpha beta gamma delta");
        let b = TextRef::new(&s, Field::Description, "epsilon zeta eta theta");
        let sim = oracle.similarity(&a, &b);
        assert!((0.0..=1.0).contains(&sim));
    }
}
