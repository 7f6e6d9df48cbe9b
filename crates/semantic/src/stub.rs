use fxhash::hash64;

use crate::embedder::Embedder;
use crate::normalize::l2_normalize_in_place;
use crate::SemanticError;

/// Deterministic bag-of-words embedder used in `"stub"` mode.
///
/// Each lowercase alphanumeric token is hashed into one of `dimension`
/// buckets with a hash-derived sign. Texts sharing vocabulary land close in
/// cosine space, so the stub behaves like a (crude) semantic model with no
/// assets and no network.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: "hashing-bow".into(),
            dimension: dimension.max(1),
            normalize: true,
        }
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let h = hash64(token.to_lowercase().as_bytes());
            let bucket = (h % self.dimension as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::cosine_similarity;

    #[test]
    fn same_text_same_vector() {
        let e = HashingEmbedder::default();
        let a = e.embed("Refund of parcel fee").unwrap();
        let b = e.embed("refund OF parcel   fee").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
    }

    #[test]
    fn vectors_are_unit_length() {
        let e = HashingEmbedder::new(64);
        let v = e.embed("caller posed as bank officer").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm={norm}");
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = HashingEmbedder::new(16);
        assert!(e.embed("  ").unwrap().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let e = HashingEmbedder::default();
        let base = e.embed("fake courier asked for customs fee via upi").unwrap();
        let close = e.embed("courier asked customs fee upi payment").unwrap();
        let far = e.embed("investment app promised crypto returns").unwrap();
        assert!(cosine_similarity(&base, &close) > cosine_similarity(&base, &far));
    }

    #[test]
    fn batch_preserves_order() {
        let e = HashingEmbedder::new(32);
        let batch = e.embed_batch(&["a", "b"]).unwrap();
        assert_eq!(batch[0], e.embed("a").unwrap());
        assert_eq!(batch[1], e.embed("b").unwrap());
    }

    #[test]
    fn model_name_is_configurable() {
        let e = HashingEmbedder::new(8).with_model_name("all-mpnet-base-v2");
        assert_eq!(e.model_name(), "all-mpnet-base-v2");
        assert_eq!(e.dimension(), 8);
    }
}
