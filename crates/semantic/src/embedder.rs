use crate::SemanticError;

/// Turns text into dense vectors.
pub trait Embedder: Send + Sync {
    /// Label reported in logs.
    fn model_name(&self) -> &str;

    /// Embed every input, returning one vector per text in input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError>;

    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| SemanticError::Response("embedder returned no vector".into()))
    }
}
