// Embeddings module
// Query embedding through a provider shared with the offline corpus build

pub mod ollama;


pub use ollama::OllamaClient;

use crate::Result;

/// Maps text into the embedding space of the indexed corpus
///
/// The corpus and the query must be embedded by the same model, otherwise
/// similarity scores are meaningless.
pub trait EmbeddingProvider {
    /// Identifier of the underlying model
    fn model(&self) -> &str;

    /// Embed a single text. The output need not be normalized.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for &T {
    #[inline]
    fn model(&self) -> &str {
        (**self).model()
    }

    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<T> {
    #[inline]
    fn model(&self) -> &str {
        (**self).model()
    }

    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

/// Scale a vector to unit L2 length in place. Zero vectors are left untouched.
#[inline]
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
