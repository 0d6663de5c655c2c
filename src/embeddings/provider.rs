//! Provider-agnostic embedding trait for generating vectors from text.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Hint telling the provider how the vector will be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmbeddingTask {
    /// Text stored for later retrieval
    RetrievalDocument,
    /// Free-text query matched against stored documents
    RetrievalQuery,
}

impl std::fmt::Display for EmbeddingTask {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            EmbeddingTask::RetrievalDocument => write!(f, "RETRIEVAL_DOCUMENT"),
            EmbeddingTask::RetrievalQuery => write!(f, "RETRIEVAL_QUERY"),
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    ///
    /// Blank input yields an empty vector without contacting the provider.
    async fn embed(&self, text: &str, task: EmbeddingTask) -> anyhow::Result<Vec<f32>>;

    /// The model name used by this provider (e.g. "text-embedding-004").
    fn model_name(&self) -> &str;

    /// The dimensionality of the embeddings produced.
    fn dimensions(&self) -> usize;
}

/// Prepare provider input: `None` for blank text, otherwise the text cut to
/// at most `max_chars` characters.
#[inline]
pub fn prepare_input(text: &str, max_chars: usize) -> Option<&str> {
    if text.trim().is_empty() {
        return None;
    }

    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => text.get(..byte_end),
        None => Some(text),
    }
}
