// Retriever
// Embeds a query and delegates nearest-neighbour search to the store


use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::settings::DEFAULT_MATCH_COUNT;
use crate::database::{ChunkMatch, ChunkStore, MatchQuery};
use crate::embeddings::{EmbeddingProvider, EmbeddingTask};
use crate::{RagError, Result};

/// A free-text search scoped to one notebook
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub notebook_id: Uuid,
    /// Restrict the search to these sources
    pub source_ids: Option<Vec<Uuid>>,
    pub limit: usize,
}

impl SearchQuery {
    #[inline]
    pub fn new(text: impl Into<String>, notebook_id: Uuid) -> Self {
        Self {
            text: text.into(),
            notebook_id,
            source_ids: None,
            limit: DEFAULT_MATCH_COUNT,
        }
    }

    /// Limit the search to the given sources. An empty list means no restriction.
    #[inline]
    #[must_use]
    pub fn with_sources(mut self, source_ids: Vec<Uuid>) -> Self {
        self.source_ids = (!source_ids.is_empty()).then_some(source_ids);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Search returning backend failures to the caller.
///
/// Matches come back ordered by descending similarity, at most `limit`.
pub async fn try_search(
    embedder: &dyn EmbeddingProvider,
    store: &dyn ChunkStore,
    query: &SearchQuery,
) -> Result<Vec<ChunkMatch>> {
    if query.text.trim().is_empty() || query.limit == 0 {
        debug!("Empty query or zero limit, skipping search");
        return Ok(Vec::new());
    }

    let embedding = embedder
        .embed(&query.text, EmbeddingTask::RetrievalQuery)
        .await
        .map_err(|e| RagError::Embedding(format!("{:#}", e)))?;

    if embedding.is_empty() {
        return Err(RagError::Embedding(
            "Provider returned an empty query embedding".to_string(),
        ));
    }

    let request = MatchQuery {
        embedding,
        notebook_id: query.notebook_id,
        source_ids: query.source_ids.clone(),
        match_count: query.limit,
    };

    let mut matches = store.match_chunks(&request).await?;
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches.truncate(query.limit);

    debug!(
        "Query in notebook {} matched {} chunks",
        query.notebook_id,
        matches.len()
    );
    Ok(matches)
}

/// Search that reports any failure as "no matches".
///
/// Use [`try_search`] to tell an unavailable backend apart from an empty result.
pub async fn search(
    embedder: &dyn EmbeddingProvider,
    store: &dyn ChunkStore,
    query: &SearchQuery,
) -> Vec<ChunkMatch> {
    match try_search(embedder, store, query).await {
        Ok(matches) => matches,
        Err(e) => {
            warn!("Search in notebook {} failed: {}", query.notebook_id, e);
            Vec::new()
        }
    }
}
