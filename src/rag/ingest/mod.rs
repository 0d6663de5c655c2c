// Ingestion pipeline
// Chunks a source, embeds each chunk in order and persists the results in one batch


use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Result;
use crate::database::{ChunkStore, NewChunkRecord};
use crate::embeddings::{ChunkingConfig, EmbeddingProvider, EmbeddingTask, chunk_text};

/// Chunk, embed and store a source's text, returning the number of stored records.
///
/// Chunks whose embedding fails (or comes back empty) are logged and skipped.
/// Nothing is written when no chunk could be embedded. A failing write is
/// returned to the caller.
pub async fn ingest_source(
    embedder: &dyn EmbeddingProvider,
    store: &dyn ChunkStore,
    chunking: &ChunkingConfig,
    source_id: Uuid,
    text: &str,
) -> Result<usize> {
    let chunks = chunk_text(text, chunking);
    if chunks.is_empty() {
        debug!("Source {} has no content to ingest", source_id);
        return Ok(0);
    }

    info!(
        "Embedding {} chunks of source {} with {}",
        chunks.len(),
        source_id,
        embedder.model_name()
    );

    let mut records = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let embedding = match embedder
            .embed(&chunk.content, EmbeddingTask::RetrievalDocument)
            .await
        {
            Ok(embedding) if !embedding.is_empty() => embedding,
            Ok(_) => {
                warn!(
                    "Empty embedding for chunk {} of source {}, skipping",
                    chunk.chunk_index, source_id
                );
                continue;
            }
            Err(e) => {
                warn!(
                    "Failed to embed chunk {} of source {}: {:#}",
                    chunk.chunk_index, source_id, e
                );
                continue;
            }
        };

        records.push(NewChunkRecord {
            source_id,
            chunk_index: i32::try_from(chunk.chunk_index).unwrap_or(i32::MAX),
            content: chunk.content.clone(),
            embedding,
            token_count: i32::try_from(chunk.token_count).ok(),
            metadata: serde_json::json!({}),
        });
    }

    let skipped = chunks.len() - records.len();
    if records.is_empty() {
        warn!(
            "No chunk of source {} could be embedded ({} failed)",
            source_id, skipped
        );
        return Ok(0);
    }

    let stored = store.insert_chunks(&records).await?;
    info!(
        "Stored {} chunks for source {} ({} skipped)",
        stored.len(),
        source_id,
        skipped
    );
    Ok(stored.len())
}

/// Remove every stored chunk of a source. Safe to repeat.
#[inline]
pub async fn delete_source(store: &dyn ChunkStore, source_id: Uuid) -> Result<()> {
    store.delete_source_chunks(source_id).await?;
    info!("Deleted chunks of source {}", source_id);
    Ok(())
}

/// Delete a source's previous chunks, then ingest its current text
pub async fn replace_source(
    embedder: &dyn EmbeddingProvider,
    store: &dyn ChunkStore,
    chunking: &ChunkingConfig,
    source_id: Uuid,
    text: &str,
) -> Result<usize> {
    delete_source(store, source_id).await?;
    ingest_source(embedder, store, chunking, source_id, text).await
}
