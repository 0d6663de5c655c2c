// Store module
// Chunk and notebook persistence behind async traits, with a PostgREST client
// and the Postgres schema migrations

pub mod models;
pub mod postgres;
pub mod supabase;

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;
use crate::persona::NotebookSettings;

pub use models::{ChunkMatch, ChunkRecord, MatchQuery, NewChunkRecord, Source, SourceStatus};
pub use supabase::SupabaseClient;

/// Persistence of chunk records and the vector search over them
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert all records in one write, returning the stored rows
    async fn insert_chunks(&self, records: &[NewChunkRecord]) -> Result<Vec<ChunkRecord>>;

    /// Remove every chunk of a source. Idempotent.
    async fn delete_source_chunks(&self, source_id: Uuid) -> Result<()>;

    /// Nearest neighbours of the query embedding, closest first
    async fn match_chunks(&self, query: &MatchQuery) -> Result<Vec<ChunkMatch>>;
}

/// Notebook-level reads and settings persistence
#[async_trait]
pub trait NotebookStore: Send + Sync {
    async fn sources_by_id(&self, ids: &[Uuid]) -> Result<Vec<Source>>;

    /// Ready sources of a notebook, optionally limited to `source_ids`
    async fn ready_sources(
        &self,
        notebook_id: Uuid,
        source_ids: Option<&[Uuid]>,
    ) -> Result<Vec<Source>>;

    /// Stored settings, or defaults when none were ever saved
    async fn load_settings(&self, notebook_id: Uuid) -> Result<NotebookSettings>;

    /// Validate and write the whole settings record
    async fn save_settings(&self, notebook_id: Uuid, settings: &NotebookSettings) -> Result<()>;
}
