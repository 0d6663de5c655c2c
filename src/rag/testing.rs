// In-memory doubles for the embedding provider and the stores

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::database::{
    ChunkMatch, ChunkRecord, ChunkStore, MatchQuery, NewChunkRecord, NotebookStore, Source,
    SourceStatus,
};
use crate::embeddings::{EmbeddingProvider, EmbeddingTask};
use crate::persona::NotebookSettings;
use crate::{RagError, Result};

pub const MOCK_DIMENSIONS: usize = 4;

/// Embeds any text as the same small vector. Text containing any of the
/// `fail_on` markers makes the call fail, text containing any of the
/// `empty_on` markers gets an empty vector.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    pub fail_on: Vec<String>,
    pub empty_on: Vec<String>,
    pub fail_all: bool,
    pub calls: Mutex<Vec<(String, EmbeddingTask)>>,
}

impl MockEmbedder {
    pub fn failing_on(markers: &[&str]) -> Self {
        Self {
            fail_on: markers.iter().map(|m| (*m).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn empty_on(markers: &[&str]) -> Self {
        Self {
            empty_on: markers.iter().map(|m| (*m).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, EmbeddingTask)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> anyhow::Result<Vec<f32>> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((text.to_string(), task));

        if self.fail_all || self.fail_on.iter().any(|marker| text.contains(marker.as_str())) {
            anyhow::bail!("provider unavailable");
        }
        let empty_marker = self.empty_on.iter().any(|marker| text.contains(marker.as_str()));
        if empty_marker || text.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![1.0, 0.5, 0.0, -1.0])
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }

    fn dimensions(&self) -> usize {
        MOCK_DIMENSIONS
    }
}

/// Records writes and answers searches from canned data
#[derive(Debug, Default)]
pub struct MockStore {
    pub matches: Vec<ChunkMatch>,
    pub sources: Vec<Source>,
    pub fail_insert: bool,
    pub fail_match: bool,
    pub fail_sources: bool,
    pub inserted: Mutex<Vec<Vec<NewChunkRecord>>>,
    pub deleted: Mutex<Vec<Uuid>>,
    pub queries: Mutex<Vec<MatchQuery>>,
    pub saved_settings: Mutex<Option<NotebookSettings>>,
}

impl MockStore {
    pub fn with_matches(matches: Vec<ChunkMatch>) -> Self {
        Self {
            matches,
            ..Self::default()
        }
    }

    pub fn insert_batches(&self) -> Vec<Vec<NewChunkRecord>> {
        self.inserted.lock().expect("insert lock").clone()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.deleted.lock().expect("delete lock").clone()
    }

    pub fn queries(&self) -> Vec<MatchQuery> {
        self.queries.lock().expect("query lock").clone()
    }
}

#[async_trait]
impl ChunkStore for MockStore {
    async fn insert_chunks(&self, records: &[NewChunkRecord]) -> Result<Vec<ChunkRecord>> {
        if self.fail_insert {
            return Err(RagError::Store("insert rejected".to_string()));
        }

        self.inserted
            .lock()
            .expect("insert lock")
            .push(records.to_vec());

        Ok(records
            .iter()
            .map(|record| ChunkRecord {
                id: Uuid::new_v4(),
                source_id: record.source_id,
                chunk_index: record.chunk_index,
                content: record.content.clone(),
                token_count: record.token_count,
                metadata: record.metadata.clone(),
                created_at: None,
            })
            .collect())
    }

    async fn delete_source_chunks(&self, source_id: Uuid) -> Result<()> {
        self.deleted.lock().expect("delete lock").push(source_id);
        Ok(())
    }

    async fn match_chunks(&self, query: &MatchQuery) -> Result<Vec<ChunkMatch>> {
        self.queries.lock().expect("query lock").push(query.clone());
        if self.fail_match {
            return Err(RagError::Network("search unavailable".to_string()));
        }
        Ok(self.matches.clone())
    }
}

#[async_trait]
impl NotebookStore for MockStore {
    async fn sources_by_id(&self, ids: &[Uuid]) -> Result<Vec<Source>> {
        if self.fail_sources {
            return Err(RagError::Store("sources unavailable".to_string()));
        }
        Ok(self
            .sources
            .iter()
            .filter(|source| ids.contains(&source.id))
            .cloned()
            .collect())
    }

    async fn ready_sources(
        &self,
        notebook_id: Uuid,
        source_ids: Option<&[Uuid]>,
    ) -> Result<Vec<Source>> {
        if self.fail_sources {
            return Err(RagError::Store("sources unavailable".to_string()));
        }
        Ok(self
            .sources
            .iter()
            .filter(|source| source.notebook_id == Some(notebook_id))
            .filter(|source| source.status == SourceStatus::Ready)
            .filter(|source| source_ids.is_none_or(|ids| ids.contains(&source.id)))
            .cloned()
            .collect())
    }

    async fn load_settings(&self, _notebook_id: Uuid) -> Result<NotebookSettings> {
        Ok(self
            .saved_settings
            .lock()
            .expect("settings lock")
            .clone()
            .unwrap_or_default())
    }

    async fn save_settings(&self, _notebook_id: Uuid, settings: &NotebookSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| RagError::Settings(e.to_string()))?;
        *self.saved_settings.lock().expect("settings lock") = Some(settings.clone());
        Ok(())
    }
}

pub fn chunk_match(source_id: Uuid, content: &str, similarity: f64) -> ChunkMatch {
    ChunkMatch {
        id: Uuid::new_v4(),
        source_id,
        content: content.to_string(),
        similarity,
        chunk_index: None,
        metadata: serde_json::Value::Null,
    }
}

pub fn source(notebook_id: Uuid, name: &str, source_type: &str, status: SourceStatus) -> Source {
    Source {
        id: Uuid::new_v4(),
        notebook_id: Some(notebook_id),
        name: name.to_string(),
        source_type: source_type.to_string(),
        status,
        metadata: serde_json::json!({}),
        source_guide: serde_json::Value::Null,
    }
}
