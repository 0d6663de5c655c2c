#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chunk row as sent to the store on insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChunkRecord {
    pub source_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub embedding: Vec<f32>,
    pub token_count: Option<i32>,
    pub metadata: serde_json::Value,
}

/// Chunk row as returned by the store. The embedding column is not read back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChunkRecord {
    pub id: Uuid,
    pub source_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    #[serde(default)]
    pub token_count: Option<i32>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One row returned by the nearest-neighbour search procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMatch {
    pub id: Uuid,
    pub source_id: Uuid,
    pub content: String,
    /// 1 - cosine distance
    pub similarity: f64,
    #[serde(default)]
    pub chunk_index: Option<i32>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Parameters of a nearest-neighbour search
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub embedding: Vec<f32>,
    pub notebook_id: Uuid,
    pub source_ids: Option<Vec<Uuid>>,
    pub match_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    #[default]
    Pending,
    Processing,
    Ready,
    Error,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for SourceStatus {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            SourceStatus::Pending => write!(f, "pending"),
            SourceStatus::Processing => write!(f, "processing"),
            SourceStatus::Ready => write!(f, "ready"),
            SourceStatus::Error => write!(f, "error"),
            SourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A document owned by a notebook
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Source {
    pub id: Uuid,
    #[serde(default)]
    pub notebook_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default)]
    pub status: SourceStatus,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub source_guide: serde_json::Value,
}

impl Source {
    /// Raw text of a text source, kept in `metadata.content`
    #[inline]
    pub fn text_content(&self) -> Option<&str> {
        if self.source_type != "text" {
            return None;
        }
        non_blank(self.metadata.get("content"))
    }

    /// Generated summary from the source guide
    #[inline]
    pub fn summary(&self) -> Option<&str> {
        non_blank(self.source_guide.get("summary"))
    }
}

fn non_blank(value: Option<&serde_json::Value>) -> Option<&str> {
    value
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
