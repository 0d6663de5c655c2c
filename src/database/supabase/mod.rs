// PostgREST client for a Supabase project
// Every request authenticates with the service-role key as both API key and bearer token


use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::database::models::{ChunkMatch, ChunkRecord, MatchQuery, NewChunkRecord, Source};
use crate::database::{ChunkStore, NotebookStore};
use crate::http::{HttpClient, HttpRequest, Method};
use crate::persona::NotebookSettings;
use crate::{RagError, Result};

const SOURCES_TABLE: &str = "sources";
const NOTEBOOKS_TABLE: &str = "notebooks";
const SOURCE_COLUMNS: &str = "id,notebook_id,name,type,status,metadata,source_guide";
// Inserts echo these back, never the embedding
const CHUNK_COLUMNS: &str = "id,source_id,chunk_index,content,token_count,metadata,created_at";

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: HttpClient,
    rest_url: Url,
    service_key: String,
    chunk_table: String,
    match_function: String,
}

#[derive(Debug, Serialize)]
struct MatchParams<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
    p_notebook_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    p_source_ids: Option<&'a [Uuid]>,
}

#[derive(Debug, Deserialize)]
struct SettingsRow {
    #[serde(default)]
    settings: Option<NotebookSettings>,
}

#[derive(Debug, Serialize)]
struct SettingsUpdate<'a> {
    settings: &'a NotebookSettings,
}

impl SupabaseClient {
    #[inline]
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let service_key = config.require_service_key()?.to_string();
        let rest_url = base_url
            .join("rest/v1/")
            .map_err(|e| RagError::Config(format!("Invalid store URL {}: {}", base_url, e)))?;

        Ok(Self {
            http: HttpClient::new(Duration::from_secs(config.timeout_secs)),
            rest_url,
            service_key,
            chunk_table: config.chunk_table.clone(),
            match_function: config.match_function.clone(),
        })
    }

    #[inline]
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    fn table_url(&self, path: &str) -> Result<Url> {
        self.rest_url
            .join(path)
            .map_err(|e| RagError::Config(format!("Invalid store path {}: {}", path, e)))
    }

    fn request(&self, method: Method, url: Url) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("apikey", self.service_key.as_str())
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<Vec<T>> {
        let body = self.http.send(request).await?;
        parse_rows(&body)
    }

    async fn fetch_sources(&self, filters: &[(&str, String)]) -> Result<Vec<Source>> {
        let mut url = self.table_url(SOURCES_TABLE)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", SOURCE_COLUMNS);
            for (column, filter) in filters {
                pairs.append_pair(column, filter);
            }
        }

        self.fetch_rows(self.request(Method::Get, url)).await
    }
}

#[async_trait]
impl ChunkStore for SupabaseClient {
    async fn insert_chunks(&self, records: &[NewChunkRecord]) -> Result<Vec<ChunkRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.table_url(&self.chunk_table)?;
        url.query_pairs_mut().append_pair("select", CHUNK_COLUMNS);

        let request = self
            .request(Method::Post, url)
            .header("Prefer", "return=representation")
            .json(records)?;

        let rows: Vec<ChunkRecord> = self.fetch_rows(request).await?;
        info!("Stored {} chunk records in {}", rows.len(), self.chunk_table);
        Ok(rows)
    }

    async fn delete_source_chunks(&self, source_id: Uuid) -> Result<()> {
        let mut url = self.table_url(&self.chunk_table)?;
        url.query_pairs_mut()
            .append_pair("source_id", &format!("eq.{}", source_id));

        self.http.send(self.request(Method::Delete, url)).await?;
        debug!("Deleted chunks of source {}", source_id);
        Ok(())
    }

    async fn match_chunks(&self, query: &MatchQuery) -> Result<Vec<ChunkMatch>> {
        let url = self.table_url(&format!("rpc/{}", self.match_function))?;
        let params = MatchParams {
            query_embedding: &query.embedding,
            match_count: query.match_count,
            p_notebook_id: query.notebook_id,
            p_source_ids: query.source_ids.as_deref(),
        };

        let request = self.request(Method::Post, url).json(&params)?;
        let matches: Vec<ChunkMatch> = self.fetch_rows(request).await?;
        debug!(
            "Search in notebook {} returned {} matches",
            query.notebook_id,
            matches.len()
        );
        Ok(matches)
    }
}

#[async_trait]
impl NotebookStore for SupabaseClient {
    async fn sources_by_id(&self, ids: &[Uuid]) -> Result<Vec<Source>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.fetch_sources(&[("id", in_filter(ids))]).await
    }

    async fn ready_sources(
        &self,
        notebook_id: Uuid,
        source_ids: Option<&[Uuid]>,
    ) -> Result<Vec<Source>> {
        let mut filters = vec![
            ("notebook_id", format!("eq.{}", notebook_id)),
            ("status", "eq.ready".to_string()),
        ];
        if let Some(ids) = source_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            filters.push(("id", in_filter(ids)));
        }

        self.fetch_sources(&filters).await
    }

    async fn load_settings(&self, notebook_id: Uuid) -> Result<NotebookSettings> {
        let mut url = self.table_url(NOTEBOOKS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "settings")
            .append_pair("id", &format!("eq.{}", notebook_id));

        let rows: Vec<SettingsRow> = self.fetch_rows(self.request(Method::Get, url)).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Store(format!("Notebook {} not found", notebook_id)))?;

        Ok(row.settings.unwrap_or_default())
    }

    async fn save_settings(&self, notebook_id: Uuid, settings: &NotebookSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| RagError::Settings(e.to_string()))?;

        let mut url = self.table_url(NOTEBOOKS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", notebook_id))
            .append_pair("select", "id");

        let request = self
            .request(Method::Patch, url)
            .header("Prefer", "return=representation")
            .json(&SettingsUpdate { settings })?;

        let updated: Vec<IgnoredAny> = self.fetch_rows(request).await?;
        if updated.is_empty() {
            return Err(RagError::Store(format!(
                "Notebook {} not found",
                notebook_id
            )));
        }

        info!("Saved settings for notebook {}", notebook_id);
        Ok(())
    }
}

fn in_filter(ids: &[Uuid]) -> String {
    let joined = ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    serde_json::from_str(body)
        .map_err(|e| RagError::Store(format!("Unexpected response from store: {}", e)))
}
