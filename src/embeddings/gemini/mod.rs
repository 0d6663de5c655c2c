
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::RagError;
use crate::config::EmbeddingConfig;
use crate::embeddings::provider::{EmbeddingProvider, EmbeddingTask, prepare_input};
use crate::http::{HttpClient, HttpRequest, Method};

/// Client for the Generative Language `embedContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: HttpClient,
    base_url: Url,
    model: String,
    api_key: String,
    dimension: usize,
    max_input_chars: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: EmbeddingTask,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl GeminiClient {
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base_url = config
            .base_url()
            .context("Failed to parse embedding base URL from config")?;
        let api_key = config
            .require_api_key()
            .context("Embedding provider is not configured")?
            .to_string();

        let model = config
            .model
            .strip_prefix("models/")
            .unwrap_or(&config.model)
            .to_string();

        Ok(Self {
            http: HttpClient::new(Duration::from_secs(config.timeout_secs)),
            base_url,
            model,
            api_key,
            dimension: config.dimension as usize,
            max_input_chars: config.max_input_chars,
        })
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = HttpClient::new(timeout);
        self
    }

    fn endpoint(&self) -> Result<Url> {
        self.base_url
            .join(&format!("v1beta/models/{}:embedContent", self.model))
            .context("Failed to build embedding URL")
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        let Some(input) = prepare_input(text, self.max_input_chars) else {
            debug!("Skipping embedding request for blank input");
            return Ok(Vec::new());
        };

        debug!(
            "Generating {} embedding for text (length: {})",
            task,
            input.len()
        );

        let body = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: [Part { text: input }],
            },
            task_type: task,
        };

        let request = HttpRequest::new(Method::Post, self.endpoint()?)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .context("Failed to serialize embedding request")?;

        let response_text = self
            .http
            .send(request)
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))
            .context("Failed to generate embedding")?;

        let response: EmbedContentResponse = serde_json::from_str(&response_text)
            .context("Failed to parse embedding response")?;

        let values = response.embedding.values;
        if values.len() != self.dimension {
            return Err(RagError::Embedding(format!(
                "Expected {} dimensions from {}, got {}",
                self.dimension,
                self.model,
                values.len()
            ))
            .into());
        }

        debug!("Generated embedding with {} dimensions", values.len());
        Ok(values)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimension
    }
}
