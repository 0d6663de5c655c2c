// Blocking ureq requests moved onto tokio's blocking pool

#[cfg(test)]
mod tests;

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const ERROR_BODY_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl std::fmt::Display for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("HTTP worker failed: {0}")]
    Worker(String),
}

impl HttpError {
    /// Status code of a non-success response, if the server answered
    #[inline]
    pub fn status(&self) -> Option<u16> {
        match *self {
            HttpError::Status { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// A fully described request that can be moved to a worker thread
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl HttpRequest {
    #[inline]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[inline]
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self.header("Content-Type", "application/json"))
    }

    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[inline]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    #[inline]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }

    /// Send the request and return the response body of a 2xx answer
    #[inline]
    pub async fn send(&self, request: HttpRequest) -> Result<String, HttpError> {
        let agent = self.agent.clone();
        let url = request.url.to_string();
        debug!("{} {}", request.method, url);

        let outcome = tokio::task::spawn_blocking(move || execute(&agent, &request))
            .await
            .map_err(|e| HttpError::Worker(e.to_string()))?;

        match outcome {
            Ok((status, body)) if (200..300).contains(&status) => {
                debug!("{} answered {} ({} bytes)", url, status, body.len());
                Ok(body)
            }
            Ok((status, body)) => {
                warn!("{} answered {}", url, status);
                Err(HttpError::Status {
                    status,
                    url,
                    body: preview(&body),
                })
            }
            Err(e) => {
                warn!("Transport error for {}: {}", url, e);
                Err(HttpError::Transport {
                    url,
                    message: e.to_string(),
                })
            }
        }
    }
}

fn execute(agent: &ureq::Agent, request: &HttpRequest) -> Result<(u16, String), ureq::Error> {
    let url = request.url.as_str();
    let body = request.body.as_deref().unwrap_or_default();

    let mut response = match request.method {
        Method::Get => with_headers(agent.get(url), &request.headers).call()?,
        Method::Delete => with_headers(agent.delete(url), &request.headers).call()?,
        Method::Post => with_headers(agent.post(url), &request.headers).send(body.as_bytes())?,
        Method::Patch => with_headers(agent.patch(url), &request.headers).send(body.as_bytes())?,
    };

    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string()?;
    Ok((status, text))
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
    format!("{}…", cut)
}
