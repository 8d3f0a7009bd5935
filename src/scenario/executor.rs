//! Step executor and HTTP transport
//!
//! One call to [`StepExecutor::execute`] makes exactly one request. The
//! JSON-or-text decision for the response body is made here and nowhere
//! else; the ledger and extractor only see the decided [`StepBody`].

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use super::ledger::{StepBody, StepResult};
use crate::common::{Error, Result};

/// A fully resolved request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Sent as `Authorization: Bearer <token>`
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// A response before body decoding
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub text: String,
}

/// Network seam for the executor
///
/// Any `Err` returned here is run-fatal.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse>;
}

/// `reqwest`-backed transport with the client's default timeouts
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(user_agent: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, user_agent))
    }

    /// Use a preconfigured client, e.g. one with proxies disabled
    pub fn with_client(client: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header(USER_AGENT, &self.user_agent);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            Error::Transport(format!("{} {}: {}", request.method, request.url, e))
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(|e| {
            Error::Transport(format!(
                "Failed to read response body of {} {}: {}",
                request.method, request.url, e
            ))
        })?;

        Ok(RawResponse {
            status,
            content_type,
            text,
        })
    }
}

/// Performs steps against a fixed base address
pub struct StepExecutor<'a, T: Transport + ?Sized> {
    transport: &'a T,
    base_url: String,
}

impl<'a, T: Transport + ?Sized> StepExecutor<'a, T> {
    pub fn new(transport: &'a T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for an API-relative path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make one call and decode its body
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> Result<StepResult> {
        let request = HttpRequest {
            method,
            url: self.url_for(path),
            bearer: bearer.map(str::to_string),
            body,
        };
        debug!(method = %request.method, url = %request.url, "sending request");

        let raw = self.transport.send(&request).await?;
        debug!(status = raw.status, "received response");

        Ok(StepResult::new(
            raw.status,
            decode_body(raw.content_type.as_deref(), raw.text),
        ))
    }
}

/// Whether a content type declares JSON
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Parse JSON when the content type declares it, otherwise keep raw text
///
/// A body that claims JSON but fails to parse is kept as text too.
pub fn decode_body(content_type: Option<&str>, text: String) -> StepBody {
    if !content_type.map(is_json).unwrap_or(false) {
        return StepBody::Text(text);
    }
    match serde_json::from_str(&text) {
        Ok(value) => StepBody::Json(value),
        Err(e) => {
            warn!(error = %e, "Response declared JSON but did not parse; keeping raw text");
            StepBody::Text(text)
        }
    }
}
