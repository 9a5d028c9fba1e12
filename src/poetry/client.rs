//! Jinrishici poem API client
//!
//! Fetches a single poem from the Jinrishici API. The response envelope is
//! `{"status": "success", "data": {...}}`; anything else is rejected.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::Poem;

/// Default endpoint for the poem API
pub const DEFAULT_ENDPOINT: &str = "https://v2.jinrishici.com/one.json";

/// Status marker the API uses for a successful response
const SUCCESS_STATUS: &str = "success";

/// Errors that can occur when fetching a poem
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status code
    #[error("HTTP error! status: {status}")]
    Transport { status: u16 },

    /// The request could not be completed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The body did not have the expected shape
    #[error("Invalid API response: {reason}")]
    InvalidResponse { reason: String },
}

impl FetchError {
    fn invalid(reason: impl Into<String>) -> Self {
        FetchError::InvalidResponse {
            reason: reason.into(),
        }
    }
}

/// Somewhere a poem can be fetched from
#[async_trait]
pub trait PoetrySource: Send + Sync {
    /// Makes a single attempt to fetch a poem
    async fn fetch_poem(&self) -> Result<Poem, FetchError>;
}

/// Response envelope from the poem API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: Option<String>,
    data: Option<Value>,
}

/// Client for fetching poems from the Jinrishici API
#[derive(Debug, Clone)]
pub struct JinrishiciClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Endpoint URL (allows override for testing)
    endpoint: String,
}

impl Default for JinrishiciClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JinrishiciClient {
    /// Creates a client for the default endpoint
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Creates a client for a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Replaces the underlying HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PoetrySource for JinrishiciClient {
    async fn fetch_poem(&self) -> Result<Poem, FetchError> {
        debug!(endpoint = %self.endpoint, "fetching poem");

        let response = self.http_client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        parse_response(&text)
    }
}

/// Parses the API envelope and extracts the poem payload
fn parse_response(text: &str) -> Result<Poem, FetchError> {
    let response: ApiResponse = serde_json::from_str(text)
        .map_err(|e| FetchError::invalid(format!("body is not valid JSON ({})", e)))?;

    match response.status.as_deref() {
        Some(SUCCESS_STATUS) => {}
        Some(other) => return Err(FetchError::invalid(format!("status \"{}\"", other))),
        None => return Err(FetchError::invalid("missing status")),
    }

    response
        .data
        .filter(|data| !is_empty_data(data))
        .map(Poem::new)
        .ok_or_else(|| FetchError::invalid("missing data"))
}

/// `false`, `0` and `""` carry no poem
fn is_empty_data(data: &Value) -> bool {
    match data {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}
