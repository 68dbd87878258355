//! HTTP transport for the character API and the wiki
//!
//! A [`Transport`] turns a path into a raw response body. The production
//! implementation wraps a `reqwest::Client` configured with a base URL, a static
//! header set and connect/read/write timeouts. No retries happen at this layer.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::TransportConfig;

/// Errors surfaced by a transport
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {path}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },

    /// Timeout, DNS failure, refused connection or a broken body
    #[error("Request to {path} failed: {message}")]
    Network { path: String, message: String },

    /// The client itself could not be built
    #[error("Invalid transport configuration: {0}")]
    Config(String),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::Status { status: 404, .. })
    }

    /// Status code carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Something that can GET a path relative to a fixed base URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `path` and returns the body of a 2xx response
    async fn get(&self, path: &str) -> Result<String, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a client with the configured headers and timeouts.
    ///
    /// reqwest has no dedicated write timeout, so the whole-request deadline is
    /// the sum of the read and write timeouts.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT, header_value(&config.accept)?);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .timeout(config.read_timeout + config.write_timeout)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value)
        .map_err(|e| TransportError::Config(format!("invalid header value {value:?}: {e}")))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let network = |e: reqwest::Error| TransportError::Network {
            path: path.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(network)?;
        let status = response.status();

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response.text().await.map_err(network)
    }
}
