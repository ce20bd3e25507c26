use async_trait::async_trait;
use meili_core::ClientConfig;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, CommunicationError, Error, Result};
use crate::transport::PreparedRequest;

/// Performs one prepared request and yields the parsed response body.
///
/// The default [`HttpFetcher`] classifies failures into [`ApiError`] and
/// [`CommunicationError`]. A custom implementation fully owns that
/// contract: whatever it returns is handed back to the caller unchanged.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `Ok(None)` means the server answered without a JSON body
    async fn fetch(&self, request: PreparedRequest) -> Result<Option<Value>>;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout_duration() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Reuse an existing reqwest client and its connection pool
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: PreparedRequest) -> Result<Option<Value>> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let url_text = url.to_string();
        let method_text = method.to_string();

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            let err = CommunicationError::from_reqwest(&e, &url_text, &method_text);
            warn!(method = %method_text, url = %url_text, reason = %err.reason, "request failed");
            err
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            let err = CommunicationError::from_reqwest(&e, &url_text, &method_text);
            warn!(url = %url_text, reason = %err.reason, "failed to read response body");
            err
        })?;

        if !status.is_success() {
            let err = ApiError::from_body(status.as_u16(), &bytes, url_text, method_text);
            warn!(
                status = err.http_status,
                code = err.code.as_deref().unwrap_or("-"),
                url = %err.url,
                "server returned an error"
            );
            return Err(err.into());
        }

        debug!(status = status.as_u16(), url = %url_text, bytes = bytes.len(), "response received");

        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_slice(&bytes).ok())
    }
}
