//! Request layer: URL resolution, header injection and dispatch through a
//! [`Fetcher`].

use meili_core::ClientConfig;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::fetcher::Fetcher;

/// Client identification header
pub const CLIENT_HEADER: &str = "X-Meilisearch-Client";

/// Separator between agent strings in [`CLIENT_HEADER`]
pub const AGENT_SEPARATOR: &str = " ; ";

const CLIENT_HEADER_NAME: HeaderName = HeaderName::from_static("x-meilisearch-client");

/// Bytes kept verbatim in a path segment: RFC 3986 unreserved characters
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a caller-supplied identifier as one path segment, so `/`,
/// `?`, `#` and `%` inside it cannot change which endpoint is addressed.
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// The library's own agent string
pub fn library_agent() -> String {
    format!("Meilisearch Rust (v{})", env!("CARGO_PKG_VERSION"))
}

/// A fully resolved request, handed to the [`Fetcher`]
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    /// Pre-encoded payload; its content type replaces the JSON default
    Raw {
        content_type: String,
        payload: Vec<u8>,
    },
}

/// Query parameters and body of a single request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Option<Value>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `query` into query parameters
    pub fn with_params<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        self.params = Some(serde_json::to_value(query).map_err(Error::Encode)?);
        Ok(self)
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Json(
            serde_json::to_value(body).map_err(Error::Encode)?,
        ));
        Ok(self)
    }

    pub fn with_raw(mut self, content_type: impl Into<String>, payload: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Raw {
            content_type: content_type.into(),
            payload,
        });
        self
    }
}

/// Executes HTTP-shaped requests against one configured host.
///
/// Cloning is cheap; clones share the host, headers and fetcher.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
    cancel: Option<CancellationToken>,
}

struct TransportInner {
    host: Url,
    headers: HeaderMap,
    fetcher: Arc<dyn Fetcher>,
}

impl Transport {
    pub fn new(config: &ClientConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let host = normalize_host(&config.host)?;
        let headers = build_headers(config)?;

        debug!(host = %host, "transport initialized");

        Ok(Self {
            inner: Arc::new(TransportInner {
                host,
                headers,
                fetcher,
            }),
            cancel: None,
        })
    }

    /// Same transport, with every request and poll sleep bound to `token`
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancel: Some(token),
        }
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Normalized host, always ending with exactly one `/`
    pub fn host(&self) -> &Url {
        &self.inner.host
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Resolve `path` against the host and append non-null `params`
    pub fn resolve(&self, path: &str, params: Option<&Value>) -> Result<Url> {
        let relative = path.trim_start_matches('/');
        // URL parsing collapses `.` and `..` even when escaped
        if relative.split('/').any(|part| part == "." || part == "..") {
            return Err(Error::InvalidConfig(format!(
                "path `{}` contains a dot segment",
                path
            )));
        }
        let mut url = self.inner.host.join(relative).map_err(|e| {
            Error::InvalidConfig(format!(
                "cannot resolve `{}` against {}: {}",
                path, self.inner.host, e
            ))
        })?;

        if let Some(params) = params {
            let pairs = query_pairs(params);
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        Ok(url)
    }

    pub fn prepare(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<PreparedRequest> {
        let url = self.resolve(path, options.params.as_ref())?;
        let mut headers = self.inner.headers.clone();

        let body = match options.body {
            None => None,
            Some(RequestBody::Json(value)) => {
                Some(serde_json::to_vec(&value).map_err(Error::Encode)?)
            }
            Some(RequestBody::Raw {
                content_type,
                payload,
            }) => {
                let value = HeaderValue::from_str(&content_type).map_err(|e| {
                    Error::InvalidConfig(format!("invalid content type `{}`: {}", content_type, e))
                })?;
                headers.insert(CONTENT_TYPE, value);
                Some(payload)
            }
        };

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Run one request and return the parsed body, `None` when the server
    /// sent no (or no valid JSON) body
    pub async fn execute_raw(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>> {
        let request = self.prepare(method, path, options)?;
        self.dispatch(request).await
    }

    /// Run one request and decode the body into `T`. An absent body decodes
    /// as JSON `null`, so `()` and `Option<_>` accept empty responses.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let request = self.prepare(method, path, options)?;
        let url = request.url.to_string();
        let raw = self.dispatch(request).await?;

        serde_json::from_value(raw.unwrap_or(Value::Null))
            .map_err(|source| Error::Decode { url, source })
    }

    async fn dispatch(&self, request: PreparedRequest) -> Result<Option<Value>> {
        let url = request.url.to_string();
        debug!(method = %request.method, url = %url, "dispatching request");

        let fetch = self.inner.fetcher.fetch(request);
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(url = %url, "request canceled");
                    Err(Error::Canceled { url })
                }
                result = fetch => result,
            },
            None => fetch.await,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Method::GET, path, RequestOptions::new()).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let options = RequestOptions::new().with_params(query)?;
        self.execute(Method::GET, path, options).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new().with_json(body)?;
        self.execute(Method::POST, path, options).await
    }

    pub async fn post_with<T, B, Q>(&self, path: &str, body: &B, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let options = RequestOptions::new().with_json(body)?.with_params(query)?;
        self.execute(Method::POST, path, options).await
    }

    /// POST without a body, optionally with query parameters
    pub async fn post_empty<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let options = match query {
            Some(query) => RequestOptions::new().with_params(query)?,
            None => RequestOptions::new(),
        };
        self.execute(Method::POST, path, options).await
    }

    pub async fn post_raw<T, Q>(
        &self,
        path: &str,
        content_type: &str,
        payload: Vec<u8>,
        query: &Q,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let options = RequestOptions::new()
            .with_params(query)?
            .with_raw(content_type, payload);
        self.execute(Method::POST, path, options).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new().with_json(body)?;
        self.execute(Method::PUT, path, options).await
    }

    pub async fn put_with<T, B, Q>(&self, path: &str, body: &B, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let options = RequestOptions::new().with_json(body)?.with_params(query)?;
        self.execute(Method::PUT, path, options).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new().with_json(body)?;
        self.execute(Method::PATCH, path, options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Method::DELETE, path, RequestOptions::new()).await
    }

    pub async fn delete_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let options = RequestOptions::new().with_params(query)?;
        self.execute(Method::DELETE, path, options).await
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("host", &self.inner.host.as_str())
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// Default the scheme to `http://` and force exactly one trailing slash so
/// relative paths keep any sub-path mount such as `/api/`.
pub fn normalize_host(host: &str) -> Result<Url> {
    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidHost("host is empty".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let normalized = format!("{}/", with_scheme.trim_end_matches('/'));

    let url = Url::parse(&normalized).map_err(|e| Error::InvalidHost(format!("{}: {}", host, e)))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::InvalidHost(host.to_string()));
    }

    Ok(url)
}

/// Flatten a serialized query object into string pairs. Null values are
/// dropped, arrays are comma-joined and nested objects are sent as JSON.
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
    match params {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, value)| render_query_value(value).map(|v| (key.clone(), v)))
            .collect(),
        _ => Vec::new(),
    }
}

fn render_query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut agents: Vec<String> = Vec::new();

    for (name, value) in &config.headers {
        // A caller-supplied client header is merged, never replaced
        if name.eq_ignore_ascii_case(CLIENT_HEADER) {
            agents.extend(
                value
                    .split(';')
                    .map(str::trim)
                    .filter(|agent| !agent.is_empty())
                    .map(String::from),
            );
            continue;
        }

        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidConfig(format!("invalid header name `{}`: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            Error::InvalidConfig(format!("invalid value for header `{}`: {}", name, e))
        })?;
        headers.insert(header_name, header_value);
    }

    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|_| {
            Error::InvalidConfig("api key contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    for agent in &config.client_agents {
        validate_agent(agent)?;
        agents.push(agent.trim().to_string());
    }
    agents.push(library_agent());

    let agent_header = HeaderValue::from_str(&agents.join(AGENT_SEPARATOR))
        .map_err(|e| Error::InvalidConfig(format!("invalid client agent: {}", e)))?;
    headers.insert(CLIENT_HEADER_NAME, agent_header);

    Ok(headers)
}

fn validate_agent(agent: &str) -> Result<()> {
    if agent.trim().is_empty() {
        return Err(Error::InvalidConfig("client agents must not be empty".to_string()));
    }
    if agent.contains(';') || agent.chars().any(char::is_control) {
        return Err(Error::InvalidConfig(format!(
            "client agent `{}` must not contain `;` or control characters",
            agent
        )));
    }
    Ok(())
}
