//! Error taxonomy surfaced by every client call.
//!
//! Transport failures are classified into exactly one of [`ApiError`]
//! (the server answered with a non-2xx status), [`CommunicationError`]
//! (no response was received) or [`TimeoutError`] (a task wait ran out of
//! budget). All of them are carried by the [`Error`] enum.

use meili_core::{CoreError, ResponseError};
use thiserror::Error;

/// The server rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({method} {url} responded with status {http_status})")]
pub struct ApiError {
    pub http_status: u16,
    pub message: String,
    pub code: Option<String>,
    pub error_type: Option<String>,
    pub link: Option<String>,
    pub url: String,
    pub method: String,
}

impl ApiError {
    /// Build from a raw error body. Bodies that are not valid JSON are
    /// treated as empty.
    pub fn from_body(
        http_status: u16,
        body: &[u8],
        url: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        let parsed: ResponseError = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed.message.unwrap_or_else(|| {
            let reason = reqwest::StatusCode::from_u16(http_status)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("Unknown status");
            format!("{} {}", http_status, reason)
        });

        Self {
            http_status,
            message,
            code: parsed.code,
            error_type: parsed.error_type,
            link: parsed.link,
            url: url.into(),
            method: method.into(),
        }
    }
}

/// The request never produced a response (DNS, refused connection,
/// network timeout, broken body stream)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request to {url} failed, reason: {reason}")]
pub struct CommunicationError {
    pub url: String,
    pub method: String,
    pub reason: String,
}

impl CommunicationError {
    pub fn from_reqwest(
        err: &reqwest::Error,
        url: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            reason: describe_reqwest_error(err),
        }
    }
}

/// A wait for one or more tasks exceeded its budget
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "timeout of {timeout_ms}ms exceeded after {elapsed_ms}ms while waiting for task(s) {task_uids:?} to be resolved"
)]
pub struct TimeoutError {
    /// Tasks still pending when the budget ran out
    pub task_uids: Vec<u32>,
    pub timeout_ms: u64,
    pub elapsed_ms: u64,
}

/// Main error type for the client
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Communication(#[from] CommunicationError),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error("request to {url} was canceled")]
    Canceled { url: String },

    #[error("The provided host is not valid: {0}")]
    InvalidHost(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification for callers that only need to branch on origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Server responded with a non-2xx status
    Api,
    /// No response was received
    Communication,
    /// A task wait exceeded its budget
    Timeout,
    /// The caller's cancellation token fired
    Canceled,
    /// Invalid host, headers or settings, detected before any request
    Config,
    /// Request or response (de)serialization failed
    Serialization,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Api(_) => ErrorKind::Api,
            Error::Communication(_) => ErrorKind::Communication,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Canceled { .. } => ErrorKind::Canceled,
            Error::InvalidHost(_) | Error::InvalidConfig(_) | Error::Core(_) => ErrorKind::Config,
            Error::Encode(_) | Error::Decode { .. } => ErrorKind::Serialization,
        }
    }

    /// Server error code, e.g. `index_not_found`
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api(err) => err.code.as_deref(),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.http_status),
            _ => None,
        }
    }

    /// Absolute URL of the failed request, when one was attempted
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Api(err) => Some(&err.url),
            Error::Communication(err) => Some(&err.url),
            Error::Canceled { url } | Error::Decode { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Human-readable reason for a network failure: the failure stage
/// followed by the innermost cause, e.g. `connect: Connection refused (os error 111)`
pub(crate) fn describe_reqwest_error(err: &reqwest::Error) -> String {
    let stage = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_request() {
        "request"
    } else if err.is_body() || err.is_decode() {
        "body"
    } else {
        "network"
    };

    let mut root: &dyn std::error::Error = err;
    while let Some(source) = root.source() {
        root = source;
    }

    format!("{}: {}", stage, root)
}
