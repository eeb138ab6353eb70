//! Error taxonomy for the request/response pipeline.
//!
//! Local failures (`Config`, `Encoding`, `Transport`) happen before any HTTP
//! exchange completes and report status `0`. Everything else carries the
//! status line the server answered with.

use std::fmt;

/// Boxed error produced by an [`HttpClient`](crate::http::HttpClient).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to encode request {what}: {reason}")]
    Encoding { what: &'static str, reason: String },

    #[error("failed to send request: method={method}, url={url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read response body: status={status}: {source}")]
    BodyRead {
        status: u16,
        #[source]
        source: BoxError,
    },

    #[error("error from server: {0}")]
    Protocol(ServerError),

    #[error("http status error: status={status}, method={method}, url={url}, body={body}")]
    Http {
        status: u16,
        method: String,
        url: String,
        body: String,
    },

    #[error("failed to decode response body: status={status}: {source}")]
    Decoding {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Structured error embedded in a response body (`error: true`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub status: u16,
    pub error_num: i64,
    pub message: String,
    pub method: String,
    pub url: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={}", self.status)?;
        if self.error_num != 0 {
            write!(f, ", errorNum={}", self.error_num)?;
        }
        if !self.message.is_empty() {
            write!(f, ", errorMessage={}", self.message)?;
        }
        write!(f, ", method={}, url={}", self.method, self.url)
    }
}

impl Error {
    /// HTTP status of the exchange, or `0` when no exchange took place.
    pub fn status(&self) -> u16 {
        match self {
            Error::Config(_) | Error::Encoding { .. } | Error::Transport { .. } => 0,
            Error::BodyRead { status, .. }
            | Error::Http { status, .. }
            | Error::Decoding { status, .. } => *status,
            Error::Protocol(e) => e.status,
        }
    }

    /// True for the server-reported family: embedded errors and HTTP >= 400.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Protocol(_) | Error::Http { .. })
    }

    /// Database error number, when the server sent a structured error.
    pub fn error_num(&self) -> Option<i64> {
        match self {
            Error::Protocol(e) => Some(e.error_num),
            _ => None,
        }
    }

    pub(crate) fn decoding(status: u16, message: &str) -> Self {
        Error::Decoding {
            status,
            source: <serde_json::Error as serde::de::Error>::custom(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
