//! Arangolite Core Library
//!
//! The request/response pipeline shared by every REST operation:
//! - Connection configuration and defaults
//! - Path composition with database scoping and query encoding
//! - Conditional (revision) headers and header merging
//! - The `Transport` send primitive with embedded-error detection
//! - The error taxonomy surfaced to callers

pub mod config;
pub mod envelope;
pub mod error;
pub mod headers;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod path;
pub mod transport;

// Re-export commonly used types
pub use config::{defaults, Config};
pub use error::{Error, Result, ServerError};
pub use headers::{conditional_headers, Conditional, ConditionalHeaders};
pub use http::{ExchangeError, HttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use path::{build_path, query_of, QueryParams, ToQuery};
pub use transport::{Response, Transport};

pub use reqwest::header::HeaderMap;
pub use reqwest::Method;
