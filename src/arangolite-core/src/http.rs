use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::time::Duration;

use crate::config::Config;
use crate::error::{BoxError, Error, Result};

/// Outgoing request, fully assembled by the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Response with its body already buffered.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Failure inside an HTTP exchange.
#[derive(Debug)]
pub enum ExchangeError {
    /// Connection or protocol failure before a status line arrived
    Send(BoxError),
    /// Status line arrived but the body could not be read
    ReadBody { status: u16, source: BoxError },
}

/// One request/response round-trip. Implementations must not retry.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, ExchangeError>;
}

/// `reqwest`-backed client
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if config.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, ExchangeError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ExchangeError::Send(Box::new(e)))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| ExchangeError::ReadBody {
            status,
            source: Box::new(e),
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
