//! In-memory [`HttpClient`] that replays canned replies and records requests.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::http::{ExchangeError, HttpClient, HttpRequest, HttpResponse};

#[derive(Debug)]
enum Reply {
    Respond(HttpResponse),
    FailSend(String),
    FailRead { status: u16, message: String },
}

/// Replies are consumed in order; once exhausted every call gets `200` with
/// an empty body.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        self.reply_with_headers(status, HeaderMap::new(), body)
    }

    pub fn reply_with_headers(self, status: u16, headers: HeaderMap, body: &str) -> Self {
        self.push(Reply::Respond(HttpResponse {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        }))
    }

    pub fn fail_send(self, message: &str) -> Self {
        self.push(Reply::FailSend(message.to_string()))
    }

    pub fn fail_read(self, status: u16, message: &str) -> Self {
        self.push(Reply::FailRead {
            status,
            message: message.to_string(),
        })
    }

    /// Number of `execute` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    fn push(self, reply: Reply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::FailSend(message)) => Err(ExchangeError::Send(message.into())),
            Some(Reply::FailRead { status, message }) => Err(ExchangeError::ReadBody {
                status,
                source: message.into(),
            }),
            None => Ok(HttpResponse {
                status: 200,
                ..HttpResponse::default()
            }),
        }
    }
}
