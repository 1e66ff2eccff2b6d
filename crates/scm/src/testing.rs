//! In-memory [`Transport`] for adapter tests.
//!
//! Responses are queued per `(method, path)`; the query string is not part of
//! the key. Each call pops the next queued response for its key, and the last
//! one is replayed once the queue runs dry. Unmatched requests answer 404.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Headers, Method, RawResponse, Request, ScmError, Transport};

enum Reply {
    Raw(RawResponse),
    TransportError(String),
}

impl Reply {
    fn to_result(&self) -> Result<RawResponse, ScmError> {
        match self {
            Self::Raw(raw) => Ok(raw.clone()),
            Self::TransportError(message) => Err(ScmError::Transport {
                message: message.clone(),
                source: None,
            }),
        }
    }
}

/// Canned-response transport that records every request it receives.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<Request>>,
}

impl FakeTransport {
    /// Creates an empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON response with `status` for `method path`.
    pub fn respond(self, method: Method, path: &str, status: u16, body: serde_json::Value) -> Self {
        let body = serde_json::to_vec(&body).unwrap_or_default();
        self.respond_raw(
            method,
            path,
            RawResponse {
                status,
                headers: Headers::new(),
                body,
            },
        )
    }

    /// Queues a JSON response carrying `headers`.
    pub fn respond_with_headers(
        self,
        method: Method,
        path: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: serde_json::Value,
    ) -> Self {
        let mut map = Headers::new();
        for (name, value) in headers {
            map.entry(name.to_ascii_lowercase())
                .or_default()
                .push((*value).to_string());
        }
        self.respond_raw(
            method,
            path,
            RawResponse {
                status,
                headers: map,
                body: serde_json::to_vec(&body).unwrap_or_default(),
            },
        )
    }

    /// Queues an empty-bodied response with `status`.
    pub fn respond_empty(self, method: Method, path: &str, status: u16) -> Self {
        self.respond_raw(
            method,
            path,
            RawResponse {
                status,
                ..Default::default()
            },
        )
    }

    /// Queues a network failure for `method path`.
    pub fn fail(self, method: Method, path: &str, message: &str) -> Self {
        self.push(method, path, Reply::TransportError(message.to_string()))
    }

    /// Queues an arbitrary raw response.
    pub fn respond_raw(self, method: Method, path: &str, raw: RawResponse) -> Self {
        self.push(method, path, Reply::Raw(raw))
    }

    fn push(self, method: Method, path: &str, reply: Reply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies
                .entry((method, path.to_string()))
                .or_default()
                .push_back(reply);
        }
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<Request> {
        self.requests().pop()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, ScmError> {
        let key = (request.method, request.path.clone());
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let mut replies = self.replies.lock().map_err(|_| ScmError::Transport {
            message: "fake transport poisoned".into(),
            source: None,
        })?;
        match replies.get_mut(&key) {
            Some(queue) if queue.len() > 1 => match queue.pop_front() {
                Some(reply) => reply.to_result(),
                None => Ok(not_found()),
            },
            Some(queue) => match queue.front() {
                Some(reply) => reply.to_result(),
                None => Ok(not_found()),
            },
            None => Ok(not_found()),
        }
    }
}

fn not_found() -> RawResponse {
    RawResponse {
        status: 404,
        headers: Headers::new(),
        body: br#"{"message":"Not Found"}"#.to_vec(),
    }
}
