//! Scripted transport for unit tests.

use std::sync::{Arc, Mutex};

use reqwest::Method;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::ApiError;

type Handler = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

/// Records every request and answers through a handler closure.
/// Yields once per call so concurrent callers interleave.
#[derive(Clone)]
pub(crate) struct FakeTransport {
    handler: Arc<Handler>,
    log: Arc<Mutex<Vec<HttpRequest>>>,
}

impl FakeTransport {
    pub(crate) fn new(handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Requests matching a method and path
    pub(crate) fn calls(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.descriptor.method == method && r.descriptor.path == path)
            .collect()
    }

    /// Mutating requests (anything but GET)
    pub(crate) fn mutations(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.descriptor.method != Method::GET)
            .collect()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = (self.handler)(&request);
        self.log.lock().unwrap().push(request);
        tokio::task::yield_now().await;
        Ok(response)
    }
}

pub(crate) fn respond(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_string(),
    }
}

pub(crate) fn no_content() -> HttpResponse {
    HttpResponse {
        status: 204,
        body: String::new(),
    }
}

pub(crate) fn unauthorized() -> HttpResponse {
    respond(401, serde_json::json!({"detail": "Given token not valid for any token type"}))
}
