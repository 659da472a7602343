//! An in-memory `HttpTransport` with canned responses and call accounting.

use crate::error::ApiError;
use crate::HttpTransport;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum StubResponse {
    Json(Value),
    Bytes(Vec<u8>),
    /// A body that is not valid JSON.
    Garbage(String),
    /// The endpoint refuses the request with this HTTP status.
    Status(u16),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StubCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

/// Routes are matched on the exact URL, query string included. Unknown URLs
/// answer 404.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, StubResponse>>,
    calls: Mutex<Vec<StubCall>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, response: StubResponse) -> Self {
        self.set(url, response);
        self
    }

    pub fn json(self, url: impl Into<String>, body: Value) -> Self {
        self.route(url, StubResponse::Json(body))
    }

    /// Replaces (or adds) a route on a shared transport.
    pub fn set(&self, url: impl Into<String>, response: StubResponse) {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into(), response);
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.url == url).count()
    }

    fn respond(&self, method: &'static str, url: &str, body: Option<&Value>) -> Result<StubResponse, ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(StubCall {
                method,
                url: url.to_string(),
                body: body.cloned(),
            });
        let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes.get(url) {
            Some(StubResponse::Status(status)) => Err(ApiError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Some(response) => Ok(response.clone()),
            None => Err(ApiError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn as_json(url: &str, response: StubResponse) -> Result<Value, ApiError> {
        match response {
            StubResponse::Json(value) => Ok(value),
            StubResponse::Bytes(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Deserialization(format!("{} from {}", e, url))),
            StubResponse::Garbage(text) => serde_json::from_str(&text)
                .map_err(|e| ApiError::Deserialization(format!("{} from {}", e, url))),
            StubResponse::Status(status) => Err(ApiError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self.respond("GET", url, None)?;
        Self::as_json(url, response)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.respond("POST", url, Some(body))?;
        Self::as_json(url, response)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        match self.respond("GET", url, None)? {
            StubResponse::Json(value) => Ok(value.to_string().into_bytes()),
            StubResponse::Bytes(bytes) => Ok(bytes),
            StubResponse::Garbage(text) => Ok(text.into_bytes()),
            StubResponse::Status(status) => Err(ApiError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}
