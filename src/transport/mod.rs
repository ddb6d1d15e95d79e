//! The broker and prober only talk to the network through [`HttpTransport`],
//! so the surrounding application (or a test) decides how requests leave the process.

pub mod reqwest_transport;

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use reqwest::Method;
use serde::Serialize;

pub use reqwest_transport::ReqwestTransport;

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Sent as `application/x-www-form-urlencoded` when present.
    pub form: Option<Vec<(String, String)>>,
    pub timeout: Duration,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self { method: Method::GET, url: url.into(), headers: Vec::new(), form: None, timeout }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>, timeout: Duration) -> Self {
        Self { method: Method::POST, url: url.into(), headers: Vec::new(), form: Some(form), timeout }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .as_ref()
            .and_then(|form| form.iter().find(|(k, _)| k == key))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

pub trait HttpTransport: Send + Sync {
    /// Perform one request. Network failures and timeouts are `Err`; any HTTP status is `Ok`.
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl std::future::Future<Output = Result<TransportResponse>> + Send;
}

/// Outcome of one unsuccessful outbound attempt (a token scope or a probed endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Forbidden,
    NotFound,
    Status(u16),
    Transport(String),
    InvalidPayload(String),
    InvalidEndpoint(String),
}

impl AttemptOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => AttemptOutcome::Forbidden,
            404 => AttemptOutcome::NotFound,
            other => AttemptOutcome::Status(other),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            AttemptOutcome::Forbidden => Some(403),
            AttemptOutcome::NotFound => Some(404),
            AttemptOutcome::Status(code) => Some(*code),
            AttemptOutcome::InvalidPayload(_) => Some(200),
            AttemptOutcome::Transport(_) | AttemptOutcome::InvalidEndpoint(_) => None,
        }
    }

    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Forbidden => "forbidden",
            AttemptOutcome::NotFound => "not_found",
            AttemptOutcome::Status(_) => "status",
            AttemptOutcome::Transport(_) => "transport",
            AttemptOutcome::InvalidPayload(_) => "invalid_payload",
            AttemptOutcome::InvalidEndpoint(_) => "invalid_endpoint",
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Forbidden => write!(f, "403 forbidden"),
            AttemptOutcome::NotFound => write!(f, "404 not found"),
            AttemptOutcome::Status(code) => write!(f, "status {}", code),
            AttemptOutcome::Transport(err) => write!(f, "transport error: {}", err),
            AttemptOutcome::InvalidPayload(err) => write!(f, "invalid payload: {}", err),
            AttemptOutcome::InvalidEndpoint(err) => write!(f, "invalid endpoint: {}", err),
        }
    }
}
