// tests/common/mod.rs
#![cfg(test)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use reqwest::Method;
use serde_json::Value;

use crate::auth::credentials::Credentials;
use crate::auth::token_broker::{BrokerSettings, TokenBroker};
use crate::probe::endpoint_prober::EndpointProber;
use crate::transport::{HttpTransport, OutboundRequest, TransportResponse};

pub const BASE_URL: &str = "http://marketplace.test";

type Handler = Box<dyn Fn(&OutboundRequest) -> Result<TransportResponse> + Send + Sync>;

/// Transport answering from a closure and recording every request it sees, in order.
pub struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&OutboundRequest) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Arc::new(Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()) })
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `scope` form value of every token request, in order.
    pub fn scopes_tried(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.method == Method::POST)
            .filter_map(|r| r.form_value("scope").map(str::to_owned))
            .collect()
    }

    /// Path (and query) of every GET, in order.
    pub fn paths_requested(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.method == Method::GET)
            .map(|r| r.url.trim_start_matches(BASE_URL).to_owned())
            .collect()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}

pub fn json_response(status: u16, body: Value) -> Result<TransportResponse> {
    Ok(TransportResponse::new(status, body.to_string()))
}

pub fn token_body(token: &str, expires_in: i64) -> Value {
    serde_json::json!({"access_token": token, "expires_in": expires_in, "scope": "messenger:read"})
}

pub fn scopes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn endpoints(list: &[&str]) -> Vec<String> {
    scopes(list)
}

pub fn build_broker(transport: Arc<ScriptedTransport>, scope_list: &[&str]) -> TokenBroker<ScriptedTransport> {
    build_broker_with(transport, Credentials::new("id1", "secret1"), scope_list, 60)
}

pub fn build_broker_with(
    transport: Arc<ScriptedTransport>,
    credentials: Credentials,
    scope_list: &[&str],
    safety_margin_seconds: u64,
) -> TokenBroker<ScriptedTransport> {
    let mut settings = BrokerSettings::new(BASE_URL, scopes(scope_list));
    settings.safety_margin_seconds = safety_margin_seconds;
    settings.request_timeout = Duration::from_secs(5);
    TokenBroker::new(transport, credentials, settings)
}

pub fn build_prober(transport: Arc<ScriptedTransport>, scope_list: &[&str]) -> EndpointProber<ScriptedTransport> {
    let broker = Arc::new(build_broker(transport.clone(), scope_list));
    EndpointProber::new(broker, transport, BASE_URL).with_request_timeout(Duration::from_secs(5))
}
