use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::token_broker::TokenBroker;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::probe::result::{ProbeAttempt, ProbeResult};
use crate::probe::template::render_endpoint;
use crate::transport::{AttemptOutcome, HttpTransport, OutboundRequest};
use crate::utils::constants::DEFAULT_REQUEST_TIMEOUT_SECS;

static SUCCESS_MSG: &str = "success";
static FAILURE_MSG: &str = "failure";

/// Walks an ordered list of candidate endpoints and returns the first one that answers 200.
pub struct EndpointProber<T: HttpTransport> {
    broker: Arc<TokenBroker<T>>,
    transport: Arc<T>,
    base_url: String,
    request_timeout: Duration,
    vars: HashMap<String, String>,
}

impl<T: HttpTransport> EndpointProber<T> {
    pub fn new(broker: Arc<TokenBroker<T>>, transport: Arc<T>, base_url: impl Into<String>) -> Self {
        Self {
            broker,
            transport,
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            vars: HashMap::new(),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Values substituted into `{name}` placeholders of endpoint templates.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    pub fn broker(&self) -> &Arc<TokenBroker<T>> {
        &self.broker
    }

    /// Try every endpoint once, in order, stopping at the first 200.
    pub async fn probe(&self, endpoints: &[String]) -> ProbeResult {
        let metrics = get_metrics().await;
        let start = get_instant();

        let token = match self.broker.get_token().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "no token available, probing skipped");
                metrics.probe_duration.with_label_values(&[FAILURE_MSG]).observe(start.elapsed().as_secs_f64());
                return ProbeResult::Failure { attempts: Vec::new() };
            }
        };

        let mut attempts = Vec::with_capacity(endpoints.len());
        for template in endpoints {
            let endpoint = match render_endpoint(template, &self.vars) {
                Ok(endpoint) => endpoint,
                Err(err) => {
                    warn!(endpoint = %template, error = %err, "endpoint template not renderable");
                    metrics.probe_attempts.with_label_values(&[template.as_str(), "invalid_endpoint"]).inc();
                    attempts.push(ProbeAttempt::new(template.to_owned(), AttemptOutcome::InvalidEndpoint(err.to_string())));
                    continue;
                }
            };

            info!(endpoint = %endpoint, "probing endpoint");
            match self.fetch(&endpoint, &token).await {
                Ok(payload) => {
                    metrics.probe_attempts.with_label_values(&[template.as_str(), SUCCESS_MSG]).inc();
                    metrics.probe_duration.with_label_values(&[SUCCESS_MSG]).observe(start.elapsed().as_secs_f64());
                    info!(endpoint = %endpoint, "endpoint answered");
                    return ProbeResult::Success { endpoint, payload };
                }
                Err(outcome) => {
                    metrics.probe_attempts.with_label_values(&[template.as_str(), outcome.as_str()]).inc();
                    match &outcome {
                        AttemptOutcome::Forbidden => info!(endpoint = %endpoint, "access denied (403), scope lacks rights"),
                        AttemptOutcome::NotFound => info!(endpoint = %endpoint, "endpoint not found (404)"),
                        other => warn!(endpoint = %endpoint, outcome = %other, "endpoint failed"),
                    }
                    attempts.push(ProbeAttempt::new(endpoint, outcome));
                }
            }
        }

        metrics.probe_duration.with_label_values(&[FAILURE_MSG]).observe(start.elapsed().as_secs_f64());
        warn!(attempted = attempts.len(), "no endpoint candidate answered");
        ProbeResult::Failure { attempts }
    }

    async fn fetch(&self, endpoint: &str, token: &str) -> Result<Value, AttemptOutcome> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), endpoint);
        let request = OutboundRequest::get(url, self.request_timeout)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| AttemptOutcome::Transport(format!("{:#}", err)))?;

        if response.status != 200 {
            debug!(endpoint = %endpoint, status = response.status, body = %truncate(&response.body, 100), "non-success body");
            return Err(AttemptOutcome::from_status(response.status));
        }

        serde_json::from_str(&response.body).map_err(|err| AttemptOutcome::InvalidPayload(err.to_string()))
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
