//! End-to-end diagnostic run: authorise once, then probe every configured endpoint group in order.

pub mod report;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::auth::credentials::Credentials;
use crate::auth::token_broker::{BrokerSettings, TokenBroker};
use crate::config::types::{ProbeGroupConfig, ServiceConfig};
use crate::helpers::time::get_token_safety_margin_seconds;
use crate::probe::endpoint_prober::EndpointProber;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::utils::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_PATH};

pub use report::{DiagnosticReport, GroupReport, TokenStatus};

pub struct Diagnostics<T: HttpTransport> {
    prober: EndpointProber<T>,
    groups: Vec<ProbeGroupConfig>,
}

impl Diagnostics<ReqwestTransport> {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(Client::builder().build()?));
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> Diagnostics<T> {
    /// Wire broker and prober from config over an injected transport.
    pub fn with_transport(config: &ServiceConfig, transport: Arc<T>) -> Result<Self> {
        let marketplace = &config.marketplace;
        let credentials = Credentials::from_config(&marketplace.credentials)?;
        let request_timeout = Duration::from_secs(
            config.settings.request_timeout_seconds.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );

        let settings = BrokerSettings {
            base_url: marketplace.base_url.to_owned(),
            token_path: marketplace.token_path.to_owned().unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_owned()),
            scopes: marketplace.scopes.to_owned(),
            safety_margin_seconds: get_token_safety_margin_seconds(config.settings.safety_margin_seconds),
            request_timeout,
        };
        let broker = Arc::new(TokenBroker::new(transport.clone(), credentials, settings));
        let prober = EndpointProber::new(broker, transport, marketplace.base_url.to_owned())
            .with_request_timeout(request_timeout)
            .with_vars(marketplace.vars.to_owned());

        Ok(Self { prober, groups: config.probes.to_owned() })
    }

    pub fn prober(&self) -> &EndpointProber<T> {
        &self.prober
    }

    /// Probe the configured groups, or only those named in `only`, keeping config order.
    pub async fn run(&self, only: Option<&[String]>) -> DiagnosticReport {
        let broker = self.prober.broker();
        let base_url = broker.settings().base_url.to_owned();

        info!("step 1: authorisation");
        let token = match broker.get_cached_token().await {
            Ok(token) => TokenStatus::Acquired {
                granted_scope: token.granted_scope,
                reported_scope: token.reported_scope,
                expires_at: token.expires_at.to_rfc3339(),
            },
            Err(err) => {
                warn!(error = %err, "authorisation failed, endpoint groups skipped");
                return DiagnosticReport {
                    base_url,
                    token: TokenStatus::Failed { reason: err.to_string(), attempts: err.attempts().to_vec() },
                    groups: Vec::new(),
                };
            }
        };

        let mut groups = Vec::new();
        for (step, group) in self
            .groups
            .iter()
            .filter(|group| only.map_or(true, |names| names.iter().any(|name| name == &group.name)))
            .enumerate()
        {
            info!(group = %group.name, "step {}: probing endpoint group", step + 2);
            let result = self.prober.probe(&group.endpoints).await;
            groups.push(GroupReport { name: group.name.to_owned(), result });
        }

        let report = DiagnosticReport { base_url, token, groups };
        info!(reachable = ?report.reachable_groups(), "diagnostics finished");
        report
    }
}
