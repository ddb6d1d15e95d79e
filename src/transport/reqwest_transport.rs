use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::transport::{HttpTransport, OutboundRequest, TransportResponse};

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, outbound: OutboundRequest) -> Result<TransportResponse> {
        let mut request = self
            .client
            .request(outbound.method.clone(), &outbound.url)
            .timeout(outbound.timeout);

        for (key, value) in &outbound.headers {
            request = request.header(key, value);
        }
        if let Some(form) = &outbound.form {
            request = request.form(form);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", outbound.method, outbound.url))?;
        let status = response.status().as_u16();
        let body = response.text().await.context("reading response body failed")?;
        debug!(method = %outbound.method, url = %outbound.url, status, "response received");
        Ok(TransportResponse { status, body })
    }
}
