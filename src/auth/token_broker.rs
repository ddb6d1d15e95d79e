use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::auth::credentials::Credentials;
use crate::cache::token::CachedToken;
use crate::cache::token_cache::TokenSlot;
use crate::errors::{BrokerError, ScopeAttempt};
use crate::helpers::mask::mask_secret;
use crate::helpers::time::{expires_at_from, now_utc};
use crate::observability::metrics::get_metrics;
use crate::transport::{AttemptOutcome, HttpTransport, OutboundRequest};
use crate::utils::constants::{
    DEFAULT_EXPIRES_IN_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_TOKEN_PATH,
    GRANT_TYPE_CLIENT_CREDENTIALS,
};

static SUCCESS_MSG: &str = "success";

#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub base_url: String,
    pub token_path: String,
    /// Tried strictly in this order; the first accepted scope wins.
    pub scopes: Vec<String>,
    pub safety_margin_seconds: u64,
    pub request_timeout: Duration,
}

impl BrokerSettings {
    pub fn new(base_url: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_path: DEFAULT_TOKEN_PATH.to_owned(),
            scopes,
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.token_path)
    }
}

/// Success body of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Acquires client-credentials tokens and caches the current one until it nears expiry.
pub struct TokenBroker<T: HttpTransport> {
    transport: Arc<T>,
    credentials: Credentials,
    settings: BrokerSettings,
    slot: TokenSlot,
}

impl<T: HttpTransport> TokenBroker<T> {
    pub fn new(transport: Arc<T>, credentials: Credentials, settings: BrokerSettings) -> Self {
        Self { transport, credentials, settings, slot: TokenSlot::new() }
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    /// Valid bearer token, from cache when possible.
    ///
    /// Fails with `Configuration` before any network I/O when credentials are empty,
    /// and with `AuthFailure` once every scope candidate has been rejected.
    pub async fn get_token(&self) -> Result<String, BrokerError> {
        self.get_cached_token().await.map(|token| token.value)
    }

    /// Same as `get_token`, keeping the scope and expiry that came with the token.
    pub async fn get_cached_token(&self) -> Result<CachedToken, BrokerError> {
        if self.credentials.is_empty() {
            error!("client credentials are empty, token request skipped");
            return Err(BrokerError::Configuration(
                "client_id and client_secret must be non-empty".to_owned(),
            ));
        }

        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }

        let _guard = self.slot.acquisition_guard().await;
        // another caller may have refreshed while we waited for the guard
        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }

        self.acquire().await
    }

    /// Current slot content, even if expired.
    pub async fn cached(&self) -> Option<CachedToken> {
        self.slot.peek().await
    }

    /// Drop the cached token; the next `get_token` starts from the first scope.
    pub async fn invalidate(&self) {
        info!("cached token invalidated");
        self.slot.clear().await;
    }

    async fn cached_valid(&self) -> Option<CachedToken> {
        let token = self.slot.get_valid(now_utc()).await?;
        get_metrics().await.token_cache_hits.inc();
        debug!(token = %mask_secret(&token.value), expires_at = %token.expires_at, "token served from cache");
        Some(token)
    }

    async fn acquire(&self) -> Result<CachedToken, BrokerError> {
        let metrics = get_metrics().await;
        let mut attempts = Vec::with_capacity(self.settings.scopes.len());

        for scope in &self.settings.scopes {
            info!(scope = %scope, client_id = %mask_secret(self.credentials.client_id()), "requesting token");

            match self.request_token(scope).await {
                Ok(token) => {
                    metrics.token_requests.with_label_values(&[scope.as_str(), SUCCESS_MSG]).inc();
                    metrics.token_expiry_unix.set(token.expires_at.timestamp());
                    info!(
                        scope = %scope,
                        reported_scope = ?token.reported_scope,
                        token = %mask_secret(&token.value),
                        expires_at = %token.expires_at,
                        "token acquired"
                    );
                    self.slot.store(token.clone()).await;
                    return Ok(token);
                }
                Err(outcome) => {
                    metrics.token_requests.with_label_values(&[scope.as_str(), outcome.as_str()]).inc();
                    warn!(scope = %scope, outcome = %outcome, "scope rejected, trying next candidate");
                    attempts.push(ScopeAttempt { scope: scope.to_owned(), outcome });
                }
            }
        }

        error!(attempted = attempts.len(), "no scope candidate yielded a token");
        Err(BrokerError::AuthFailure { attempts })
    }

    async fn request_token(&self, scope: &str) -> Result<CachedToken, AttemptOutcome> {
        let form = vec![
            ("grant_type".to_owned(), GRANT_TYPE_CLIENT_CREDENTIALS.to_owned()),
            ("scope".to_owned(), scope.to_owned()),
        ];
        let request = OutboundRequest::post_form(self.settings.token_url(), form, self.settings.request_timeout)
            .header("Authorization", self.credentials.basic_auth_header())
            .header("Content-Type", "application/x-www-form-urlencoded");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| AttemptOutcome::Transport(format!("{:#}", err)))?;

        if response.status != 200 {
            return Err(AttemptOutcome::from_status(response.status));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|err| AttemptOutcome::InvalidPayload(err.to_string()))?;
        if parsed.access_token.is_empty() {
            return Err(AttemptOutcome::InvalidPayload("access_token is empty".to_owned()));
        }

        let expires_at = expires_at_from(now_utc(), parsed.expires_in, self.settings.safety_margin_seconds)
            .ok_or_else(|| AttemptOutcome::InvalidPayload("expires_in out of range".to_owned()))?;
        Ok(CachedToken::new(parsed.access_token, expires_at, scope.to_owned(), parsed.scope))
    }
}
