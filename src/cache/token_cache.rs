use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::cache::token::CachedToken;

/// Single-slot cache owned by one `TokenBroker`.
///
/// Readers never observe a half-written token: `store` swaps the whole value under the write lock.
#[derive(Debug, Clone, Default)]
pub struct TokenSlot {
    inner: Arc<RwLock<Option<CachedToken>>>,
    acquisition: Arc<Mutex<()>>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token if one is cached and still valid at `now`.
    pub async fn get_valid(&self, now: DateTime<Utc>) -> Option<CachedToken> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_valid_at(now))
            .cloned()
    }

    /// Raw slot content, expired or not.
    pub async fn peek(&self) -> Option<CachedToken> {
        self.inner.read().await.clone()
    }

    pub async fn store(&self, token: CachedToken) {
        *self.inner.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    /// Serialises acquisitions so a burst of callers performs one scope iteration.
    pub async fn acquisition_guard(&self) -> MutexGuard<'_, ()> {
        self.acquisition.lock().await
    }
}
