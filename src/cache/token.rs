use chrono::{DateTime, Utc};

/// Bearer token with an expiry that already has the safety margin applied.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    /// Scope candidate that produced this token.
    pub granted_scope: String,
    /// `scope` field echoed by the provider, informational only.
    pub reported_scope: Option<String>,
}

impl CachedToken {
    pub fn new(value: String, expires_at: DateTime<Utc>, granted_scope: String, reported_scope: Option<String>) -> Self {
        Self { value, expires_at, granted_scope, reported_scope }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("value", &crate::helpers::mask::mask_secret(&self.value))
            .field("expires_at", &self.expires_at)
            .field("granted_scope", &self.granted_scope)
            .field("reported_scope", &self.reported_scope)
            .finish()
    }
}
