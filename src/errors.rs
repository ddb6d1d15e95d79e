use serde::Serialize;
use thiserror::Error;

use crate::transport::AttemptOutcome;

/// One rejected scope candidate, in the order it was tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeAttempt {
    pub scope: String,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// Credentials missing or empty. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Every scope candidate was rejected or unreachable.
    #[error("token endpoint rejected all {} scope candidates", .attempts.len())]
    AuthFailure { attempts: Vec<ScopeAttempt> },
}

impl BrokerError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, BrokerError::Configuration(_))
    }

    pub fn attempts(&self) -> &[ScopeAttempt] {
        match self {
            BrokerError::AuthFailure { attempts } => attempts,
            BrokerError::Configuration(_) => &[],
        }
    }
}
