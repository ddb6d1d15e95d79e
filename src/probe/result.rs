use serde::Serialize;
use serde_json::Value;

use crate::transport::AttemptOutcome;

/// One endpoint that did not answer with 200, in the order it was tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeAttempt {
    pub endpoint: String,
    pub outcome: AttemptOutcome,
}

impl ProbeAttempt {
    pub fn new(endpoint: impl Into<String>, outcome: AttemptOutcome) -> Self {
        Self { endpoint: endpoint.into(), outcome }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.outcome.status_code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProbeResult {
    /// First endpoint that answered 200, with its JSON body unchanged.
    Success { endpoint: String, payload: Value },
    /// Every endpoint failed. Empty when no token could be obtained.
    Failure { attempts: Vec<ProbeAttempt> },
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            ProbeResult::Success { payload, .. } => Some(payload),
            ProbeResult::Failure { .. } => None,
        }
    }

    pub fn attempts(&self) -> &[ProbeAttempt] {
        match self {
            ProbeResult::Failure { attempts } => attempts,
            ProbeResult::Success { .. } => &[],
        }
    }

    /// `(endpoint, status)` pairs of a failure, `None` status for transport errors.
    pub fn attempted_statuses(&self) -> Vec<(&str, Option<u16>)> {
        self.attempts()
            .iter()
            .map(|attempt| (attempt.endpoint.as_str(), attempt.status_code()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_serializes_with_tagged_outcomes() {
        let result = ProbeResult::Failure {
            attempts: vec![ProbeAttempt::new("/v1/chats", AttemptOutcome::Forbidden)],
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"result": "failure", "attempts": [{"endpoint": "/v1/chats", "outcome": {"kind": "forbidden"}}]})
        );
        assert_eq!(result.attempted_statuses(), vec![("/v1/chats", Some(403))]);
    }

    #[test]
    fn success_exposes_payload() {
        let result = ProbeResult::Success { endpoint: "/v2/chats".into(), payload: json!({"items": []}) };
        assert!(result.is_success());
        assert_eq!(result.payload(), Some(&json!({"items": []})));
        assert!(result.attempts().is_empty());
    }
}
