use serde::Serialize;

use crate::errors::ScopeAttempt;
use crate::probe::result::ProbeResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenStatus {
    Acquired {
        granted_scope: String,
        reported_scope: Option<String>,
        expires_at: String,
    },
    Failed {
        reason: String,
        attempts: Vec<ScopeAttempt>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub name: String,
    pub result: ProbeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub base_url: String,
    pub token: TokenStatus,
    pub groups: Vec<GroupReport>,
}

impl DiagnosticReport {
    pub fn token_acquired(&self) -> bool {
        matches!(self.token, TokenStatus::Acquired { .. })
    }

    pub fn group(&self, name: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Names of the groups that found a live endpoint.
    pub fn reachable_groups(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|group| group.result.is_success())
            .map(|group| group.name.as_str())
            .collect()
    }
}
