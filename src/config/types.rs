use serde::Deserialize;
use std::collections::HashMap;

use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub marketplace: MarketplaceConfig,
    /// Ordered; groups are probed in declaration order.
    #[serde(default)]
    pub probes: Vec<ProbeGroupConfig>,
}

/// ================================
/// Marketplace API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct MarketplaceConfig {
    pub base_url: String,
    pub token_path: Option<String>,
    pub credentials: CredentialsConfig,
    /// Scope candidates, highest priority first.
    pub scopes: Vec<String>,
    /// Values for `{name}` placeholders in probe endpoints.
    #[serde(default)]
    pub vars: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub client_id: GenericSourceValue,
    pub client_secret: GenericSourceValue,
}

/// Credential value sources
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum GenericSourceValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

/// ================================
/// Probes
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ProbeGroupConfig {
    pub name: String,
    /// Endpoint templates, highest priority first.
    pub endpoints: Vec<String>,
}
