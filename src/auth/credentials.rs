use std::{env, fs};

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::types::{CredentialsConfig, GenericSourceValue};
use crate::helpers::mask::mask_secret;

/// Client-credentials pair. Immutable once built; `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }

    pub fn from_config(config: &CredentialsConfig) -> Result<Self> {
        let client_id = resolve_value(&config.client_id)
            .map_err(|err| anyhow!("marketplace.credentials.client_id: {}", err))?;
        let client_secret = resolve_value(&config.client_secret)
            .map_err(|err| anyhow!("marketplace.credentials.client_secret: {}", err))?;
        Ok(Self::new(client_id, client_secret))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn is_empty(&self) -> bool {
        self.client_id.trim().is_empty() || self.client_secret.trim().is_empty()
    }

    /// `Authorization` header value: `Basic base64(client_id:client_secret)`.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &mask_secret(&self.client_id))
            .field("client_secret", &"***")
            .finish()
    }
}

fn resolve_value(value: &GenericSourceValue) -> Result<String> {
    match value {
        GenericSourceValue::Literal { value } => Ok(value.to_owned()),
        GenericSourceValue::FromEnv { from_env } => {
            env::var(from_env).map_err(|err| anyhow!("env '{}': {}", from_env, err))
        }
        GenericSourceValue::FromFile { path } => fs::read_to_string(path)
            .map_err(|err| anyhow!("file '{}': {}", path, err))
            .map(|res| res.trim().to_string()),
    }
}
