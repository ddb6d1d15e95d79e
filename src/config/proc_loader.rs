use std::path::Path;
use crate::config::proc_initiateor::initiate_default_values;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};
use crate::config::proc_validator;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("cannot read config '{}': {}", path.display(), e))?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
        })?;

    service_config = initiate_default_values(service_config);
    debug!("validation config ...");
    if let Err(errors) = proc_validator::validate_service_config(&service_config) {
        get_metrics().await.config_validation_errors.inc_by(errors.len() as u64);
        return Err(anyhow!(
            "config is not valid, total errors:{}, \n{}",
            errors.len(),
            errors.join("\n")
        ));
    }

    Ok(service_config)
}

/// `${VAR}` and `${VAR:default}` substitution from the process environment.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::expand_env_vars;
    use serial_test::serial;

    #[test]
    #[serial]
    fn expands_set_vars_and_defaults() {
        std::env::set_var("MP_EXPAND_HOST", "https://example.test");
        std::env::remove_var("MP_EXPAND_MISSING");
        let out = expand_env_vars("a: ${MP_EXPAND_HOST}\nb: ${MP_EXPAND_MISSING:fallback}\nc: ${MP_EXPAND_MISSING}");
        assert_eq!(out, "a: https://example.test\nb: fallback\nc: ");
        std::env::remove_var("MP_EXPAND_HOST");
    }
}
