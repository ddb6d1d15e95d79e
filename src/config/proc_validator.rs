//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates:
//!   * settings bounds (timeouts, safety margin, logging level)
//!   * marketplace base url, token path and scope candidates
//!   * probe groups: unique names, non-empty endpoint lists, path shape
//!   * endpoint template placeholders against `marketplace.vars`

use std::collections::HashSet;
use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::{MarketplaceConfig, ProbeGroupConfig, ServiceConfig};
use crate::probe::template::placeholders;

const MAX_SAFETY_MARGIN_SECONDS: u64 = 60 * 60 * 24;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_marketplace(&cfg.marketplace, &mut errors);

    let mut names = HashSet::new();
    for (idx, group) in cfg.probes.iter().enumerate() {
        validate_probe_group(idx, group, &cfg.marketplace, &mut errors);
        if !group.name.is_empty() && !names.insert(group.name.as_str()) {
            errors.push(format!("probes['{}'] is defined more than once; group names must be unique", group.name));
        }
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(s) = settings.safety_margin_seconds {
        if s > MAX_SAFETY_MARGIN_SECONDS {
            errors.push(format!(
                "settings.safety_margin_seconds ({}) is unreasonably large",
                s
            ));
        }
    }

    if settings.request_timeout_seconds == Some(0) {
        errors.push("settings.request_timeout_seconds must be > 0".to_string());
    }
    if settings.deadline_seconds == Some(0) {
        errors.push("settings.deadline_seconds must be > 0 when set".to_string());
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

/// MARKETPLACE VALIDATION
fn validate_marketplace(marketplace: &MarketplaceConfig, errors: &mut Vec<String>) {
    let base_url = &marketplace.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(format!(
            "marketplace.base_url '{}' must start with http:// or https://",
            base_url
        ));
    }

    if let Some(token_path) = &marketplace.token_path {
        if !token_path.starts_with('/') {
            errors.push(format!("marketplace.token_path '{}' must start with '/'", token_path));
        }
    }

    if marketplace.scopes.is_empty() {
        errors.push("marketplace.scopes is empty; at least one scope candidate required".to_string());
    }
    for (idx, scope) in marketplace.scopes.iter().enumerate() {
        if scope.trim().is_empty() {
            errors.push(format!("marketplace.scopes[{}] must not be blank", idx));
        }
    }
}

/// PROBE GROUP VALIDATION
fn validate_probe_group(
    idx: usize,
    group: &ProbeGroupConfig,
    marketplace: &MarketplaceConfig,
    errors: &mut Vec<String>,
) {
    if group.name.trim().is_empty() {
        errors.push(format!("probes[{}].name must not be empty", idx));
    }
    if group.endpoints.is_empty() {
        errors.push(format!("probes['{}'].endpoints is empty", group.name));
    }

    for endpoint in &group.endpoints {
        if !endpoint.starts_with('/') {
            errors.push(format!(
                "probes['{}'] endpoint '{}' must start with '/'",
                group.name, endpoint
            ));
        }
        for name in placeholders(endpoint) {
            if !marketplace.vars.contains_key(&name) {
                errors.push(format!(
                    "probes['{}'] endpoint '{}' references undefined var '{}'",
                    group.name, endpoint, name
                ));
            }
        }
    }
}
