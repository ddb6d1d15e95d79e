use crate::config::settings::LoggingConfig;
use crate::config::types::ServiceConfig;
use crate::config::settings::LogFormat;
use crate::utils::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_TOKEN_PATH};

pub fn initiate_default_values(mut config: ServiceConfig) -> ServiceConfig {
    let settings = &mut config.settings;
    if settings.logging.is_none() {
        settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::from_env()));
    }
    settings.safety_margin_seconds.get_or_insert(DEFAULT_SAFETY_MARGIN_SECS);
    settings.request_timeout_seconds.get_or_insert(DEFAULT_REQUEST_TIMEOUT_SECS);

    let marketplace = &mut config.marketplace;
    marketplace.token_path.get_or_insert_with(|| DEFAULT_TOKEN_PATH.to_owned());
    marketplace.base_url = marketplace.base_url.trim_end_matches('/').to_owned();
    // scope order is significant, only surrounding whitespace is dropped
    marketplace.scopes = marketplace.scopes.iter().map(|scope| scope.trim().to_owned()).collect();

    config
}
