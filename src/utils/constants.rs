//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
pub const DEFAULT_TOKEN_PATH: &str = "/token";
pub const DEFAULT_CONFIG_PATH: &str = "conf/marketplace-probe.yaml";

pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";
