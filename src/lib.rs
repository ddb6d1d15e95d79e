//! # Marketplace Probe Library
//!
//! Obtains OAuth2 client-credentials tokens for the marketplace API,
//! caches them until they near expiry, and probes ordered lists of
//! candidate endpoints for the first one the token is authorised for.
//!
//! Modules:
//! - `config` — YAML service configuration, defaults and validation
//! - `auth` — credentials and the token broker
//! - `cache` — single-slot token cache
//! - `transport` — injectable HTTP transport
//! - `probe` — endpoint prober and probe results
//! - `diagnostics` — end-to-end diagnostic run over configured probe groups

pub mod auth;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod probe;
pub mod resilience;
pub mod tests;
pub mod transport;
pub mod utils;


pub use crate::auth::{BrokerSettings, Credentials, TokenBroker};
pub use crate::config::types::ServiceConfig;
pub use crate::errors::BrokerError;
pub use crate::probe::{EndpointProber, ProbeAttempt, ProbeResult};
