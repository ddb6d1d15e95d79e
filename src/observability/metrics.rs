use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token broker metrics
    pub token_requests: IntCounterVec,
    pub token_cache_hits: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Prober metrics
    pub probe_attempts: IntCounterVec,
    pub probe_duration: HistogramVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("marketplaceprobe".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token broker
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Token endpoint requests by scope and outcome"),&["scope", "outcome"],).unwrap(),
            token_cache_hits: IntCounter::new("token_cache_hits_total", "get_token calls served from cache").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the cached token, margin applied").unwrap(),

            // Prober
            probe_attempts: IntCounterVec::new(Opts::new("probe_attempts_total", "Endpoint probe attempts by outcome"),&["endpoint", "outcome"],).unwrap(),
            probe_duration: HistogramVec::new(HistogramOpts::new("probe_duration_seconds", "Duration of a full probe call").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 30.0]),&["result"],).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during config loading",).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_requests.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.probe_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.probe_duration.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();

        metrics
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
