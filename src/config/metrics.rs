//! Prometheus exposure toggle.

use super::rate_limit::parse_bool;
use std::env;

/// Controls whether `/metrics` serves the registry
///
/// Collection always runs so rate limit decisions are counted even while
/// the endpoint is switched off; only the scrape answers 503.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED`; anything other than true/false keeps the default
    pub fn from_env() -> Self {
        let enabled = match env::var("METRICS_ENABLED") {
            Ok(raw) => parse_bool(&raw).unwrap_or_else(|()| {
                tracing::warn!(value = %raw, "Ignoring unrecognised METRICS_ENABLED value");
                true
            }),
            Err(_) => true,
        };

        Self { enabled }
    }
}
