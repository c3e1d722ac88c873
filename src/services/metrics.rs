//! Metrics collection and Prometheus integration service.

use prometheus::{CounterVec, Gauge, HistogramOpts, HistogramVec, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::time::{Duration, Instant};

/// Application metrics collector for Prometheus integration
#[derive(Clone)]
pub struct AppMetrics {
    pub registry: Registry,
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub app_uptime_seconds: Gauge,
    pub rate_limit_decisions_total: CounterVec,
    pub rate_limit_tracked_keys: IntGauge,
    pub talk_questions_total: IntCounter,
    pub start_time: Instant,
}

impl AppMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "status", "route"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        )?;

        let app_uptime_seconds = Gauge::new("app_uptime_seconds", "Application uptime in seconds")?;

        // Outcome is "allowed" or "rejected"
        let rate_limit_decisions_total = CounterVec::new(
            Opts::new(
                "rate_limit_decisions_total",
                "Rate limit decisions by policy and outcome",
            ),
            &["policy", "outcome"],
        )?;

        let rate_limit_tracked_keys = IntGauge::new(
            "rate_limit_tracked_keys",
            "Rate limit counters held in memory after the last sweep",
        )?;

        let talk_questions_total =
            IntCounter::new("talk_questions_total", "Questions submitted about talks")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(app_uptime_seconds.clone()))?;
        registry.register(Box::new(rate_limit_decisions_total.clone()))?;
        registry.register(Box::new(rate_limit_tracked_keys.clone()))?;
        registry.register(Box::new(talk_questions_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            app_uptime_seconds,
            rate_limit_decisions_total,
            rate_limit_tracked_keys,
            talk_questions_total,
            start_time: Instant::now(),
        })
    }

    /// Record an HTTP request with method, route, status, and duration
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        if route == "/metrics" {
            // Scrapes would otherwise dominate the counters
            return;
        }

        self.http_requests_total
            .with_label_values(&[method, &status.to_string(), route])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    pub fn record_rate_limit(&self, policy: &str, allowed: bool) {
        let outcome = if allowed { "allowed" } else { "rejected" };
        self.rate_limit_decisions_total
            .with_label_values(&[policy, outcome])
            .inc();
    }

    pub fn set_tracked_keys(&self, tracked: usize) {
        self.rate_limit_tracked_keys
            .set(i64::try_from(tracked).unwrap_or(i64::MAX));
    }

    /// Update the application uptime gauge
    pub fn update_uptime(&self) {
        let uptime = self.start_time.elapsed().as_secs_f64();
        self.app_uptime_seconds.set(uptime);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}
