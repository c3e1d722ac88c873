//! Application state assembled once at startup.

use crate::{
    config::{CorsConfig, MetricsConfig, RateLimitConfig, ServerConfig},
    error::StartupError,
    services::{AppMetrics, QuestionStore, RateLimiter, SeedData},
};
use actix_web::web;

/// Everything the app factory needs, shared by all workers
///
/// Cloning is cheap: the data, store, metrics and limiter are all reference
/// counted, so every worker sees the same counters and questions.
#[derive(Clone)]
pub struct AppState {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub metrics_config: MetricsConfig,
    pub data: web::Data<SeedData>,
    pub questions: web::Data<QuestionStore>,
    pub metrics: web::Data<AppMetrics>,
    pub limiter: RateLimiter,
}

impl AppState {
    /// Load every configuration section from the environment and build state
    pub fn from_env() -> Result<Self, StartupError> {
        Self::new(
            ServerConfig::from_env()?,
            RateLimitConfig::from_env()?,
            CorsConfig::from_env(),
            MetricsConfig::from_env(),
        )
    }

    /// Build state from explicit configuration, loading seed data from disk
    pub fn new(
        server: ServerConfig,
        rate_limit: RateLimitConfig,
        cors: CorsConfig,
        metrics_config: MetricsConfig,
    ) -> Result<Self, StartupError> {
        let data = SeedData::load(&server.data_dir)?;
        let questions = match &server.questions_file {
            Some(path) => QuestionStore::open(path.clone())?,
            None => QuestionStore::in_memory(),
        };
        let metrics = AppMetrics::new()?;

        Ok(Self {
            server,
            rate_limit,
            cors,
            metrics_config,
            data: web::Data::new(data),
            questions: web::Data::new(questions),
            metrics: web::Data::new(metrics),
            limiter: RateLimiter::new(),
        })
    }

    /// Replace the limiter, e.g. with one driven by a manual clock
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }
}
