//! Profile API - a small personal introduction REST API
//!
//! Serves a profile, skills, talks and projects from flat JSON seed files,
//! accepts questions about talks, and documents itself with OpenAPI. Every
//! route group is protected by a fixed-window, per-client rate limiter.
//!
//! ## Architecture
//!
//! - `models/` - request/response models
//! - `handlers/` - HTTP handlers, the OpenAPI document and the app factory
//! - `middleware/` - CORS, request IDs, metrics and rate limiting
//! - `services/` - seed data, question storage, metrics and the rate limiter
//! - `config/` - environment-driven configuration
//! - `state` - shared state built once at startup
//!
//! ## Quick Start
//!
//! ```no_run
//! use actix_web::HttpServer;
//! use profile_api::{AppState, create_app};
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::from_env()?;
//!     let bind = state.server.bind_address();
//!     HttpServer::new(move || create_app(state.clone()))
//!         .bind(bind)?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use config::{CorsConfig, LogFormat, MetricsConfig, RateLimitConfig, ServerConfig};
pub use error::{ApiError, ConfigError, DataError, StartupError};
pub use handlers::{create_app, create_openapi_spec};
pub use middleware::{Cors, MetricsMiddleware, RateLimit, RequestIdMiddleware};
pub use models::{
    HealthResponse, Profile, ProfileMode, Project, ProjectsList, Quote, Skill, SkillsList, Talk,
    TalkQuestion, TalkQuestionResponse, TalksList,
};
pub use services::{
    AppMetrics, Clock, Decision, ManualClock, Policy, QuestionStore, RateLimiter, SeedData,
    SystemClock,
};
pub use state::AppState;
pub use utils::client_identity;
