//! Business logic and service layer modules.
//!
//! Seed data access, the question store, metrics collection and the
//! fixed-window rate limiter.

pub mod data;
pub mod metrics;
pub mod questions;
pub mod rate_limit;

pub use data::*;
pub use metrics::*;
pub use questions::*;
pub use rate_limit::*;
