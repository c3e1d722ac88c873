//! Custom middleware implementations for the API.
//!
//! CORS, request IDs, metrics collection and rate limiting.

pub mod cors;
pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use cors::*;
pub use metrics::*;
pub use rate_limit::*;
pub use request_id::*;
