//! Configuration structures and loading utilities.
//!
//! Every concern reads its own environment variables. Rate limiting and server
//! settings are validated strictly since a bad value there must stop startup.

pub mod cors;
pub mod metrics;
pub mod rate_limit;
pub mod server;

pub use cors::*;
pub use metrics::*;
pub use rate_limit::*;
pub use server::*;

// Tests touching process environment variables take this lock
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
