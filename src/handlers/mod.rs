//! HTTP request handlers for API endpoints.

pub mod docs;
pub mod health;
pub mod metrics;
pub mod openapi;
pub mod profile;
pub mod projects;
pub mod skills;
pub mod talks;

pub use docs::*;
pub use health::*;
pub use metrics::*;
pub use openapi::*;
pub use profile::*;
pub use projects::*;
pub use skills::*;
pub use talks::*;
