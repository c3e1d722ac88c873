//! Data models and schemas for the Profile API.
//!
//! Request and response bodies, query parameter structs and the records
//! persisted for submitted questions.

pub mod api;
pub mod catalog;
pub mod profile;
pub mod question;

pub use api::*;
pub use catalog::*;
pub use profile::*;
pub use question::*;
