//! # civic-core
//!
//! Core crate for the civic notification service. Contains configuration
//! schemas, typed identifiers, collaborator traits, the per-key lock used
//! to serialize per-user work, and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod sync;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
