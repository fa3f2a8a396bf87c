//! Snapmark Common Utilities
//!
//! Shared infrastructure for all Snapmark crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading
//! - Injected key-value preference storage

pub mod config;
pub mod error;
pub mod logging;
pub mod store;

pub use config::*;
pub use error::*;
pub use store::*;
