//! Shared library for the Anime News Hub workspace.
//!
//! This crate provides common functionality used by the hub crate:
//! - Configuration management
//! - The unified content model
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
