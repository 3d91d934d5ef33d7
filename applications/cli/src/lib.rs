//! Selecta CLI Library
//!
//! Configuration loading and subcommands for the `selecta` binary.
//!
//! This library exposes the core components for testing purposes.

pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;

// Re-export commonly used types for convenience
pub use config::CliConfig;
pub use confirm::StdinConfirm;
pub use error::{CliError, Result};
