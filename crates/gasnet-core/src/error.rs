//! Unified error types for the gasnet ecosystem
//!
//! This module provides a common error type [`GasnetError`] that can represent
//! errors from any part of the system. Domain-specific error types can be
//! converted to `GasnetError` for uniform error handling at API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use gasnet_core::{GasnetError, GasnetResult};
//!
//! fn plan(path: &str) -> GasnetResult<()> {
//!     let network = load_network(path)?;
//!     optimize(&network)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all gasnet operations.
///
/// Allows errors from I/O, parsing, optimization, and validation to be
/// handled uniformly across the workspace crates.
#[derive(Error, Debug)]
pub enum GasnetError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Solver/algorithm errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network structure errors
    #[error("Network error: {0}")]
    Network(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GasnetError.
pub type GasnetResult<T> = Result<T, GasnetError>;

impl From<anyhow::Error> for GasnetError {
    fn from(err: anyhow::Error) -> Self {
        GasnetError::Other(err.to_string())
    }
}

impl From<String> for GasnetError {
    fn from(s: String) -> Self {
        GasnetError::Other(s)
    }
}

impl From<&str> for GasnetError {
    fn from(s: &str) -> Self {
        GasnetError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for GasnetError {
    fn from(err: serde_json::Error) -> Self {
        GasnetError::Parse(err.to_string())
    }
}
