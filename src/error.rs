//! Error types for daxtab.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for daxtab operations.
#[derive(Error, Debug)]
pub enum DaxError {
    /// Configuration errors (missing required descriptor fields, invalid config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver errors (engine open/execute/read failures), propagated unchanged.
    #[error("Driver error: {0}")]
    Driver(String),

    /// The field decoder saw a runtime type outside its known set. Fatal, never retried.
    #[error("Unsupported field type: {0}")]
    UnsupportedType(String),
}

impl DaxError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a driver error with the given message.
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Creates an unsupported-type error carrying the driver's type name.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType(type_name.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Driver(_) => "Driver Error",
            Self::UnsupportedType(_) => "Unsupported Type Error",
        }
    }
}

/// Result type alias using DaxError.
pub type Result<T> = std::result::Result<T, DaxError>;
