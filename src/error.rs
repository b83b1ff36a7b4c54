//! Error types for prompt validation and configuration loading

use thiserror::Error;

/// Reasons a prompt is rejected before enhancement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Prompt must be a string, got {found}")]
    NotAString { found: &'static str },

    #[error("Prompt is empty")]
    Empty,

    #[error("Prompt is too short: {length} characters (minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("Prompt is too long: {length} characters (maximum {max})")]
    TooLong { length: usize, max: usize },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
