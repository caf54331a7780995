//! Error types for aclregex
//!
//! This module defines the error hierarchy used throughout the application.
//! Rule and placeholder errors never escape evaluation: they are turned into
//! diagnostics or skipped rules. Only configuration and I/O problems reach
//! the caller as real errors.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed rule: {0}")]
    Rule(#[from] RuleError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single rule line cannot be compiled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("missing {field} field")]
    MissingField { field: &'static str },

    #[error("permission '{value}' is not a non-negative integer")]
    InvalidPermission { value: String },

    #[error("invalid regex in object '{object}': {reason}")]
    InvalidPattern { object: String, reason: String },
}

impl RuleError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid_permission(value: impl Into<String>) -> Self {
        Self::InvalidPermission {
            value: value.into(),
        }
    }
}

/// Subject placeholder substitution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("placeholder '{token}' refers to capture group {index}, which did not match")]
    UnknownGroup { token: String, index: usize },

    #[error("placeholder '{token}' has an unusable group index")]
    InvalidIndex { token: String },
}
