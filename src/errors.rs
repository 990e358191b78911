// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for reactive sequences

use thiserror::Error;

/// Failure signal carried by a [`Flux`](crate::Flux) or [`Mono`](crate::Mono)
///
/// Errors are `Clone` so that an error source can replay the same failure to
/// every independent subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// A user-supplied mapping or predicate function failed
    #[error("Operator error: {0}")]
    Operator(String),

    /// The producer of a sequence failed
    #[error("Source error: {0}")]
    Source(String),

    /// The subscription driver panicked or was aborted
    #[error("Subscription aborted: {0}")]
    Aborted(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ReactiveError {
    /// Build a source failure from anything printable
    pub fn source(message: impl std::fmt::Display) -> Self {
        ReactiveError::Source(message.to_string())
    }

    /// Build an operator failure from anything printable
    pub fn operator(message: impl std::fmt::Display) -> Self {
        ReactiveError::Operator(message.to_string())
    }
}

/// Result type for reactive operations
pub type ReactiveResult<T> = Result<T, ReactiveError>;

impl From<&str> for ReactiveError {
    fn from(message: &str) -> Self {
        ReactiveError::Operator(message.to_string())
    }
}

impl From<String> for ReactiveError {
    fn from(message: String) -> Self {
        ReactiveError::Operator(message)
    }
}

impl From<anyhow::Error> for ReactiveError {
    fn from(err: anyhow::Error) -> Self {
        ReactiveError::Operator(err.to_string())
    }
}

impl From<serde_json::Error> for ReactiveError {
    fn from(err: serde_json::Error) -> Self {
        ReactiveError::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ReactiveError {
    fn from(err: tokio::task::JoinError) -> Self {
        ReactiveError::Aborted(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ReactiveError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ReactiveError::Timeout(err.to_string())
    }
}
