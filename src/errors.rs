// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for infrastructure operations
//!
//! Persistence and transport failures. These are wrapped with context and
//! handed to the caller unchanged; the only failures the service layer
//! swallows are event publishes.

use thiserror::Error;

/// Errors that can occur in infrastructure operations
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backing store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored record does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Optimistic concurrency check failed on update
    #[error("{entity} {id} version conflict: expected {expected}, found {actual}")]
    ConcurrencyConflict {
        entity: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl InfrastructureError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        InfrastructureError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, InfrastructureError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, InfrastructureError::ConcurrencyConflict { .. })
    }
}

impl From<async_nats::Error> for InfrastructureError {
    fn from(err: async_nats::Error) -> Self {
        InfrastructureError::NatsConnection(err.to_string())
    }
}

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}
