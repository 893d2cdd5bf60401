//! Error types for database operations.

use thiserror::Error;

use crate::resource::TransportError;

/// Errors surfaced by the source database and its module wrappers.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Invalid or missing required arguments: bad dialect, empty file name,
    /// missing parser, parse input that cannot exist. Immediate and fatal
    /// to the call; never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation required a pre-registered module that does not exist.
    #[error("module not found: {0}")]
    NotFound(String),

    /// Remote content changed since it was loaded; resolved only through
    /// an explicit user decision, never retried automatically.
    #[error("conflicting remote change for {0}")]
    Conflict(String),

    /// Listing or generic network failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SourceError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
