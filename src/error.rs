//! Error types for the publish step
//!
//! Errors come in two tiers. [`StepError`] is fatal: the run aborts and the
//! host receives no [`StepOutput`](crate::StepOutput). [`PublishError`] is
//! recoverable: it stops the message loop but is folded into the output's
//! `err` field so test assertions can still inspect it.

use crate::config::{ConfigError, Message};
use crate::transport::TransportError;
use thiserror::Error;

/// Fatal, run-aborting errors
#[derive(Debug, Error)]
pub enum StepError {
    #[error("address is mandatory")]
    MissingAddress,

    #[error("clientType {0:?} must be publisher")]
    UnsupportedClientType(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),

    #[error("Run cancelled before a connection was established")]
    Cancelled,
}

impl StepError {
    /// Create unsupported client type error
    pub fn unsupported_client_type<S: Into<String>>(client_type: S) -> Self {
        Self::UnsupportedClientType(client_type.into())
    }
}

/// Per-message failures that abort the remaining message loop
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("mandatory field Subject was empty in Messages[{index}]({message})")]
    EmptySubject { index: usize, message: Message },

    #[error("Message publish failed: Messages[{index}]({message}): {source}")]
    Submit {
        index: usize,
        message: Message,
        #[source]
        source: TransportError,
    },

    #[error("Run cancelled before Messages[{index}] was submitted")]
    Cancelled { index: usize },
}

impl PublishError {
    /// Position of the failing message in the configured list
    pub fn index(&self) -> usize {
        match self {
            PublishError::EmptySubject { index, .. }
            | PublishError::Submit { index, .. }
            | PublishError::Cancelled { index } => *index,
        }
    }
}

/// Result type for step operations
pub type StepResult<T> = Result<T, StepError>;
