//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants line up
//! with the failure categories the storefront reports to customers, see [`ErrorKind`].

use crate::core::access::AuthError;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Malformed input, rejected before touching the catalog
    #[error("Invalid input: {message}")]
    Validation {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// The referenced sweet does not exist
    #[error("Sweet not found: {id}")]
    SweetNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// A purchase asked for more units than are in stock
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        /// Units on hand when the purchase was rejected
        available: i32,
        /// Units the customer asked for
        requested: i32,
    },

    /// Credential missing, malformed, or expired
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Any failure reported by the catalog store
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    #[allow(missing_docs)]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    #[allow(missing_docs)]
    EnvVar(#[from] std::env::VarError),

    /// Discord framework failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Failure categories surfaced to the storefront UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, never retried
    Validation,
    /// Referenced sweet is gone
    NotFound,
    /// Not enough units to fill a purchase
    InsufficientStock,
    /// Catalog store failure
    Store,
    /// Credential problem, the UI should ask the user to log in again
    Auth,
    /// Anything outside the catalog (config, I/O, framework)
    Internal,
}

impl Error {
    /// Classifies this error for the UI.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::SweetNotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::Database(_) => ErrorKind::Store,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Config { .. } | Self::Io(_) | Self::EnvVar(_) | Self::Framework(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
