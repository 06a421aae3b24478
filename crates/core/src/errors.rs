//! Core error types for the Finbooks currency subsystem.
//!
//! This module defines transport-agnostic error types. HTTP-specific failures
//! (from reqwest, status codes, etc.) are converted to these types by the
//! connect layer.

use std::num::ParseFloatError;
use thiserror::Error;

use crate::fx::FxError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the currency subsystem.
///
/// Every failure is recoverable from the caller's point of view: services
/// leave their state at the last known-good value and surface one of these
/// variants.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a usable response (connection refused,
    /// timeout, DNS). Retry is a user action, not automatic.
    #[error("Network request failed: {0}")]
    Network(String),

    /// The backend rejected the bearer token (HTTP 401). The logout flow is
    /// owned by an external collaborator; this layer only reports it.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The backend answered with a non-success status other than 401.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for user input. Raised before any request is sent;
/// a validation failure never mutates local state.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Exchange rate must be positive, got {0}")]
    NonPositiveRate(rust_decimal::Decimal),

    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
