//! Finbooks Core - Domain entities, services, and traits for the
//! multi-currency subsystem.
//!
//! This crate contains the client-side business logic: the in-memory rate
//! book, conversion, refresh orchestration, and company currency setup. It
//! is transport-agnostic and defines gateway traits that are implemented by
//! the `connect` crate over HTTP.

pub mod errors;
pub mod fx;
pub mod settings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
pub use errors::ValidationError;
