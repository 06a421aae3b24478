//! Finbooks Connect - HTTP client for the Finbooks backend.
//!
//! This crate implements the core gateway traits over the backend REST API:
//! currency rates, manual overrides, server-side conversion, and the company
//! currency setup.

pub mod client;
mod models;

// Re-export commonly used types
pub use client::{ApiClient, DEFAULT_TIMEOUT_SECS};
