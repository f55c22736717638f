//! Shared API path definitions for GCP
//!
//! This crate centralizes all API paths to ensure consistency
//! between the REST clients and the mock server implementation.
//!
//! ## PathBuilder
//!
//! The `PathBuilder` provides a type-safe, builder-pattern API for constructing
//! HTTP paths for each [`GcpOperation`].
//!
//! ## Matching
//!
//! [`GcpOperation::match_request`] is the inverse of the builder and is what the
//! mock server uses to route incoming requests.

pub mod builder;
pub mod errors;
pub mod gcp;
pub mod operations;

// Re-export core types for convenience
pub use builder::PathBuilder;
pub use errors::PathBuilderError;
pub use gcp::GcpService;
pub use operations::{GcpOperation, HttpMethod, PathParams};
