//! # GCP Config Tools
//!
//! Two command-line tools that push declarative configuration into a Google Cloud project.
//!
//! ## Overview
//!
//! - **`apply-config`** reads YAML documents from the `iam/`, `cloudrun/` and `cloudbuild/`
//!   directories and, per file, adds IAM policy bindings, creates a Cloud Run service or
//!   creates a Cloud Build trigger.
//! - **`opsctl`** proxies to Secret Manager: update a secret, list secrets, read the latest
//!   version, bulk-update from a `.env` file, and validate that the required secrets exist.
//!
//! Both tools talk to the GCP REST APIs through the [`provider`] traits, so the
//! orchestration in [`applier`] and [`manager`] can be exercised against the in-memory
//! mock server or test fakes.

pub mod applier;
pub mod config;
pub mod constants;
pub mod manager;
pub mod provider;
pub mod runtime;

pub use applier::{ApplySummary, ConfigApplier, ConfigKind};
pub use config::{resolve_project_id, ToolConfig};
pub use manager::{Action, ActionOutcome, ActionRequest, SecretOperations};
