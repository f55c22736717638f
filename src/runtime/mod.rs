//! # Runtime Module
//!
//! Process setup shared by the `apply-config` and `opsctl` binaries.

pub mod initialization;

pub use initialization::*;
