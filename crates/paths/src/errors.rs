//! # Path Builder Errors

use std::fmt;

use crate::operations::GcpOperation;

/// Error returned when a path cannot be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathBuilderError {
    /// No operation was set on the builder
    MissingOperation,
    /// A parameter required by the operation was not provided
    MissingParameter {
        operation: GcpOperation,
        parameter: &'static str,
    },
}

impl fmt::Display for PathBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathBuilderError::MissingOperation => write!(f, "no operation set on PathBuilder"),
            PathBuilderError::MissingParameter {
                operation,
                parameter,
            } => write!(
                f,
                "operation {} requires parameter '{parameter}'",
                operation.as_str()
            ),
        }
    }
}

impl std::error::Error for PathBuilderError {}
