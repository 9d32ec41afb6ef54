//! Error types for gltoolbox-rs.

use thiserror::Error;

/// The main error type for gltoolbox-rs operations.
///
/// Only invalid calls produce an error. Calls that are valid but saturate
/// (zooming past a zero radius, moving a camera center past its limits) are
/// accepted silently and never reach this type.
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// A parameter violated its documented precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A particle property with the given key does not exist.
    #[error("property '{0}' does not exist")]
    PropertyNotFound(String),

    /// A particle property exists but cannot be indexed at the given position.
    #[error("index {index} not valid for property '{property}'")]
    PropertyIndex { property: String, index: usize },

    /// A particle property holds a value of the wrong kind for the operation.
    #[error("property '{property}' is not a {expected}")]
    PropertyType {
        property: String,
        expected: &'static str,
    },

    /// No callback with the given name is bound.
    #[error("callback '{0}' does not exist")]
    CallbackNotFound(String),

    /// Division or modulo by zero in a property operation.
    #[error("division by zero in '{0}'")]
    DivisionByZero(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for gltoolbox-rs operations.
pub type Result<T> = std::result::Result<T, ToolboxError>;
