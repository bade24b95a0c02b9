//! Error handling and error types for column-tree.
//!
//! Tree induction distinguishes four kinds of failure: fatal preconditions
//! detected before the column table is built, parallel task failures that are
//! handed back to the caller unchanged, cooperative cancellation, and plain
//! configuration or I/O problems. Node-local degeneracies (no valid split,
//! constant attributes, empty partitions) are never errors; they turn the node
//! into a leaf.

use std::io;
use thiserror::Error;

/// Main error type for the tree induction engine.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dataset-related errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// The label column contains missing values
    #[error("Label attribute '{attribute}' contains missing values")]
    LabelMissingValues { attribute: String },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Computation was aborted through the cancellation token
    #[error("Process aborted by request")]
    Cancelled,

    /// Thread pool setup and synchronization errors
    #[error("Threading error: {message}")]
    Threading { message: String },

    /// A worker task panicked
    #[error("Worker task panicked: {message}")]
    TaskPanicked { message: String },

    /// Tree construction errors
    #[error("Tree construction error: {message}")]
    TreeConstruction { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Type alias for Results using TreeError
pub type Result<T> = std::result::Result<T, TreeError>;

impl TreeError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        TreeError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        TreeError::Dataset {
            message: message.into(),
        }
    }

    /// Create a missing label values error naming the label attribute
    pub fn label_missing_values<S: Into<String>>(attribute: S) -> Self {
        TreeError::LabelMissingValues {
            attribute: attribute.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        TreeError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        TreeError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a threading error
    pub fn threading<S: Into<String>>(message: S) -> Self {
        TreeError::Threading {
            message: message.into(),
        }
    }

    /// Create a task panic error
    pub fn task_panicked<S: Into<String>>(message: S) -> Self {
        TreeError::TaskPanicked {
            message: message.into(),
        }
    }

    /// Create a tree construction error
    pub fn tree_construction<S: Into<String>>(message: S) -> Self {
        TreeError::TreeConstruction {
            message: message.into(),
        }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        TreeError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error reports a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TreeError::Cancelled)
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TreeError::Config { .. } => false,
            TreeError::InvalidParameter { .. } => false,
            TreeError::Dataset { .. } => false,
            TreeError::LabelMissingValues { .. } => false,
            TreeError::DimensionMismatch { .. } => false,
            TreeError::Cancelled => true,
            TreeError::Threading { .. } => true,
            TreeError::TaskPanicked { .. } => false,
            TreeError::TreeConstruction { .. } => true,
            TreeError::IO { .. } => false,
            TreeError::Json { .. } => false,
            TreeError::Toml { .. } => false,
            TreeError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TreeError::Config { .. } => "config",
            TreeError::InvalidParameter { .. } => "invalid_parameter",
            TreeError::Dataset { .. } => "dataset",
            TreeError::LabelMissingValues { .. } => "label_missing_values",
            TreeError::DimensionMismatch { .. } => "dimension_mismatch",
            TreeError::Cancelled => "cancelled",
            TreeError::Threading { .. } => "threading",
            TreeError::TaskPanicked { .. } => "task_panicked",
            TreeError::TreeConstruction { .. } => "tree_construction",
            TreeError::IO { .. } => "io",
            TreeError::Json { .. } => "json",
            TreeError::Toml { .. } => "toml",
            TreeError::Internal { .. } => "internal",
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::TreeError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::TreeError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! dataset_error {
    ($msg:expr) => {
        $crate::core::error::TreeError::dataset($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::TreeError::dataset(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
