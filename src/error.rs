//! Error types for Gyre.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Only the variants listed first ever reach a caller of the data model; the
//! `Backend` variant describes a single engine's failure and is absorbed by
//! the fallback chain.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Gyre operations.
pub type Result<T> = std::result::Result<T, GyreError>;

/// Errors that can occur in Gyre.
#[derive(Debug, Error)]
pub enum GyreError {
    /// The file extension is not in the allow-list.
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat {
        /// Offending extension (empty when the file has none).
        extension: String,
    },

    /// The file does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// Every backend variant failed to read the file.
    #[error("Failed to read {}: {message}", path.display())]
    BackendReadFailure {
        /// File that could not be read.
        path: PathBuf,
        /// Message of the last variant tried.
        message: String,
    },

    /// A node path could not be resolved inside the file.
    #[error("Path not found: {path}")]
    PathNotFound {
        /// The unresolved node path.
        path: String,
    },

    /// A raw load produced nothing usable.
    #[error("No data available for {path}")]
    NoData {
        /// Variable path.
        path: String,
    },

    /// Failure inside a single backend variant.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Rejected projection configuration.
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GyreError {
    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a BackendReadFailure error.
    pub fn backend_read_failure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::BackendReadFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a PathNotFound error.
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a NoData error.
    pub fn no_data(path: impl Into<String>) -> Self {
        Self::NoData { path: path.into() }
    }

    /// Create a Backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<netcdf::Error> for GyreError {
    fn from(err: netcdf::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[cfg(feature = "hdf5")]
impl From<hdf5::Error> for GyreError {
    fn from(err: hdf5::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<ndarray::ShapeError> for GyreError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Backend(format!("Invalid shape/data size: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = GyreError::unsupported_format("txt");
        assert_eq!(err.to_string(), "Unsupported file format: txt");

        let err = GyreError::backend_read_failure("/tmp/a.nc", "bad magic");
        assert!(err.to_string().contains("/tmp/a.nc"));
        assert!(err.to_string().contains("bad magic"));

        let err = GyreError::path_not_found("/ocean/salt");
        assert!(err.to_string().contains("/ocean/salt"));
    }
}
