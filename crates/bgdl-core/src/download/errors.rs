//! Download error types.
//!
//! These errors are designed to be serializable and not depend on external
//! error types like `std::io::Error`. For I/O errors, we capture the kind
//! and message as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for download operations.
///
/// Designed to be serializable across the host bridge without depending on
/// non-serializable types like `std::io::Error` or `reqwest::Error`.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "`NotFound`", "`PermissionDenied`").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// The source URI cannot be handled by the engine.
    #[error("Invalid URI: {uri}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
    },

    /// A request header could not be attached.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why the header was rejected.
        reason: String,
    },

    /// The engine refuses to overwrite an existing destination.
    #[error("Destination already exists: {path}")]
    DestinationExists {
        /// The destination that already exists.
        path: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl DownloadError {
    /// Create an I/O error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create an invalid URI error.
    pub fn invalid_uri(uri: impl Into<String>) -> Self {
        Self::InvalidUri { uri: uri.into() }
    }

    /// Create an invalid header error.
    pub fn invalid_header(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a destination-exists error.
    pub fn destination_exists(path: impl Into<String>) -> Self {
        Self::DestinationExists { path: path.into() }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Convenience result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;
