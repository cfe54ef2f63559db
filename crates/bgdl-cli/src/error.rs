//! CLI-specific error types and mappings.
//!
//! `CliError` maps to process exit codes; `BridgeError` covers requests the
//! JSON bridge cannot execute.

use bgdl_core::DownloadError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The download ended without producing the file.
    #[error("Download failed: {0}")]
    Download(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Download(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::InvalidUri { .. } | DownloadError::InvalidHeader { .. } => {
                Self::Arguments(err.to_string())
            }
            DownloadError::Io { .. } | DownloadError::DestinationExists { .. } => {
                Self::Io(err.to_string())
            }
            DownloadError::Other { .. } => Self::Download(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A bridge request that cannot be executed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The line is not a valid request object.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// A required positional argument is absent or null.
    #[error("missing argument {index} ({name})")]
    MissingArgument { index: usize, name: &'static str },

    /// A positional argument has the wrong JSON type.
    #[error("argument {index} ({name}) must be {expected}")]
    InvalidArgument {
        index: usize,
        name: &'static str,
        expected: &'static str,
    },

    /// The reply could not be encoded.
    #[error("failed to encode reply: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
