//! Internal transfer errors.
//!
//! These never cross the port: a failed transfer is reported as a terminal
//! row whose reason code comes from [`TransferError::reason`].

use std::io;

use bgdl_core::FailureReason;
use thiserror::Error;

/// Why a running transfer stopped.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The server answered with a client or server error.
    #[error("server responded with HTTP {0}")]
    Status(u16),

    /// The server answered with a status the engine does not handle.
    #[error("unhandled HTTP status {0}")]
    UnhandledStatus(u16),

    /// The redirect limit was exceeded.
    #[error("too many redirects")]
    TooManyRedirects,

    /// The response body could not be read.
    #[error("error reading response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Bytes could not be written to the destination.
    #[error("error writing destination: {0}")]
    Write(#[from] io::Error),

    /// The request could not be sent.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl TransferError {
    /// Classify an error returned by `send()`.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_redirect() {
            Self::TooManyRedirects
        } else {
            Self::Request(err)
        }
    }

    /// Classify a non-success HTTP status.
    pub const fn from_status(status: u16) -> Self {
        if status >= 400 {
            Self::Status(status)
        } else {
            Self::UnhandledStatus(status)
        }
    }

    /// Reason code recorded on the failed row.
    pub fn reason(&self) -> i32 {
        match self {
            Self::Status(code) => i32::from(*code),
            Self::UnhandledStatus(_) => FailureReason::UnhandledHttpCode.code(),
            Self::TooManyRedirects => FailureReason::TooManyRedirects.code(),
            Self::Body(_) => FailureReason::HttpDataError.code(),
            Self::Write(e) if e.kind() == io::ErrorKind::StorageFull => {
                FailureReason::InsufficientSpace.code()
            }
            Self::Write(_) => FailureReason::FileError.code(),
            Self::Request(_) => FailureReason::Unknown.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_report_their_status() {
        assert_eq!(TransferError::from_status(404).reason(), 404);
        assert_eq!(TransferError::from_status(403).reason(), 403);
        assert_eq!(TransferError::from_status(503).reason(), 503);
    }

    #[test]
    fn unhandled_status_has_symbolic_reason() {
        assert_eq!(TransferError::from_status(304).reason(), 1002);
        assert!(TransferError::from_status(304).to_string().contains("304"));
    }

    #[test]
    fn write_errors_distinguish_full_storage() {
        let full = TransferError::from(io::Error::from(io::ErrorKind::StorageFull));
        let denied = TransferError::from(io::Error::from(io::ErrorKind::PermissionDenied));

        assert_eq!(full.reason(), 1008);
        assert_eq!(denied.reason(), 1001);
    }

    #[test]
    fn redirect_limit_reason() {
        assert_eq!(TransferError::TooManyRedirects.reason(), 1005);
    }
}
