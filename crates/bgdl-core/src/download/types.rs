//! Core domain types for transfers.
//!
//! Pure data types with no I/O dependencies.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the transfer engine when a request is enqueued.
///
/// It is the correlation key for a download across every async hop:
/// registry lookups, completion signals, and engine queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(i64);

impl TransferId {
    /// Wrap a raw engine id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw engine id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TransferId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Point-in-time status of a transfer inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Accepted, waiting to run.
    Pending,
    /// Bytes are moving.
    Running,
    /// Suspended by the engine (network loss, waiting for retry).
    Paused,
    /// Finished; all bytes are at the destination.
    Successful,
    /// Finished with an error; see the reason code.
    Failed,
}

impl TransferStatus {
    /// Whether the engine will not touch this transfer again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }

    /// The single-bit mask matching this status.
    #[must_use]
    pub const fn mask(self) -> StatusMask {
        match self {
            Self::Pending => StatusMask::PENDING,
            Self::Running => StatusMask::RUNNING,
            Self::Paused => StatusMask::PAUSED,
            Self::Successful => StatusMask::SUCCESSFUL,
            Self::Failed => StatusMask::FAILED,
        }
    }

    /// Get a string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Filter used when querying the engine for transfers by status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StatusMask: u8 {
        const PENDING = 1;
        const RUNNING = 1 << 1;
        const PAUSED = 1 << 2;
        const SUCCESSFUL = 1 << 3;
        const FAILED = 1 << 4;
    }
}

impl StatusMask {
    /// Statuses swept when a new download replaces older ones for the same URI.
    pub const SWEEP: Self = Self::PENDING
        .union(Self::RUNNING)
        .union(Self::PAUSED)
        .union(Self::SUCCESSFUL);

    /// Whether `status` is selected by this mask.
    #[must_use]
    pub const fn matches(self, status: TransferStatus) -> bool {
        self.contains(status.mask())
    }
}

impl Default for StatusMask {
    fn default() -> Self {
        Self::SWEEP
    }
}

/// Engine reason codes with a stable symbolic label.
///
/// Any code outside this set (HTTP statuses among them) is reported as its
/// decimal string, see [`reason_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    Unknown,
    FileError,
    UnhandledHttpCode,
    HttpDataError,
    TooManyRedirects,
    CannotResume,
    DeviceNotFound,
    InsufficientSpace,
    FileAlreadyExists,
}

impl FailureReason {
    /// All symbolic reasons.
    pub const ALL: [Self; 9] = [
        Self::Unknown,
        Self::FileError,
        Self::UnhandledHttpCode,
        Self::HttpDataError,
        Self::TooManyRedirects,
        Self::CannotResume,
        Self::DeviceNotFound,
        Self::InsufficientSpace,
        Self::FileAlreadyExists,
    ];

    /// The engine reason code for this failure.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Unknown => 1000,
            Self::FileError => 1001,
            Self::UnhandledHttpCode => 1002,
            Self::HttpDataError => 1004,
            Self::TooManyRedirects => 1005,
            Self::CannotResume => 1006,
            Self::DeviceNotFound => 1007,
            Self::InsufficientSpace => 1008,
            Self::FileAlreadyExists => 1009,
        }
    }

    /// Look up a symbolic reason by engine code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.code() == code)
    }

    /// Stable label surfaced to callers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "ERROR_UNKNOWN",
            Self::FileError => "ERROR_FILE_ERROR",
            Self::UnhandledHttpCode => "ERROR_UNHANDLED_HTTP_CODE",
            Self::HttpDataError => "ERROR_HTTP_DATA_ERROR",
            Self::TooManyRedirects => "ERROR_TOO_MANY_REDIRECTS",
            Self::CannotResume => "ERROR_CANNOT_RESUME",
            Self::DeviceNotFound => "ERROR_DEVICE_NOT_FOUND",
            Self::InsufficientSpace => "ERROR_INSUFFICIENT_SPACE",
            Self::FileAlreadyExists => "ERROR_FILE_ALREADY_EXISTS",
        }
    }
}

/// HTTP status the engine reports as a raw reason when access is refused.
pub const HTTP_FORBIDDEN: i32 = 403;

/// Translate an engine reason code to the label reported through callbacks.
#[must_use]
pub fn reason_label(code: i32) -> String {
    FailureReason::from_code(code).map_or_else(|| code.to_string(), |r| r.label().to_string())
}
