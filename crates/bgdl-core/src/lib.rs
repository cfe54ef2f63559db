//! # bgdl-core
//!
//! Domain types and ports for the background download coordinator.
//!
//! - `download` - records, transfer ids, statuses, reason labels, errors
//! - `ports` - the transfer engine and completion callback traits
//!
//! Implementations live in `bgdl-download` (coordinator) and `bgdl-http`
//! (engine).

pub mod download;
pub mod ports;

// Re-export commonly used types for convenience
pub use download::{
    DEFAULT_TEMP_SUFFIX, DownloadError, DownloadRecord, DownloadResult, DownloadSummary,
    FailureReason, HTTP_FORBIDDEN, RegistrySnapshot, StatusMask, TransferId, TransferStatus,
    reason_label, temp_path_for,
};
pub use ports::{
    COOKIE_HEADER, ChannelCallback, DownloadCallback, DownloadOutcome, NoopCallback,
    TransferEnginePort, TransferRequest, TransferRow, TransferSnapshot,
};
