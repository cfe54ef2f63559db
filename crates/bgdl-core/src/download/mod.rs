//! Download domain types, records, errors, and snapshots.
//!
//! This module contains pure data types for the download system. No I/O,
//! networking, or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `types` - Engine identifiers, statuses, masks and reason codes
//! - `record` - The per-request `DownloadRecord`
//! - `errors` - Error types for download operations
//! - `snapshot` - Registry snapshot DTOs

pub mod errors;
pub mod record;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use errors::{DownloadError, DownloadResult};
pub use record::{DEFAULT_TEMP_SUFFIX, DownloadRecord, temp_path_for};
pub use snapshot::{DownloadSummary, RegistrySnapshot};
pub use types::{
    FailureReason, HTTP_FORBIDDEN, StatusMask, TransferId, TransferStatus, reason_label,
};
