//! Temp-file handling around a transfer.
//!
//! The engine writes to `<final>.temp`. Before a submission any leftover temp
//! file is removed (the engine refuses to overwrite); after a successful
//! transfer the temp file is renamed onto the final path.

use std::io;
use std::path::Path;

use bgdl_core::DownloadError;

/// Remove a leftover temp file. A missing file is not an error.
pub async fn remove_stale_temp(temp_path: &Path) -> Result<bool, DownloadError> {
    match tokio::fs::remove_file(temp_path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DownloadError::from_io_error(&e)),
    }
}

/// Move the finished temp file onto the final path.
///
/// This is a same-filesystem rename; an existing file at `final_path` is
/// replaced.
pub async fn promote(temp_path: &Path, final_path: &Path) -> Result<(), DownloadError> {
    tokio::fs::rename(temp_path, final_path)
        .await
        .map_err(|e| DownloadError::from_io_error(&e))
}
