//! # bgdl-download
//!
//! Lifecycle coordinator for background downloads.
//!
//! - `manager` - the `LifecycleCoordinator`: start, stop, pause, resume,
//!   completion handling and temp-file promotion
//! - `registry` - pure state for active and paused records
//! - `engine` - request building and outcome classification over a
//!   `TransferEnginePort`
//! - `listener` - completion-signal subscription
//! - `cookies` - the current cookie set
//!
//! The coordinator is engine-agnostic; `bgdl-http` provides an HTTP engine.

// Re-export core types for convenience
pub use bgdl_core::{
    ChannelCallback, DownloadCallback, DownloadError, DownloadOutcome, DownloadRecord,
    DownloadResult, DownloadSummary, NoopCallback, RegistrySnapshot, TransferEnginePort,
    TransferId, TransferStatus,
};

mod config;
mod cookies;
mod engine;
mod listener;
mod registry;

pub use config::{CoordinatorConfig, DEFAULT_REQUEST_TITLE};
pub use cookies::CookieStore;
pub use engine::{TransferEngineAdapter, TransferOutcome};
pub use listener::{CompletionHandler, ListenerHandle, spawn_listener};
pub use registry::DownloadRegistry;

// Public API
mod manager;

pub use manager::{
    CANCELLED_MESSAGE, CoordinatorDeps, LifecycleCoordinator, Operation,
    PROMOTION_FAILED_MESSAGE, VANISHED_MESSAGE, build_coordinator, promote, remove_stale_temp,
};

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
