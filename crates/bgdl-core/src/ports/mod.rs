//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP client types in any signature
//! - Callbacks are plain sync traits; the coordinator decides where they run
//! - The engine owns its queue; the core only correlates by `TransferId`

pub mod callback;
pub mod transfer_engine;

pub use callback::{ChannelCallback, DownloadCallback, DownloadOutcome, NoopCallback};
pub use transfer_engine::{
    COOKIE_HEADER, TransferEnginePort, TransferRequest, TransferRow, TransferSnapshot,
};
