//! # bgdl-http
//!
//! `TransferEnginePort` implementation over `reqwest`.
//!
//! - `HttpTransferEngine` - in-memory queue table, one task per transfer
//! - `HttpEngineConfig` - user agent, connect timeout, redirect limit
//!
//! Failed transfers are reported as terminal rows carrying a reason code:
//! the HTTP status for 4xx/5xx responses, otherwise one of the symbolic
//! `FailureReason` codes.

mod config;
mod engine;
mod error;

pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_REDIRECTS, DEFAULT_SIGNAL_CAPACITY, HttpEngineConfig,
    default_user_agent,
};
pub use engine::HttpTransferEngine;
pub use error::TransferError;
