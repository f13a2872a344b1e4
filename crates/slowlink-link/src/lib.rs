//! Connection engine for slowlink.
//!
//! This is the layer that turns a raw byte [`Channel`] into a messaging
//! endpoint: a background reader thread runs the timeout-driven frame
//! state machine and feeds decoded frames to a dispatch table of
//! action-code handlers; the send path paces outbound bytes to the
//! channel's bit rate under a write-exclusion lock.
//!
//! [`Channel`]: slowlink_transport::Channel

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod pacing;
pub mod reader;

pub use config::{
    LinkConfig, DEFAULT_BITS_PER_SECOND, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT_MULTIPLIER,
};
pub use connection::Connection;
pub use dispatch::{Handler, SlotTable};
pub use error::{LinkError, Result};
pub use pacing::PacedWriter;
pub use reader::FrameReader;
