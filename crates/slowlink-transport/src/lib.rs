//! Byte-channel abstraction for slow serial links.
//!
//! Provides a unified blocking interface over the physical byte stream:
//! - Real serial ports (via the `serialport` crate)
//! - In-memory loopback pairs for tests and demos
//!
//! This is the lowest layer of slowlink. Everything else builds on top of
//! the [`Channel`] trait provided here.

pub mod channel;
pub mod error;
pub mod serial;

#[cfg(unix)]
pub mod loopback;

pub use channel::Channel;
pub use error::{Result, TransportError};
pub use serial::{open, SerialChannel};

#[cfg(unix)]
pub use loopback::LoopbackChannel;
