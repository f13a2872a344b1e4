//! Link-layer text messaging over slow serial channels.
//!
//! slowlink frames variable-length text into fixed 4-byte headers plus
//! bodies, fragments oversized payloads into bundles, paces outbound
//! writes to the channel's bit rate, and dispatches inbound frames to
//! handlers by action code.
//!
//! # Crate Structure
//!
//! - [`transport`] — Byte-channel abstraction (serial ports, loopbacks)
//! - [`frame`] — Header/message/bundle codec and frame containers
//! - [`link`] — Connection engine: paced writes, read loop, dispatch

/// Re-export transport types.
pub mod transport {
    pub use slowlink_transport::*;
}

/// Re-export frame codec types.
pub mod frame {
    pub use slowlink_frame::*;
}

/// Re-export connection engine types.
pub mod link {
    pub use slowlink_link::*;
}
