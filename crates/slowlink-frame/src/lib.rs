//! Fixed-header frame codec with bundle fragmentation for slow links.
//!
//! Every frame starts with a 4-byte header:
//! - declared body length (u8)
//! - sender address (u8)
//! - target address (u8, 0 = broadcast)
//! - action code (u8, 0-31 reserved)
//!
//! followed by the body in a single-byte text encoding. Payloads longer
//! than one frame travel as a [`Bundle`]: a header frame carrying the
//! fragment count, then up to 255 fragment frames.
//!
//! There is no end-of-frame marker on the wire; the declared length plus
//! the link's bit rate bound how long a body may take to arrive. A body
//! cut short by that deadline becomes a [`BrokenMessage`], a value rather
//! than an error.

pub mod buffer;
pub mod bundle;
pub mod codes;
pub mod error;
pub mod header;
pub mod message;
pub mod text;

pub use buffer::{Buffer, BufferError, Dequeue, Queue, TransparentBuffer};
pub use bundle::{Bundle, MAX_BUNDLE_CHARS, MAX_FRAGMENTS};
pub use codes::{
    code_name, is_reserved, is_user, BASIC_TEXT, BROADCAST_ADDRESS, BUNDLE_HEADER,
    DEFAULT_DEVICE_ADDRESS, EXIT, MAX_CODE, TIMEOUT_MULTIPLIER, USER_CODE_START,
};
pub use error::{FrameError, Result};
pub use header::{Header, HEADER_SIZE};
pub use message::{compose, BrokenMessage, Frame, Message, MAX_BODY_CHARS};
