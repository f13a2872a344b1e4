use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// A connected byte channel — implements Read + Write.
///
/// This is the fundamental I/O type the link layer is built on. A `read`
/// may return fewer bytes than requested; when a read timeout is set, a
/// read that produces no bytes in time fails with `WouldBlock` or
/// `TimedOut`. The timeout-driven frame reader depends on exactly these
/// short-read semantics.
///
/// One connection uses two handles of the same channel: the background
/// reader owns one, the paced writer the other. [`Channel::try_clone`]
/// provides the split.
pub trait Channel: Read + Write + Send {
    /// Set the read timeout. `None` means block until bytes arrive.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Clone this channel handle (shares the underlying port).
    fn try_clone(&self) -> Result<Box<dyn Channel>>;
}

/// Shortest read timeout a channel must honor.
///
/// Zero-duration timeouts are rejected by the OS layers underneath; the
/// frame reader clamps its remaining-deadline slices to this floor.
pub const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// Clamp a requested timeout to the supported floor.
pub fn clamp_timeout(timeout: Duration) -> Duration {
    timeout.max(MIN_READ_TIMEOUT)
}
