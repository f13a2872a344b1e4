use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use crate::channel::{clamp_timeout, Channel};
use crate::error::{Result, TransportError};

/// In-memory channel pair backed by a socketpair.
///
/// Gives tests and local demos a channel with real blocking and timeout
/// semantics without serial hardware: bytes written to one end become
/// readable on the other.
pub struct LoopbackChannel {
    inner: UnixStream,
}

/// Create a connected pair of loopback channels.
pub fn pair() -> Result<(LoopbackChannel, LoopbackChannel)> {
    let (left, right) = UnixStream::pair()?;
    Ok((
        LoopbackChannel { inner: left },
        LoopbackChannel { inner: right },
    ))
}

impl Read for LoopbackChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for LoopbackChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl Channel for LoopbackChannel {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.map(clamp_timeout);
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    fn try_clone(&self) -> Result<Box<dyn Channel>> {
        let inner = self.inner.try_clone().map_err(TransportError::Clone)?;
        Ok(Box::new(LoopbackChannel { inner }))
    }
}

impl std::fmt::Debug for LoopbackChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackChannel").finish()
    }
}
