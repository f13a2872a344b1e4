use std::io::{Read, Write};
use std::time::Duration;

use tracing::info;

use crate::channel::{clamp_timeout, Channel};
use crate::error::{Result, TransportError};

/// Poll interval used when the caller asks for an indefinite read.
///
/// Serial ports always carry some timeout; the frame reader treats a timed
/// out header read as "no frame yet" and polls again, so a long slice here
/// only bounds how often that retry happens.
const INDEFINITE_POLL: Duration = Duration::from_secs(60);

/// A real serial port, opened at a fixed baud rate.
pub struct SerialChannel {
    inner: Box<dyn serialport::SerialPort>,
}

/// Open a serial port at the given baud rate.
///
/// The returned channel starts with the indefinite-read poll interval;
/// callers adjust it per read via [`Channel::set_read_timeout`].
pub fn open(port: &str, baud: u32) -> Result<SerialChannel> {
    let inner = serialport::new(port, baud)
        .timeout(INDEFINITE_POLL)
        .open()
        .map_err(|source| TransportError::Open {
            port: port.to_string(),
            baud,
            source,
        })?;

    info!(port, baud, "serial channel open");
    Ok(SerialChannel { inner })
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl Channel for SerialChannel {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let timeout = match timeout {
            Some(t) => clamp_timeout(t),
            None => INDEFINITE_POLL,
        };
        self.inner
            .set_timeout(timeout)
            .map_err(|err| TransportError::Io(err.into()))
    }

    fn try_clone(&self) -> Result<Box<dyn Channel>> {
        let inner = self
            .inner
            .try_clone()
            .map_err(|err| TransportError::Clone(err.into()))?;
        Ok(Box::new(SerialChannel { inner }))
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port", &self.inner.name())
            .field("baud", &self.inner.baud_rate().ok())
            .finish()
    }
}
