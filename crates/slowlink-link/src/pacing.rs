use std::io::Write;
use std::time::Duration;

use tracing::trace;

/// Paces raw byte writes to a configured bit rate.
///
/// The input is split into chunks; after each chunk is written and
/// flushed, the writer sleeps for the chunk's transmission time so a slow
/// receiver is never overrun. Purely a pacing policy: no retry, and the
/// underlying write is assumed blocking and reliable.
pub struct PacedWriter<W> {
    inner: W,
    bits_per_second: u32,
    chunk_size: usize,
}

impl<W: Write> PacedWriter<W> {
    pub fn new(inner: W, bits_per_second: u32, chunk_size: usize) -> Self {
        Self {
            inner,
            bits_per_second,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Write all of `data` in paced chunks; returns the byte count.
    ///
    /// The pacing pause also follows the final chunk: the call returns
    /// only after the data's full transmission time has elapsed, which
    /// keeps back-to-back sends paced across frame boundaries.
    pub fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        for chunk in data.chunks(self.chunk_size) {
            self.inner.write_all(chunk)?;
            self.inner.flush()?;
            let pause = self.transmission_time(chunk.len());
            trace!(bytes = chunk.len(), ?pause, "chunk written, pacing");
            std::thread::sleep(pause);
        }
        Ok(data.len())
    }

    /// How long `len` bytes take on the wire at the configured rate.
    fn transmission_time(&self, len: usize) -> Duration {
        Duration::from_secs_f64(len as f64 * 8.0 / f64::from(self.bits_per_second.max(1)))
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner channel.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
