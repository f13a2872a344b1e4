use std::io::ErrorKind;
use std::time::{Duration, Instant};

use slowlink_frame::{
    Bundle, Frame, FrameError, Header, Message, BUNDLE_HEADER, HEADER_SIZE, MAX_FRAGMENTS,
};
use slowlink_transport::Channel;
use tracing::trace;

use crate::error::{LinkError, Result};

/// The timeout-driven frame-reading state machine.
///
/// There is no end-of-frame marker on the wire: the header declares the
/// body length, and the absence of timely bytes is what signals a
/// truncated frame. Per frame the reader
/// 1. blocks indefinitely for the 4 header bytes,
/// 2. reads up to the declared body length within a deadline derived from
///    the bit rate and the current timeout multiplier,
/// 3. classifies short arrivals as broken messages, and
/// 4. expands bundle headers by reading the declared number of
///    continuation frames.
pub struct FrameReader {
    channel: Box<dyn Channel>,
    bits_per_second: u32,
}

impl FrameReader {
    pub fn new(channel: Box<dyn Channel>, bits_per_second: u32) -> Self {
        Self {
            channel,
            bits_per_second,
        }
    }

    /// Read the next complete inbound frame, reassembling bundles.
    ///
    /// The multiplier is reloaded by the caller per frame so runtime
    /// adjustments (action code 3) take effect on the very next read.
    pub fn read_frame(&mut self, multiplier: Option<f64>) -> Result<Frame> {
        let frame = self.read_single(multiplier)?;
        if frame.header().action() != BUNDLE_HEADER {
            return Ok(frame);
        }

        let Frame::Message(header_message) = frame else {
            // The bundle header itself arrived truncated; its declared
            // fragment count cannot be trusted, so hand it through as-is.
            return Ok(frame);
        };

        let count = parse_fragment_count(header_message.body())?;
        trace!(count, "reading bundle fragments");
        let mut fragments = Vec::with_capacity(count);
        for _ in 0..count {
            fragments.push(self.read_single(multiplier)?);
        }
        Ok(Frame::Bundle(Bundle::from_parts(header_message, fragments)))
    }

    fn read_single(&mut self, multiplier: Option<f64>) -> Result<Frame> {
        let header = self.read_header()?;
        let timeout = body_timeout(header.body_len(), self.bits_per_second, multiplier);
        let body = self.read_body(header.body_len(), timeout)?;
        Ok(Message::from_header_and_body(header, &body))
    }

    /// Blocking read of exactly one header; waits indefinitely for the
    /// next frame to begin.
    fn read_header(&mut self) -> Result<Header> {
        self.channel.set_read_timeout(None)?;

        let mut buf = [0u8; HEADER_SIZE];
        let mut filled = 0;
        while filled < HEADER_SIZE {
            match self.channel.read(&mut buf[filled..]) {
                Ok(0) => return Err(LinkError::ChannelClosed),
                Ok(n) => filled += n,
                // Serial channels poll in slices even for indefinite reads.
                Err(err) if is_timeout(&err) || err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Header::decode(buf))
    }

    /// Read up to `declared` body bytes within the deadline. A short
    /// result is not an error here; classification happens above.
    fn read_body(&mut self, declared: usize, timeout: Option<Duration>) -> Result<Vec<u8>> {
        let mut body = vec![0u8; declared];
        if declared == 0 {
            return Ok(body);
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        if deadline.is_none() {
            self.channel.set_read_timeout(None)?;
        }

        let mut filled = 0;
        while filled < declared {
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                self.channel.set_read_timeout(Some(deadline - now))?;
            }
            match self.channel.read(&mut body[filled..]) {
                Ok(0) => return Err(LinkError::ChannelClosed),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => break,
                Err(err) => return Err(err.into()),
            }
        }

        body.truncate(filled);
        Ok(body)
    }
}

/// Deadline for a declared body length: transmission time at the link
/// rate, scaled by the multiplier. `None` multiplier means no deadline.
fn body_timeout(declared: usize, bits_per_second: u32, multiplier: Option<f64>) -> Option<Duration> {
    multiplier.map(|m| {
        Duration::from_secs_f64(declared as f64 * 8.0 / f64::from(bits_per_second.max(1)) * m)
    })
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

fn parse_fragment_count(body: &str) -> Result<usize> {
    match body.trim().parse::<usize>() {
        Ok(count) if (1..=MAX_FRAGMENTS).contains(&count) => Ok(count),
        _ => Err(LinkError::Frame(FrameError::BadFragmentCount(
            body.to_string(),
        ))),
    }
}
