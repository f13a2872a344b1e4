use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::codes::BUNDLE_HEADER;
use crate::error::{FrameError, Result};
use crate::message::{Frame, Message, MAX_BODY_CHARS};
use crate::text;

/// Maximum number of fragments a bundle may carry.
pub const MAX_FRAGMENTS: usize = 255;

/// Maximum payload of a bundle, in characters (255 fragments x 255 chars).
pub const MAX_BUNDLE_CHARS: usize = MAX_FRAGMENTS * MAX_BODY_CHARS;

/// A multi-frame envelope for payloads too long for one message.
///
/// On the wire: one header message (action = bundle-header code, body =
/// decimal fragment count) followed by the fragment messages, all sharing
/// the payload's sender, target and action code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    header: Message,
    fragments: Vec<Frame>,
}

impl Bundle {
    /// Split a payload into fragments and build the bundle around it.
    ///
    /// Chunks are at most 255 characters, breaking after a space where one
    /// falls inside the window. Fails with [`FrameError::Oversized`] when
    /// the payload cannot fit in 255 fragments.
    pub fn build(sender: u8, target: u8, action: u8, body: &str) -> Result<Self> {
        let encoded = text::encode(body);
        if encoded.len() > MAX_BUNDLE_CHARS {
            return Err(FrameError::Oversized {
                size: encoded.len(),
                max: MAX_BUNDLE_CHARS,
            });
        }

        let normalized = text::decode(&encoded);
        let chunks = chunk_body(&normalized);
        debug!(fragments = chunks.len(), chars = encoded.len(), "bundle built");

        let header = Message::new(sender, target, BUNDLE_HEADER, &chunks.len().to_string())?;
        let fragments = chunks
            .iter()
            .map(|chunk| Message::new(sender, target, action, chunk).map(Frame::Message))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { header, fragments })
    }

    /// Reassemble a bundle from a received header message and its
    /// continuation frames, in arrival order. Truncated fragments are kept
    /// as-is; [`Bundle::is_broken`] reports their presence.
    pub fn from_parts(header: Message, fragments: Vec<Frame>) -> Self {
        Self { header, fragments }
    }

    /// The header message (action code = bundle-header, body = count).
    pub fn header_message(&self) -> &Message {
        &self.header
    }

    /// The fragment frames in order.
    pub fn fragments(&self) -> &[Frame] {
        &self.fragments
    }

    /// Number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// The payload's action code, carried by the fragments.
    pub fn action(&self) -> u8 {
        self.fragments
            .first()
            .map(Frame::action)
            .unwrap_or_else(|| self.header.header().action())
    }

    /// True when any fragment arrived truncated.
    pub fn is_broken(&self) -> bool {
        self.fragments.iter().any(Frame::is_broken)
    }

    /// The full payload: fragment bodies concatenated in order.
    pub fn body(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            out.push_str(&fragment.body());
        }
        out
    }

    /// Total wire size (header frame + all fragment frames).
    pub fn wire_size(&self) -> usize {
        self.header.wire_size()
            + self
                .fragments
                .iter()
                .map(|f| f.encode().len())
                .sum::<usize>()
    }

    /// Encode into the wire form: header frame first, then each fragment.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.header.put(&mut buf);
        for fragment in &self.fragments {
            buf.extend_from_slice(&fragment.encode());
        }
        buf.freeze()
    }
}

/// Split a normalized body into at most 255-character chunks, preferring
/// word boundaries. Falls back to exact slicing when boundary-respecting
/// chunks would need more fragments than the bundle allows.
fn chunk_body(body: &str) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let soft = soft_chunks(&chars, MAX_BODY_CHARS);
    if soft.len() <= MAX_FRAGMENTS {
        return soft;
    }
    hard_chunks(&chars, MAX_BODY_CHARS)
}

fn soft_chunks(chars: &[char], max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        if chars.len() - start <= max {
            out.push(chars[start..].iter().collect());
            break;
        }
        let window = &chars[start..start + max];
        // Break after the last space in the window; the space stays with
        // the leading chunk so concatenation reproduces the payload.
        let end = match window.iter().rposition(|&c| c == ' ') {
            Some(pos) if pos > 0 => start + pos + 1,
            _ => start + max,
        };
        out.push(chars[start..end].iter().collect());
        start = end;
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn hard_chunks(chars: &[char], max: usize) -> Vec<String> {
    chars
        .chunks(max)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
