use std::borrow::Cow;

use bytes::{Bytes, BytesMut};

use crate::bundle::Bundle;
use crate::error::{FrameError, Result};
use crate::header::{Header, HEADER_SIZE};
use crate::text;

/// Maximum body length of a single message, in characters.
pub const MAX_BODY_CHARS: usize = 255;

/// A well-formed frame: header plus a body of at most 255 characters.
///
/// Invariant: the stored body always has exactly `header.length()`
/// characters, each encodable as a single byte. Characters outside the
/// single-byte range are replaced at construction, so the in-memory body
/// matches what the wire will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: Header,
    body: String,
}

impl Message {
    /// Build a message from addresses, action code and body text.
    ///
    /// Fails with [`FrameError::Oversized`] when the body exceeds 255
    /// characters.
    pub fn new(sender: u8, target: u8, action: u8, body: &str) -> Result<Self> {
        let bytes = text::encode(body);
        if bytes.len() > MAX_BODY_CHARS {
            return Err(FrameError::Oversized {
                size: bytes.len(),
                max: MAX_BODY_CHARS,
            });
        }
        let header = Header::new(bytes.len() as u8, sender, target, action);
        Ok(Self {
            header,
            body: text::decode(&bytes),
        })
    }

    /// The frame header.
    pub fn header(&self) -> Header {
        self.header
    }

    /// The body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Total wire size of this message (header + body).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.header.body_len()
    }

    /// Encode into the wire form: header bytes then encoded body.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.put(&mut buf);
        buf.freeze()
    }

    /// Append the wire form to an encode buffer.
    pub fn put(&self, dst: &mut BytesMut) {
        self.header.put(dst);
        dst.extend_from_slice(&text::encode(&self.body));
    }

    /// Classify a received body against its header.
    ///
    /// This is the single switch point where truncation is recognized:
    /// fewer body bytes than the header declared produce a
    /// [`BrokenMessage`], anything else a well-formed [`Message`]. Bytes
    /// beyond the declared length are ignored.
    pub fn from_header_and_body(header: Header, body: &[u8]) -> Frame {
        let declared = header.body_len();
        if body.len() < declared {
            Frame::Broken(BrokenMessage::new(header, body))
        } else {
            Frame::Message(Self {
                header,
                body: text::decode(&body[..declared]),
            })
        }
    }
}

/// A frame whose body arrived shorter than its header declared.
///
/// The reported body is the received text right-padded with the filler
/// character up to the declared length, so its length always matches the
/// header; [`BrokenMessage::received_len`] keeps the true count. This
/// models a truncated-frame condition, not a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenMessage {
    header: Header,
    body: String,
    received: usize,
}

impl BrokenMessage {
    fn new(header: Header, received: &[u8]) -> Self {
        let mut padded = received.to_vec();
        padded.resize(header.body_len(), text::FILLER);
        Self {
            header,
            body: text::decode(&padded),
            received: received.len(),
        }
    }

    /// The frame header (with the declared, not received, length).
    pub fn header(&self) -> Header {
        self.header
    }

    /// The padded body, `header.length()` characters long.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// How many body bytes actually arrived.
    pub fn received_len(&self) -> usize {
        self.received
    }

    /// Encode the padded form. Only relevant inbound; a broken message is
    /// never re-sent, so this exists for symmetry and diagnostics.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.header.body_len());
        self.header.put(&mut buf);
        buf.extend_from_slice(&text::encode(&self.body));
        buf.freeze()
    }
}

/// One dispatched unit: a single message, a truncated message, or a
/// reassembled bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Message(Message),
    Broken(BrokenMessage),
    Bundle(Bundle),
}

impl Frame {
    /// The governing header. For a bundle this is the header frame's
    /// header (its action code is the bundle-header code).
    pub fn header(&self) -> Header {
        match self {
            Frame::Message(m) => m.header(),
            Frame::Broken(b) => b.header(),
            Frame::Bundle(b) => b.header_message().header(),
        }
    }

    /// Sender address.
    pub fn sender(&self) -> u8 {
        self.header().sender()
    }

    /// Destination address.
    pub fn target(&self) -> u8 {
        self.header().target()
    }

    /// The action code routing decisions are made on. For a bundle this is
    /// the payload's code carried by its fragments.
    pub fn action(&self) -> u8 {
        match self {
            Frame::Message(m) => m.header().action(),
            Frame::Broken(b) => b.header().action(),
            Frame::Bundle(b) => b.action(),
        }
    }

    /// The payload text. Borrows for single frames, concatenates fragment
    /// bodies for bundles.
    pub fn body(&self) -> Cow<'_, str> {
        match self {
            Frame::Message(m) => Cow::Borrowed(m.body()),
            Frame::Broken(b) => Cow::Borrowed(b.body()),
            Frame::Bundle(b) => Cow::Owned(b.body()),
        }
    }

    /// True when any part of the frame arrived truncated.
    pub fn is_broken(&self) -> bool {
        match self {
            Frame::Message(_) => false,
            Frame::Broken(_) => true,
            Frame::Bundle(b) => b.is_broken(),
        }
    }

    /// Encode into the wire form.
    pub fn encode(&self) -> Bytes {
        match self {
            Frame::Message(m) => m.encode(),
            Frame::Broken(b) => b.encode(),
            Frame::Bundle(b) => b.encode(),
        }
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        Frame::Message(message)
    }
}

impl From<BrokenMessage> for Frame {
    fn from(broken: BrokenMessage) -> Self {
        Frame::Broken(broken)
    }
}

impl From<Bundle> for Frame {
    fn from(bundle: Bundle) -> Self {
        Frame::Bundle(bundle)
    }
}

/// Build the outbound frame for a payload: a [`Message`] when it fits in
/// one frame, a [`Bundle`] otherwise.
pub fn compose(sender: u8, target: u8, action: u8, body: &str) -> Result<Frame> {
    if text::encode(body).len() <= MAX_BODY_CHARS {
        Ok(Frame::Message(Message::new(sender, target, action, body)?))
    } else {
        Ok(Frame::Bundle(Bundle::build(sender, target, action, body)?))
    }
}
