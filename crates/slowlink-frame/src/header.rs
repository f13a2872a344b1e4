use bytes::{BufMut, BytesMut};

/// Frame header: length (1) + sender (1) + target (1) + action (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// The fixed 4-byte frame header.
///
/// All fields are single bytes, so every header value is representable on
/// the wire by construction. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    length: u8,
    sender: u8,
    target: u8,
    action: u8,
}

impl Header {
    /// Create a new header.
    pub fn new(length: u8, sender: u8, target: u8, action: u8) -> Self {
        Self {
            length,
            sender,
            target,
            action,
        }
    }

    /// Declared body length in bytes.
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Declared body length as a buffer size.
    pub fn body_len(&self) -> usize {
        usize::from(self.length)
    }

    /// Sender address.
    pub fn sender(&self) -> u8 {
        self.sender
    }

    /// Destination address (0 = broadcast).
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Action code.
    pub fn action(&self) -> u8 {
        self.action
    }

    /// Encode into the 4-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        [self.length, self.sender, self.target, self.action]
    }

    /// Decode from the 4-byte wire form.
    pub fn decode(bytes: [u8; HEADER_SIZE]) -> Self {
        Self {
            length: bytes[0],
            sender: bytes[1],
            target: bytes[2],
            action: bytes[3],
        }
    }

    /// Append the wire form to an encode buffer.
    pub fn put(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.encode());
    }
}
