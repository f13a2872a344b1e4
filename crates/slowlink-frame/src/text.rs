//! Single-byte text codec.
//!
//! Bodies travel as Latin-1: one byte per character, with unencodable
//! characters replaced rather than rejected. Every decoded character
//! re-encodes to the same byte, so decode/encode round-trips.

/// Byte substituted for characters outside the single-byte range.
pub const REPLACEMENT: u8 = b'?';

/// Byte used to pad a truncated body up to its declared length.
pub const FILLER: u8 = 0x00;

/// Encode text to single-byte form, one byte per character.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let cp = u32::from(c);
            if cp <= 0xFF {
                cp as u8
            } else {
                REPLACEMENT
            }
        })
        .collect()
}

/// Decode single-byte text. Total, never fails.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_roundtrip() {
        let text = "hello, link!";
        assert_eq!(decode(&encode(text)), text);
    }

    #[test]
    fn latin1_range_roundtrip() {
        let text = "caf\u{e9} \u{ff}";
        let bytes = encode(text);
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xE9, b' ', 0xFF]);
        assert_eq!(decode(&bytes), text);
    }

    #[test]
    fn unencodable_characters_are_replaced() {
        assert_eq!(encode("a\u{1F600}b"), vec![b'a', REPLACEMENT, b'b']);
    }

    #[test]
    fn one_byte_per_character() {
        let text = "\u{e9}\u{e9}\u{1F600}";
        assert_eq!(encode(text).len(), text.chars().count());
    }
}
