//! Built-in action codes and well-known addresses.
//!
//! Action codes 0-31 are reserved for protocol-internal use.
//! Codes 32-254 are available for application handlers.
//! Code 255 is unused by convention.

/// Plain text receipt.
pub const BASIC_TEXT: u8 = 1;

/// Bundle header: the body carries the decimal fragment count.
pub const BUNDLE_HEADER: u8 = 2;

/// Apply a new read-timeout multiplier (body is a float or `None`).
pub const TIMEOUT_MULTIPLIER: u8 = 3;

/// Terminate the process.
pub const EXIT: u8 = 5;

/// First action code available for user binding.
pub const USER_CODE_START: u8 = 32;

/// Highest dispatchable action code.
pub const MAX_CODE: u8 = 254;

/// Target address accepted by every endpoint.
pub const BROADCAST_ADDRESS: u8 = 0;

/// Device address a connection starts with.
pub const DEFAULT_DEVICE_ADDRESS: u8 = 255;

/// Returns a human-readable name for an action code.
pub fn code_name(code: u8) -> &'static str {
    match code {
        BASIC_TEXT => "BASIC_TEXT",
        BUNDLE_HEADER => "BUNDLE_HEADER",
        TIMEOUT_MULTIPLIER => "TIMEOUT_MULTIPLIER",
        EXIT => "EXIT",
        0..=31 => "RESERVED",
        255 => "UNUSED",
        _ => "USER",
    }
}

/// Returns true if the action code is in the reserved range.
pub fn is_reserved(code: u8) -> bool {
    code < USER_CODE_START
}

/// Returns true if the action code is available for user binding.
pub fn is_user(code: u8) -> bool {
    (USER_CODE_START..=MAX_CODE).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_window_covers_builtins() {
        assert!(is_reserved(BASIC_TEXT));
        assert!(is_reserved(BUNDLE_HEADER));
        assert!(is_reserved(TIMEOUT_MULTIPLIER));
        assert!(is_reserved(EXIT));
        assert!(is_reserved(31));
        assert!(!is_reserved(32));
    }

    #[test]
    fn user_window_is_32_through_254() {
        assert!(!is_user(31));
        assert!(is_user(32));
        assert!(is_user(254));
        assert!(!is_user(255));
    }

    #[test]
    fn names() {
        assert_eq!(code_name(1), "BASIC_TEXT");
        assert_eq!(code_name(2), "BUNDLE_HEADER");
        assert_eq!(code_name(7), "RESERVED");
        assert_eq!(code_name(40), "USER");
        assert_eq!(code_name(255), "UNUSED");
    }
}
