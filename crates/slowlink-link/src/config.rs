use slowlink_frame::DEFAULT_DEVICE_ADDRESS;

/// Nominal rate of the default link, in bits per second.
pub const DEFAULT_BITS_PER_SECOND: u32 = 300;

/// Default write chunk size, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Default body read timeout multiplier on the declared transmission time.
pub const DEFAULT_TIMEOUT_MULTIPLIER: f64 = 1.5;

/// Configuration for one connection.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Channel bit rate; drives both write pacing and body read timeouts.
    pub bits_per_second: u32,
    /// Largest burst handed to the channel between pacing pauses.
    pub chunk_size: usize,
    /// Initial timeout multiplier. `None` waits indefinitely for declared
    /// body bytes. Adjustable at runtime (action code 3).
    pub timeout_multiplier: Option<f64>,
    /// Initial device address. Adjustable at runtime.
    pub address: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            bits_per_second: DEFAULT_BITS_PER_SECOND,
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout_multiplier: Some(DEFAULT_TIMEOUT_MULTIPLIER),
            address: DEFAULT_DEVICE_ADDRESS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_link_parameters() {
        let config = LinkConfig::default();
        assert_eq!(config.bits_per_second, 300);
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.timeout_multiplier, Some(1.5));
        assert_eq!(config.address, 255);
    }
}
