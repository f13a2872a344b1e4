/// Errors that can occur while building or interpreting frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the per-message or per-bundle character limit.
    #[error("payload too large ({size} characters, max {max})")]
    Oversized { size: usize, max: usize },

    /// A bundle header body did not parse as a fragment count in 1-255.
    #[error("bundle header declares an invalid fragment count: {0:?}")]
    BadFragmentCount(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
