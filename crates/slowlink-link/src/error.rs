/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Channel transport error.
    #[error("transport error: {0}")]
    Transport(#[from] slowlink_transport::TransportError),

    /// Frame codec error.
    #[error("frame error: {0}")]
    Frame(#[from] slowlink_frame::FrameError),

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel closed before a complete frame was received.
    #[error("channel closed (incomplete frame)")]
    ChannelClosed,

    /// The action code is outside the dispatch table (only 0-254 exist).
    #[error("action code {0} is outside the dispatch table")]
    CodeOutOfRange(u8),

    /// The action code is reserved for protocol-internal handlers.
    #[error("action code {0} is reserved for protocol use")]
    ReservedCode(u8),

    /// The slot already holds an active binding.
    #[error("action code {0} is already bound")]
    SlotAlreadyUsed(u8),

    /// The slot holds no binding to remove.
    #[error("action code {0} is not bound")]
    EmptySlot(u8),

    /// A dispatched handler reported a failure.
    #[error("handler failed: {0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;
