/// Errors that can occur during record encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The declared payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A media record tried to use the configuration sentinel as its timestamp.
    #[error("timestamp 0xFFFFFFFFFFFFFFFF is reserved for configuration records")]
    ReservedTimestamp,

    /// An I/O error occurred while writing records.
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
