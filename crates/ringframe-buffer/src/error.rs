/// Errors that can occur in byte window operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// A ring buffer cannot be created without storage.
    #[error("ring buffer capacity must be non-zero")]
    ZeroCapacity,

    /// Fewer unread bytes are available than a look-ahead requested.
    #[error("incomplete look-ahead ({requested} bytes requested, {available} available)")]
    Incomplete { requested: usize, available: usize },

    /// Tried to consume more bytes than are unread.
    #[error("cannot advance {requested} bytes ({available} unread)")]
    AdvancePastEnd { requested: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, BufferError>;
