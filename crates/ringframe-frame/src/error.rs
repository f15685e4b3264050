use ringframe_buffer::BufferError;

use crate::segment::Segments;

/// Errors in a frame schema. These are configuration mistakes, reported when
/// the schema is built, never while parsing a stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The sync prefix has no bytes.
    #[error("frame prefix must contain at least one byte")]
    EmptyPrefix,

    /// No length mode was chosen.
    #[error("frame schema has no length mode")]
    MissingLengthMode,

    /// Free-length frames are terminated by the suffix, so they need one.
    #[error("free-length frames need a non-empty suffix")]
    FreeModeWithoutSuffix,

    /// Checksum coverage or algorithm was set without a checksum field.
    #[error("checksum settings given without a checksum width")]
    ChecksumWithoutWidth,

    #[error("checksum coverage is empty")]
    EmptyChecksumCoverage,

    /// Coverage named the checksum or suffix segments.
    #[error("checksum may only cover prefix, command, length and content (got {0:?})")]
    InvalidChecksumCoverage(Segments),

    /// A field width other than 1, 2 or 4 bytes.
    #[error("invalid field width {0} (expected 1, 2 or 4)")]
    InvalidFieldWidth(usize),
}

/// Why a fully identified candidate frame was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("checksum mismatch (frame carries {expected:#x}, computed {computed:#x})")]
    ChecksumMismatch { expected: u32, computed: u32 },

    #[error("suffix mismatch")]
    SuffixMismatch,

    /// The length field is smaller than the fixed segments it claims to count.
    #[error("length field {encoded} is smaller than the {covered} bytes it counts")]
    LengthUnderflow { encoded: u32, covered: usize },

    /// The frame can never fit in the window.
    #[error("frame needs {required} bytes but the window holds {capacity}")]
    TooLarge { required: usize, capacity: usize },

    /// The candidate fills the whole window without completing.
    #[error("frame fills the {capacity}-byte window without completing")]
    WindowFull { capacity: usize },

    /// A free-length frame too short to hold its checksum field.
    #[error("free-length frame body of {span} bytes cannot hold its checksum")]
    TruncatedChecksum { span: usize },
}

/// Errors that can occur while extracting, encoding or transporting frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A candidate frame failed validation. Its bytes were consumed, so the
    /// next call continues with the data after it.
    #[error("malformed frame ({rejection}), discarded {discarded} bytes")]
    Malformed {
        rejection: Rejection,
        discarded: usize,
    },

    /// The handle outlived the window state it was issued for.
    #[error("frame handle is stale")]
    StaleHandle,

    /// The extraction destination cannot hold the content.
    #[error("destination too small ({len} bytes, need {needed})")]
    DestinationTooSmall { needed: usize, len: usize },

    /// Content handed to the encoder does not match a fixed-length schema.
    #[error("content length {actual} does not match fixed length {expected}")]
    ContentLengthMismatch { expected: usize, actual: usize },

    /// A value does not fit its header field.
    #[error("{field} value {value} does not fit a {width}-byte field")]
    FieldOverflow {
        field: &'static str,
        value: usize,
        width: usize,
    },

    /// Free-length content would be cut short by its own bytes.
    #[error("content contains the frame suffix")]
    SuffixInContent,

    /// The window is too small for any frame of the schema.
    #[error("window of {capacity} bytes is too small (need at least {required})")]
    WindowTooSmall { capacity: usize, required: usize },

    #[error("byte window error: {0}")]
    Buffer(#[from] BufferError),

    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source ended; `unread` bytes never formed a frame.
    #[error("end of stream ({unread} unread bytes)")]
    EndOfStream { unread: usize },
}

impl FrameError {
    /// True when the caller should simply ask for the next frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::Malformed { .. })
    }

    /// The rejection reason, for malformed frames.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            FrameError::Malformed { rejection, .. } => Some(*rejection),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
