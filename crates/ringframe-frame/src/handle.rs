use bytes::Bytes;

/// Location of an accepted frame's content inside the parser's window.
///
/// A handle borrows nothing, but it is only good until the window's read
/// cursor moves again. It is consumed by
/// [`FrameParser::extract_content`](crate::FrameParser::extract_content) and
/// cannot be cloned.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameHandle {
    pub(crate) frame_position: u64,
    pub(crate) frame_len: usize,
    pub(crate) content_position: u64,
    pub(crate) content_len: usize,
    pub(crate) wrapped: bool,
    pub(crate) command: Option<u32>,
    pub(crate) committed_at: u64,
}

impl FrameHandle {
    /// Logical stream position of the first content byte.
    pub fn position(&self) -> u64 {
        self.content_position
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.content_len
    }

    pub fn is_empty(&self) -> bool {
        self.content_len == 0
    }

    /// True when the content straddles the window's wrap point.
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Logical stream position of the first prefix byte.
    pub fn frame_position(&self) -> u64 {
        self.frame_position
    }

    /// Wire length of the whole frame.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Raw command field, if the schema has one.
    pub fn command(&self) -> Option<u32> {
        self.command
    }
}

/// An accepted frame with its content copied out of the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw command field, if the schema has one.
    pub command: Option<u32>,
    pub content: Bytes,
    /// Logical stream position of the frame's prefix.
    pub position: u64,
}

impl Frame {
    pub fn new(command: Option<u32>, content: impl Into<Bytes>) -> Self {
        Self {
            command,
            content: content.into(),
            position: 0,
        }
    }
}
