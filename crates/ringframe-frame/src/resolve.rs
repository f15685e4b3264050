//! Frame length resolution.
//!
//! Given a candidate that starts at a matched prefix, work out where the
//! frame ends and where its content lies. Offsets are relative to the first
//! prefix byte.

use ringframe_buffer::Span;

use crate::error::Rejection;
use crate::scan::find_exact;
use crate::schema::{FrameSchema, LengthMode};
use crate::segment::{width_of, Segments};

/// Byte layout of one candidate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) total: usize,
    pub(crate) content_offset: usize,
    pub(crate) content_len: usize,
}

impl Layout {
    /// Layout of a frame whose header and trailer sizes follow the schema.
    pub(crate) fn with_content(schema: &FrameSchema, content_len: usize) -> Self {
        Self {
            total: schema.frame_len(content_len),
            content_offset: schema.header_len(),
            content_len,
        }
    }

    pub(crate) fn checksum_offset(&self) -> usize {
        self.content_offset + self.content_len
    }

    /// Offset and size of one segment within the frame.
    pub(crate) fn segment(&self, schema: &FrameSchema, segment: Segments) -> (usize, usize) {
        let prefix_len = schema.prefix().len();
        let command_len = width_of(schema.command());
        if segment == Segments::PREFIX {
            (0, prefix_len)
        } else if segment == Segments::COMMAND {
            (prefix_len, command_len)
        } else if segment == Segments::LENGTH {
            (prefix_len + command_len, schema.length_len())
        } else if segment == Segments::CONTENT {
            (self.content_offset, self.content_len)
        } else if segment == Segments::CHECKSUM {
            (self.checksum_offset(), schema.checksum_len())
        } else {
            (self.checksum_offset() + schema.checksum_len(), schema.suffix().len())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The frame extent is known. The bytes may not all be available yet.
    Resolved(Layout),
    /// More bytes are needed to decide the extent.
    Incomplete,
    /// The extent can never be valid; `skip` bytes of the candidate are dropped.
    Invalid { rejection: Rejection, skip: usize },
}

/// Resolve the extent of the frame starting at the beginning of `candidate`.
pub(crate) fn resolve(schema: &FrameSchema, candidate: Span<'_>) -> Resolution {
    match schema.mode() {
        LengthMode::Fixed { content_len } => {
            Resolution::Resolved(Layout::with_content(schema, content_len))
        }
        LengthMode::Dynamic { width, range } => {
            let offset = schema.prefix().len() + width_of(schema.command());
            let Some(encoded) = width.read(candidate, offset) else {
                return Resolution::Incomplete;
            };
            let covered = schema.segment_size(range);
            match (encoded as usize).checked_sub(covered) {
                Some(content_len) => Resolution::Resolved(Layout::with_content(schema, content_len)),
                None => Resolution::Invalid {
                    rejection: Rejection::LengthUnderflow { encoded, covered },
                    skip: schema.prefix().len(),
                },
            }
        }
        LengthMode::Free => resolve_free(schema, candidate),
    }
}

fn resolve_free(schema: &FrameSchema, candidate: Span<'_>) -> Resolution {
    let content_offset = schema.header_len();
    let suffix = schema.suffix();
    let Some(suffix_at) = find_exact(candidate, content_offset, suffix) else {
        return Resolution::Incomplete;
    };

    let body = suffix_at - content_offset;
    let total = suffix_at + suffix.len();
    match body.checked_sub(schema.checksum_len()) {
        Some(content_len) => Resolution::Resolved(Layout {
            total,
            content_offset,
            content_len,
        }),
        None => Resolution::Invalid {
            rejection: Rejection::TruncatedChecksum { span: body },
            skip: total,
        },
    }
}
