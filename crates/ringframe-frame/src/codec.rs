use bytes::{BufMut, BytesMut};
use ringframe_buffer::Span;

use crate::error::{FrameError, Result};
use crate::resolve::Layout;
use crate::scan::find_exact;
use crate::schema::{FrameSchema, LengthMode};
use crate::validate::compute_checksum;

/// Encode one frame of `schema` into `dst`.
///
/// `command` is written only if the schema has a command field. The checksum
/// field is computed over the schema's coverage, or zero-filled when the
/// schema has no algorithm. On error nothing is appended to `dst`.
pub fn encode_frame(
    schema: &FrameSchema,
    command: u32,
    content: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let length = match schema.mode() {
        LengthMode::Fixed { content_len } => {
            if content.len() != content_len {
                return Err(FrameError::ContentLengthMismatch {
                    expected: content_len,
                    actual: content.len(),
                });
            }
            None
        }
        LengthMode::Dynamic { width, range } => {
            let value = content.len().saturating_add(schema.segment_size(range));
            Some((width, checked_field("length", value, width.max_value(), width.bytes())?))
        }
        LengthMode::Free => None,
    };
    if let Some(width) = schema.command() {
        checked_field("command", command as usize, width.max_value(), width.bytes())?;
    }

    let layout = Layout::with_content(schema, content.len());
    let start = dst.len();
    dst.reserve(layout.total);
    dst.put_slice(schema.prefix());
    if let Some(width) = schema.command() {
        width.put(command, dst);
    }
    if let Some((width, value)) = length {
        width.put(value, dst);
    }
    dst.put_slice(content);
    dst.put_bytes(0, schema.checksum_len());
    dst.put_slice(schema.suffix());

    if let Some(spec) = schema.checksum() {
        let frame = Span::contiguous(&dst[start..]);
        if let Some(value) = compute_checksum(schema, spec, frame, &layout) {
            let offset = start + layout.checksum_offset();
            let mut slot = &mut dst[offset..offset + spec.width().bytes()];
            spec.width().put(value, &mut slot);
        }
    }

    // A free-length frame ends at the first suffix match, which must be ours.
    if schema.mode() == LengthMode::Free {
        let suffix_at = layout.total - schema.suffix().len();
        let frame = Span::contiguous(&dst[start..]);
        if find_exact(frame, layout.content_offset, schema.suffix()) != Some(suffix_at) {
            dst.truncate(start);
            return Err(FrameError::SuffixInContent);
        }
    }

    Ok(())
}

fn checked_field(field: &'static str, value: usize, max: u32, width: usize) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|value| *value <= max)
        .ok_or(FrameError::FieldOverflow {
            field,
            value,
            width,
        })
}
