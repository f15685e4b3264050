use ringframe_buffer::Span;

use crate::checksum::ChecksumSpec;
use crate::error::Rejection;
use crate::resolve::Layout;
use crate::schema::{FrameSchema, LengthMode};
use crate::segment::Segments;

/// Wire-ordered segments a checksum may cover.
const COVERABLE: [Segments; 4] = [
    Segments::PREFIX,
    Segments::COMMAND,
    Segments::LENGTH,
    Segments::CONTENT,
];

/// Check the checksum and suffix of a complete candidate.
///
/// `frame` holds exactly `layout.total` bytes starting at the prefix.
pub(crate) fn validate(schema: &FrameSchema, frame: Span<'_>, layout: &Layout) -> Result<(), Rejection> {
    if let Some(spec) = schema.checksum() {
        if let Some(computed) = compute_checksum(schema, spec, frame, layout) {
            let expected = spec
                .width()
                .read(frame, layout.checksum_offset())
                .ok_or(Rejection::TruncatedChecksum {
                    span: frame.len().saturating_sub(layout.checksum_offset()),
                })?;
            if expected != computed {
                return Err(Rejection::ChecksumMismatch { expected, computed });
            }
        }
    }

    // Free-mode frames end at a suffix match by construction.
    if schema.mode() != LengthMode::Free && !schema.suffix().is_empty() {
        let (offset, _) = layout.segment(schema, Segments::SUFFIX);
        if frame.matches_at(offset, schema.suffix()) != Some(true) {
            return Err(Rejection::SuffixMismatch);
        }
    }

    Ok(())
}

/// Run the checksum algorithm over its coverage, or `None` if unverified.
pub(crate) fn compute_checksum(
    schema: &FrameSchema,
    spec: &ChecksumSpec,
    frame: Span<'_>,
    layout: &Layout,
) -> Option<u32> {
    spec.algorithm()?;

    // Each covered segment contributes at most two slices.
    let mut chunks: [&[u8]; 8] = [&[]; 8];
    let mut count = 0;
    for segment in COVERABLE {
        if !spec.coverage().contains(segment) {
            continue;
        }
        let (offset, len) = layout.segment(schema, segment);
        let (head, tail) = frame.slice(offset, len)?.as_slices();
        for piece in [head, tail] {
            if !piece.is_empty() {
                chunks[count] = piece;
                count += 1;
            }
        }
    }

    spec.compute(&chunks[..count])
}
