use ringframe_buffer::Span;

/// How the scanner searches for the sync prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixScan {
    /// Single pass. On a mismatch the offending byte is retried as the first
    /// prefix byte, but earlier partial matches are not revisited, so a
    /// prefix with a repeated sub-pattern (`AAB` in `AAAB`) can be missed.
    #[default]
    Restart,
    /// Try every start offset. Never misses a match.
    Exhaustive,
}

/// Offset of the first `prefix` match in `data`.
///
/// `None` means no complete match is confirmed within the available bytes.
pub(crate) fn find_prefix(data: Span<'_>, prefix: &[u8], strategy: PrefixScan) -> Option<usize> {
    match strategy {
        PrefixScan::Restart => restart_scan(data, prefix),
        PrefixScan::Exhaustive => find_exact(data, 0, prefix),
    }
}

fn restart_scan(data: Span<'_>, pattern: &[u8]) -> Option<usize> {
    let mut matched = 0usize;
    for (index, byte) in data.iter().enumerate() {
        if byte == pattern[matched] {
            matched += 1;
        } else if byte == pattern[0] {
            matched = 1;
        } else {
            matched = 0;
        }

        if matched == pattern.len() {
            return Some(index + 1 - pattern.len());
        }
    }
    None
}

/// Offset of the first exact occurrence of `pattern` at or after `from`.
pub(crate) fn find_exact(data: Span<'_>, from: usize, pattern: &[u8]) -> Option<usize> {
    let last = data.len().checked_sub(pattern.len())?;
    (from..=last).find(|&start| data.matches_at(start, pattern) == Some(true))
}
