/// A read-only view of one logical byte range inside a circular buffer.
///
/// The range is stored as at most two contiguous pieces: `head` runs up to the
/// physical end of the storage and `tail` continues from its start. A range
/// that does not straddle the wrap point has an empty `tail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span<'a> {
    head: &'a [u8],
    tail: &'a [u8],
}

impl<'a> Span<'a> {
    /// Create a span from its two physical pieces.
    pub fn new(head: &'a [u8], tail: &'a [u8]) -> Self {
        if head.is_empty() {
            Self { head: tail, tail: &[] }
        } else {
            Self { head, tail }
        }
    }

    /// Create a span over a single contiguous slice.
    pub fn contiguous(bytes: &'a [u8]) -> Self {
        Self {
            head: bytes,
            tail: &[],
        }
    }

    /// Number of bytes in the range.
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    /// True when the range crosses the physical end of the storage.
    pub fn is_wrapped(&self) -> bool {
        !self.tail.is_empty()
    }

    /// The byte at logical index `index`.
    pub fn get(&self, index: usize) -> Option<u8> {
        match self.head.get(index) {
            Some(byte) => Some(*byte),
            None => self.tail.get(index - self.head.len()).copied(),
        }
    }

    /// Iterate over the bytes in logical order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = u8> + 'a {
        self.head.iter().chain(self.tail.iter()).copied()
    }

    /// Sub-range `[offset, offset + len)`, or `None` if it runs past the end.
    pub fn slice(&self, offset: usize, len: usize) -> Option<Span<'a>> {
        let end = offset.checked_add(len)?;
        if end > self.len() {
            return None;
        }

        let split = self.head.len();
        let span = if end <= split {
            Span::contiguous(&self.head[offset..end])
        } else if offset >= split {
            Span::contiguous(&self.tail[offset - split..end - split])
        } else {
            Span::new(&self.head[offset..], &self.tail[..end - split])
        };
        Some(span)
    }

    /// Compare `pattern` against the bytes starting at `offset`.
    ///
    /// Returns `None` when the span is too short to decide.
    pub fn matches_at(&self, offset: usize, pattern: &[u8]) -> Option<bool> {
        let window = self.slice(offset, pattern.len())?;
        let (head, tail) = window.as_slices();
        Some(head == &pattern[..head.len()] && tail == &pattern[head.len()..])
    }

    /// Copy the whole range into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst.len()` differs from `self.len()`.
    pub fn copy_to_slice(&self, dst: &mut [u8]) {
        let (first, second) = dst.split_at_mut(self.head.len());
        first.copy_from_slice(self.head);
        second.copy_from_slice(self.tail);
    }

    /// The two physical pieces, in logical order.
    pub fn as_slices(&self) -> (&'a [u8], &'a [u8]) {
        (self.head, self.tail)
    }

    /// Copy the range into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(self.head);
        out.extend_from_slice(self.tail);
        out
    }
}
