use crate::error::{BufferError, Result};
use crate::span::Span;

/// A bounded byte stream with look-ahead and explicit consumption.
///
/// Offsets passed to [`peek`](ByteWindow::peek) are relative to the read
/// cursor. Positions passed to [`span_at`](ByteWindow::span_at) are logical
/// stream positions: the number of bytes consumed since the window was
/// created, never wrapping.
///
/// A window is single-writer/single-reader. It does no locking; callers that
/// produce and consume from different threads must serialize access.
pub trait ByteWindow {
    /// Total storage in bytes.
    fn capacity(&self) -> usize;

    /// Number of unread bytes.
    fn available(&self) -> usize;

    /// Logical stream position of the read cursor.
    fn position(&self) -> u64;

    /// Append bytes and return how many were accepted.
    ///
    /// Without `overwrite`, at most [`free`](ByteWindow::free) bytes are taken.
    /// With `overwrite`, every byte is taken and the oldest unread bytes are
    /// dropped to make room.
    fn write(&mut self, data: &[u8], overwrite: bool) -> usize;

    /// View `len` resident bytes starting at logical `position`.
    ///
    /// The range may lie before the read cursor as long as the producer has
    /// not overwritten it yet.
    fn span_at(&self, position: u64, len: usize) -> Option<Span<'_>>;

    /// Consume `len` unread bytes.
    fn advance(&mut self, len: usize) -> Result<()>;

    /// Bytes that can be written without overwriting.
    fn free(&self) -> usize {
        self.capacity() - self.available()
    }

    fn is_empty(&self) -> bool {
        self.available() == 0
    }

    fn is_full(&self) -> bool {
        self.available() == self.capacity()
    }

    /// Look at `len` unread bytes starting `offset` bytes past the read cursor.
    ///
    /// Returns `None` if fewer than `offset + len` bytes are unread.
    fn peek(&self, offset: usize, len: usize) -> Option<Span<'_>> {
        let end = offset.checked_add(len)?;
        if end > self.available() {
            return None;
        }
        self.span_at(self.position() + offset as u64, len)
    }

    /// Every unread byte.
    fn unread(&self) -> Span<'_> {
        self.peek(0, self.available()).unwrap_or_default()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.peek(offset, 1)?.get(0)
    }

    /// Copy unread bytes starting at `offset` into `dst`.
    fn peek_into(&self, offset: usize, dst: &mut [u8]) -> Result<()> {
        let span = self
            .peek(offset, dst.len())
            .ok_or(BufferError::Incomplete {
                requested: offset.saturating_add(dst.len()),
                available: self.available(),
            })?;
        span.copy_to_slice(dst);
        Ok(())
    }
}

impl<T: ByteWindow + ?Sized> ByteWindow for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn available(&self) -> usize {
        (**self).available()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn write(&mut self, data: &[u8], overwrite: bool) -> usize {
        (**self).write(data, overwrite)
    }

    fn span_at(&self, position: u64, len: usize) -> Option<Span<'_>> {
        (**self).span_at(position, len)
    }

    fn advance(&mut self, len: usize) -> Result<()> {
        (**self).advance(len)
    }
}
