use std::fmt;

use tracing::debug;

use crate::error::{BufferError, Result};
use crate::span::Span;
use crate::traits::ByteWindow;

/// Fixed-capacity circular byte buffer.
///
/// Storage is allocated once in [`RingBuffer::new`] and never grows. Read and
/// write cursors are kept as logical stream positions, so a position handed
/// out earlier can be checked for residency later.
pub struct RingBuffer {
    storage: Box<[u8]>,
    read_pos: u64,
    write_pos: u64,
}

impl RingBuffer {
    /// Create a ring buffer holding up to `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            read_pos: 0,
            write_pos: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        (self.write_pos - self.read_pos) as usize
    }

    /// Bytes that can be written without overwriting.
    pub fn free(&self) -> usize {
        self.capacity() - self.available()
    }

    /// Logical stream position of the read cursor.
    pub fn position(&self) -> u64 {
        self.read_pos
    }

    pub fn is_empty(&self) -> bool {
        self.read_pos == self.write_pos
    }

    pub fn is_full(&self) -> bool {
        self.available() == self.capacity()
    }

    /// Append bytes, returning how many were accepted.
    ///
    /// See [`ByteWindow::write`] for the overwrite rules.
    pub fn write(&mut self, data: &[u8], overwrite: bool) -> usize {
        let accepted = if overwrite {
            data.len()
        } else {
            data.len().min(self.free())
        };

        // Leading bytes of an oversized write would be overwritten by its own tail.
        let skipped = accepted.saturating_sub(self.capacity());
        let kept = &data[skipped..accepted];
        self.write_pos += skipped as u64;
        self.copy_in(kept);
        self.write_pos += kept.len() as u64;

        let unread = self.write_pos - self.read_pos;
        let capacity = self.capacity() as u64;
        if unread > capacity {
            let dropped = unread - capacity;
            self.read_pos += dropped;
            debug!(dropped, "ring buffer overwrote unread bytes");
        }

        accepted
    }

    /// Consume `len` unread bytes.
    pub fn advance(&mut self, len: usize) -> Result<()> {
        let available = self.available();
        if len > available {
            return Err(BufferError::AdvancePastEnd {
                requested: len,
                available,
            });
        }
        self.read_pos += len as u64;
        Ok(())
    }

    /// View `len` resident bytes starting at logical `position`.
    pub fn span_at(&self, position: u64, len: usize) -> Option<Span<'_>> {
        let end = position.checked_add(len as u64)?;
        let oldest = self.write_pos.saturating_sub(self.capacity() as u64);
        if position < oldest || end > self.write_pos {
            return None;
        }
        if len == 0 {
            return Some(Span::default());
        }

        let start = self.physical(position);
        let first = len.min(self.capacity() - start);
        Some(Span::new(
            &self.storage[start..start + first],
            &self.storage[..len - first],
        ))
    }

    /// Drop every unread byte.
    pub fn clear(&mut self) {
        self.read_pos = self.write_pos;
    }

    fn physical(&self, position: u64) -> usize {
        (position % self.capacity() as u64) as usize
    }

    fn copy_in(&mut self, bytes: &[u8]) {
        let start = self.physical(self.write_pos);
        let first = bytes.len().min(self.capacity() - start);
        self.storage[start..start + first].copy_from_slice(&bytes[..first]);
        self.storage[..bytes.len() - first].copy_from_slice(&bytes[first..]);
    }
}

impl ByteWindow for RingBuffer {
    fn capacity(&self) -> usize {
        RingBuffer::capacity(self)
    }

    fn available(&self) -> usize {
        RingBuffer::available(self)
    }

    fn position(&self) -> u64 {
        RingBuffer::position(self)
    }

    fn write(&mut self, data: &[u8], overwrite: bool) -> usize {
        RingBuffer::write(self, data, overwrite)
    }

    fn span_at(&self, position: u64, len: usize) -> Option<Span<'_>> {
        RingBuffer::span_at(self, position, len)
    }

    fn advance(&mut self, len: usize) -> Result<()> {
        RingBuffer::advance(self, len)
    }
}

impl bytes::Buf for RingBuffer {
    fn remaining(&self) -> usize {
        self.available()
    }

    fn chunk(&self) -> &[u8] {
        self.unread().as_slices().0
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.available(),
            "cannot advance {cnt} bytes past {} unread",
            self.available()
        );
        self.read_pos += cnt as u64;
    }
}

impl std::io::Write for RingBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(RingBuffer::write(self, buf, false))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .field("position", &self.read_pos)
            .finish()
    }
}
