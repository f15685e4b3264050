use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::encode_frame;
use crate::error::{FrameError, Result};
use crate::handle::Frame;
use crate::schema::FrameSchema;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete frames of one schema to any `Write` sink.
pub struct FrameWriter<W> {
    inner: W,
    buf: BytesMut,
    schema: FrameSchema,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W, schema: FrameSchema) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            schema,
        }
    }

    /// Write a frame (blocking). A missing command is sent as zero.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.command.unwrap_or(0), frame.content.as_ref())
    }

    /// Encode and send one frame, then flush.
    ///
    /// A non-blocking sink that reports `WouldBlock` fails the send with
    /// [`FrameError::Io`]; part of the frame may already be written.
    pub fn send(&mut self, command: u32, content: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(&self.schema, command, content, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Io(std::io::Error::from(ErrorKind::WriteZero))),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    pub fn schema(&self) -> &FrameSchema {
        &self.schema
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
