use std::io::{ErrorKind, Read};

use ringframe_buffer::RingBuffer;

use crate::error::{FrameError, Result};
use crate::handle::Frame;
use crate::parser::FrameParser;
use crate::schema::{FrameSchema, LengthMode};

/// Default window size for [`FrameReader`]: 4 KiB.
pub const DEFAULT_WINDOW_CAPACITY: usize = 4 * 1024;

/// Default size of a single read from the source.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 512;

/// Configuration for [`FrameReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Ring buffer capacity. Frames longer than this are rejected.
    pub window_capacity: usize,
    /// Upper bound on bytes requested per `read` call.
    pub read_chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Reads complete frames from any `Read` source.
///
/// Bytes are pulled into a private [`RingBuffer`] until the parser accepts a
/// frame. A rejected frame surfaces as [`FrameError::Malformed`]; the reader
/// stays usable and the next call continues after the rejected bytes.
pub struct FrameReader<R> {
    inner: R,
    parser: FrameParser<RingBuffer>,
    chunk: Vec<u8>,
    config: ReaderConfig,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader with the default configuration.
    pub fn new(inner: R, schema: FrameSchema) -> Result<Self> {
        Self::with_config(inner, schema, ReaderConfig::default())
    }

    /// Create a reader with an explicit configuration.
    ///
    /// Fails with [`FrameError::WindowTooSmall`] if the window cannot hold the
    /// smallest frame of `schema`.
    pub fn with_config(inner: R, schema: FrameSchema, config: ReaderConfig) -> Result<Self> {
        let required = smallest_frame(&schema);
        if config.window_capacity < required {
            return Err(FrameError::WindowTooSmall {
                capacity: config.window_capacity,
                required,
            });
        }
        let window = RingBuffer::new(config.window_capacity)?;
        Ok(Self {
            inner,
            parser: FrameParser::new("reader", schema, window),
            chunk: vec![0u8; config.read_chunk_size.max(1)],
            config,
        })
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::EndOfStream)` once the source is exhausted.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.parser.read_frame(None)? {
                return Ok(frame);
            }

            let window = self.parser.window();
            let free = window.free();
            if free == 0 {
                return Err(FrameError::WindowTooSmall {
                    capacity: window.capacity(),
                    required: window.capacity() + 1,
                });
            }

            let want = free.min(self.chunk.len());
            let read = match self.inner.read(&mut self.chunk[..want]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::EndOfStream {
                    unread: self.parser.window().available(),
                });
            }

            self.parser.window_mut().write(&self.chunk[..read], false);
        }
    }

    /// The parser and window behind this reader.
    pub fn parser(&self) -> &FrameParser<RingBuffer> {
        &self.parser
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner source. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    /// Yields frames and rejections until the source ends.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::EndOfStream { .. }) => None,
            other => Some(other),
        }
    }
}

fn smallest_frame(schema: &FrameSchema) -> usize {
    match schema.mode() {
        LengthMode::Fixed { content_len } => schema.frame_len(content_len),
        _ => schema.frame_len(0),
    }
}
