use bytes::Bytes;
use ringframe_buffer::{ByteWindow, Span};
use tracing::{debug, trace};

use crate::error::{FrameError, Rejection, Result};
use crate::handle::{Frame, FrameHandle};
use crate::resolve::{resolve, Layout, Resolution};
use crate::scan::find_prefix;
use crate::schema::FrameSchema;
use crate::validate::validate;

/// Extracts frames from a [`ByteWindow`] according to a [`FrameSchema`].
///
/// The parser keeps no state between calls: the window's read cursor is the
/// only progress marker. Every call to [`next_frame`](Self::next_frame)
/// returns immediately.
///
/// # Example
///
/// ```
/// use ringframe_buffer::RingBuffer;
/// use ringframe_frame::{FrameParser, FrameSchema};
///
/// let schema = FrameSchema::builder([0xEF, 0xFF])
///     .fixed(2)
///     .suffix([0x0E, 0x0F])
///     .build()?;
/// let mut parser = FrameParser::new("uart0", schema, RingBuffer::new(64)?);
///
/// parser.window_mut().write(&[0x00, 0xEF, 0xFF, 0x12, 0x34, 0x0E, 0x0F], false);
///
/// let handle = parser.next_frame(None)?.expect("complete frame");
/// let mut content = [0u8; 2];
/// parser.extract_content(handle, &mut content)?;
/// assert_eq!(content, [0x12, 0x34]);
/// assert!(parser.next_frame(None)?.is_none());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FrameParser<W> {
    name: String,
    schema: FrameSchema,
    window: W,
}

impl<W: ByteWindow> FrameParser<W> {
    /// Bind a window to a default schema. `name` only labels diagnostics.
    pub fn new(name: impl Into<String>, schema: FrameSchema, window: W) -> Self {
        Self {
            name: name.into(),
            schema,
            window,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema used when a call passes no override.
    pub fn schema(&self) -> &FrameSchema {
        &self.schema
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Mutable access to the window, for the producer side.
    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn into_inner(self) -> W {
        self.window
    }

    /// Find, validate and commit the next frame.
    ///
    /// * `Ok(Some(handle))`: a frame was accepted and its bytes committed.
    /// * `Ok(None)`: not enough data yet.
    /// * `Err(FrameError::Malformed { .. })`: a candidate was rejected and its
    ///   bytes dropped. Call again for the next frame.
    ///
    /// `schema` overrides the bound schema for this call only.
    pub fn next_frame(&mut self, schema: Option<&FrameSchema>) -> Result<Option<FrameHandle>> {
        let schema = schema.unwrap_or(&self.schema);
        let start = self.window.position();
        let outcome = examine(schema, self.window.unread(), self.window.capacity());

        match outcome {
            Outcome::Incomplete { discard: 0 } => Ok(None),
            Outcome::Incomplete { discard } => {
                self.window.advance(discard)?;
                trace!(parser = %self.name, discarded = discard, "window full, dropped noise");
                Ok(None)
            }
            Outcome::Reject {
                noise,
                rejection,
                skip,
            } => {
                let discarded = noise + skip;
                self.window.advance(discarded)?;
                debug!(parser = %self.name, reason = %rejection, discarded, "rejected frame");
                Err(FrameError::Malformed {
                    rejection,
                    discarded,
                })
            }
            Outcome::Accept {
                noise,
                layout,
                command,
                wrapped,
            } => {
                self.window.advance(noise + layout.total)?;
                let frame_position = start + noise as u64;
                trace!(
                    parser = %self.name,
                    noise,
                    len = layout.total,
                    position = frame_position,
                    "accepted frame"
                );
                Ok(Some(FrameHandle {
                    frame_position,
                    frame_len: layout.total,
                    content_position: frame_position + layout.content_offset as u64,
                    content_len: layout.content_len,
                    wrapped,
                    command,
                    committed_at: self.window.position(),
                }))
            }
        }
    }

    /// Borrow the content of an accepted frame without copying.
    pub fn content(&self, handle: &FrameHandle) -> Result<Span<'_>> {
        if self.window.position() != handle.committed_at {
            return Err(FrameError::StaleHandle);
        }
        self.window
            .span_at(handle.content_position, handle.content_len)
            .ok_or(FrameError::StaleHandle)
    }

    /// Copy the content of an accepted frame into `dst`.
    ///
    /// Returns the number of bytes written, which is the content length.
    pub fn extract_content(&self, handle: FrameHandle, dst: &mut [u8]) -> Result<usize> {
        let span = self.content(&handle)?;
        let needed = span.len();
        if dst.len() < needed {
            return Err(FrameError::DestinationTooSmall {
                needed,
                len: dst.len(),
            });
        }
        span.copy_to_slice(&mut dst[..needed]);
        Ok(needed)
    }

    /// Accept the next frame and copy it out.
    pub fn read_frame(&mut self, schema: Option<&FrameSchema>) -> Result<Option<Frame>> {
        let Some(handle) = self.next_frame(schema)? else {
            return Ok(None);
        };
        let content = Bytes::from(self.content(&handle)?.to_vec());
        Ok(Some(Frame {
            command: handle.command,
            content,
            position: handle.frame_position,
        }))
    }

    /// Commit unread bytes that cannot start a frame. Returns how many.
    ///
    /// Stops at the first prefix match. Without a match, the last
    /// `prefix_len - 1` bytes are kept since they may begin one.
    pub fn discard_noise(&mut self, schema: Option<&FrameSchema>) -> Result<usize> {
        let schema = schema.unwrap_or(&self.schema);
        let unread = self.window.unread();
        let noise = find_prefix(unread, schema.prefix(), schema.prefix_scan())
            .unwrap_or_else(|| unmatched_noise(schema, unread.len()));
        if noise > 0 {
            self.window.advance(noise)?;
            trace!(parser = %self.name, discarded = noise, "discarded noise");
        }
        Ok(noise)
    }
}

impl<W: ByteWindow + std::fmt::Debug> std::fmt::Debug for FrameParser<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameParser")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("window", &self.window)
            .finish()
    }
}

/// What one parse call should do, decided before anything is committed.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// Wait for more bytes, after committing `discard` bytes of noise.
    Incomplete { discard: usize },
    Accept {
        noise: usize,
        layout: Layout,
        command: Option<u32>,
        wrapped: bool,
    },
    Reject {
        noise: usize,
        rejection: Rejection,
        skip: usize,
    },
}

fn examine(schema: &FrameSchema, unread: Span<'_>, capacity: usize) -> Outcome {
    let full = unread.len() >= capacity;
    let prefix_len = schema.prefix().len();

    let Some(noise) = find_prefix(unread, schema.prefix(), schema.prefix_scan()) else {
        let discard = if full {
            unmatched_noise(schema, unread.len())
        } else {
            0
        };
        return Outcome::Incomplete { discard };
    };

    // A full window that still cannot complete the candidate never will.
    let stalled = || match (full, noise) {
        (false, _) => Outcome::Incomplete { discard: 0 },
        (true, 0) => Outcome::Reject {
            noise,
            rejection: Rejection::WindowFull { capacity },
            skip: prefix_len,
        },
        (true, noise) => Outcome::Incomplete { discard: noise },
    };

    let candidate = unread.slice(noise, unread.len() - noise).unwrap_or_default();
    let layout = match resolve(schema, candidate) {
        Resolution::Resolved(layout) => layout,
        Resolution::Incomplete => return stalled(),
        Resolution::Invalid { rejection, skip } => {
            return Outcome::Reject {
                noise,
                rejection,
                skip,
            };
        }
    };

    if layout.total > capacity {
        return Outcome::Reject {
            noise,
            rejection: Rejection::TooLarge {
                required: layout.total,
                capacity,
            },
            skip: prefix_len,
        };
    }
    let Some(frame) = candidate.slice(0, layout.total) else {
        return stalled();
    };

    match validate(schema, frame, &layout) {
        Ok(()) => Outcome::Accept {
            noise,
            layout,
            command: schema.command().and_then(|width| width.read(frame, prefix_len)),
            wrapped: frame
                .slice(layout.content_offset, layout.content_len)
                .is_some_and(|content| content.is_wrapped()),
        },
        Err(rejection) => Outcome::Reject {
            noise,
            rejection,
            skip: layout.total,
        },
    }
}

/// Leading bytes that cannot begin a prefix when no match was found.
fn unmatched_noise(schema: &FrameSchema, available: usize) -> usize {
    available.saturating_sub(schema.prefix().len() - 1)
}
