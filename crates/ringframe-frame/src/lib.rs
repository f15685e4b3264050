//! Schema-driven frame extraction from a circular byte window.
//!
//! A [`FrameSchema`] describes a binary wire format:
//!
//! ```text
//! ┌────────┬─────────┬────────┬─────────┬──────────┬────────┐
//! │ prefix │ command │ length │ content │ checksum │ suffix │
//! └────────┴─────────┴────────┴─────────┴──────────┴────────┘
//! ```
//!
//! Only the prefix is mandatory. Content length is fixed, read from a
//! little-endian length field, or delimited by the suffix. A [`FrameParser`]
//! bound to a [`ByteWindow`](ringframe_buffer::ByteWindow) finds the next
//! prefix, resolves the frame's extent, checks checksum and suffix, and
//! commits the bytes. Noise and rejected frames are skipped, so the parser
//! never loses sync.
//!
//! Each call returns immediately with a frame, "not yet" (`Ok(None)`), or a
//! [`FrameError::Malformed`] after which parsing simply continues.
//!
//! [`encode_frame`] builds frames, and [`FrameReader`]/[`FrameWriter`] adapt
//! the parser to blocking `std::io` streams.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod handle;
pub mod parser;
pub mod reader;
mod resolve;
pub mod scan;
pub mod schema;
pub mod segment;
mod validate;
pub mod writer;

pub use checksum::{Checksum, ChecksumAlgorithm, ChecksumSpec};
pub use codec::encode_frame;
pub use error::{FrameError, Rejection, Result, SchemaError};
pub use handle::{Frame, FrameHandle};
pub use parser::FrameParser;
pub use reader::{FrameReader, ReaderConfig, DEFAULT_READ_CHUNK_SIZE, DEFAULT_WINDOW_CAPACITY};
pub use scan::PrefixScan;
pub use schema::{FrameSchema, LengthMode, SchemaBuilder};
pub use segment::{FieldWidth, Segments};
pub use writer::FrameWriter;
