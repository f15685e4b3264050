//! Schema-driven binary frame extraction from ring buffers.
//!
//! ringframe pulls self-delimiting frames (prefix, optional command and
//! length fields, content, optional checksum and suffix) out of a noisy byte
//! stream held in a fixed-capacity circular buffer.
//!
//! # Crate Structure
//!
//! - [`buffer`]: the byte window contract and a concrete ring buffer
//! - [`frame`]: frame schemas, the parser, encoding and blocking I/O adapters
//! - [`schema`]: JSON schema definitions and a named registry (behind `schema` feature)
//!
//! ```
//! use ringframe::buffer::RingBuffer;
//! use ringframe::frame::{FieldWidth, FrameParser, FrameSchema, Segments};
//!
//! let schema = FrameSchema::builder([0xAA, 0x55])
//!     .dynamic(FieldWidth::U8, Segments::CONTENT)
//!     .build()
//!     .unwrap();
//!
//! let mut ring = RingBuffer::new(64).unwrap();
//! ring.write(&[0x00, 0xAA, 0x55, 0x02, b'h', b'i'], false);
//!
//! let mut parser = FrameParser::new("doc", schema, ring);
//! let frame = parser.read_frame(None).unwrap().unwrap();
//! assert_eq!(frame.content.as_ref(), b"hi");
//! ```

/// Re-export byte window types.
pub mod buffer {
    pub use ringframe_buffer::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ringframe_frame::*;
}

/// Re-export schema registry types (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use ringframe_schema::*;
}
