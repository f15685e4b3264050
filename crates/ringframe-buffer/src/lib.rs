//! Fixed-capacity byte window over a circular buffer.
//!
//! This is the lowest layer of ringframe. A producer appends raw bytes
//! (from a UART, a socket, a file) and a consumer looks ahead without
//! consuming, then commits what it has used:
//! - [`ByteWindow::peek`] returns a [`Span`] that may straddle the wrap point
//! - [`ByteWindow::advance`] is the only operation that moves the read cursor
//! - [`ByteWindow::span_at`] reaches bytes that were consumed but not yet overwritten
//!
//! [`RingBuffer`] is the bundled implementation. It allocates once and never grows.

pub mod error;
pub mod ring;
pub mod span;
pub mod traits;

pub use error::{BufferError, Result};
pub use ring::RingBuffer;
pub use span::Span;
pub use traits::ByteWindow;
