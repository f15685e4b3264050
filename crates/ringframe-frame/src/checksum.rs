//! Pluggable checksum functions.
//!
//! A checksum sees its covered region as a list of byte slices: a region that
//! straddles the ring buffer's wrap point, or that skips an uncovered segment,
//! arrives in several pieces and is never copied.

use std::fmt;
use std::sync::Arc;

use crate::segment::{FieldWidth, Segments};

/// A checksum over one or more byte chunks, processed in order.
pub trait Checksum: Send + Sync {
    fn compute(&self, chunks: &[&[u8]]) -> u32;

    /// Short label used in diagnostics.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Built-in checksum algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    /// Wrapping 8-bit sum.
    Sum8,
    /// 8-bit XOR.
    Xor8,
    /// 8-bit Fletcher pair; `CK_A` is the low byte, so it is sent first.
    Fletcher16,
    /// CRC-16/MODBUS (reflected 0x8005, init 0xFFFF).
    Crc16Modbus,
    /// CRC-32 (IEEE 802.3).
    Crc32,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 5] = [
        ChecksumAlgorithm::Sum8,
        ChecksumAlgorithm::Xor8,
        ChecksumAlgorithm::Fletcher16,
        ChecksumAlgorithm::Crc16Modbus,
        ChecksumAlgorithm::Crc32,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sum8 => "sum8",
            ChecksumAlgorithm::Xor8 => "xor8",
            ChecksumAlgorithm::Fletcher16 => "fletcher16",
            ChecksumAlgorithm::Crc16Modbus => "crc16-modbus",
            ChecksumAlgorithm::Crc32 => "crc32",
        }
    }

    /// Look up an algorithm by its [`as_str`](Self::as_str) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(name))
    }
}

impl Checksum for ChecksumAlgorithm {
    fn compute(&self, chunks: &[&[u8]]) -> u32 {
        let bytes = chunks.iter().flat_map(|chunk| chunk.iter().copied());
        match self {
            ChecksumAlgorithm::Sum8 => u32::from(bytes.fold(0u8, u8::wrapping_add)),
            ChecksumAlgorithm::Xor8 => u32::from(bytes.fold(0u8, |acc, byte| acc ^ byte)),
            ChecksumAlgorithm::Fletcher16 => {
                let (a, b) = bytes.fold((0u8, 0u8), |(a, b), byte| {
                    let a = a.wrapping_add(byte);
                    (a, b.wrapping_add(a))
                });
                u32::from(a) | (u32::from(b) << 8)
            }
            ChecksumAlgorithm::Crc16Modbus => {
                let crc = bytes.fold(0xFFFFu16, |mut crc, byte| {
                    crc ^= u16::from(byte);
                    for _ in 0..8 {
                        crc = if crc & 1 != 0 {
                            (crc >> 1) ^ 0xA001
                        } else {
                            crc >> 1
                        };
                    }
                    crc
                });
                u32::from(crc)
            }
            ChecksumAlgorithm::Crc32 => {
                let mut hasher = crc32fast::Hasher::new();
                for chunk in chunks {
                    hasher.update(chunk);
                }
                hasher.finalize()
            }
        }
    }

    fn name(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapts a closure into a [`Checksum`].
pub(crate) struct FnChecksum<F>(pub(crate) F);

impl<F> Checksum for FnChecksum<F>
where
    F: Fn(&[&[u8]]) -> u32 + Send + Sync,
{
    fn compute(&self, chunks: &[&[u8]]) -> u32 {
        (self.0)(chunks)
    }
}

/// The checksum field of a schema.
///
/// With no algorithm the field still occupies `width` bytes on the wire but
/// is not verified.
#[derive(Clone)]
pub struct ChecksumSpec {
    width: FieldWidth,
    coverage: Segments,
    algorithm: Option<Arc<dyn Checksum>>,
}

impl ChecksumSpec {
    pub(crate) fn new(
        width: FieldWidth,
        coverage: Segments,
        algorithm: Option<Arc<dyn Checksum>>,
    ) -> Self {
        Self {
            width,
            coverage,
            algorithm,
        }
    }

    pub fn width(&self) -> FieldWidth {
        self.width
    }

    /// Segments fed to the algorithm, in wire order.
    pub fn coverage(&self) -> Segments {
        self.coverage
    }

    pub fn algorithm(&self) -> Option<&dyn Checksum> {
        self.algorithm.as_deref()
    }

    /// True when frames are checked against this field.
    pub fn is_verified(&self) -> bool {
        self.algorithm.is_some()
    }

    /// Compute the field value over `chunks`, or `None` without an algorithm.
    pub fn compute(&self, chunks: &[&[u8]]) -> Option<u32> {
        let algorithm = self.algorithm.as_ref()?;
        Some(self.width.truncate(algorithm.compute(chunks)))
    }
}

impl fmt::Debug for ChecksumSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecksumSpec")
            .field("width", &self.width)
            .field("coverage", &self.coverage)
            .field(
                "algorithm",
                &self.algorithm.as_ref().map(|algorithm| algorithm.name()),
            )
            .finish()
    }
}
