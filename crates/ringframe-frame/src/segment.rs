use bitflags::bitflags;
use bytes::BufMut;
use ringframe_buffer::Span;

use crate::error::SchemaError;

bitflags! {
    /// A set of frame segments.
    ///
    /// Used for the segments a dynamic length field counts and for the
    /// segments a checksum covers. Flags follow wire order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Segments: u8 {
        const PREFIX = 1 << 0;
        const COMMAND = 1 << 1;
        const LENGTH = 1 << 2;
        const CONTENT = 1 << 3;
        const CHECKSUM = 1 << 4;
        const SUFFIX = 1 << 5;
    }
}

impl Segments {
    /// Everything a checksum is allowed to cover.
    pub const CHECKSUMMABLE: Segments = Segments::PREFIX
        .union(Segments::COMMAND)
        .union(Segments::LENGTH)
        .union(Segments::CONTENT);
}

/// Byte width of a header or trailer field. Values are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldWidth {
    U8,
    U16,
    U32,
}

impl FieldWidth {
    pub const fn bytes(self) -> usize {
        match self {
            FieldWidth::U8 => 1,
            FieldWidth::U16 => 2,
            FieldWidth::U32 => 4,
        }
    }

    /// Largest value the field can carry.
    pub const fn max_value(self) -> u32 {
        match self {
            FieldWidth::U8 => u8::MAX as u32,
            FieldWidth::U16 => u16::MAX as u32,
            FieldWidth::U32 => u32::MAX,
        }
    }

    /// Decode a configured width where `0` means the field is absent.
    pub fn optional(bytes: usize) -> Result<Option<FieldWidth>, SchemaError> {
        match bytes {
            0 => Ok(None),
            other => FieldWidth::try_from(other).map(Some),
        }
    }

    /// Truncate `value` to the bits the field can carry.
    pub const fn truncate(self, value: u32) -> u32 {
        value & self.max_value()
    }

    /// Read a little-endian value at `offset`.
    pub fn read(self, span: Span<'_>, offset: usize) -> Option<u32> {
        let field = span.slice(offset, self.bytes())?;
        Some(
            field
                .iter()
                .rev()
                .fold(0u32, |value, byte| (value << 8) | u32::from(byte)),
        )
    }

    /// Append `value` in little-endian order, truncated to the field width.
    pub fn put(self, value: u32, dst: &mut impl BufMut) {
        match self {
            FieldWidth::U8 => dst.put_u8(value as u8),
            FieldWidth::U16 => dst.put_u16_le(value as u16),
            FieldWidth::U32 => dst.put_u32_le(value),
        }
    }
}

impl TryFrom<usize> for FieldWidth {
    type Error = SchemaError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(FieldWidth::U8),
            2 => Ok(FieldWidth::U16),
            4 => Ok(FieldWidth::U32),
            other => Err(SchemaError::InvalidFieldWidth(other)),
        }
    }
}

/// Width in bytes of an optional field.
pub(crate) fn width_of(field: Option<FieldWidth>) -> usize {
    field.map_or(0, FieldWidth::bytes)
}
