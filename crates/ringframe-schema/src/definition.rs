//! Serde form of a frame schema.
//!
//! ```json
//! {
//!   "name": "ubx",
//!   "prefix": "b562",
//!   "command_width": 2,
//!   "mode": { "dynamic": { "width": 2, "range": ["content"] } },
//!   "checksum": { "width": 2, "coverage": ["command", "length", "content"], "algorithm": "fletcher16" }
//! }
//! ```
//!
//! Byte strings are hex. Widths are in bytes, with `0` meaning absent.

use ringframe_frame::{
    ChecksumAlgorithm, FieldWidth, FrameSchema, LengthMode, PrefixScan, Segments,
};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Registry key.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sync prefix, hex encoded.
    pub prefix: String,
    #[serde(default)]
    pub command_width: usize,
    pub mode: ModeDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumDefinition>,
    /// Suffix, hex encoded. Empty means none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suffix: String,
    #[serde(default)]
    pub prefix_scan: ScanDefinition,
}

/// Length mode. Serialized as `"free"`, `{"fixed": {...}}` or `{"dynamic": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ModeDefinition {
    Fixed {
        content_length: usize,
    },
    Dynamic {
        width: usize,
        range: Vec<SegmentName>,
    },
    Free,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksumDefinition {
    pub width: usize,
    #[serde(default = "content_only")]
    pub coverage: Vec<SegmentName>,
    /// Built-in algorithm name. Without one the field is carried but not checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentName {
    Prefix,
    Command,
    Length,
    Content,
    Checksum,
    Suffix,
}

impl From<SegmentName> for Segments {
    fn from(name: SegmentName) -> Self {
        match name {
            SegmentName::Prefix => Segments::PREFIX,
            SegmentName::Command => Segments::COMMAND,
            SegmentName::Length => Segments::LENGTH,
            SegmentName::Content => Segments::CONTENT,
            SegmentName::Checksum => Segments::CHECKSUM,
            SegmentName::Suffix => Segments::SUFFIX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDefinition {
    #[default]
    Restart,
    Exhaustive,
}

impl From<ScanDefinition> for PrefixScan {
    fn from(scan: ScanDefinition) -> Self {
        match scan {
            ScanDefinition::Restart => PrefixScan::Restart,
            ScanDefinition::Exhaustive => PrefixScan::Exhaustive,
        }
    }
}

fn content_only() -> Vec<SegmentName> {
    vec![SegmentName::Content]
}

fn segment_set(names: &[SegmentName]) -> Segments {
    names
        .iter()
        .fold(Segments::empty(), |set, name| set | Segments::from(*name))
}

impl SchemaDefinition {
    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the typed schema this definition describes.
    pub fn to_schema(&self) -> Result<FrameSchema> {
        let mut builder = FrameSchema::builder(self.decode_hex("prefix", &self.prefix)?)
            .suffix(self.decode_hex("suffix", &self.suffix)?)
            .prefix_scan(self.prefix_scan.into());

        if let Some(width) = self.optional_width("command", self.command_width)? {
            builder = builder.command(width);
        }

        let mode = match &self.mode {
            ModeDefinition::Fixed { content_length } => LengthMode::Fixed {
                content_len: *content_length,
            },
            ModeDefinition::Dynamic { width, range } => LengthMode::Dynamic {
                width: self.required_width("length", *width)?,
                range: segment_set(range),
            },
            ModeDefinition::Free => LengthMode::Free,
        };
        builder = builder.mode(mode);

        if let Some(checksum) = &self.checksum {
            builder = builder
                .checksum(self.required_width("checksum", checksum.width)?)
                .checksum_coverage(segment_set(&checksum.coverage));
            if let Some(name) = &checksum.algorithm {
                let algorithm = ChecksumAlgorithm::from_name(name).ok_or_else(|| {
                    RegistryError::UnknownChecksum {
                        name: self.name.clone(),
                        algorithm: name.clone(),
                    }
                })?;
                builder = builder.checksum_algorithm(algorithm);
            }
        }

        builder.build().map_err(|source| RegistryError::Invalid {
            name: self.name.clone(),
            source,
        })
    }

    fn decode_hex(&self, field: &'static str, value: &str) -> Result<Vec<u8>> {
        hex::decode(value).map_err(|source| RegistryError::InvalidHex {
            name: self.name.clone(),
            field,
            source,
        })
    }

    fn optional_width(&self, field: &'static str, width: usize) -> Result<Option<FieldWidth>> {
        FieldWidth::optional(width).map_err(|_| RegistryError::InvalidWidth {
            name: self.name.clone(),
            field,
            width,
        })
    }

    fn required_width(&self, field: &'static str, width: usize) -> Result<FieldWidth> {
        self.optional_width(field, width)?
            .ok_or_else(|| RegistryError::InvalidWidth {
                name: self.name.clone(),
                field,
                width,
            })
    }
}
