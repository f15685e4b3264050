use std::sync::Arc;

use crate::checksum::{Checksum, ChecksumSpec, FnChecksum};
use crate::error::SchemaError;
use crate::scan::PrefixScan;
use crate::segment::{width_of, FieldWidth, Segments};

/// How the content length of a frame is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMode {
    /// Every frame carries exactly `content_len` content bytes.
    Fixed { content_len: usize },
    /// A little-endian length field follows the command field. Its value is
    /// the summed size of the segments in `range`.
    Dynamic { width: FieldWidth, range: Segments },
    /// Content runs until the first occurrence of the suffix.
    Free,
}

/// Immutable description of a wire format:
///
/// ```text
/// ┌────────┬─────────┬────────┬─────────┬──────────┬────────┐
/// │ prefix │ command │ length │ content │ checksum │ suffix │
/// │ 1..N   │ 0/1/2/4 │ 0/1/2/4│ varies  │ 0/1/2/4  │ 0..N   │
/// └────────┴─────────┴────────┴─────────┴──────────┴────────┘
/// ```
///
/// The length field exists only in [`LengthMode::Dynamic`]. Schemas are cheap
/// to clone and safe to share between parsers on different threads.
#[derive(Debug, Clone)]
pub struct FrameSchema {
    prefix: Box<[u8]>,
    command: Option<FieldWidth>,
    mode: LengthMode,
    checksum: Option<ChecksumSpec>,
    suffix: Box<[u8]>,
    prefix_scan: PrefixScan,
}

impl FrameSchema {
    /// Start building a schema with the given sync prefix.
    pub fn builder(prefix: impl Into<Vec<u8>>) -> SchemaBuilder {
        SchemaBuilder::new(prefix.into())
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn command(&self) -> Option<FieldWidth> {
        self.command
    }

    pub fn mode(&self) -> LengthMode {
        self.mode
    }

    pub fn checksum(&self) -> Option<&ChecksumSpec> {
        self.checksum.as_ref()
    }

    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    pub fn prefix_scan(&self) -> PrefixScan {
        self.prefix_scan
    }

    /// Width of the length field (zero unless dynamic).
    pub fn length_len(&self) -> usize {
        match self.mode {
            LengthMode::Dynamic { width, .. } => width.bytes(),
            _ => 0,
        }
    }

    pub fn checksum_len(&self) -> usize {
        width_of(self.checksum.as_ref().map(ChecksumSpec::width))
    }

    /// Bytes before the content: prefix, command and length field.
    pub fn header_len(&self) -> usize {
        self.prefix.len() + width_of(self.command) + self.length_len()
    }

    /// Bytes after the content: checksum and suffix.
    pub fn trailer_len(&self) -> usize {
        self.checksum_len() + self.suffix.len()
    }

    /// Total wire size of a frame carrying `content_len` content bytes.
    pub fn frame_len(&self, content_len: usize) -> usize {
        self.header_len()
            .saturating_add(content_len)
            .saturating_add(self.trailer_len())
    }

    /// Summed schema-declared size of the flagged segments.
    ///
    /// Content has no declared size and contributes nothing.
    pub fn segment_size(&self, segments: Segments) -> usize {
        [
            (Segments::PREFIX, self.prefix.len()),
            (Segments::COMMAND, width_of(self.command)),
            (Segments::LENGTH, self.length_len()),
            (Segments::CHECKSUM, self.checksum_len()),
            (Segments::SUFFIX, self.suffix.len()),
        ]
        .into_iter()
        .filter(|(segment, _)| segments.contains(*segment))
        .map(|(_, size)| size)
        .sum()
    }
}

/// Builder for [`FrameSchema`]. All validation happens in [`build`](Self::build).
pub struct SchemaBuilder {
    prefix: Vec<u8>,
    command: Option<FieldWidth>,
    mode: Option<LengthMode>,
    checksum_width: Option<FieldWidth>,
    checksum_coverage: Option<Segments>,
    algorithm: Option<Arc<dyn Checksum>>,
    suffix: Vec<u8>,
    prefix_scan: PrefixScan,
}

impl SchemaBuilder {
    fn new(prefix: Vec<u8>) -> Self {
        Self {
            prefix,
            command: None,
            mode: None,
            checksum_width: None,
            checksum_coverage: None,
            algorithm: None,
            suffix: Vec::new(),
            prefix_scan: PrefixScan::default(),
        }
    }

    /// Opaque command field between prefix and length field.
    pub fn command(mut self, width: FieldWidth) -> Self {
        self.command = Some(width);
        self
    }

    pub fn fixed(mut self, content_len: usize) -> Self {
        self.mode = Some(LengthMode::Fixed { content_len });
        self
    }

    pub fn dynamic(mut self, width: FieldWidth, range: Segments) -> Self {
        self.mode = Some(LengthMode::Dynamic { width, range });
        self
    }

    pub fn free(mut self) -> Self {
        self.mode = Some(LengthMode::Free);
        self
    }

    pub fn mode(mut self, mode: LengthMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Checksum field right after the content. Covers the content unless
    /// [`checksum_coverage`](Self::checksum_coverage) says otherwise.
    pub fn checksum(mut self, width: FieldWidth) -> Self {
        self.checksum_width = Some(width);
        self
    }

    pub fn checksum_coverage(mut self, coverage: Segments) -> Self {
        self.checksum_coverage = Some(coverage);
        self
    }

    pub fn checksum_algorithm(mut self, algorithm: impl Checksum + 'static) -> Self {
        self.algorithm = Some(Arc::new(algorithm));
        self
    }

    /// Use a closure as the checksum algorithm.
    pub fn checksum_fn<F>(self, checksum: F) -> Self
    where
        F: Fn(&[&[u8]]) -> u32 + Send + Sync + 'static,
    {
        self.checksum_algorithm(FnChecksum(checksum))
    }

    pub fn suffix(mut self, suffix: impl Into<Vec<u8>>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn prefix_scan(mut self, strategy: PrefixScan) -> Self {
        self.prefix_scan = strategy;
        self
    }

    pub fn build(self) -> Result<FrameSchema, SchemaError> {
        if self.prefix.is_empty() {
            return Err(SchemaError::EmptyPrefix);
        }

        let mode = self.mode.ok_or(SchemaError::MissingLengthMode)?;
        match mode {
            LengthMode::Free if self.suffix.is_empty() => {
                return Err(SchemaError::FreeModeWithoutSuffix);
            }
            _ => {}
        }

        let checksum = match self.checksum_width {
            Some(width) => {
                let coverage = self.checksum_coverage.unwrap_or(Segments::CONTENT);
                if coverage.is_empty() {
                    return Err(SchemaError::EmptyChecksumCoverage);
                }
                if !Segments::CHECKSUMMABLE.contains(coverage) {
                    return Err(SchemaError::InvalidChecksumCoverage(coverage));
                }
                Some(ChecksumSpec::new(width, coverage, self.algorithm))
            }
            None if self.checksum_coverage.is_some() || self.algorithm.is_some() => {
                return Err(SchemaError::ChecksumWithoutWidth);
            }
            None => None,
        };

        Ok(FrameSchema {
            prefix: self.prefix.into_boxed_slice(),
            command: self.command,
            mode,
            checksum,
            suffix: self.suffix.into_boxed_slice(),
            prefix_scan: self.prefix_scan,
        })
    }
}
