//! Decoded header records.
//!
//! [`HeaderValues`] is the generic form: a layout plus one `i64` per
//! field, decoded from or encoded to the record's raw bytes.  The two
//! typed views, [`BinaryReelHeader`] and [`TraceHeader`], add accessors
//! for the fields the rest of the crate steers by.
//!
//! The binary reel header always uses the standard layout; trace headers
//! take whichever layout the caller configured, so their key fields are
//! looked up optionally.

use std::sync::Arc;

use crate::codec::{read_field, write_field, Endian};
use crate::datatypes::{Revision, SampleFormat};
use crate::error::{Result, SegYError};
use crate::format::HeaderFormat;

/// Field values of one header record, keyed by the record's layout.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderValues {
    format: Arc<HeaderFormat>,
    values: Vec<i64>,
}

impl HeaderValues {
    /// All-zero values for the given layout.
    pub fn new(format: Arc<HeaderFormat>) -> Self {
        let values = vec![0; format.fields().len()];
        HeaderValues { format, values }
    }

    /// Decode every field of a raw record.
    pub fn decode(format: Arc<HeaderFormat>, buf: &[u8], endian: Endian) -> Self {
        debug_assert!(buf.len() >= format.record_len());
        let values = format
            .fields()
            .iter()
            .map(|f| read_field(buf, f.offset, f.kind, endian))
            .collect();
        HeaderValues { format, values }
    }

    /// Encode to a raw record; unnamed bytes stay zero.
    pub fn encode(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.format.record_len()];
        for (field, &value) in self.format.fields().iter().zip(&self.values) {
            write_field(&mut buf, field.offset, field.kind, endian, value, &field.name)?;
        }
        Ok(buf)
    }

    #[inline]
    pub fn format(&self) -> &Arc<HeaderFormat> {
        &self.format
    }

    /// Value of a named field, or an error naming the layout when the
    /// layout has no such field.
    pub fn get(&self, name: &str) -> Result<i64> {
        self.try_get(name).ok_or_else(|| SegYError::UnknownField {
            format: self.format.name().to_string(),
            field: name.to_string(),
        })
    }

    /// Value of a named field, `None` when the layout lacks it.
    pub fn try_get(&self, name: &str) -> Option<i64> {
        self.format.field_position(name).map(|i| self.values[i])
    }

    /// Store a field value, checking it against the field's width.
    pub fn set(&mut self, name: &str, value: i64) -> Result<()> {
        let position = self
            .format
            .field_position(name)
            .ok_or_else(|| SegYError::UnknownField {
                format: self.format.name().to_string(),
                field: name.to_string(),
            })?;
        if !self.format.fields()[position].kind.fits(value) {
            return Err(SegYError::FieldRange {
                field: name.to_string(),
                value,
            });
        }
        self.values[position] = value;
        Ok(())
    }

    // Fields known to exist in the layout; reads as zero if absent, so
    // typed accessors never panic.
    fn known(&self, name: &str) -> i64 {
        self.try_get(name).unwrap_or(0)
    }
}

/// The 400-byte binary reel header, in the standard layout unless a
/// custom one was substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryReelHeader {
    values: HeaderValues,
}

impl BinaryReelHeader {
    /// An all-zero header in the standard layout.
    pub fn new() -> Self {
        BinaryReelHeader::with_format(Arc::new(HeaderFormat::binary_reel()))
    }

    /// An all-zero header in the given layout.
    pub fn with_format(format: Arc<HeaderFormat>) -> Self {
        BinaryReelHeader {
            values: HeaderValues::new(format),
        }
    }

    pub fn decode(buf: &[u8], endian: Endian) -> Self {
        BinaryReelHeader::decode_with(Arc::new(HeaderFormat::binary_reel()), buf, endian)
    }

    pub fn decode_with(format: Arc<HeaderFormat>, buf: &[u8], endian: Endian) -> Self {
        BinaryReelHeader {
            values: HeaderValues::decode(format, buf, endian),
        }
    }

    pub fn encode(&self, endian: Endian) -> Result<Vec<u8>> {
        self.values.encode(endian)
    }

    pub fn get(&self, name: &str) -> Result<i64> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: i64) -> Result<()> {
        self.values.set(name, value)
    }

    #[inline]
    pub fn values(&self) -> &HeaderValues {
        &self.values
    }

    /// Sample format of the trace data, from the format code field.
    pub fn sample_format(&self) -> Result<SampleFormat> {
        SampleFormat::from_code(self.values.known("data_sample_format") as i32)
    }

    pub fn set_sample_format(&mut self, format: SampleFormat) -> Result<()> {
        self.values
            .set("data_sample_format", i64::from(format.code()))
    }

    /// Canonicalized format revision.
    pub fn revision(&self) -> Result<Revision> {
        Revision::from_code(self.values.known("format_revision_num") as u16)
    }

    pub fn set_revision(&mut self, revision: Revision) -> Result<()> {
        self.values
            .set("format_revision_num", i64::from(revision.code()))
    }

    /// Declared samples per trace; zero means not declared.  A negative
    /// value in a signed custom layout also reads as not declared.
    pub fn num_samples(&self) -> usize {
        usize::try_from(self.values.known("num_samples")).unwrap_or(0)
    }

    pub fn set_num_samples(&mut self, num_samples: usize) -> Result<()> {
        self.values.set("num_samples", num_samples as i64)
    }

    /// Declared sample interval in microseconds.
    pub fn sample_interval(&self) -> i64 {
        self.values.known("sample_interval")
    }

    /// True when the header asserts every trace has the declared length.
    pub fn fixed_length_trace_flag(&self) -> bool {
        self.values.known("fixed_length_trace_flag") != 0
    }

    /// Declared count of extended textual headers; -1 means "read until
    /// the end-text stanza".
    pub fn num_extended_textual_headers(&self) -> i64 {
        self.values.known("num_extended_textual_headers")
    }

    pub fn set_num_extended_textual_headers(&mut self, count: i64) -> Result<()> {
        self.values.set("num_extended_textual_headers", count)
    }
}

impl Default for BinaryReelHeader {
    fn default() -> Self {
        BinaryReelHeader::new()
    }
}

/// One 240-byte trace header in a caller-chosen layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceHeader {
    values: HeaderValues,
}

impl TraceHeader {
    /// An all-zero header in the given layout.
    pub fn new(format: Arc<HeaderFormat>) -> Self {
        TraceHeader {
            values: HeaderValues::new(format),
        }
    }

    pub fn decode(format: Arc<HeaderFormat>, buf: &[u8], endian: Endian) -> Self {
        TraceHeader {
            values: HeaderValues::decode(format, buf, endian),
        }
    }

    pub fn encode(&self, endian: Endian) -> Result<Vec<u8>> {
        self.values.encode(endian)
    }

    pub fn get(&self, name: &str) -> Result<i64> {
        self.values.get(name)
    }

    pub fn try_get(&self, name: &str) -> Option<i64> {
        self.values.try_get(name)
    }

    pub fn set(&mut self, name: &str, value: i64) -> Result<()> {
        self.values.set(name, value)
    }

    #[inline]
    pub fn values(&self) -> &HeaderValues {
        &self.values
    }

    /// Samples in this trace; zero when the layout lacks the field.
    pub fn num_samples(&self) -> usize {
        self.values.known("num_samples") as usize
    }

    pub fn set_num_samples(&mut self, num_samples: usize) -> Result<()> {
        self.values.set("num_samples", num_samples as i64)
    }

    /// Sample interval in microseconds.
    pub fn sample_interval(&self) -> i64 {
        self.values.known("sample_interval")
    }

    pub fn inline_num(&self) -> Option<i64> {
        self.values.try_get("inline_num")
    }

    pub fn crossline_num(&self) -> Option<i64> {
        self.values.try_get("crossline_num")
    }

    pub fn file_sequence_num(&self) -> Option<i64> {
        self.values.try_get("file_sequence_num")
    }

    pub fn ensemble_num(&self) -> Option<i64> {
        self.values.try_get("ensemble_num")
    }
}
