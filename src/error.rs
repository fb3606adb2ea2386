//! Error types for SEG Y parsing, cataloging and writing.

use std::io;

use thiserror::Error;

use crate::text::TextEncoding;

#[derive(Debug, Error)]
pub enum SegYError {
    /// The byte source ended mid-record. Offsets are absolute file positions.
    #[error("file truncated at byte {offset} while reading {context}")]
    TruncatedFile { offset: u64, context: &'static str },

    #[error("unsupported data sample format code {code}")]
    UnsupportedFormat { code: i32 },

    #[error("unsupported SEG Y format revision {code:#06x}")]
    UnsupportedRevision { code: u16 },

    #[error("byte {byte:#04x} at offset {offset} is not valid {encoding} text")]
    Encoding {
        encoding: TextEncoding,
        byte: u8,
        offset: u64,
    },

    /// A character in outbound text has no representation in the target codepage.
    #[error("character {ch:?} cannot be encoded as {encoding}")]
    Unencodable { encoding: TextEncoding, ch: char },

    #[error("value {value} cannot be represented in the target sample format")]
    FloatOutOfRange { value: f64 },

    #[error("{what} {value} is out of range 0..{bound}")]
    OutOfRange {
        what: &'static str,
        value: usize,
        bound: usize,
    },

    #[error("value {value} does not fit field {field:?}")]
    FieldRange { field: String, value: i64 },

    #[error("header format {format:?} has no field named {field:?}")]
    UnknownField { format: String, field: String },

    #[error("header format {format:?}: field {field:?} {reason}")]
    InvalidHeaderFormat {
        format: String,
        field: String,
        reason: &'static str,
    },

    /// Raised only under strict metadata checking; the scan result is
    /// otherwise authoritative and the disagreement is logged.
    #[error("reel header declares {declared} but the scan found {scanned}")]
    InconsistentMetadata { declared: usize, scanned: usize },

    #[error("malformed header format description: {0}")]
    FormatDescription(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SegYError>;
