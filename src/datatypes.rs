//! Sample format codes and format revisions.
//!
//! # Identity rules
//! The data sample format code lives at bytes 3225-3226 of the file (offset
//! 24 of the binary reel header) and governs how every trace payload in the
//! file is encoded.  Parsers MUST reject codes outside the table below
//! before any trace is touched; there is no fallback interpretation.
//!
//! The revision word at bytes 3501-3502 has a Q-point between its bytes, so
//! Revision 1.0 is recorded as 0x0100.  Files in the wild also carry the
//! erroneous decimal forms 1 and 100, which canonicalize to Revision 1.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegYError};

// ── Data sample formats ──────────────────────────────────────────────────────

/// Recognized data sample format codes.
///
/// Code 4 (fixed-point with gain) is obsolete as of Revision 1 but still
/// appears in archival data; samples in that format are moved around as
/// their raw 32-bit words, since the gain interpretation is instrument
/// specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Code 1: 4-byte IBM hexadecimal floating point.
    Ibm,
    /// Code 2: 4-byte two's complement integer.
    Int32,
    /// Code 3: 2-byte two's complement integer.
    Int16,
    /// Code 4: 4-byte fixed point with gain (obsolete).
    Fixed32,
    /// Code 5: 4-byte IEEE 754 floating point.
    Float32,
    /// Code 8: 1-byte two's complement integer.
    Int8,
}

impl SampleFormat {
    /// Resolve an on-disk format code.
    /// Unknown codes fail; decoding MUST NOT continue without a format.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(SampleFormat::Ibm),
            2 => Ok(SampleFormat::Int32),
            3 => Ok(SampleFormat::Int16),
            4 => Ok(SampleFormat::Fixed32),
            5 => Ok(SampleFormat::Float32),
            8 => Ok(SampleFormat::Int8),
            _ => Err(SegYError::UnsupportedFormat { code }),
        }
    }

    /// The on-disk format code.
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            SampleFormat::Ibm => 1,
            SampleFormat::Int32 => 2,
            SampleFormat::Int16 => 3,
            SampleFormat::Fixed32 => 4,
            SampleFormat::Float32 => 5,
            SampleFormat::Int8 => 8,
        }
    }

    /// Bytes per sample. Payload length is `num_samples * size()`.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            SampleFormat::Ibm => 4,
            SampleFormat::Int32 => 4,
            SampleFormat::Int16 => 2,
            SampleFormat::Fixed32 => 4,
            SampleFormat::Float32 => 4,
            SampleFormat::Int8 => 1,
        }
    }

    /// Human-readable name, for diagnostics only.
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::Ibm => "ibm",
            SampleFormat::Int32 => "int32",
            SampleFormat::Int16 => "int16",
            SampleFormat::Fixed32 => "fixed32",
            SampleFormat::Float32 => "float32",
            SampleFormat::Int8 => "int8",
        }
    }
}

// ── Format revisions ─────────────────────────────────────────────────────────

/// Canonical SEG Y format revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Revision {
    Rev0,
    Rev1,
}

impl Revision {
    /// Canonicalize a raw revision word.
    ///
    /// Accepts the two canonical encodings plus the common erroneous
    /// decimal forms of Revision 1 seen in the wild.
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            0x0000 => Ok(Revision::Rev0),
            0x0100 | 1 | 100 => Ok(Revision::Rev1),
            _ => Err(SegYError::UnsupportedRevision { code }),
        }
    }

    /// The canonical on-disk encoding of this revision.
    #[inline]
    pub fn code(self) -> u16 {
        match self {
            Revision::Rev0 => 0x0000,
            Revision::Rev1 => 0x0100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_codes_round_trip() {
        for code in [1, 2, 3, 4, 5, 8] {
            let fmt = SampleFormat::from_code(code).unwrap();
            assert_eq!(fmt.code(), code);
        }
    }

    #[test]
    fn unknown_format_code_is_rejected() {
        for code in [0, 6, 7, 9, 255, -1] {
            assert!(matches!(
                SampleFormat::from_code(code),
                Err(SegYError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn sample_sizes() {
        assert_eq!(SampleFormat::Ibm.size(), 4);
        assert_eq!(SampleFormat::Int32.size(), 4);
        assert_eq!(SampleFormat::Int16.size(), 2);
        assert_eq!(SampleFormat::Fixed32.size(), 4);
        assert_eq!(SampleFormat::Float32.size(), 4);
        assert_eq!(SampleFormat::Int8.size(), 1);
    }

    #[test]
    fn revision_variants_canonicalize() {
        assert_eq!(Revision::from_code(0x0000).unwrap(), Revision::Rev0);
        assert_eq!(Revision::from_code(0x0100).unwrap(), Revision::Rev1);
        assert_eq!(Revision::from_code(1).unwrap(), Revision::Rev1);
        assert_eq!(Revision::from_code(100).unwrap(), Revision::Rev1);
        assert!(matches!(
            Revision::from_code(0x0200),
            Err(SegYError::UnsupportedRevision { code: 0x0200 })
        ));
    }
}
