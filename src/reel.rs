//! The reel header region: everything before the first trace.
//!
//! # Layout
//! ```text
//! offset 0     3200-byte textual header (40 cards)
//! offset 3200  400-byte binary reel header
//! offset 3600  zero or more 3200-byte extended textual headers
//! ```
//!
//! The binary header's `num_extended_textual_headers` field declares how
//! many extended records follow.  A value of -1 means the count is
//! unknown and the records run until one whose first card carries the
//! end-text stanza; that terminator record is consumed but is not
//! content.  A stanza met before a positive declared count runs out wins
//! over the count: reading stops there with a warning, because the
//! stanza is the explicit terminator.

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::codec::Endian;
use crate::error::{Result, SegYError};
use crate::format::{HeaderFormat, BINARY_HEADER_LEN};
use crate::header::BinaryReelHeader;
use crate::text::{
    end_text_stanza_page, TextEncoding, TextPolicy, TextualHeader, TEXTUAL_HEADER_LEN,
};

pub const BINARY_HEADER_OFFSET: u64 = TEXTUAL_HEADER_LEN as u64;
/// Offset of the first extended textual header, or of the first trace
/// when there are none.
pub const REEL_HEADER_LEN: u64 = 3600;

/// Read exactly `buf.len()` bytes, turning a short read into a truncation
/// error that names the record and its file offset.
pub(crate) fn read_exact_or_truncated<R: Read>(
    src: &mut R,
    buf: &mut [u8],
    offset: u64,
    context: &'static str,
) -> Result<()> {
    src.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            SegYError::TruncatedFile { offset, context }
        } else {
            SegYError::Io(e)
        }
    })
}

/// The decoded reel header region.
///
/// `extended` holds content records only; a sentinel terminator record is
/// never included.
#[derive(Debug, Clone, PartialEq)]
pub struct ReelHeader {
    pub textual: TextualHeader,
    pub binary: BinaryReelHeader,
    pub extended: Vec<TextualHeader>,
}

impl ReelHeader {
    /// A blank region with the given binary header.
    pub fn new(binary: BinaryReelHeader) -> Self {
        ReelHeader {
            textual: TextualHeader::blank(),
            binary,
            extended: Vec::new(),
        }
    }

    /// Read the whole region from the start of `src`, decoding the binary
    /// header with the given layout.  Returns the header and the offset
    /// of the first trace.
    pub fn read<R: Read>(
        src: &mut R,
        encoding: TextEncoding,
        policy: TextPolicy,
        endian: Endian,
        binary_format: &Arc<HeaderFormat>,
    ) -> Result<(Self, u64)> {
        let mut record = vec![0u8; TEXTUAL_HEADER_LEN];
        read_exact_or_truncated(src, &mut record, 0, "textual header")?;
        let textual = TextualHeader::decode(&record, encoding, policy, 0)?;

        let mut binary_raw = [0u8; BINARY_HEADER_LEN];
        read_exact_or_truncated(src, &mut binary_raw, BINARY_HEADER_OFFSET, "binary reel header")?;
        let binary = BinaryReelHeader::decode_with(Arc::clone(binary_format), &binary_raw, endian);

        let declared = binary.num_extended_textual_headers();
        if declared < -1 {
            return Err(SegYError::FieldRange {
                field: "num_extended_textual_headers".to_string(),
                value: declared,
            });
        }

        let mut extended = Vec::new();
        let mut offset = REEL_HEADER_LEN;
        loop {
            match declared {
                -1 => {}
                n if extended.len() as i64 >= n => break,
                _ => {}
            }
            read_exact_or_truncated(src, &mut record, offset, "extended textual header")?;
            let page = TextualHeader::decode(&record, encoding, policy, offset)?;
            offset += TEXTUAL_HEADER_LEN as u64;
            if page.has_end_text_stanza() {
                if declared >= 0 {
                    log::warn!(
                        "end-text stanza after {} of {} declared extended textual headers; \
                         trusting the stanza",
                        extended.len(),
                        declared
                    );
                }
                break;
            }
            extended.push(page);
        }

        Ok((ReelHeader { textual, binary, extended }, offset))
    }

    /// Write the whole region.  The count field is stamped with the
    /// number of extended records, unless it is the -1 sentinel, in which
    /// case the sentinel is kept and a terminator record is appended.
    /// Returns the offset of the first trace.
    pub fn write<W: Write>(
        &self,
        dst: &mut W,
        encoding: TextEncoding,
        endian: Endian,
    ) -> Result<u64> {
        dst.write_all(&self.textual.encode(encoding)?)?;

        let sentinel = self.binary.num_extended_textual_headers() == -1;
        let mut binary = self.binary.clone();
        if !sentinel {
            binary.set_num_extended_textual_headers(self.extended.len() as i64)?;
        }
        dst.write_all(&binary.encode(endian)?)?;

        let mut offset = REEL_HEADER_LEN;
        for page in &self.extended {
            dst.write_all(&page.encode(encoding)?)?;
            offset += TEXTUAL_HEADER_LEN as u64;
        }
        if sentinel {
            dst.write_all(&end_text_stanza_page().encode(encoding)?)?;
            offset += TEXTUAL_HEADER_LEN as u64;
        }
        Ok(offset)
    }
}
