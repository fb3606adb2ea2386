//! Indexed dataset reader.
//!
//! [`SegYReader::open`] parses the reel header region, catalogs every
//! trace in one sequential scan, and then serves random-access header
//! and sample reads against the catalog.  Opening either yields a fully
//! usable reader or an error; no partially constructed reader escapes.
//!
//! The reader owns its byte source exclusively.  Reads take `&mut self`
//! because the seek cursor is shared state; nothing else is mutated, so
//! reads may be issued in any order and repeated freely.  `into_inner`
//! hands the source back.
//!
//! Byte order, text encoding and survey dimensionality are declared by
//! the caller through [`ReaderConfig`].  Nothing is sniffed from the
//! data.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use crate::catalog::{
    self, CatalogConfig, CdpCatalog, Dimensionality, Geometry, LineCatalog, LineKeys,
    TraceCatalogEntry,
};
use crate::codec::{decode_samples, Endian};
use crate::datatypes::{Revision, SampleFormat};
use crate::error::{Result, SegYError};
use crate::format::{HeaderFormat, TRACE_HEADER_LEN};
use crate::header::{BinaryReelHeader, TraceHeader};
use crate::reel::{read_exact_or_truncated, ReelHeader};
use crate::text::{TextEncoding, TextPolicy, TextualHeader};

/// How to interpret the file being opened.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub endian: Endian,
    pub encoding: TextEncoding,
    pub text_policy: TextPolicy,
    pub dimensionality: Dimensionality,
    pub line_keys: LineKeys,
    /// Fail `InconsistentMetadata` when the reel header disagrees with
    /// the scan; the default is to log a warning and trust the scan.
    pub strict: bool,
    /// Substitute layout for the binary reel header.
    pub binary_format: Option<HeaderFormat>,
    /// Substitute layout for trace headers; the default follows the
    /// file's declared revision.
    pub trace_format: Option<HeaderFormat>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            endian: Endian::Big,
            encoding: TextEncoding::Ascii,
            text_policy: TextPolicy::Strict,
            dimensionality: Dimensionality::Unknown,
            line_keys: LineKeys::InlineCrossline,
            strict: false,
            binary_format: None,
            trace_format: None,
        }
    }
}

/// An open SEG Y dataset over any seekable byte source.
#[derive(Debug)]
pub struct SegYReader<R> {
    src: R,
    endian: Endian,
    encoding: TextEncoding,
    revision: Revision,
    sample_format: SampleFormat,
    trace_format: Arc<HeaderFormat>,
    reel: ReelHeader,
    data_start: u64,
    entries: Vec<TraceCatalogEntry>,
    geometry: Geometry,
    max_samples: usize,
}

impl<R: Read + Seek> SegYReader<R> {
    /// Parse the reel header region and catalog every trace.
    pub fn open(mut src: R, config: &ReaderConfig) -> Result<Self> {
        let binary_format = Arc::new(
            config
                .binary_format
                .clone()
                .unwrap_or_else(HeaderFormat::binary_reel),
        );
        let (reel, data_start) = ReelHeader::read(
            &mut src,
            config.encoding,
            config.text_policy,
            config.endian,
            &binary_format,
        )?;

        let sample_format = reel.binary.sample_format()?;
        let revision = reel.binary.revision()?;
        let trace_format = Arc::new(config.trace_format.clone().unwrap_or_else(|| {
            match revision {
                Revision::Rev0 => HeaderFormat::trace_rev0(),
                Revision::Rev1 => HeaderFormat::trace_rev1(),
            }
        }));

        let catalog_config = CatalogConfig {
            trace_format: &trace_format,
            sample_format,
            endian: config.endian,
            dimensionality: config.dimensionality,
            line_keys: config.line_keys,
        };
        let (entries, geometry) = catalog::scan(&mut src, data_start, &catalog_config)?;

        check_declared_lengths(&mut src, &reel.binary, sample_format, data_start, &entries, config.strict)?;

        let max_samples = entries
            .iter()
            .map(|e| e.sample_count as usize)
            .max()
            .unwrap_or(0);

        Ok(SegYReader {
            src,
            endian: config.endian,
            encoding: config.encoding,
            revision,
            sample_format,
            trace_format,
            reel,
            data_start,
            entries,
            geometry,
            max_samples,
        })
    }

    /// Number of traces the scan found; the authoritative count.
    #[inline]
    pub fn trace_count(&self) -> usize {
        self.entries.len()
    }

    /// Samples in trace `index`, from its own header.
    pub fn num_trace_samples(&self, index: usize) -> Result<usize> {
        Ok(self.entry(index)?.sample_count as usize)
    }

    /// The largest per-trace sample count in the file.
    #[inline]
    pub fn max_num_trace_samples(&self) -> usize {
        self.max_samples
    }

    /// Absolute byte offset of trace `index`'s header.
    pub fn trace_offset(&self, index: usize) -> Result<u64> {
        Ok(self.entry(index)?.byte_offset)
    }

    /// Decode the full header of trace `index`.
    pub fn trace_header(&mut self, index: usize) -> Result<TraceHeader> {
        let entry = self.entry(index)?;
        self.src.seek(SeekFrom::Start(entry.byte_offset))?;
        let mut buf = [0u8; TRACE_HEADER_LEN];
        read_exact_or_truncated(&mut self.src, &mut buf, entry.byte_offset, "trace header")?;
        Ok(TraceHeader::decode(
            Arc::clone(&self.trace_format),
            &buf,
            self.endian,
        ))
    }

    /// All samples of trace `index`.
    pub fn trace_samples(&mut self, index: usize) -> Result<Vec<f64>> {
        let count = self.num_trace_samples(index)?;
        self.trace_samples_range(index, 0, count)
    }

    /// Samples `start..stop` of trace `index`.  The range must lie inside
    /// the trace; nothing is clamped.
    pub fn trace_samples_range(
        &mut self,
        index: usize,
        start: usize,
        stop: usize,
    ) -> Result<Vec<f64>> {
        let entry = self.entry(index)?;
        let count = entry.sample_count as usize;
        if stop > count {
            return Err(SegYError::OutOfRange {
                what: "sample range end",
                value: stop,
                bound: count,
            });
        }
        if start > stop {
            return Err(SegYError::OutOfRange {
                what: "sample range start",
                value: start,
                bound: stop,
            });
        }

        let bytes_per_sample = self.sample_format.size();
        let from = entry.byte_offset + TRACE_HEADER_LEN as u64 + (start * bytes_per_sample) as u64;
        self.src.seek(SeekFrom::Start(from))?;
        let mut buf = vec![0u8; (stop - start) * bytes_per_sample];
        read_exact_or_truncated(&mut self.src, &mut buf, from, "trace samples")?;
        Ok(decode_samples(&buf, self.sample_format, self.endian))
    }

    #[inline]
    pub fn textual_header(&self) -> &TextualHeader {
        &self.reel.textual
    }

    #[inline]
    pub fn binary_reel_header(&self) -> &BinaryReelHeader {
        &self.reel.binary
    }

    #[inline]
    pub fn extended_headers(&self) -> &[TextualHeader] {
        &self.reel.extended
    }

    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    #[inline]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    #[inline]
    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        self.sample_format.size()
    }

    /// Layout used to decode trace headers.
    #[inline]
    pub fn trace_format(&self) -> &Arc<HeaderFormat> {
        &self.trace_format
    }

    /// Offset of the first trace record.
    #[inline]
    pub fn data_start_offset(&self) -> u64 {
        self.data_start
    }

    /// The full trace catalog, in on-disk order.
    #[inline]
    pub fn trace_catalog(&self) -> &[TraceCatalogEntry] {
        &self.entries
    }

    /// 3D geometry catalog, when one was requested at open.
    pub fn line_catalog(&self) -> Option<&LineCatalog> {
        self.geometry.line()
    }

    /// 2D geometry catalog, when one was requested at open.
    pub fn cdp_catalog(&self) -> Option<&CdpCatalog> {
        self.geometry.cdp()
    }

    /// Release the underlying byte source.
    pub fn into_inner(self) -> R {
        self.src
    }

    fn entry(&self, index: usize) -> Result<TraceCatalogEntry> {
        self.entries
            .get(index)
            .copied()
            .ok_or(SegYError::OutOfRange {
                what: "trace index",
                value: index,
                bound: self.entries.len(),
            })
    }
}

// The reel header cannot declare a trace count directly; when the
// fixed-length flag asserts uniform traces of a declared length, the
// region length implies one.  Scanned truth wins in lenient mode.
fn check_declared_lengths<R: Read + Seek>(
    src: &mut R,
    binary: &BinaryReelHeader,
    sample_format: SampleFormat,
    data_start: u64,
    entries: &[TraceCatalogEntry],
    strict: bool,
) -> Result<()> {
    let declared = binary.num_samples();
    if !binary.fixed_length_trace_flag() || declared == 0 {
        return Ok(());
    }

    let end = src.seek(SeekFrom::End(0))?;
    let trace_len = (TRACE_HEADER_LEN + declared * sample_format.size()) as u64;
    let implied = ((end - data_start) / trace_len) as usize;
    if implied != entries.len() {
        if strict {
            return Err(SegYError::InconsistentMetadata {
                declared: implied,
                scanned: entries.len(),
            });
        }
        log::warn!(
            "fixed-length reel header implies {implied} traces but the scan found {}; \
             trusting the scan",
            entries.len()
        );
    }

    if let Some(entry) = entries
        .iter()
        .find(|e| e.sample_count as usize != declared)
    {
        if strict {
            return Err(SegYError::InconsistentMetadata {
                declared,
                scanned: entry.sample_count as usize,
            });
        }
        log::warn!(
            "trace at byte {} has {} samples where the reel header declares {declared}; \
             trusting the trace headers",
            entry.byte_offset,
            entry.sample_count
        );
    }
    Ok(())
}
