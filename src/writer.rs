//! Streaming writer.
//!
//! Two layers.  [`SegYWriter`] is the push API: `begin` writes the whole
//! reel header region up front, `write_trace` streams one encoded trace
//! at a time, `finalize` consumes the writer.  At most one trace is in
//! memory at any point.
//!
//! [`write_segy`] is the pull driver: it walks any [`TraceSource`]
//! (implemented by [`SegYReader`]) trace by trace through a
//! [`SegYWriter`], converting byte order, sample format and text
//! encoding on the way.  Sample conversion preserves values, not bits.
//!
//! # The one backward write
//! A reel header that declares zero samples per trace means "unknown at
//! begin".  If every written trace carried the same nonzero sample
//! count, `finalize` stamps that count into the reel header with a
//! seek-write-seek that restores the cursor.  Any failure propagates
//! and the file is simply left unfinalized.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::codec::{encode_samples, write_field, Endian, FieldKind};
use crate::datatypes::SampleFormat;
use crate::error::Result;
use crate::header::{BinaryReelHeader, TraceHeader};
use crate::reader::SegYReader;
use crate::reel::{ReelHeader, BINARY_HEADER_OFFSET};
use crate::text::{TextEncoding, TextualHeader};

/// Target shape of the file being written.
#[derive(Debug, Clone, Copy)]
pub struct WriterConfig {
    pub endian: Endian,
    /// Target sample format; `None` keeps the source's (in [`write_segy`])
    /// or the binary header's declared code (in [`SegYWriter::begin`]).
    pub sample_format: Option<SampleFormat>,
    /// Target text encoding; `None` keeps the source's, or ASCII when
    /// there is no source.
    pub encoding: Option<TextEncoding>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            endian: Endian::Big,
            sample_format: None,
            encoding: None,
        }
    }
}

/// Anything a SEG Y file can be pulled out of, one trace at a time.
pub trait TraceSource {
    fn textual_header(&self) -> &TextualHeader;
    fn binary_reel_header(&self) -> &BinaryReelHeader;
    fn extended_headers(&self) -> &[TextualHeader];
    fn text_encoding(&self) -> TextEncoding;
    fn sample_format(&self) -> SampleFormat;
    fn trace_count(&self) -> usize;
    fn trace_header(&mut self, index: usize) -> Result<TraceHeader>;
    fn trace_samples(&mut self, index: usize) -> Result<Vec<f64>>;
}

impl<R: Read + Seek> TraceSource for SegYReader<R> {
    fn textual_header(&self) -> &TextualHeader {
        SegYReader::textual_header(self)
    }

    fn binary_reel_header(&self) -> &BinaryReelHeader {
        SegYReader::binary_reel_header(self)
    }

    fn extended_headers(&self) -> &[TextualHeader] {
        SegYReader::extended_headers(self)
    }

    fn text_encoding(&self) -> TextEncoding {
        SegYReader::encoding(self)
    }

    fn sample_format(&self) -> SampleFormat {
        SegYReader::sample_format(self)
    }

    fn trace_count(&self) -> usize {
        SegYReader::trace_count(self)
    }

    fn trace_header(&mut self, index: usize) -> Result<TraceHeader> {
        SegYReader::trace_header(self, index)
    }

    fn trace_samples(&mut self, index: usize) -> Result<Vec<f64>> {
        SegYReader::trace_samples(self, index)
    }
}

// Running agreement on the per-trace sample count.
enum SeenCounts {
    NoneYet,
    AllEqual(usize),
    Mixed,
}

impl SeenCounts {
    fn record(&mut self, count: usize) {
        match *self {
            SeenCounts::NoneYet => *self = SeenCounts::AllEqual(count),
            SeenCounts::AllEqual(n) if n != count => *self = SeenCounts::Mixed,
            _ => {}
        }
    }
}

/// Push writer over any seekable sink.
pub struct SegYWriter<W: Write + Seek> {
    sink: W,
    endian: Endian,
    sample_format: SampleFormat,
    declared_num_samples: usize,
    // Absolute offset and width of the declared-count field, when the
    // binary layout has one to patch.
    patch_target: Option<(u64, FieldKind)>,
    seen: SeenCounts,
    traces_written: usize,
}

impl<W: Write + Seek> SegYWriter<W> {
    /// Write the full reel header region and return a writer positioned
    /// at the first trace.
    ///
    /// When the config overrides the sample format, the binary header is
    /// re-stamped with the override's code before being written.
    pub fn begin(
        sink: W,
        textual: TextualHeader,
        binary: BinaryReelHeader,
        extended: Vec<TextualHeader>,
        config: &WriterConfig,
    ) -> Result<Self> {
        let mut binary = binary;
        let sample_format = match config.sample_format {
            Some(format) => {
                binary.set_sample_format(format)?;
                format
            }
            None => binary.sample_format()?,
        };
        let encoding = config.encoding.unwrap_or(TextEncoding::Ascii);

        let declared_num_samples = binary.num_samples();
        let patch_target = binary
            .values()
            .format()
            .field("num_samples")
            .map(|f| (BINARY_HEADER_OFFSET + f.offset as u64, f.kind));

        let region = ReelHeader {
            textual,
            binary,
            extended,
        };
        let mut sink = sink;
        region.write(&mut sink, encoding, config.endian)?;

        Ok(SegYWriter {
            sink,
            endian: config.endian,
            sample_format,
            declared_num_samples,
            patch_target,
            seen: SeenCounts::NoneYet,
            traces_written: 0,
        })
    }

    /// Encode and stream one trace.  The header's sample-count field is
    /// stamped from `samples.len()` so the record is self-describing.
    pub fn write_trace(&mut self, header: &TraceHeader, samples: &[f64]) -> Result<()> {
        let mut header = header.clone();
        header.set_num_samples(samples.len())?;
        self.sink.write_all(&header.encode(self.endian)?)?;
        self.sink
            .write_all(&encode_samples(samples, self.sample_format, self.endian)?)?;
        self.seen.record(samples.len());
        self.traces_written += 1;
        Ok(())
    }

    #[inline]
    pub fn traces_written(&self) -> usize {
        self.traces_written
    }

    /// Finish the file, patching the declared sample count when it was
    /// left at zero and every trace agreed on one.  Returns the sink.
    pub fn finalize(mut self) -> Result<W> {
        if self.declared_num_samples == 0 {
            if let (SeenCounts::AllEqual(count), Some((offset, kind))) =
                (&self.seen, self.patch_target)
            {
                let count = *count;
                if count > 0 {
                    let resume = self.sink.stream_position()?;
                    let mut buf = [0u8; 4];
                    write_field(&mut buf, 0, kind, self.endian, count as i64, "num_samples")?;
                    self.sink.seek(SeekFrom::Start(offset))?;
                    self.sink.write_all(&buf[..kind.size()])?;
                    self.sink.seek(SeekFrom::Start(resume))?;
                    log::debug!("stamped declared sample count {count} at byte {offset}");
                }
            }
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Pull every trace of `source` through a fresh [`SegYWriter`] into
/// `sink`, one trace in memory at a time.  Returns the sink.
pub fn write_segy<W, S>(sink: W, source: &mut S, config: &WriterConfig) -> Result<W>
where
    W: Write + Seek,
    S: TraceSource,
{
    let effective = WriterConfig {
        endian: config.endian,
        sample_format: Some(config.sample_format.unwrap_or_else(|| source.sample_format())),
        encoding: Some(config.encoding.unwrap_or_else(|| source.text_encoding())),
    };
    let mut writer = SegYWriter::begin(
        sink,
        source.textual_header().clone(),
        source.binary_reel_header().clone(),
        source.extended_headers().to_vec(),
        &effective,
    )?;
    for index in 0..source.trace_count() {
        let header = source.trace_header(index)?;
        let samples = source.trace_samples(index)?;
        writer.write_trace(&header, &samples)?;
    }
    writer.finalize()
}
