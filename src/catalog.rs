//! Trace and geometry catalogs.
//!
//! # Scan pass
//! Traces are back to back from the first trace offset to end of file,
//! each a 240-byte header followed by `num_samples * bytes_per_sample`
//! payload bytes.  Cataloging is one sequential pass that reads each
//! header, decodes only the sample-count field (plus the geometry key
//! fields when a geometry catalog was requested) straight out of the
//! header buffer, and seeks over the payload.  Payloads are never
//! decoded here; memory is O(1) in traces scanned.
//!
//! End of file anywhere other than exactly on a trace boundary is a
//! truncation error carrying the offset of the incomplete record.
//!
//! # Fixed-length shortcut
//! When every trace is known to have the same sample count, offsets
//! follow arithmetically from the region length.  [`fixed_length`] MUST
//! produce the same catalog (and the same truncation failures) as
//! [`scan`] would on a well-formed fixed-length file; headers are then
//! only read when a geometry catalog needs their key fields.
//!
//! # Geometry
//! 3D surveys key traces on a configurable pair of header fields, 2D
//! surveys on the ensemble number.  Duplicate keys are legal: the last
//! trace under a key wins.  Dimensionality is caller configuration,
//! never guessed from the data.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};

use crate::codec::{read_field, Endian, FieldKind};
use crate::datatypes::SampleFormat;
use crate::error::{Result, SegYError};
use crate::format::{HeaderFormat, TRACE_HEADER_LEN};
use crate::reel::read_exact_or_truncated;

/// Catalog row for one trace: where its header starts and how many
/// samples follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceCatalogEntry {
    pub byte_offset: u64,
    pub sample_count: u32,
}

/// Survey dimensionality, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dimensionality {
    /// No geometry catalog is built.
    #[default]
    Unknown,
    /// Catalog on the ensemble (CDP) number.
    Two,
    /// Catalog on a pair of line-key fields.
    Three,
}

/// Which pair of trace-header fields carries the 3D line geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineKeys {
    /// The Revision 1 inline/crossline assignments.
    #[default]
    InlineCrossline,
    /// The field-record and ensemble numbers, for surveys that store
    /// line coordinates there (the only choice under Revision 0
    /// layouts, which leave inline/crossline unassigned).
    FieldRecordAndEnsemble,
}

impl LineKeys {
    /// Names of the two key fields in the trace header layout.
    pub fn field_names(self) -> (&'static str, &'static str) {
        match self {
            LineKeys::InlineCrossline => ("inline_num", "crossline_num"),
            LineKeys::FieldRecordAndEnsemble => ("file_sequence_num", "ensemble_num"),
        }
    }
}

/// Everything the scan needs to know about the file being cataloged.
#[derive(Debug, Clone, Copy)]
pub struct CatalogConfig<'a> {
    pub trace_format: &'a HeaderFormat,
    pub sample_format: SampleFormat,
    pub endian: Endian,
    pub dimensionality: Dimensionality,
    pub line_keys: LineKeys,
}

/// 3D geometry: `(line, crossline) -> trace index`, last write wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineCatalog {
    map: HashMap<(i32, i32), usize>,
    inline_numbers: Vec<i32>,
    crossline_numbers: Vec<i32>,
}

impl LineCatalog {
    fn from_map(map: HashMap<(i32, i32), usize>) -> Self {
        let mut inline_numbers: Vec<i32> = map.keys().map(|k| k.0).collect();
        inline_numbers.sort_unstable();
        inline_numbers.dedup();
        let mut crossline_numbers: Vec<i32> = map.keys().map(|k| k.1).collect();
        crossline_numbers.sort_unstable();
        crossline_numbers.dedup();
        LineCatalog {
            map,
            inline_numbers,
            crossline_numbers,
        }
    }

    /// Index of the last trace carrying this key.
    pub fn lookup(&self, inline: i32, crossline: i32) -> Option<usize> {
        self.map.get(&(inline, crossline)).copied()
    }

    pub fn contains(&self, inline: i32, crossline: i32) -> bool {
        self.map.contains_key(&(inline, crossline))
    }

    /// Distinct inline numbers, ascending.
    #[inline]
    pub fn inline_numbers(&self) -> &[i32] {
        &self.inline_numbers
    }

    /// Distinct crossline numbers, ascending.
    #[inline]
    pub fn crossline_numbers(&self) -> &[i32] {
        &self.crossline_numbers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// 2D geometry: `cdp -> trace index`, last write wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CdpCatalog {
    map: HashMap<i32, usize>,
    cdp_numbers: Vec<i32>,
}

impl CdpCatalog {
    fn from_map(map: HashMap<i32, usize>) -> Self {
        let mut cdp_numbers: Vec<i32> = map.keys().copied().collect();
        cdp_numbers.sort_unstable();
        CdpCatalog { map, cdp_numbers }
    }

    /// Index of the last trace carrying this CDP number.
    pub fn lookup(&self, cdp: i32) -> Option<usize> {
        self.map.get(&cdp).copied()
    }

    pub fn contains(&self, cdp: i32) -> bool {
        self.map.contains_key(&cdp)
    }

    /// Distinct CDP numbers, ascending.
    #[inline]
    pub fn cdp_numbers(&self) -> &[i32] {
        &self.cdp_numbers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The geometry catalog a scan produced, if any was requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Geometry {
    #[default]
    None,
    Line(LineCatalog),
    Cdp(CdpCatalog),
}

impl Geometry {
    pub fn line(&self) -> Option<&LineCatalog> {
        match self {
            Geometry::Line(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn cdp(&self) -> Option<&CdpCatalog> {
        match self {
            Geometry::Cdp(catalog) => Some(catalog),
            _ => None,
        }
    }
}

// Offset and width of a field, resolved once before the scan loop.
#[derive(Debug, Clone, Copy)]
struct FieldRef {
    offset: usize,
    kind: FieldKind,
}

impl FieldRef {
    fn resolve(format: &HeaderFormat, name: &str) -> Result<Self> {
        format
            .field(name)
            .map(|f| FieldRef {
                offset: f.offset,
                kind: f.kind,
            })
            .ok_or_else(|| SegYError::UnknownField {
                format: format.name().to_string(),
                field: name.to_string(),
            })
    }

    fn read(&self, buf: &[u8], endian: Endian) -> i64 {
        read_field(buf, self.offset, self.kind, endian)
    }
}

// Accumulates geometry keys during the scan; key fields are resolved up
// front so a layout missing them fails before any trace is read.
enum GeometryBuilder {
    None,
    Line {
        inline: FieldRef,
        crossline: FieldRef,
        map: HashMap<(i32, i32), usize>,
    },
    Cdp {
        cdp: FieldRef,
        map: HashMap<i32, usize>,
    },
}

impl GeometryBuilder {
    fn new(config: &CatalogConfig<'_>) -> Result<Self> {
        match config.dimensionality {
            Dimensionality::Unknown => Ok(GeometryBuilder::None),
            Dimensionality::Two => Ok(GeometryBuilder::Cdp {
                cdp: FieldRef::resolve(config.trace_format, "ensemble_num")?,
                map: HashMap::new(),
            }),
            Dimensionality::Three => {
                let (a, b) = config.line_keys.field_names();
                Ok(GeometryBuilder::Line {
                    inline: FieldRef::resolve(config.trace_format, a)?,
                    crossline: FieldRef::resolve(config.trace_format, b)?,
                    map: HashMap::new(),
                })
            }
        }
    }

    fn wants_headers(&self) -> bool {
        !matches!(self, GeometryBuilder::None)
    }

    fn record(&mut self, buf: &[u8], endian: Endian, index: usize) {
        match self {
            GeometryBuilder::None => {}
            GeometryBuilder::Line {
                inline,
                crossline,
                map,
            } => {
                let key = (
                    inline.read(buf, endian) as i32,
                    crossline.read(buf, endian) as i32,
                );
                map.insert(key, index);
            }
            GeometryBuilder::Cdp { cdp, map } => {
                map.insert(cdp.read(buf, endian) as i32, index);
            }
        }
    }

    fn finish(self) -> Geometry {
        match self {
            GeometryBuilder::None => Geometry::None,
            GeometryBuilder::Line { map, .. } => Geometry::Line(LineCatalog::from_map(map)),
            GeometryBuilder::Cdp { map, .. } => Geometry::Cdp(CdpCatalog::from_map(map)),
        }
    }
}

fn sample_count_from(buf: &[u8], field: FieldRef, endian: Endian) -> Result<u32> {
    let value = field.read(buf, endian);
    u32::try_from(value).map_err(|_| SegYError::FieldRange {
        field: "num_samples".to_string(),
        value,
    })
}

/// General scan: walk every trace record from `start` to end of file.
pub fn scan<R: Read + Seek>(
    src: &mut R,
    start: u64,
    config: &CatalogConfig<'_>,
) -> Result<(Vec<TraceCatalogEntry>, Geometry)> {
    let num_samples = FieldRef::resolve(config.trace_format, "num_samples")?;
    let mut geometry = GeometryBuilder::new(config)?;
    let bytes_per_sample = config.sample_format.size() as u64;

    let end = src.seek(SeekFrom::End(0))?;
    src.seek(SeekFrom::Start(start))?;

    let mut entries = Vec::new();
    let mut buf = [0u8; TRACE_HEADER_LEN];
    let mut pos = start;
    while pos < end {
        read_exact_or_truncated(src, &mut buf, pos, "trace header")?;
        let sample_count = sample_count_from(&buf, num_samples, config.endian)?;
        let payload = u64::from(sample_count) * bytes_per_sample;
        let payload_start = pos + TRACE_HEADER_LEN as u64;
        if payload_start + payload > end {
            return Err(SegYError::TruncatedFile {
                offset: payload_start,
                context: "trace samples",
            });
        }
        geometry.record(&buf, config.endian, entries.len());
        entries.push(TraceCatalogEntry {
            byte_offset: pos,
            sample_count,
        });
        src.seek(SeekFrom::Current(payload as i64))?;
        pos = payload_start + payload;
    }

    log::debug!(
        "cataloged {} traces in {} bytes",
        entries.len(),
        end - start
    );
    Ok((entries, geometry.finish()))
}

/// Fixed-length shortcut: compute offsets arithmetically for a file whose
/// every trace has `num_samples` samples.  Produces the same catalog as
/// [`scan`] would, including the truncation failure when the region is
/// not a whole number of traces.
pub fn fixed_length<R: Read + Seek>(
    src: &mut R,
    start: u64,
    num_samples: usize,
    config: &CatalogConfig<'_>,
) -> Result<(Vec<TraceCatalogEntry>, Geometry)> {
    let mut geometry = GeometryBuilder::new(config)?;
    let trace_len = (TRACE_HEADER_LEN + num_samples * config.sample_format.size()) as u64;

    let end = src.seek(SeekFrom::End(0))?;
    let region = end - start;
    let count = region / trace_len;
    let remainder = region % trace_len;
    if remainder != 0 {
        let pos = start + count * trace_len;
        // Same failure scan() would report for the partial record.
        return Err(if remainder < TRACE_HEADER_LEN as u64 {
            SegYError::TruncatedFile {
                offset: pos,
                context: "trace header",
            }
        } else {
            SegYError::TruncatedFile {
                offset: pos + TRACE_HEADER_LEN as u64,
                context: "trace samples",
            }
        });
    }

    let entries: Vec<TraceCatalogEntry> = (0..count)
        .map(|i| TraceCatalogEntry {
            byte_offset: start + i * trace_len,
            sample_count: num_samples as u32,
        })
        .collect();

    if geometry.wants_headers() {
        let mut buf = [0u8; TRACE_HEADER_LEN];
        for (index, entry) in entries.iter().enumerate() {
            src.seek(SeekFrom::Start(entry.byte_offset))?;
            read_exact_or_truncated(src, &mut buf, entry.byte_offset, "trace header")?;
            geometry.record(&buf, config.endian, index);
        }
    }

    log::debug!("cataloged {count} fixed-length traces arithmetically");
    Ok((entries, geometry.finish()))
}
