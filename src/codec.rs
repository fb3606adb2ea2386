//! Binary field and sample codecs.
//!
//! Every multi-byte quantity in a SEG Y file is a fixed-width two's
//! complement integer, an IEEE single, or an IBM hexadecimal float, at a
//! byte order chosen per file (big-endian is the standard; little-endian
//! data exists in the wild).  Byte order is therefore a runtime parameter
//! on every routine here, never a compile-time choice.
//!
//! Field values travel as `i64`, which holds every recognized field width.
//! Sample values travel as `f64`: i8/i16/i32 and f32 embed exactly, and the
//! 24-bit IBM mantissa is well inside f64's 53 bits, so no recognized
//! format loses precision on decode.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::datatypes::SampleFormat;
use crate::error::{Result, SegYError};
use crate::ibm::IbmFloat32;

/// Byte order of a file or of a single decode/encode operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// The other byte order. Handy when rewriting a file swapped.
    #[inline]
    pub fn opposite(self) -> Endian {
        match self {
            Endian::Big => Endian::Little,
            Endian::Little => Endian::Big,
        }
    }
}

/// Width and signedness of a header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
}

impl FieldKind {
    #[inline]
    pub fn size(self) -> usize {
        match self {
            FieldKind::Int8 | FieldKind::UInt8 => 1,
            FieldKind::Int16 | FieldKind::UInt16 => 2,
            FieldKind::Int32 | FieldKind::UInt32 => 4,
        }
    }

    /// Inclusive value range of the field.
    pub fn bounds(self) -> (i64, i64) {
        match self {
            FieldKind::Int8 => (i64::from(i8::MIN), i64::from(i8::MAX)),
            FieldKind::UInt8 => (0, i64::from(u8::MAX)),
            FieldKind::Int16 => (i64::from(i16::MIN), i64::from(i16::MAX)),
            FieldKind::UInt16 => (0, i64::from(u16::MAX)),
            FieldKind::Int32 => (i64::from(i32::MIN), i64::from(i32::MAX)),
            FieldKind::UInt32 => (0, i64::from(u32::MAX)),
        }
    }

    #[inline]
    pub fn fits(self, value: i64) -> bool {
        let (lo, hi) = self.bounds();
        lo <= value && value <= hi
    }
}

fn read_with<B: ByteOrder>(bytes: &[u8], kind: FieldKind) -> i64 {
    match kind {
        FieldKind::Int8 => i64::from(bytes[0] as i8),
        FieldKind::UInt8 => i64::from(bytes[0]),
        FieldKind::Int16 => i64::from(B::read_i16(bytes)),
        FieldKind::UInt16 => i64::from(B::read_u16(bytes)),
        FieldKind::Int32 => i64::from(B::read_i32(bytes)),
        FieldKind::UInt32 => i64::from(B::read_u32(bytes)),
    }
}

fn write_with<B: ByteOrder>(bytes: &mut [u8], kind: FieldKind, value: i64) {
    match kind {
        FieldKind::Int8 => bytes[0] = value as i8 as u8,
        FieldKind::UInt8 => bytes[0] = value as u8,
        FieldKind::Int16 => B::write_i16(bytes, value as i16),
        FieldKind::UInt16 => B::write_u16(bytes, value as u16),
        FieldKind::Int32 => B::write_i32(bytes, value as i32),
        FieldKind::UInt32 => B::write_u32(bytes, value as u32),
    }
}

/// Decode one integer field out of a record buffer.
pub fn read_field(buf: &[u8], offset: usize, kind: FieldKind, endian: Endian) -> i64 {
    let bytes = &buf[offset..offset + kind.size()];
    match endian {
        Endian::Big => read_with::<BigEndian>(bytes, kind),
        Endian::Little => read_with::<LittleEndian>(bytes, kind),
    }
}

/// Encode one integer field into a record buffer.
///
/// `name` only feeds the error message; the value must fit the field's
/// width and signedness.
pub fn write_field(
    buf: &mut [u8],
    offset: usize,
    kind: FieldKind,
    endian: Endian,
    value: i64,
    name: &str,
) -> Result<()> {
    if !kind.fits(value) {
        return Err(SegYError::FieldRange {
            field: name.to_string(),
            value,
        });
    }
    let bytes = &mut buf[offset..offset + kind.size()];
    match endian {
        Endian::Big => write_with::<BigEndian>(bytes, kind, value),
        Endian::Little => write_with::<LittleEndian>(bytes, kind, value),
    }
    Ok(())
}

/// Decode a single IBM float stored at the given byte order.
#[inline]
pub fn decode_ibm(bytes: [u8; 4], endian: Endian) -> f64 {
    let be = match endian {
        Endian::Big => bytes,
        Endian::Little => [bytes[3], bytes[2], bytes[1], bytes[0]],
    };
    IbmFloat32::from_be_bytes(be).to_f64()
}

/// Encode a single IBM float at the given byte order.
#[inline]
pub fn encode_ibm(value: f64, endian: Endian) -> Result<[u8; 4]> {
    let be = IbmFloat32::from_f64(value)?.to_be_bytes();
    Ok(match endian {
        Endian::Big => be,
        Endian::Little => [be[3], be[2], be[1], be[0]],
    })
}

/// Decode a whole sample payload. `data` must hold a whole number of
/// samples of the given format.
pub fn decode_samples(data: &[u8], format: SampleFormat, endian: Endian) -> Vec<f64> {
    debug_assert_eq!(data.len() % format.size(), 0);
    let read_i32 = |b: &[u8]| match endian {
        Endian::Big => BigEndian::read_i32(b),
        Endian::Little => LittleEndian::read_i32(b),
    };
    match format {
        SampleFormat::Ibm => data
            .chunks_exact(4)
            .map(|c| decode_ibm([c[0], c[1], c[2], c[3]], endian))
            .collect(),
        SampleFormat::Float32 => data
            .chunks_exact(4)
            .map(|c| {
                f64::from(match endian {
                    Endian::Big => BigEndian::read_f32(c),
                    Endian::Little => LittleEndian::read_f32(c),
                })
            })
            .collect(),
        SampleFormat::Int32 | SampleFormat::Fixed32 => {
            data.chunks_exact(4).map(|c| f64::from(read_i32(c))).collect()
        }
        SampleFormat::Int16 => data
            .chunks_exact(2)
            .map(|c| {
                f64::from(match endian {
                    Endian::Big => BigEndian::read_i16(c),
                    Endian::Little => LittleEndian::read_i16(c),
                })
            })
            .collect(),
        SampleFormat::Int8 => data.iter().map(|&b| f64::from(b as i8)).collect(),
    }
}

/// Encode sample values for the target format and byte order.
///
/// Integer targets round to nearest; a rounded value outside the target
/// width fails rather than wrapping, as does a finite value past IEEE
/// single range.  Converting between formats preserves value, not bits.
pub fn encode_samples(values: &[f64], format: SampleFormat, endian: Endian) -> Result<Vec<u8>> {
    let mut out = vec![0u8; values.len() * format.size()];
    match format {
        SampleFormat::Ibm => {
            for (chunk, &v) in out.chunks_exact_mut(4).zip(values) {
                chunk.copy_from_slice(&encode_ibm(v, endian)?);
            }
        }
        SampleFormat::Float32 => {
            for (chunk, &v) in out.chunks_exact_mut(4).zip(values) {
                let f = v as f32;
                // A finite value past single range casts to infinity.
                if f.is_infinite() && v.is_finite() {
                    return Err(SegYError::FloatOutOfRange { value: v });
                }
                match endian {
                    Endian::Big => BigEndian::write_f32(chunk, f),
                    Endian::Little => LittleEndian::write_f32(chunk, f),
                }
            }
        }
        SampleFormat::Int32 | SampleFormat::Fixed32 => {
            for (chunk, &v) in out.chunks_exact_mut(4).zip(values) {
                let r = check_int(v, f64::from(i32::MIN), f64::from(i32::MAX))?;
                match endian {
                    Endian::Big => BigEndian::write_i32(chunk, r as i32),
                    Endian::Little => LittleEndian::write_i32(chunk, r as i32),
                }
            }
        }
        SampleFormat::Int16 => {
            for (chunk, &v) in out.chunks_exact_mut(2).zip(values) {
                let r = check_int(v, f64::from(i16::MIN), f64::from(i16::MAX))?;
                match endian {
                    Endian::Big => BigEndian::write_i16(chunk, r as i16),
                    Endian::Little => LittleEndian::write_i16(chunk, r as i16),
                }
            }
        }
        SampleFormat::Int8 => {
            for (b, &v) in out.iter_mut().zip(values) {
                let r = check_int(v, f64::from(i8::MIN), f64::from(i8::MAX))?;
                *b = r as i8 as u8;
            }
        }
    }
    Ok(out)
}

fn check_int(value: f64, lo: f64, hi: f64) -> Result<f64> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < lo || rounded > hi {
        return Err(SegYError::FloatOutOfRange { value });
    }
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_round_trips_both_orders() {
        let cases = [
            (FieldKind::Int8, -100i64),
            (FieldKind::UInt8, 200),
            (FieldKind::Int16, -30000),
            (FieldKind::UInt16, 65535),
            (FieldKind::Int32, -2_000_000_000),
            (FieldKind::UInt32, 4_000_000_000),
        ];
        for endian in [Endian::Big, Endian::Little] {
            for (kind, value) in cases {
                let mut buf = [0u8; 8];
                write_field(&mut buf, 2, kind, endian, value, "t").unwrap();
                assert_eq!(read_field(&buf, 2, kind, endian), value);
            }
        }
    }

    #[test]
    fn field_overflow_is_an_error() {
        let mut buf = [0u8; 4];
        let err = write_field(&mut buf, 0, FieldKind::Int16, Endian::Big, 40000, "ns");
        assert!(matches!(err, Err(SegYError::FieldRange { .. })));
    }

    #[test]
    fn big_endian_is_the_wire_order() {
        let mut buf = [0u8; 4];
        write_field(&mut buf, 0, FieldKind::Int32, Endian::Big, 0x0102_0304, "t").unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        write_field(&mut buf, 0, FieldKind::Int32, Endian::Little, 0x0102_0304, "t").unwrap();
        assert_eq!(buf, [4, 3, 2, 1]);
    }

    #[test]
    fn ibm_little_endian_is_byte_reversed() {
        let be = encode_ibm(-118.625, Endian::Big).unwrap();
        let le = encode_ibm(-118.625, Endian::Little).unwrap();
        assert_eq!(be, [0xC2, 0x76, 0xA0, 0x00]);
        assert_eq!(le, [0x00, 0xA0, 0x76, 0xC2]);
        assert_eq!(decode_ibm(le, Endian::Little), -118.625);
    }

    #[test]
    fn samples_round_trip_every_format() {
        let values = [-1.0, 0.0, 0.5, 100.25];
        for endian in [Endian::Big, Endian::Little] {
            for format in [SampleFormat::Ibm, SampleFormat::Float32] {
                let bytes = encode_samples(&values, format, endian).unwrap();
                assert_eq!(bytes.len(), 16);
                assert_eq!(decode_samples(&bytes, format, endian), values);
            }
        }

        let ints = [-128.0, 0.0, 1.0, 127.0];
        for format in [SampleFormat::Int32, SampleFormat::Int16, SampleFormat::Int8] {
            let bytes = encode_samples(&ints, format, Endian::Big).unwrap();
            assert_eq!(decode_samples(&bytes, format, Endian::Big), ints);
        }
    }

    #[test]
    fn integer_targets_round_and_range_check() {
        let bytes = encode_samples(&[2.5, -2.5], SampleFormat::Int16, Endian::Big).unwrap();
        assert_eq!(decode_samples(&bytes, SampleFormat::Int16, Endian::Big), [3.0, -3.0]);

        assert!(matches!(
            encode_samples(&[40000.0], SampleFormat::Int16, Endian::Big),
            Err(SegYError::FloatOutOfRange { .. })
        ));
    }

    #[test]
    fn ieee_overflow_is_an_error() {
        for v in [1.0e39, -1.0e39] {
            assert!(matches!(
                encode_samples(&[v], SampleFormat::Float32, Endian::Big),
                Err(SegYError::FloatOutOfRange { value }) if value == v
            ));
        }

        // The largest finite single and true infinities still encode.
        let edge = [f64::from(f32::MAX), f64::NEG_INFINITY];
        let bytes = encode_samples(&edge, SampleFormat::Float32, Endian::Big).unwrap();
        assert_eq!(decode_samples(&bytes, SampleFormat::Float32, Endian::Big), edge);
    }

    #[test]
    fn fixed_point_words_move_raw() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        let decoded = decode_samples(&bytes, SampleFormat::Fixed32, Endian::Big);
        assert_eq!(decoded, [f64::from(0x1234_5678i32)]);
        let re = encode_samples(&decoded, SampleFormat::Fixed32, Endian::Big).unwrap();
        assert_eq!(re, bytes);
    }
}
