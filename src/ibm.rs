//! IBM System/360 hexadecimal floating point.
//!
//! # Layout
//! Big-endian, four bytes:
//!
//! ```text
//! byte 0            bytes 1-3
//! S EEEEEEE         MMMMMMMM MMMMMMMM MMMMMMMM
//! sign, exponent    24-bit mantissa, no implicit leading bit
//! ```
//!
//! The exponent is base 16 with a bias of 64, so
//! `value = (-1)^S * 16^(E - 64) * M / 16^6`.  A zero mantissa is zero no
//! matter what the sign and exponent bits say; writers MUST emit the
//! all-zero canonical form.
//!
//! Decoding to `f64` is exact: 24 mantissa bits fit well inside the 53
//! available.  Encoding rounds the mantissa to nearest and fails for NaN,
//! infinities and magnitudes outside the representable range, including
//! nonzero values too small for even a subnormal mantissa.

use crate::error::{Result, SegYError};

/// Largest magnitude representable: `(1 - 2^-24) * 16^63`.
pub const MAX_IBM_FLOAT: f64 = 7.2370051459731155e75;
/// Smallest positive value with a normalized mantissa: `16^-65`.
pub const SMALLEST_POSITIVE_NORMAL_IBM_FLOAT: f64 = 5.397605346934028e-79;

const F24: f64 = 16_777_216.0; // 2^24
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// A single-precision IBM hexadecimal float, held as its big-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IbmFloat32([u8; 4]);

impl IbmFloat32 {
    #[inline]
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        IbmFloat32(bytes)
    }

    #[inline]
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }

    /// Decode to an IEEE double. Exact for every bit pattern.
    pub fn to_f64(self) -> f64 {
        let [a, b, c, d] = self.0;
        let mantissa = u32::from(b) << 16 | u32::from(c) << 8 | u32::from(d);
        if mantissa == 0 {
            return 0.0;
        }
        let sign = if a & 0x80 != 0 { -1.0 } else { 1.0 };
        let exponent = i32::from(a & 0x7f);
        sign * (f64::from(mantissa) / F24) * 16f64.powi(exponent - 64)
    }

    /// Encode an IEEE double, rounding the mantissa to nearest.
    pub fn from_f64(value: f64) -> Result<Self> {
        if value == 0.0 {
            // Canonical zero, covering -0.0 as well.
            return Ok(IbmFloat32([0; 4]));
        }
        if !value.is_finite() || value.abs() > MAX_IBM_FLOAT {
            return Err(SegYError::FloatOutOfRange { value });
        }

        let sign = if value.is_sign_negative() { 0x80u8 } else { 0x00 };

        // value.abs() = m * 2^e with m in [0.5, 1).  Rebase the exponent to
        // a multiple of four so it divides cleanly into base 16.
        let (m, e) = frexp(value.abs());
        let rem = e.rem_euclid(4);
        let (shift, e) = if rem != 0 { (4 - rem, e + 4 - rem) } else { (0, e) };
        let mut exponent = e / 4 + 64;

        // Below the exponent floor the mantissa goes subnormal, losing four
        // bits per missing exponent step.
        let subnormal = if exponent < 0 { -exponent } else { 0 };
        exponent += subnormal;

        let scale = 24 - shift - 4 * subnormal;
        let mut mantissa = (m * 2f64.powi(scale)).round() as u32;
        if mantissa == 0 {
            return Err(SegYError::FloatOutOfRange { value });
        }
        if mantissa == 1 << 24 {
            // Rounding carried out of the top hex digit.
            mantissa >>= 4;
            exponent += 1;
        }
        if exponent > 0x7f {
            return Err(SegYError::FloatOutOfRange { value });
        }

        Ok(IbmFloat32([
            sign | exponent as u8,
            (mantissa >> 16) as u8,
            (mantissa >> 8) as u8,
            mantissa as u8,
        ]))
    }
}

/// Split a positive finite nonzero `x` into `(m, e)` with `x = m * 2^e`
/// and `m` in `[0.5, 1)`.
fn frexp(x: f64) -> (f64, i32) {
    let bits = x.to_bits();
    let raw_exp = ((bits >> 52) & 0x7ff) as i32;
    if raw_exp == 0 {
        // Subnormal input: renormalize, then correct the exponent.
        let (m, e) = frexp(x * TWO_POW_64);
        return (m, e - 64);
    }
    let m = f64::from_bits((bits & 0x800F_FFFF_FFFF_FFFF) | 0x3FE0_0000_0000_0000);
    (m, raw_exp - 1022)
}
