//! Scalar transcoders.
//!
//! Pure functions translating between wire integers and engineering values:
//! fixed-point scaling, sized big-endian integers, and the battery sentinel
//! convention. Everything here is side-effect free and fail-closed; the
//! encode direction rejects values that do not fit the declared byte width
//! instead of truncating them.

use zwavemap_core::{CodecError, Result};

fn pow10(precision: u8) -> f64 {
    10f64.powi(i32::from(precision))
}

/// Decode a fixed-point integer: `raw / 10^precision`.
pub fn decode_fixed_point(raw: i64, precision: u8) -> f64 {
    raw as f64 / pow10(precision)
}

/// Encode a value as a fixed-point integer in `width` big-endian bytes.
///
/// The value is scaled by `10^precision` and rounded half-up before
/// encoding as a two's-complement integer. Values that do not fit the
/// width are rejected with [`CodecError::ValueOutOfRange`].
pub fn encode_fixed_point(value: f64, precision: u8, width: u8) -> Result<Vec<u8>> {
    let scaled = (value * pow10(precision)).round();
    if !scaled.is_finite() {
        return Err(CodecError::ValueOutOfRange {
            value: i64::MAX,
            width,
        });
    }
    // Saturating cast; encode_int_be rejects anything outside the width.
    encode_int_be(scaled as i64, width, true)
}

/// Encode an integer in `width` big-endian bytes (1..=4).
///
/// Signed values use two's complement. Out-of-range values are rejected,
/// never wrapped.
pub fn encode_int_be(value: i64, width: u8, signed: bool) -> Result<Vec<u8>> {
    let out_of_range = CodecError::ValueOutOfRange { value, width };
    if !(1..=4).contains(&width) {
        return Err(out_of_range);
    }
    let bits = u32::from(width) * 8;
    let in_range = if signed {
        let max = (1i64 << (bits - 1)) - 1;
        let min = -(1i64 << (bits - 1));
        (min..=max).contains(&value)
    } else {
        value >= 0 && value <= ((1i64 << bits) - 1)
    };
    if !in_range {
        return Err(out_of_range);
    }
    let bytes = value.to_be_bytes();
    Ok(bytes[8 - usize::from(width)..].to_vec())
}

/// Decode a 1..=4 byte big-endian integer.
///
/// Returns `None` for empty or oversized buffers so malformed reports
/// resolve to a non-match rather than a panic.
pub fn decode_int_be(bytes: &[u8], signed: bool) -> Option<i64> {
    if bytes.is_empty() || bytes.len() > 4 {
        return None;
    }
    let mut value: i64 = 0;
    for &b in bytes {
        value = (value << 8) | i64::from(b);
    }
    if signed {
        let bits = bytes.len() as u32 * 8;
        let sign_bit = 1i64 << (bits - 1);
        if value & sign_bit != 0 {
            value -= 1i64 << bits;
        }
    }
    Some(value)
}

/// Battery-report sentinel: `0xFF` signals a low-battery alarm and maps to
/// `1` on the 0-100 scale; every other raw byte passes through unchanged.
///
/// This convention is specific to battery-style reports and is applied only
/// by the battery decoder family, not to percentages in general.
pub fn decode_percent_or_sentinel(raw: u8) -> u8 {
    if raw == 0xFF { 1 } else { raw }
}

/// Round to a fixed number of decimal places for stable reported state.
pub fn round_decimals(value: f64, decimals: u8) -> f64 {
    let factor = pow10(decimals);
    (value * factor).round() / factor
}

pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    (value - 32.0) / 1.8
}
