//! Integer magnitude decoding (Ion 1.0 binary, positive/negative int).
//!
//! Das Payload ist eine vorzeichenlose Big-Endian-Magnitude; das Vorzeichen
//! steckt im Type-Tag (positive vs. negative int), nicht im Payload. Bis zu
//! 8 Magnitude-Bytes werden in einen u64-Akkumulator gefaltet; passt der Wert
//! nicht in den signierten 64-Bit-Bereich (oder sind es mehr als 8 Bytes),
//! fällt die Decodierung auf `BigInt` mit explizitem Vorzeichen zurück.

use num_bigint::{BigInt, Sign};

/// A decoded integer: the native fast path or the arbitrary-precision fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntRepr {
    /// Fits the signed 64-bit range.
    Small(i64),
    /// Magnitude beyond the signed 64-bit range.
    Large(BigInt),
}

/// Folds up to 8 big-endian magnitude bytes into a `u64`.
/// Zero length encodes the value 0.
///
/// # Panics
///
/// Panics if `bytes` is longer than 8.
#[inline]
pub fn fold_u64(bytes: &[u8]) -> u64 {
    assert!(bytes.len() <= 8, "magnitude wider than u64");
    let mut v: u64 = 0;
    for &b in bytes {
        v = (v << 8) | u64::from(b);
    }
    v
}

/// Decodes an integer payload. `negative` carries the sign from the type tag.
///
/// Eine negative Null-Magnitude decodiert zu 0 (der Encoder schreibt sie nie,
/// der Decoder bleibt tolerant).
pub fn decode(payload: &[u8], negative: bool) -> IntRepr {
    if payload.len() <= 8 {
        let magnitude = fold_u64(payload);
        if magnitude > i64::MAX as u64 {
            let sign = if negative { Sign::Minus } else { Sign::Plus };
            return IntRepr::Large(BigInt::from_bytes_be(sign, payload));
        }
        let v = magnitude as i64;
        IntRepr::Small(if negative { -v } else { v })
    } else {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        IntRepr::Large(BigInt::from_bytes_be(sign, payload))
    }
}
