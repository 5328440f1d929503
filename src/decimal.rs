//! Decimal decoding (Ion 1.0 binary, decimal).
//!
//! Wire-Layout: ein VarInt-Exponent, dann die restlichen Payload-Bytes als
//! Big-Endian-Koeffizient in Sign-and-Magnitude-Darstellung (das High-Bit des
//! ersten Magnitude-Bytes ist das Vorzeichen und wird vor der Konstruktion
//! maskiert). Wert = Koeffizient × 10^Exponent.
//!
//! Eine negative Null (Vorzeichenbit gesetzt, Magnitude 0) ist semantisch von
//! der positiven Null auf derselben Skala verschieden und bleibt erhalten —
//! deshalb das explizite `negative`-Flag statt eines vorzeichenbehafteten
//! Koeffizienten, der -0 nicht darstellen kann.

use core::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

use crate::source::{ByteSource, SliceSource};
use crate::varint::read_var_int;
use crate::{Error, Result};

/// An arbitrary-precision decimal with explicit sign: `coefficient × 10^exponent`.
///
/// Equality is *encoding* equality: `1 × 10^1` and `10 × 10^0` compare
/// unequal, and negative zero compares unequal to positive zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    negative: bool,
    coefficient: BigUint,
    exponent: i32,
}

impl Decimal {
    /// Creates a decimal from its parts.
    pub fn new(negative: bool, coefficient: BigUint, exponent: i32) -> Self {
        Self { negative, coefficient, exponent }
    }

    /// Positive zero with exponent 0 (the zero-length wire encoding).
    pub fn zero() -> Self {
        Self::new(false, BigUint::zero(), 0)
    }

    /// Negative zero at the given scale.
    pub fn negative_zero(exponent: i32) -> Self {
        Self::new(true, BigUint::zero(), exponent)
    }

    /// A decimal with the value of `v` and exponent 0.
    pub fn from_i64(v: i64) -> Self {
        Self::new(v < 0, BigUint::from(v.unsigned_abs()), 0)
    }

    /// A decimal with the value of `v` and exponent 0.
    pub fn from_bigint(v: &BigInt) -> Self {
        Self::new(v.sign() == Sign::Minus, v.magnitude().clone(), 0)
    }

    /// True when the coefficient is zero (covers both signed zeros).
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// True for negative values *and* for negative zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// True only for the distinguished negative zero.
    pub fn is_negative_zero(&self) -> bool {
        self.negative && self.is_zero()
    }

    /// The unsigned coefficient.
    pub fn coefficient(&self) -> &BigUint {
        &self.coefficient
    }

    /// The base-10 exponent.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Decodes a decimal payload. A zero-length payload is positive zero.
    pub fn decode(payload: &[u8], position: u64) -> Result<Self> {
        if payload.is_empty() {
            return Ok(Self::zero());
        }
        let mut scan = SliceSource::with_base(payload, position);
        let exponent = read_var_int(&mut scan)?;
        let exponent = i32::try_from(exponent)
            .map_err(|_| Error::VarIntOverflow { position: scan.position() })?;

        let magnitude = &payload[(scan.position() - position) as usize..];
        if magnitude.is_empty() {
            return Ok(Self::new(false, BigUint::zero(), exponent));
        }
        let negative = magnitude[0] & 0x80 != 0;
        let mut bytes = magnitude.to_vec();
        bytes[0] &= 0x7F;
        Ok(Self::new(negative, BigUint::from_bytes_be(&bytes), exponent))
    }

    /// Approximates the value as an `f64`.
    pub fn to_f64(&self) -> f64 {
        let coeff = self.coefficient.to_f64().unwrap_or(f64::INFINITY);
        let v = coeff * 10f64.powi(self.exponent);
        if self.negative {
            -v
        } else {
            v
        }
    }

    /// The integral part of the value, truncated toward zero.
    pub fn truncate_to_bigint(&self) -> BigInt {
        let ten = BigUint::from(10u32);
        let magnitude = if self.exponent >= 0 {
            &self.coefficient * ten.pow(self.exponent as u32)
        } else {
            &self.coefficient / ten.pow(self.exponent.unsigned_abs())
        };
        let sign = if self.negative && !magnitude.is_zero() {
            Sign::Minus
        } else if magnitude.is_zero() {
            Sign::NoSign
        } else {
            Sign::Plus
        };
        BigInt::from_biguint(sign, magnitude)
    }
}

impl fmt::Display for Decimal {
    /// Coefficient-and-exponent notation: `-123E-2`, `0`, `-0E-3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.coefficient)?;
        if self.exponent != 0 {
            write!(f, "E{}", self.exponent)?;
        }
        Ok(())
    }
}
