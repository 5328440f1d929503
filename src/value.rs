//! Decoded scalar values and the per-value coercion cache.
//!
//! Pro positioniertem Wert gibt es genau eine autoritative Repräsentation
//! (die decodierte Payload). Abgeleitete numerische Sichten (i32, i64, f64,
//! Decimal, BigInt) werden bei Bedarf berechnet und memoisiert, damit
//! wiederholte Getter-Aufrufe nicht erneut konvertieren. `clear` läuft bei
//! jedem Vorrücken, Betreten und Verlassen — nie dazwischen.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::decimal::Decimal;
use crate::descriptor::ValueType;
use crate::timestamp::Timestamp;
use crate::{Error, Result};

/// A fully decoded scalar in its authoritative or a derived representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A typed null (`null.int`, `null.struct`, ...).
    Null(ValueType),
    Bool(bool),
    /// An integer that fits the native signed 64-bit width.
    Int(i64),
    /// An integer past the native width, sign already applied.
    BigInt(BigInt),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    /// String text, or resolved symbol text.
    Text(String),
}

impl Scalar {
    /// Representation name used in mismatch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null(_) => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::BigInt(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Timestamp(_) => "timestamp",
            Self::Text(_) => "text",
        }
    }
}

/// Memoizing cache holding the current value's representations.
///
/// Exactly one authoritative entry per positioned value; derived entries are
/// coercions computed from it. Container values and unread scalars leave the
/// cache empty.
#[derive(Debug, Default)]
pub struct ValueCache {
    authoritative: Option<Scalar>,
    derived: Vec<Scalar>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything; runs on advance, step_in and step_out.
    pub fn clear(&mut self) {
        self.authoritative = None;
        self.derived.clear();
    }

    /// True once a payload has been decoded for the current value.
    pub fn is_loaded(&self) -> bool {
        self.authoritative.is_some()
    }

    /// Installs the authoritative representation for the current value.
    pub fn load(&mut self, scalar: Scalar) {
        self.authoritative = Some(scalar);
        self.derived.clear();
    }

    fn authoritative(&self) -> Result<&Scalar> {
        match &self.authoritative {
            Some(Scalar::Null(_)) => Err(Error::NullValue),
            Some(s) => Ok(s),
            None => Err(Error::NoCurrentValue),
        }
    }

    fn mismatch(&self, from: &Scalar, to: &'static str) -> Error {
        Error::TypeMismatch { from: from.kind(), to }
    }

    /// The boolean value. No coercions exist for booleans.
    pub fn bool_value(&self) -> Result<bool> {
        match self.authoritative()? {
            Scalar::Bool(v) => Ok(*v),
            s => Err(self.mismatch(s, "bool")),
        }
    }

    /// The integer value narrowed to `i32`.
    pub fn int_value(&self) -> Result<i32> {
        let v = self.long_value()?;
        i32::try_from(v).map_err(|_| Error::CoercionOverflow { to: "i32" })
    }

    /// The integer value as `i64`. Oversize integers overflow rather than
    /// silently truncate.
    pub fn long_value(&self) -> Result<i64> {
        match self.authoritative()? {
            Scalar::Int(v) => Ok(*v),
            Scalar::BigInt(v) => {
                v.to_i64().ok_or(Error::CoercionOverflow { to: "i64" })
            }
            s => Err(self.mismatch(s, "int")),
        }
    }

    /// The integer value at full precision. Decimals truncate toward zero.
    pub fn big_integer_value(&mut self) -> Result<BigInt> {
        if let Some(Scalar::BigInt(v)) = self.find_derived(|s| matches!(s, Scalar::BigInt(_))) {
            return Ok(v.clone());
        }
        let derived = match self.authoritative()? {
            Scalar::Int(v) => BigInt::from(*v),
            Scalar::BigInt(v) => return Ok(v.clone()),
            Scalar::Decimal(d) => d.truncate_to_bigint(),
            s => return Err(self.mismatch(s, "int")),
        };
        self.derived.push(Scalar::BigInt(derived.clone()));
        Ok(derived)
    }

    /// The value as binary64. Integers and decimals convert with the usual
    /// loss of precision past 2^53.
    pub fn double_value(&mut self) -> Result<f64> {
        if let Some(Scalar::Float(v)) = self.find_derived(|s| matches!(s, Scalar::Float(_))) {
            return Ok(*v);
        }
        let derived = match self.authoritative()? {
            Scalar::Float(v) => return Ok(*v),
            Scalar::Int(v) => *v as f64,
            Scalar::BigInt(v) => v.to_f64().unwrap_or(f64::INFINITY),
            Scalar::Decimal(d) => d.to_f64(),
            s => return Err(self.mismatch(s, "float")),
        };
        self.derived.push(Scalar::Float(derived));
        Ok(derived)
    }

    /// The value as an exact decimal. Integers widen losslessly; floats do
    /// not convert (their binary fractions have no faithful base-10 form
    /// without a rounding policy).
    pub fn decimal_value(&mut self) -> Result<Decimal> {
        if let Some(Scalar::Decimal(v)) = self.find_derived(|s| matches!(s, Scalar::Decimal(_))) {
            return Ok(v.clone());
        }
        let derived = match self.authoritative()? {
            Scalar::Decimal(d) => return Ok(d.clone()),
            Scalar::Int(v) => Decimal::from_i64(*v),
            Scalar::BigInt(v) => Decimal::from_bigint(v),
            s => return Err(self.mismatch(s, "decimal")),
        };
        self.derived.push(Scalar::Decimal(derived.clone()));
        Ok(derived)
    }

    /// The timestamp value.
    pub fn timestamp_value(&self) -> Result<Timestamp> {
        match self.authoritative()? {
            Scalar::Timestamp(t) => Ok(t.clone()),
            s => Err(self.mismatch(s, "timestamp")),
        }
    }

    /// Borrowed text of a string value.
    pub fn text(&self) -> Result<&str> {
        match self.authoritative()? {
            Scalar::Text(t) => Ok(t),
            s => Err(self.mismatch(s, "text")),
        }
    }

    /// The typed null, if the current loaded value is one.
    pub fn null_type(&self) -> Option<ValueType> {
        match &self.authoritative {
            Some(Scalar::Null(t)) => Some(*t),
            _ => None,
        }
    }

    fn find_derived(&self, pred: impl Fn(&Scalar) -> bool) -> Option<&Scalar> {
        self.derived.iter().find(|s| pred(s))
    }
}
