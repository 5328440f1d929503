//! Type descriptor model (Ion 1.0 binary, typed value formats).
//!
//! Jeder Wert beginnt mit einem Descriptor-Byte: High-Nibble = Type-Tag,
//! Low-Nibble = Länge oder Sentinel. Die Sentinels:
//!
//! * 14 — "VarUInt-Länge folgt"
//! * 15 — Null-Wert des jeweiligen Typs
//! * Boolean: 0 = false, 1 = true (Länge immer 0)
//! * Struct: 1 = lexikalisch geordnete Felder, VarUInt-Länge folgt

use core::fmt;

use crate::symbol::SymbolId;

/// Length nibble sentinel: the real length follows as a VarUInt.
pub const LN_VAR_LEN: u8 = 14;
/// Length nibble sentinel: the value is null, zero payload bytes.
pub const LN_NULL: u8 = 15;
/// Boolean flag nibble for `false`.
pub const LN_BOOL_FALSE: u8 = 0;
/// Boolean flag nibble for `true`.
pub const LN_BOOL_TRUE: u8 = 1;
/// Struct length nibble marking lexically ordered fields (VarUInt length follows).
pub const LN_ORDERED_STRUCT: u8 = 1;

/// The fixed 4-byte version marker opening an encoding context.
pub const VERSION_MARKER: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

/// Well-known symbol ID the version marker is surfaced as.
pub const VERSION_MARKER_SID: SymbolId = 2;

/// The 4-bit type tag of a value header (high nibble of the descriptor byte).
///
/// `PosInt`/`NegInt` both surface as [`ValueType::Int`]; the tag carries the
/// sign of the magnitude payload. Tag 15 is reserved and malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Null = 0,
    Bool = 1,
    PosInt = 2,
    NegInt = 3,
    Float = 4,
    Decimal = 5,
    Timestamp = 6,
    Symbol = 7,
    String = 8,
    Clob = 9,
    Blob = 10,
    List = 11,
    Sexp = 12,
    Struct = 13,
    Annotation = 14,
}

impl TypeTag {
    /// Maps a high nibble to its tag. Nibble 15 is reserved and yields `None`.
    pub fn from_nibble(nibble: u8) -> Option<TypeTag> {
        Some(match nibble {
            0 => Self::Null,
            1 => Self::Bool,
            2 => Self::PosInt,
            3 => Self::NegInt,
            4 => Self::Float,
            5 => Self::Decimal,
            6 => Self::Timestamp,
            7 => Self::Symbol,
            8 => Self::String,
            9 => Self::Clob,
            10 => Self::Blob,
            11 => Self::List,
            12 => Self::Sexp,
            13 => Self::Struct,
            14 => Self::Annotation,
            _ => return None,
        })
    }

    /// The user-facing value type, or `None` for the annotation wrapper
    /// (its true type is only known after the two-phase lookahead).
    pub fn value_type(self) -> Option<ValueType> {
        Some(match self {
            Self::Null => ValueType::Null,
            Self::Bool => ValueType::Bool,
            Self::PosInt | Self::NegInt => ValueType::Int,
            Self::Float => ValueType::Float,
            Self::Decimal => ValueType::Decimal,
            Self::Timestamp => ValueType::Timestamp,
            Self::Symbol => ValueType::Symbol,
            Self::String => ValueType::String,
            Self::Clob => ValueType::Clob,
            Self::Blob => ValueType::Blob,
            Self::List => ValueType::List,
            Self::Sexp => ValueType::Sexp,
            Self::Struct => ValueType::Struct,
            Self::Annotation => return None,
        })
    }
}

/// The fundamental kind of a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Clob,
    Blob,
    List,
    Sexp,
    Struct,
}

impl ValueType {
    /// True for list, sexp and struct.
    pub fn is_container(self) -> bool {
        matches!(self, Self::List | Self::Sexp | Self::Struct)
    }

    /// True for blob and clob.
    pub fn is_lob(self) -> bool {
        matches!(self, Self::Blob | Self::Clob)
    }

    /// Lowercase name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Timestamp => "timestamp",
            Self::Symbol => "symbol",
            Self::String => "string",
            Self::Clob => "clob",
            Self::Blob => "blob",
            Self::List => "list",
            Self::Sexp => "sexp",
            Self::Struct => "struct",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Splits a descriptor byte into its (tag, length) nibbles.
#[inline]
pub fn split(descriptor: u8) -> (u8, u8) {
    (descriptor >> 4, descriptor & 0x0F)
}
