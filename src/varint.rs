//! Variable-width integer fields (Ion 1.0 binary, VarUInt and VarInt).
//!
//! Beide Varianten tragen 7 Nutzbits pro Byte, most-significant group first.
//! Das High-Bit (0x80) markiert das LETZTE Byte. Beim VarInt trägt das
//! zweithöchste Bit (0x40) des ERSTEN Bytes das Vorzeichen; ein "negatives
//! Null" (Vorzeichen gesetzt, Magnitude 0) ist eine eigene Codierung und wird
//! dort unterschieden, wo der Consumer sie braucht (Timestamp-Offset).

use crate::source::ByteSource;
use crate::{Error, Result};

/// High bits that must be clear before a further 7-bit shift of a u64
/// accumulator can succeed.
const SHIFT_GUARD: u64 = 0xFE00_0000_0000_0000;

/// Decodes a VarUInt field.
///
/// End of input anywhere inside the field is a truncation error.
pub fn read_var_uint<S: ByteSource>(src: &mut S) -> Result<u64> {
    match try_read_var_uint(src)? {
        Some(v) => Ok(v),
        None => Err(Error::UnexpectedEof { position: src.position() }),
    }
}

/// Decodes a VarUInt field, treating end of input *before the first byte* as
/// a normal "nothing here" signal (`None`).
///
/// So scannt der Cursor den Annotation-Block: der Block endet genau an einer
/// ID-Grenze. EOF mitten im Feld bleibt ein Truncation-Fehler.
pub fn try_read_var_uint<S: ByteSource>(src: &mut S) -> Result<Option<u64>> {
    let first = match src.read_byte()? {
        Some(b) => b,
        None => return Ok(None),
    };
    let mut value = u64::from(first & 0x7F);
    if first & 0x80 != 0 {
        return Ok(Some(value));
    }
    loop {
        let b = match src.read_byte()? {
            Some(b) => b,
            None => return Err(Error::UnexpectedEof { position: src.position() }),
        };
        if value & SHIFT_GUARD != 0 {
            return Err(Error::VarIntOverflow { position: src.position() });
        }
        value = (value << 7) | u64::from(b & 0x7F);
        if b & 0x80 != 0 {
            return Ok(Some(value));
        }
    }
}

/// Decodes a VarInt field into an `i64`. Negative zero decodes to plain 0.
pub fn read_var_int<S: ByteSource>(src: &mut S) -> Result<i64> {
    let (negative, magnitude) = read_var_int_parts(src)?;
    if magnitude > i64::MAX as u64 {
        return Err(Error::VarIntOverflow { position: src.position() });
    }
    let v = magnitude as i64;
    Ok(if negative { -v } else { v })
}

/// Decodes a VarInt field, distinguishing negative zero.
///
/// Returns `None` for the distinguished negative-zero encoding (sign bit set,
/// zero magnitude), `Some(value)` otherwise. An explicit `Some(0)` means a
/// real zero.
pub fn read_var_int_or_negative_zero<S: ByteSource>(src: &mut S) -> Result<Option<i64>> {
    let (negative, magnitude) = read_var_int_parts(src)?;
    if magnitude > i64::MAX as u64 {
        return Err(Error::VarIntOverflow { position: src.position() });
    }
    let v = magnitude as i64;
    if negative {
        if v == 0 {
            Ok(None)
        } else {
            Ok(Some(-v))
        }
    } else {
        Ok(Some(v))
    }
}

/// Sign flag and unsigned magnitude of a VarInt field.
fn read_var_int_parts<S: ByteSource>(src: &mut S) -> Result<(bool, u64)> {
    let first = match src.read_byte()? {
        Some(b) => b,
        None => return Err(Error::UnexpectedEof { position: src.position() }),
    };
    let negative = first & 0x40 != 0;
    let mut magnitude = u64::from(first & 0x3F);
    if first & 0x80 != 0 {
        return Ok((negative, magnitude));
    }
    loop {
        let b = match src.read_byte()? {
            Some(b) => b,
            None => return Err(Error::UnexpectedEof { position: src.position() }),
        };
        if magnitude & SHIFT_GUARD != 0 {
            return Err(Error::VarIntOverflow { position: src.position() });
        }
        magnitude = (magnitude << 7) | u64::from(b & 0x7F);
        if b & 0x80 != 0 {
            return Ok((negative, magnitude));
        }
    }
}
