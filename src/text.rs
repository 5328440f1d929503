//! UTF-8 text decoding (Ion 1.0 binary, string/clob text).
//!
//! Decodiert Codepoint für Codepoint mit vollständiger Validierung der
//! Continuation-Bytes für 2/3/4-Byte-Sequenzen. Overlong-Codierungen,
//! Surrogat-Codepoints (U+D800..U+DFFF) und Werte über U+10FFFF werden
//! abgelehnt — ebenso abgeschnittene Sequenzen am Payload-Ende, die nie
//! stillschweigend durch ein Replacement-Zeichen ersetzt werden.

use crate::{Error, Result};

/// Decodes a string payload as strictly validated UTF-8.
///
/// `position` is the stream offset of the first payload byte and is used in
/// error reports.
pub fn decode(payload: &[u8], position: u64) -> Result<String> {
    // Payload-Bytes >= Codepoints; fast genau richtig für ASCII-lastigen Text.
    let mut out = String::with_capacity(payload.len());
    let mut i = 0usize;
    while i < payload.len() {
        let (cp, width) = decode_scalar(&payload[i..], position + i as u64)?;
        let ch = char::from_u32(cp)
            .ok_or(Error::InvalidUtf8 { position: position + i as u64 })?;
        out.push(ch);
        i += width;
    }
    Ok(out)
}

/// Decodes one Unicode scalar from the start of `bytes`, returning the code
/// point and the byte width of its encoding.
fn decode_scalar(bytes: &[u8], position: u64) -> Result<(u32, usize)> {
    let err = Err(Error::InvalidUtf8 { position });
    let b0 = bytes[0];
    if b0 < 0x80 {
        return Ok((u32::from(b0), 1));
    }
    match b0 {
        0xC0..=0xDF => {
            let b1 = continuation(bytes, 1, position)?;
            let cp = (u32::from(b0 & 0x1F) << 6) | b1;
            if cp < 0x80 {
                return err; // overlong
            }
            Ok((cp, 2))
        }
        0xE0..=0xEF => {
            let b1 = continuation(bytes, 1, position)?;
            let b2 = continuation(bytes, 2, position)?;
            let cp = (u32::from(b0 & 0x0F) << 12) | (b1 << 6) | b2;
            if cp < 0x800 || (0xD800..=0xDFFF).contains(&cp) {
                return err; // overlong or surrogate
            }
            Ok((cp, 3))
        }
        0xF0..=0xF7 => {
            let b1 = continuation(bytes, 1, position)?;
            let b2 = continuation(bytes, 2, position)?;
            let b3 = continuation(bytes, 3, position)?;
            let cp = (u32::from(b0 & 0x07) << 18) | (b1 << 12) | (b2 << 6) | b3;
            if cp < 0x10000 {
                return err; // overlong
            }
            if cp > 0x10_FFFF {
                return err;
            }
            Ok((cp, 4))
        }
        // Lone continuation byte or the illegal 0xF8..0xFF lead bytes.
        _ => err,
    }
}

/// Fetches continuation byte `idx` of the current sequence, validating the
/// `10xxxxxx` shape. A missing byte (truncated sequence) is an encoding
/// error, not a silent replacement.
#[inline]
fn continuation(bytes: &[u8], idx: usize, position: u64) -> Result<u32> {
    match bytes.get(idx) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(u32::from(b & 0x3F)),
        _ => Err(Error::InvalidUtf8 { position }),
    }
}
