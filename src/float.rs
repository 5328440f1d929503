//! Float decoding (Ion 1.0 binary, float).
//!
//! Ein leeres Payload ist die positive Null; sonst sind exakt 8 Bytes als
//! IEEE-754-binary64-Bitmuster (Big-Endian) vorgeschrieben. Jede andere Länge
//! ist ein Strukturfehler.

use crate::integer::fold_u64;
use crate::{Error, Result};

/// Decodes a float payload.
pub fn decode(payload: &[u8], position: u64) -> Result<f64> {
    match payload.len() {
        0 => Ok(0.0),
        8 => Ok(f64::from_bits(fold_u64(payload))),
        n => Err(Error::InvalidFloatLength { length: n as u64, position }),
    }
}
