//! Byte source contract consumed by the cursor.
//!
//! I/O (Buffering, Blocking, Retries) ist Sache der Implementierung — der
//! Cursor kennt nur diesen minimalen Vertrag. Jede Operation darf blockieren;
//! der erste I/O-Fehler ist fatal für den Stream und wird nicht wiederholt.

use crate::Result;

/// Sequential, position-tracked access to the input bytes.
///
/// End of input is a normal condition and is reported via `Ok(None)` from
/// [`read_byte`](ByteSource::read_byte) or a short count from
/// [`read_into`](ByteSource::read_into), never as an error.
pub trait ByteSource {
    /// Reads one byte, or `None` at end of input.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Reads up to `buf.len()` bytes into `buf` and returns the count read.
    /// Returns 0 only at end of input.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Skips up to `n` bytes and returns the count actually skipped
    /// (short only at end of input).
    fn skip(&mut self, n: usize) -> Result<usize>;

    /// Absolute byte offset of the next byte to be read.
    fn position(&self) -> u64;

    /// True when no more bytes are available.
    fn is_at_end(&mut self) -> bool;
}

/// A [`ByteSource`] over an in-memory byte slice.
///
/// Der Referenz-Collaborator für Tests und In-Memory-Dokumente. `base` erlaubt
/// es, einen Ausschnitt eines größeren Streams mit seinen Original-Offsets zu
/// scannen (Save-Point-Re-Scan von Annotationen).
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
    base: u64,
}

impl<'a> SliceSource<'a> {
    /// Creates a source over `data` reporting positions starting at 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// Creates a source over `data` reporting positions starting at `base`.
    pub fn with_base(data: &'a [u8], base: u64) -> Self {
        Self { data, pos: 0, base }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn skip(&mut self, n: usize) -> Result<usize> {
        let n = n.min(self.remaining());
        self.pos += n;
        Ok(n)
    }

    #[inline]
    fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    #[inline]
    fn is_at_end(&mut self) -> bool {
        self.pos >= self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_byte_advances_position() {
        let mut s = SliceSource::new(&[1, 2, 3]);
        assert_eq!(s.position(), 0);
        assert_eq!(s.read_byte().unwrap(), Some(1));
        assert_eq!(s.read_byte().unwrap(), Some(2));
        assert_eq!(s.position(), 2);
    }

    #[test]
    fn read_byte_none_at_end() {
        let mut s = SliceSource::new(&[]);
        assert!(s.is_at_end());
        assert_eq!(s.read_byte().unwrap(), None);
        // End of input is sticky, not an error.
        assert_eq!(s.read_byte().unwrap(), None);
    }

    #[test]
    fn read_into_short_at_end() {
        let mut s = SliceSource::new(&[9, 8]);
        let mut buf = [0u8; 4];
        assert_eq!(s.read_into(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[9, 8]);
        assert_eq!(s.read_into(&mut buf).unwrap(), 0);
    }

    #[test]
    fn skip_clamps_to_remaining() {
        let mut s = SliceSource::new(&[0; 5]);
        assert_eq!(s.skip(3).unwrap(), 3);
        assert_eq!(s.skip(10).unwrap(), 2);
        assert_eq!(s.position(), 5);
    }

    #[test]
    fn base_offsets_positions() {
        let mut s = SliceSource::with_base(&[7], 100);
        assert_eq!(s.position(), 100);
        s.read_byte().unwrap();
        assert_eq!(s.position(), 101);
    }
}
