//! Save-Point Buffer: a marked, re-scannable byte range already consumed
//! from the source.
//!
//! Der Zwei-Phasen-Lookahead für Annotationen liest über den Annotation-Block
//! hinweg, um den Descriptor des eigentlichen Werts zu erreichen, und muss den
//! Block später erneut interpretieren. Quellen ohne Rewind können das nur über
//! einen expliziten Puffer: die Bytes werden beim Überlesen hierher kopiert
//! und über [`SavePoint::scanner`] mit ihren Original-Offsets erneut gelesen.
//!
//! Der interne Puffer wächst bei Bedarf (Verdopplung via `Vec`) und wird über
//! Markierungen hinweg wiederverwendet; externes Aliasing gibt es nicht.

use crate::source::SliceSource;

/// A single re-scannable byte range. At most one range is marked at a time;
/// marking again replaces the previous range.
#[derive(Debug, Default)]
pub struct SavePoint {
    buf: Vec<u8>,
    start: u64,
    defined: bool,
}

impl SavePoint {
    /// Creates an empty, undefined save point.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a marked range is available for re-scanning.
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Absolute stream offset of the first marked byte.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of bytes in the marked range.
    pub fn len(&self) -> usize {
        if self.defined {
            self.buf.len()
        } else {
            0
        }
    }

    /// True when no range is marked or the marked range is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks a new range of `len` bytes starting at stream offset `start` and
    /// returns the buffer slice the caller must fill with those bytes.
    ///
    /// Die Kapazität des Puffers bleibt über clear() hinweg erhalten.
    pub fn mark(&mut self, start: u64, len: usize) -> &mut [u8] {
        self.buf.clear();
        self.buf.resize(len, 0);
        self.start = start;
        self.defined = true;
        &mut self.buf
    }

    /// Drops the marked range. The buffer capacity is retained.
    pub fn clear(&mut self) {
        self.defined = false;
        self.buf.clear();
    }

    /// A [`SliceSource`] over the marked range, reporting the original stream
    /// offsets. Scanning does not consume the mark; call [`clear`](Self::clear)
    /// once the range is no longer needed.
    pub fn scanner(&self) -> SliceSource<'_> {
        debug_assert!(self.defined, "scanner() on an undefined save point");
        SliceSource::with_base(&self.buf, self.start)
    }
}
