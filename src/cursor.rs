//! Raw pull cursor over the Ion 1.0 binary encoding.
//!
//! Der Cursor ist die untere Hälfte des Readers: er kennt Positionen, Längen,
//! Header und Container-Budgets, aber keine Payload-Semantik. Vorwärts-only —
//! jedes Byte wird höchstens einmal aus der Quelle gelesen; der einzige
//! "Rücksprung" ist der Re-Scan des Annotation-Blocks über den Save-Point.
//!
//! Budget-Führung: jeder Container kennt die Restbytes seines Rumpfs
//! (`local_remaining`, `None` auf Top-Level). Header-Bytes werden beim Lesen
//! abgebucht, die deklarierte Rumpflänge eines Werts sofort beim
//! Header-Abschluss — ein Kind, das mehr deklariert als der Elternteil noch
//! hat, scheitert dort und nicht erst beim Überspringen.

use log::trace;

use crate::descriptor::{
    self, TypeTag, ValueType, LN_BOOL_FALSE, LN_BOOL_TRUE, LN_NULL, LN_ORDERED_STRUCT,
    LN_VAR_LEN, VERSION_MARKER, VERSION_MARKER_SID,
};
use crate::save_point::SavePoint;
use crate::source::ByteSource;
use crate::symbol::{SymbolId, MAX_SYMBOL_ID};
use crate::value::{Scalar, ValueCache};
use crate::varint::{read_var_uint, try_read_var_uint};
use crate::{Error, Result};

/// Cursor position relative to the value grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At a field boundary inside a struct, field ID not yet read.
    BeforeFieldId,
    /// At a value boundary, descriptor byte not yet read.
    BeforeTypeDescriptor,
    /// Header fully read, payload untouched.
    BeforeValueBody,
    /// Payload consumed (scalar decoded or lob drained).
    AfterValue,
    /// Top-level end of input. Sticky.
    EndOfInput,
}

/// The kind of container the cursor is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerType {
    TopLevel,
    List,
    Sexp,
    Struct,
}

impl ContainerType {
    fn boundary_state(self) -> State {
        if self == Self::Struct {
            State::BeforeFieldId
        } else {
            State::BeforeTypeDescriptor
        }
    }
}

/// One suspended enclosing container, restored by `step_out`.
#[derive(Debug)]
struct DepthFrame {
    /// Absolute offset of the first byte after the entered container's body.
    resume_position: u64,
    /// Container kind to restore as `parent`.
    parent: ContainerType,
    /// Parent's remaining budget to restore (already net of the entered
    /// container's body).
    remaining: Option<u64>,
}

/// Forward-only structural cursor. Pairs with a symbol table handle in
/// [`Reader`](crate::reader::Reader) for the full value surface.
///
/// Zwischen `next()` und dem nächsten Vorrücken sind Header-Zustand
/// (Typ, Null-Flag, Feld-ID, Annotationen) und Payload-Zugriffe gültig.
#[derive(Debug)]
pub struct RawCursor<S: ByteSource> {
    source: S,
    state: State,
    /// True while the current value (if any) must be passed before the next
    /// header can be read.
    needs_advance: bool,
    /// No further sibling at the current depth.
    at_end: bool,
    parent: ContainerType,
    /// Unread bytes of the current container body; `None` at top level.
    local_remaining: Option<u64>,
    depth_stack: Vec<DepthFrame>,

    value_tag: Option<TypeTag>,
    value_type: Option<ValueType>,
    value_len: u64,
    value_body_start: u64,
    value_is_null: bool,
    value_is_true: bool,
    field_id: Option<SymbolId>,
    annotations: SavePoint,
    annotation_ids: Vec<SymbolId>,
    lob_remaining: u64,
    cache: ValueCache,
}

impl<S: ByteSource> RawCursor<S> {
    /// Creates a cursor at the start of `source`, positioned before the first
    /// top-level value.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: State::BeforeTypeDescriptor,
            needs_advance: true,
            at_end: false,
            parent: ContainerType::TopLevel,
            local_remaining: None,
            depth_stack: Vec::new(),
            value_tag: None,
            value_type: None,
            value_len: 0,
            value_body_start: 0,
            value_is_null: false,
            value_is_true: false,
            field_id: None,
            annotations: SavePoint::new(),
            annotation_ids: Vec::new(),
            lob_remaining: 0,
            cache: ValueCache::new(),
        }
    }

    // --- traversal ---

    /// True when another value exists at the current depth. Idempotent:
    /// repeated calls without `next()` inspect the same boundary.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.needs_advance {
            self.advance()?;
            self.needs_advance = false;
        }
        Ok(!self.at_end)
    }

    /// Positions the cursor on the next value and returns its type, or
    /// `None` at the end of the current depth.
    pub fn next(&mut self) -> Result<Option<ValueType>> {
        if !self.has_next()? {
            return Ok(None);
        }
        self.needs_advance = true;
        Ok(self.value_type)
    }

    /// Enters the current container value. The cursor is positioned before
    /// the container's first child; there is no current value afterwards.
    pub fn step_in(&mut self) -> Result<()> {
        let vtype = self.value_type.ok_or(Error::NoCurrentValue)?;
        if !vtype.is_container() {
            return Err(Error::NotAContainer);
        }
        if self.value_is_null {
            return Err(Error::StepIntoNull);
        }
        self.depth_stack.push(DepthFrame {
            resume_position: self.value_body_start + self.value_len,
            parent: self.parent,
            remaining: self.local_remaining,
        });
        self.parent = match vtype {
            ValueType::List => ContainerType::List,
            ValueType::Sexp => ContainerType::Sexp,
            _ => ContainerType::Struct,
        };
        self.local_remaining = Some(self.value_len);
        self.state = self.parent.boundary_state();
        self.clear_value();
        self.needs_advance = true;
        self.at_end = false;
        trace!("step_in {} depth={}", vtype, self.depth_stack.len());
        Ok(())
    }

    /// Leaves the current container, skipping any unread children, and
    /// positions the cursor after the container value in its parent.
    ///
    /// At depth 0 this fails without touching any cursor state.
    pub fn step_out(&mut self) -> Result<()> {
        let frame = match self.depth_stack.pop() {
            Some(f) => f,
            None => return Err(Error::StepOutAtTopLevel),
        };
        let pos = self.source.position();
        if pos > frame.resume_position {
            return Err(Error::PositionMismatch { expected: frame.resume_position, actual: pos });
        }
        self.skip_bytes(frame.resume_position - pos)?;
        self.parent = frame.parent;
        self.local_remaining = frame.remaining;
        self.state = self.parent.boundary_state();
        self.clear_value();
        self.needs_advance = true;
        self.at_end = false;
        trace!("step_out to depth={}", self.depth_stack.len());
        Ok(())
    }

    // --- header accessors ---

    /// The type of the current value.
    pub fn value_type(&self) -> Result<ValueType> {
        self.value_type.ok_or(Error::NoCurrentValue)
    }

    /// True when the current value is a null (typed or untyped).
    pub fn is_null(&self) -> Result<bool> {
        self.value_type()?;
        Ok(self.value_is_null)
    }

    /// Field ID of the current value, when inside a struct.
    pub fn field_id(&self) -> Option<SymbolId> {
        self.field_id
    }

    /// Annotation symbol IDs of the current value, outermost first. Empty
    /// for unannotated values.
    pub fn annotations(&self) -> &[SymbolId] {
        &self.annotation_ids
    }

    /// True while the cursor is inside a struct.
    pub fn is_in_struct(&self) -> bool {
        self.parent == ContainerType::Struct
    }

    /// Container nesting depth; 0 at top level.
    pub fn depth(&self) -> usize {
        self.depth_stack.len()
    }

    /// Absolute offset of the next byte to be read from the source.
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    pub(crate) fn value_tag(&self) -> Option<TypeTag> {
        self.value_tag
    }

    pub(crate) fn value_body_start(&self) -> u64 {
        self.value_body_start
    }

    pub(crate) fn value_is_true(&self) -> bool {
        self.value_is_true
    }

    pub(crate) fn cache(&self) -> &ValueCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut ValueCache {
        &mut self.cache
    }

    // --- payload access ---

    /// Reads the entire payload of the current scalar value into a buffer
    /// and marks it consumed. At most one payload read per value.
    pub(crate) fn read_value_bytes(&mut self) -> Result<Vec<u8>> {
        let len = usize::try_from(self.value_len)
            .map_err(|_| Error::VarIntOverflow { position: self.value_body_start })?;
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = self.source.read_into(&mut buf[filled..])?;
            if n == 0 {
                return Err(Error::UnexpectedEof { position: self.source.position() });
            }
            filled += n;
        }
        self.state = State::AfterValue;
        Ok(buf)
    }

    /// Declared byte size of the current blob or clob.
    pub fn lob_byte_size(&self) -> Result<u64> {
        self.lob_guard()?;
        Ok(self.value_len)
    }

    /// Reads up to `buf.len()` lob bytes and returns the count, 0 once the
    /// lob is drained. Successive calls continue where the last one stopped.
    pub fn lob_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.lob_guard()?;
        let want = buf
            .len()
            .min(usize::try_from(self.lob_remaining).unwrap_or(usize::MAX));
        let mut filled = 0;
        while filled < want {
            let n = self.source.read_into(&mut buf[filled..want])?;
            if n == 0 {
                return Err(Error::UnexpectedEof { position: self.source.position() });
            }
            filled += n;
        }
        self.lob_remaining -= filled as u64;
        if self.lob_remaining == 0 {
            self.state = State::AfterValue;
        }
        Ok(filled)
    }

    fn lob_guard(&self) -> Result<()> {
        let vtype = self.value_type.ok_or(Error::NoCurrentValue)?;
        if !vtype.is_lob() {
            return Err(Error::NotALobValue);
        }
        if self.value_is_null {
            return Err(Error::NullValue);
        }
        Ok(())
    }

    // --- advancing ---

    /// Moves past the current value (if any) and reads the next header at
    /// the current depth, or detects the end of the container/stream.
    fn advance(&mut self) -> Result<()> {
        if matches!(self.state, State::BeforeValueBody | State::AfterValue) {
            let end = self.value_body_start + self.value_len;
            let pos = self.source.position();
            if pos < end {
                self.skip_bytes(end - pos)?;
            }
        }
        self.clear_value();
        if self.at_end {
            return Ok(());
        }
        if self.local_remaining == Some(0) {
            // container body exhausted; only step_out makes progress now
            self.at_end = true;
            self.state = self.parent.boundary_state();
            return Ok(());
        }
        if self.parent == ContainerType::Struct {
            self.state = State::BeforeFieldId;
            let before = self.source.position();
            let id = read_var_uint(&mut self.source)?;
            self.charge(self.source.position() - before, before)?;
            if id > u64::from(MAX_SYMBOL_ID) {
                return Err(Error::SymbolIdOutOfRange { id, position: before });
            }
            self.field_id = Some(id as SymbolId);
        }
        self.state = State::BeforeTypeDescriptor;
        let desc_pos = self.source.position();
        let byte = match self.source.read_byte()? {
            Some(b) => b,
            None => {
                if self.parent == ContainerType::TopLevel {
                    self.at_end = true;
                    self.state = State::EndOfInput;
                    return Ok(());
                }
                // a container with budget left must not run out of bytes
                return Err(Error::UnexpectedEof { position: desc_pos });
            }
        };
        self.charge(1, desc_pos)?;
        self.read_value_header(byte, desc_pos, false)
    }

    /// Interprets a descriptor byte. `annotated` is true when the byte was
    /// reached through an annotation wrapper.
    fn read_value_header(&mut self, byte: u8, desc_pos: u64, annotated: bool) -> Result<()> {
        let (tag_nibble, len_nibble) = descriptor::split(byte);
        let tag = TypeTag::from_nibble(tag_nibble)
            .ok_or(Error::InvalidTypeDescriptor { descriptor: byte, position: desc_pos })?;
        if tag == TypeTag::Annotation {
            if annotated {
                return Err(Error::NestedAnnotation { position: desc_pos });
            }
            return self.read_annotated_header(byte, len_nibble, desc_pos);
        }
        let vtype = tag
            .value_type()
            .ok_or(Error::InvalidTypeDescriptor { descriptor: byte, position: desc_pos })?;

        let mut is_null = false;
        let mut is_true = false;
        let len: u64 = match tag {
            TypeTag::Null => {
                if len_nibble != LN_NULL {
                    return Err(Error::InvalidTypeDescriptor {
                        descriptor: byte,
                        position: desc_pos,
                    });
                }
                is_null = true;
                0
            }
            TypeTag::Bool => match len_nibble {
                LN_BOOL_FALSE => 0,
                LN_BOOL_TRUE => {
                    is_true = true;
                    0
                }
                LN_NULL => {
                    is_null = true;
                    0
                }
                n => return Err(Error::InvalidBooleanFlag { nibble: n, position: desc_pos }),
            },
            TypeTag::Struct if len_nibble == LN_ORDERED_STRUCT => {
                let len = self.read_var_uint_charged()?;
                if len == 0 {
                    return Err(Error::InvalidOrderedStructLength { position: desc_pos });
                }
                len
            }
            _ => match len_nibble {
                LN_NULL => {
                    is_null = true;
                    0
                }
                LN_VAR_LEN => self.read_var_uint_charged()?,
                n => u64::from(n),
            },
        };

        // charge the declared body now so an oversize child fails here
        if let Some(rem) = self.local_remaining {
            if len > rem {
                return Err(Error::ContainerExceedsParent {
                    declared: len,
                    available: rem,
                    position: desc_pos,
                });
            }
            self.local_remaining = Some(rem - len);
        }

        self.value_tag = Some(tag);
        self.value_type = Some(vtype);
        self.value_len = len;
        self.value_body_start = self.source.position();
        self.value_is_null = is_null;
        self.value_is_true = is_true;
        self.lob_remaining = if vtype.is_lob() && !is_null { len } else { 0 };
        self.state = State::BeforeValueBody;
        trace!("value {} len={} at {}", vtype, len, desc_pos);
        Ok(())
    }

    /// Handles the annotation-wrapper tag: either the 4-byte version marker
    /// (length nibble 0, top level only) or a real wrapper with its two-phase
    /// lookahead over the annotation block.
    fn read_annotated_header(&mut self, byte: u8, len_nibble: u8, desc_pos: u64) -> Result<()> {
        if len_nibble == 0 {
            if self.parent != ContainerType::TopLevel {
                return Err(Error::InvalidTypeDescriptor { descriptor: byte, position: desc_pos });
            }
            return self.read_version_marker(desc_pos);
        }
        if len_nibble == LN_NULL {
            return Err(Error::InvalidTypeDescriptor { descriptor: byte, position: desc_pos });
        }
        let wrapper_len = if len_nibble == LN_VAR_LEN {
            self.read_var_uint_charged()?
        } else {
            u64::from(len_nibble)
        };
        // minimum wrapper: annotation-block length, one annotation ID, one
        // descriptor byte
        if wrapper_len < 3 {
            return Err(Error::InvalidTypeDescriptor { descriptor: byte, position: desc_pos });
        }
        let wrapper_body_start = self.source.position();
        let block_len = self.read_var_uint_charged()?;
        if block_len == 0 {
            return Err(Error::InvalidTypeDescriptor { descriptor: byte, position: desc_pos });
        }

        // phase one: capture the annotation block and look past it
        let block_start = self.source.position();
        let block_size = usize::try_from(block_len)
            .map_err(|_| Error::VarIntOverflow { position: block_start })?;
        self.charge(block_len, block_start)?;
        let buf = self.annotations.mark(block_start, block_size);
        let mut filled = 0;
        while filled < block_size {
            let n = self.source.read_into(&mut buf[filled..])?;
            if n == 0 {
                return Err(Error::UnexpectedEof { position: block_start + filled as u64 });
            }
            filled += n;
        }

        let inner_pos = self.source.position();
        let inner = self
            .source
            .read_byte()?
            .ok_or(Error::UnexpectedEof { position: inner_pos })?;
        self.charge(1, inner_pos)?;
        self.read_value_header(inner, inner_pos, true)?;

        // the wrapper length must cover its contents exactly
        let actual = (self.value_body_start - wrapper_body_start) + self.value_len;
        if actual != wrapper_len {
            return Err(Error::AnnotationLengthMismatch {
                declared: wrapper_len,
                actual,
                position: desc_pos,
            });
        }

        // phase two: re-scan the captured block for the annotation IDs; the
        // block must end exactly at an ID boundary
        let mut scan = self.annotations.scanner();
        loop {
            let id_pos = scan.position();
            let id = match try_read_var_uint(&mut scan)? {
                Some(id) => id,
                None => break,
            };
            if id > u64::from(MAX_SYMBOL_ID) {
                return Err(Error::SymbolIdOutOfRange { id, position: id_pos });
            }
            self.annotation_ids.push(id as SymbolId);
        }
        Ok(())
    }

    /// Consumes the 3-byte tail of the version marker and synthesizes the
    /// marker as a symbol value with its well-known ID, already decoded.
    fn read_version_marker(&mut self, desc_pos: u64) -> Result<()> {
        let mut tail = [0u8; 3];
        let mut filled = 0;
        while filled < tail.len() {
            let n = self.source.read_into(&mut tail[filled..])?;
            if n == 0 {
                return Err(Error::UnexpectedEof { position: self.source.position() });
            }
            filled += n;
        }
        if tail[..] != VERSION_MARKER[1..] {
            return Err(Error::InvalidVersionMarker { position: desc_pos });
        }
        self.value_tag = Some(TypeTag::Symbol);
        self.value_type = Some(ValueType::Symbol);
        self.value_len = 0;
        self.value_body_start = self.source.position();
        self.cache.load(Scalar::Int(i64::from(VERSION_MARKER_SID)));
        self.state = State::BeforeValueBody;
        trace!("version marker at {}", desc_pos);
        Ok(())
    }

    // --- bookkeeping ---

    fn clear_value(&mut self) {
        self.value_tag = None;
        self.value_type = None;
        self.value_len = 0;
        self.value_body_start = self.source.position();
        self.value_is_null = false;
        self.value_is_true = false;
        self.field_id = None;
        self.annotations.clear();
        self.annotation_ids.clear();
        self.lob_remaining = 0;
        self.cache.clear();
    }

    /// Deducts `n` consumed header bytes from the container budget.
    fn charge(&mut self, n: u64, position: u64) -> Result<()> {
        if let Some(rem) = self.local_remaining {
            if n > rem {
                return Err(Error::UnexpectedEof { position });
            }
            self.local_remaining = Some(rem - n);
        }
        Ok(())
    }

    fn read_var_uint_charged(&mut self) -> Result<u64> {
        let before = self.source.position();
        let v = read_var_uint(&mut self.source)?;
        self.charge(self.source.position() - before, before)?;
        Ok(v)
    }

    /// Forward skip in source-sized chunks; running out of bytes while
    /// skipping declared content is a truncation error.
    fn skip_bytes(&mut self, mut n: u64) -> Result<()> {
        while n > 0 {
            let step = usize::try_from(n).unwrap_or(usize::MAX);
            let skipped = self.source.skip(step)?;
            if skipped == 0 {
                return Err(Error::UnexpectedEof { position: self.source.position() });
            }
            n -= skipped as u64;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;

    fn cursor(bytes: &[u8]) -> RawCursor<SliceSource<'_>> {
        RawCursor::new(SliceSource::new(bytes))
    }

    // --- top-level traversal ---

    #[test]
    fn empty_input_has_no_values() {
        let mut c = cursor(&[]);
        assert!(!c.has_next().unwrap());
        assert_eq!(c.next().unwrap(), None);
        assert_eq!(c.value_type(), Err(Error::NoCurrentValue));
    }

    #[test]
    fn booleans_from_the_length_nibble() {
        let mut c = cursor(&[0x11, 0x10, 0x1F]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        assert!(c.value_is_true());
        assert!(!c.is_null().unwrap());
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        assert!(!c.value_is_true());
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        assert!(c.is_null().unwrap());
        assert_eq!(c.next().unwrap(), None);
    }

    #[test]
    fn has_next_is_idempotent() {
        let mut c = cursor(&[0x21, 0x0A]);
        assert!(c.has_next().unwrap());
        assert!(c.has_next().unwrap());
        assert!(c.has_next().unwrap());
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x0A]);
        assert!(!c.has_next().unwrap());
    }

    /// Unread payloads are skipped when the cursor advances.
    #[test]
    fn advance_skips_unconsumed_payload() {
        let mut c = cursor(&[0x21, 0x01, 0x21, 0x02]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x02]);
    }

    #[test]
    fn typed_and_untyped_nulls() {
        let mut c = cursor(&[0x0F, 0x2F, 0xBF]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Null));
        assert!(c.is_null().unwrap());
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert!(c.is_null().unwrap());
        assert_eq!(c.next().unwrap(), Some(ValueType::List));
        assert!(c.is_null().unwrap());
    }

    #[test]
    fn variable_length_scalar() {
        let mut c = cursor(&[0x2E, 0x81, 0x2A]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x2A]);
    }

    // --- version marker ---

    #[test]
    fn version_marker_surfaces_as_symbol() {
        let mut c = cursor(&[0xE0, 0x01, 0x00, 0xEA, 0x21, 0x0A]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Symbol));
        assert!(c.annotations().is_empty());
        assert_eq!(c.field_id(), None);
        assert_eq!(
            c.cache().long_value().unwrap(),
            i64::from(VERSION_MARKER_SID)
        );
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x0A]);
    }

    #[test]
    fn version_marker_bad_tail() {
        let mut c = cursor(&[0xE0, 0x01, 0x00, 0xEB]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidVersionMarker { position: 0 }
        );
    }

    #[test]
    fn version_marker_truncated() {
        let mut c = cursor(&[0xE0, 0x01]);
        assert!(matches!(c.next().unwrap_err(), Error::UnexpectedEof { .. }));
    }

    // --- malformed descriptors ---

    #[test]
    fn reserved_type_nibble() {
        let mut c = cursor(&[0xF0]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidTypeDescriptor { descriptor: 0xF0, position: 0 }
        );
    }

    #[test]
    fn bool_with_invalid_flag() {
        let mut c = cursor(&[0x12]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidBooleanFlag { nibble: 2, position: 0 }
        );
    }

    /// The null tag admits no length other than the null sentinel.
    #[test]
    fn null_tag_with_payload_length() {
        let mut c = cursor(&[0x03]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidTypeDescriptor { descriptor: 0x03, position: 0 }
        );
    }

    #[test]
    fn truncated_length_field() {
        let mut c = cursor(&[0x2E]);
        assert!(matches!(c.next().unwrap_err(), Error::UnexpectedEof { .. }));
    }

    // --- containers ---

    #[test]
    fn list_walk() {
        // [1, true]
        let mut c = cursor(&[0xB3, 0x21, 0x01, 0x11]);
        assert_eq!(c.next().unwrap(), Some(ValueType::List));
        assert_eq!(c.depth(), 0);
        c.step_in().unwrap();
        assert_eq!(c.depth(), 1);
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x01]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        assert!(c.value_is_true());
        assert_eq!(c.next().unwrap(), None);
        c.step_out().unwrap();
        assert_eq!(c.depth(), 0);
        assert!(!c.has_next().unwrap());
    }

    #[test]
    fn struct_fields_carry_ids() {
        // {sid 10: true}
        let mut c = cursor(&[0xD2, 0x8A, 0x11]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Struct));
        assert!(!c.is_in_struct());
        c.step_in().unwrap();
        assert!(c.is_in_struct());
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        assert_eq!(c.field_id(), Some(10));
        assert_eq!(c.next().unwrap(), None);
        c.step_out().unwrap();
        assert!(!c.is_in_struct());
    }

    #[test]
    fn empty_containers() {
        let mut c = cursor(&[0xB0, 0xD0]);
        assert_eq!(c.next().unwrap(), Some(ValueType::List));
        c.step_in().unwrap();
        assert!(!c.has_next().unwrap());
        c.step_out().unwrap();
        assert_eq!(c.next().unwrap(), Some(ValueType::Struct));
        c.step_in().unwrap();
        assert_eq!(c.next().unwrap(), None);
        c.step_out().unwrap();
    }

    /// Leaving early skips the rest of the container body.
    #[test]
    fn step_out_skips_unread_children() {
        // [1, 2] then false
        let mut c = cursor(&[0xB4, 0x21, 0x01, 0x21, 0x02, 0x10]);
        c.next().unwrap();
        c.step_in().unwrap();
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        c.step_out().unwrap();
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
    }

    #[test]
    fn nested_containers_restore_parent_state() {
        // [[false], 7]
        let mut c = cursor(&[0xB4, 0xB1, 0x10, 0x21, 0x07]);
        c.next().unwrap();
        c.step_in().unwrap();
        assert_eq!(c.next().unwrap(), Some(ValueType::List));
        c.step_in().unwrap();
        assert_eq!(c.depth(), 2);
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        c.step_out().unwrap();
        assert_eq!(c.depth(), 1);
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x07]);
        assert_eq!(c.next().unwrap(), None);
        c.step_out().unwrap();
        assert!(!c.has_next().unwrap());
    }

    #[test]
    fn step_in_guards() {
        let mut c = cursor(&[0x21, 0x05, 0xBF]);
        assert_eq!(c.step_in(), Err(Error::NoCurrentValue));
        c.next().unwrap();
        assert_eq!(c.step_in(), Err(Error::NotAContainer));
        c.next().unwrap();
        assert_eq!(c.step_in(), Err(Error::StepIntoNull));
    }

    /// step_out at depth 0 fails and leaves the cursor usable.
    #[test]
    fn step_out_at_top_level_changes_nothing() {
        let mut c = cursor(&[0x21, 0x05]);
        assert_eq!(c.step_out(), Err(Error::StepOutAtTopLevel));
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.step_out(), Err(Error::StepOutAtTopLevel));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x05]);
    }

    #[test]
    fn child_longer_than_parent_fails_at_its_header() {
        // list of 2 bytes containing a value declaring 3 body bytes
        let mut c = cursor(&[0xB2, 0x23, 0x00, 0x00, 0x00]);
        c.next().unwrap();
        c.step_in().unwrap();
        assert_eq!(
            c.next().unwrap_err(),
            Error::ContainerExceedsParent { declared: 3, available: 1, position: 1 }
        );
    }

    #[test]
    fn ordered_struct_needs_nonzero_length() {
        let mut c = cursor(&[0xD1, 0x80]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidOrderedStructLength { position: 0 }
        );
    }

    #[test]
    fn ordered_struct_reads_like_a_struct() {
        let mut c = cursor(&[0xD1, 0x82, 0x8A, 0x11]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Struct));
        c.step_in().unwrap();
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        assert_eq!(c.field_id(), Some(10));
        assert_eq!(c.next().unwrap(), None);
    }

    #[test]
    fn field_id_above_range() {
        // field ID 2^31 needs five VarUInt bytes
        let mut c = cursor(&[0xD6, 0x08, 0x00, 0x00, 0x00, 0x80, 0x11]);
        c.next().unwrap();
        c.step_in().unwrap();
        assert_eq!(
            c.next().unwrap_err(),
            Error::SymbolIdOutOfRange { id: 1 << 31, position: 1 }
        );
    }

    #[test]
    fn truncated_container_body() {
        // struct declares 4 bytes, stream ends after 2
        let mut c = cursor(&[0xD4, 0x8A, 0x21]);
        c.next().unwrap();
        c.step_in().unwrap();
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert!(matches!(c.next().unwrap_err(), Error::UnexpectedEof { .. }));
    }

    // --- annotations ---

    #[test]
    fn annotated_value_exposes_ids() {
        // sid 10 :: int 5
        let mut c = cursor(&[0xE4, 0x81, 0x8A, 0x21, 0x05]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.annotations(), &[10]);
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x05]);
        assert!(!c.has_next().unwrap());
    }

    #[test]
    fn multiple_annotations_in_order() {
        // sid 10 :: sid 11 :: false
        let mut c = cursor(&[0xE4, 0x82, 0x8A, 0x8B, 0x10]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Bool));
        assert_eq!(c.annotations(), &[10, 11]);
    }

    #[test]
    fn annotations_cleared_on_advance() {
        let mut c = cursor(&[0xE4, 0x81, 0x8A, 0x21, 0x05, 0x11]);
        c.next().unwrap();
        assert_eq!(c.annotations(), &[10]);
        c.next().unwrap();
        assert!(c.annotations().is_empty());
    }

    #[test]
    fn annotated_container_walk() {
        // sid 10 :: [7]
        let mut c = cursor(&[0xE5, 0x81, 0x8A, 0xB2, 0x21, 0x07]);
        assert_eq!(c.next().unwrap(), Some(ValueType::List));
        assert_eq!(c.annotations(), &[10]);
        c.step_in().unwrap();
        assert!(c.annotations().is_empty());
        assert_eq!(c.next().unwrap(), Some(ValueType::Int));
        assert_eq!(c.read_value_bytes().unwrap(), vec![0x07]);
        c.step_out().unwrap();
    }

    /// The annotation block must end exactly at an ID boundary; an ID cut
    /// off by the end of the block is a truncation error.
    #[test]
    fn truncated_annotation_id() {
        // block byte 0x0A has its stop bit clear
        let mut c = cursor(&[0xE4, 0x81, 0x0A, 0x21, 0x05]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::UnexpectedEof { position: 3 }
        );
    }

    /// A wrapper length that disagrees with the span of block plus wrapped
    /// value is malformed, even when every component parses.
    #[test]
    fn wrapper_length_must_match_contents() {
        // declares 5 wrapper bytes, contents span 4
        let mut c = cursor(&[0xE5, 0x81, 0x8A, 0x21, 0x05]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::AnnotationLengthMismatch { declared: 5, actual: 4, position: 0 }
        );
    }

    #[test]
    fn nested_annotation_wrapper_is_malformed() {
        let mut c = cursor(&[0xE5, 0x81, 0x8A, 0xE3, 0x81, 0x8B]);
        assert_eq!(c.next().unwrap_err(), Error::NestedAnnotation { position: 3 });
    }

    #[test]
    fn wrapper_with_empty_annotation_block() {
        let mut c = cursor(&[0xE3, 0x80, 0x21, 0x05]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidTypeDescriptor { descriptor: 0xE3, position: 0 }
        );
    }

    #[test]
    fn wrapper_too_short() {
        let mut c = cursor(&[0xE2, 0x81, 0x8A]);
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidTypeDescriptor { descriptor: 0xE2, position: 0 }
        );
    }

    /// The wrapper tag with length nibble 0 is only the version marker, and
    /// only at the top level.
    #[test]
    fn version_marker_inside_container() {
        let mut c = cursor(&[0xB4, 0xE0, 0x01, 0x00, 0xEA]);
        c.next().unwrap();
        c.step_in().unwrap();
        assert_eq!(
            c.next().unwrap_err(),
            Error::InvalidTypeDescriptor { descriptor: 0xE0, position: 1 }
        );
    }

    // --- lobs ---

    #[test]
    fn lob_reads_in_chunks() {
        let mut c = cursor(&[0xA4, 1, 2, 3, 4]);
        assert_eq!(c.next().unwrap(), Some(ValueType::Blob));
        assert_eq!(c.lob_byte_size().unwrap(), 4);
        let mut buf = [0u8; 3];
        assert_eq!(c.lob_read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(c.lob_read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 4);
        assert_eq!(c.lob_read(&mut buf).unwrap(), 0);
        assert!(!c.has_next().unwrap());
    }

    #[test]
    fn lob_guards() {
        let mut c = cursor(&[0x21, 0x05, 0x9F]);
        c.next().unwrap();
        assert_eq!(c.lob_byte_size(), Err(Error::NotALobValue));
        c.next().unwrap();
        assert_eq!(c.value_type().unwrap(), ValueType::Clob);
        assert_eq!(c.lob_byte_size(), Err(Error::NullValue));
    }

    #[test]
    fn truncated_scalar_payload() {
        let mut c = cursor(&[0x24, 0x00]);
        c.next().unwrap();
        assert!(matches!(
            c.read_value_bytes().unwrap_err(),
            Error::UnexpectedEof { .. }
        ));
    }
}
