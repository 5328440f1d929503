//! Pull reader: the raw cursor paired with a symbol table handle.
//!
//! Der Reader übersetzt positionierte Werte in decodierte Repräsentationen:
//! Payloads werden höchstens einmal gelesen (danach bedient der Cache), Text
//! wird strikt validiert, Symbol-IDs werden über das geliehene Handle
//! aufgelöst. Traversierung (next/step_in/step_out) delegiert unverändert an
//! den Cursor.

use num_bigint::BigInt;

use crate::cursor::RawCursor;
use crate::decimal::Decimal;
use crate::descriptor::{TypeTag, ValueType};
use crate::integer::{self, IntRepr};
use crate::source::ByteSource;
use crate::symbol::{SymbolId, SymbolLookup, MAX_SYMBOL_ID};
use crate::timestamp::Timestamp;
use crate::value::Scalar;
use crate::{float, text};
use crate::{Error, Result};

/// A pull reader over one binary stream, resolving symbols through a
/// borrowed [`SymbolLookup`].
///
/// Scalar getters decode the current value's payload on first access and
/// answer later calls from the value cache; numeric views follow the cache's
/// coercion rules.
pub struct Reader<'sym, S: ByteSource> {
    cursor: RawCursor<S>,
    symbols: &'sym dyn SymbolLookup,
}

impl<'sym, S: ByteSource> Reader<'sym, S> {
    /// Creates a reader over `source` resolving symbol IDs via `symbols`.
    pub fn new(source: S, symbols: &'sym dyn SymbolLookup) -> Self {
        Self { cursor: RawCursor::new(source), symbols }
    }

    // --- traversal ---

    /// See [`RawCursor::has_next`].
    pub fn has_next(&mut self) -> Result<bool> {
        self.cursor.has_next()
    }

    /// See [`RawCursor::next`].
    pub fn next(&mut self) -> Result<Option<ValueType>> {
        self.cursor.next()
    }

    /// See [`RawCursor::step_in`].
    pub fn step_in(&mut self) -> Result<()> {
        self.cursor.step_in()
    }

    /// See [`RawCursor::step_out`].
    pub fn step_out(&mut self) -> Result<()> {
        self.cursor.step_out()
    }

    /// Container nesting depth; 0 at top level.
    pub fn depth(&self) -> usize {
        self.cursor.depth()
    }

    /// True while positioned inside a struct.
    pub fn is_in_struct(&self) -> bool {
        self.cursor.is_in_struct()
    }

    /// Absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    // --- current value header ---

    /// The type of the current value.
    pub fn value_type(&self) -> Result<ValueType> {
        self.cursor.value_type()
    }

    /// True when the current value is a null.
    pub fn is_null(&self) -> Result<bool> {
        self.cursor.is_null()
    }

    /// Field ID of the current value inside a struct.
    pub fn field_id(&self) -> Option<SymbolId> {
        self.cursor.field_id()
    }

    /// Resolved field name, `None` when there is no field context.
    pub fn field_name(&self) -> Result<Option<&str>> {
        match self.cursor.field_id() {
            None => Ok(None),
            Some(sid) => self
                .symbols
                .find_text(sid)
                .map(Some)
                .ok_or(Error::UnknownSymbol(sid)),
        }
    }

    /// Annotation symbol IDs of the current value, outermost first.
    pub fn annotation_ids(&self) -> &[SymbolId] {
        self.cursor.annotations()
    }

    /// Resolved annotation texts, outermost first.
    pub fn annotations(&self) -> Result<Vec<&str>> {
        self.cursor
            .annotations()
            .iter()
            .map(|&sid| self.symbols.find_text(sid).ok_or(Error::UnknownSymbol(sid)))
            .collect()
    }

    // --- scalar getters ---

    /// The boolean value.
    pub fn bool_value(&mut self) -> Result<bool> {
        self.load_scalar("bool", false)?;
        self.cursor.cache().bool_value()
    }

    /// The integer value narrowed to `i32`.
    pub fn int_value(&mut self) -> Result<i32> {
        self.load_scalar("int", false)?;
        self.cursor.cache().int_value()
    }

    /// The integer value as `i64`.
    pub fn long_value(&mut self) -> Result<i64> {
        self.load_scalar("int", false)?;
        self.cursor.cache().long_value()
    }

    /// The integer value at full precision.
    pub fn big_integer_value(&mut self) -> Result<BigInt> {
        self.load_scalar("int", false)?;
        self.cursor.cache_mut().big_integer_value()
    }

    /// The value as binary64, coercing integers and decimals.
    pub fn double_value(&mut self) -> Result<f64> {
        self.load_scalar("float", false)?;
        self.cursor.cache_mut().double_value()
    }

    /// The value as an exact decimal, widening integers.
    pub fn decimal_value(&mut self) -> Result<Decimal> {
        self.load_scalar("decimal", false)?;
        self.cursor.cache_mut().decimal_value()
    }

    /// The timestamp value.
    pub fn timestamp_value(&mut self) -> Result<Timestamp> {
        self.load_scalar("timestamp", false)?;
        self.cursor.cache().timestamp_value()
    }

    /// The symbol ID of the current symbol value.
    pub fn symbol_id(&mut self) -> Result<SymbolId> {
        let vtype = self.load_scalar("symbol", true)?;
        if vtype != ValueType::Symbol {
            return Err(Error::TypeMismatch { from: vtype.name(), to: "symbol" });
        }
        Ok(self.cursor.cache().long_value()? as SymbolId)
    }

    /// Text of the current string, or resolved text of the current symbol.
    pub fn string_value(&mut self) -> Result<String> {
        let vtype = self.load_scalar("text", true)?;
        match vtype {
            ValueType::String => Ok(self.cursor.cache().text()?.to_owned()),
            ValueType::Symbol => {
                let sid = self.cursor.cache().long_value()? as SymbolId;
                self.symbols
                    .find_text(sid)
                    .map(str::to_owned)
                    .ok_or(Error::UnknownSymbol(sid))
            }
            _ => Err(Error::TypeMismatch { from: vtype.name(), to: "text" }),
        }
    }

    // --- lobs ---

    /// Declared byte size of the current blob or clob.
    pub fn lob_byte_size(&self) -> Result<u64> {
        self.cursor.lob_byte_size()
    }

    /// Reads the next chunk of the current lob; see [`RawCursor::lob_read`].
    pub fn read_lob(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.cursor.lob_read(buf)
    }

    /// Drains the rest of the current lob into one buffer.
    pub fn lob_bytes(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = self.cursor.lob_read(&mut chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    // --- decoding ---

    /// Decodes the current scalar payload into the cache, once. `symbol_ok`
    /// permits symbol values (whose cached representation is their ID).
    fn load_scalar(&mut self, want: &'static str, symbol_ok: bool) -> Result<ValueType> {
        let vtype = self.cursor.value_type()?;
        if vtype.is_container() || vtype.is_lob() {
            return Err(Error::TypeMismatch { from: vtype.name(), to: want });
        }
        if vtype == ValueType::Symbol && !symbol_ok {
            return Err(Error::TypeMismatch { from: "symbol", to: want });
        }
        if self.cursor.cache().is_loaded() {
            return Ok(vtype);
        }
        if self.cursor.is_null()? {
            self.cursor.cache_mut().load(Scalar::Null(vtype));
            return Ok(vtype);
        }
        let position = self.cursor.value_body_start();
        let scalar = match vtype {
            ValueType::Bool => Scalar::Bool(self.cursor.value_is_true()),
            ValueType::Int => {
                let negative = self.cursor.value_tag() == Some(TypeTag::NegInt);
                let payload = self.cursor.read_value_bytes()?;
                match integer::decode(&payload, negative) {
                    IntRepr::Small(v) => Scalar::Int(v),
                    IntRepr::Large(v) => Scalar::BigInt(v),
                }
            }
            ValueType::Float => {
                let payload = self.cursor.read_value_bytes()?;
                Scalar::Float(float::decode(&payload, position)?)
            }
            ValueType::Decimal => {
                let payload = self.cursor.read_value_bytes()?;
                Scalar::Decimal(Decimal::decode(&payload, position)?)
            }
            ValueType::Timestamp => {
                let payload = self.cursor.read_value_bytes()?;
                match Timestamp::decode(&payload, position)? {
                    Some(ts) => Scalar::Timestamp(ts),
                    // zero-length payload: "no timestamp", read as a null
                    None => Scalar::Null(ValueType::Timestamp),
                }
            }
            ValueType::Symbol => {
                let payload = self.cursor.read_value_bytes()?;
                let id = if payload.len() <= 8 {
                    integer::fold_u64(&payload)
                } else {
                    u64::MAX
                };
                if id == 0 || id > u64::from(MAX_SYMBOL_ID) {
                    return Err(Error::SymbolIdOutOfRange { id, position });
                }
                Scalar::Int(id as i64)
            }
            ValueType::String => {
                let payload = self.cursor.read_value_bytes()?;
                Scalar::Text(text::decode(&payload, position)?)
            }
            // the null tag only encodes nulls, handled above
            ValueType::Null => return Err(Error::NullValue),
            ValueType::Clob | ValueType::Blob | ValueType::List | ValueType::Sexp
            | ValueType::Struct => {
                return Err(Error::TypeMismatch { from: vtype.name(), to: want })
            }
        };
        self.cursor.cache_mut().load(scalar);
        Ok(vtype)
    }
}
