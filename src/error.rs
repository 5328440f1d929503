//! Central error types for the Ion 1.0 binary reader.
//!
//! Die Taxonomie folgt den Fehlerklassen des Binärformats: Malformed-Structure,
//! Truncation, Numeric-Overflow, Encoding, State-Misuse, Type-Mismatch und
//! Unknown-Symbol. Malformed-Structure und Truncation machen den Stream
//! unbrauchbar (die Positionskonsistenz ist danach nicht mehr garantiert);
//! State-Misuse und Type-Mismatch sind Vertragsverletzungen des Aufrufers und
//! lassen den Stream intakt.

use core::fmt;

use crate::symbol::SymbolId;

/// All failure conditions of the binary reader.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A type descriptor byte carries an invalid type/length nibble combination.
    InvalidTypeDescriptor {
        /// The offending descriptor byte.
        descriptor: u8,
        /// Byte offset of the descriptor in the stream.
        position: u64,
    },
    /// A boolean descriptor carries a length nibble that is neither the
    /// false (0) nor the true (1) flag.
    InvalidBooleanFlag { nibble: u8, position: u64 },
    /// An ordered struct (length nibble 1) declared a zero length.
    InvalidOrderedStructLength { position: u64 },
    /// The 4-byte version marker started with the wrapper descriptor but the
    /// 3-byte magic tail did not match `01 00 EA`.
    InvalidVersionMarker { position: u64 },
    /// An annotation wrapper directly wraps another annotation wrapper.
    NestedAnnotation { position: u64 },
    /// An annotation wrapper's declared length disagrees with the span of
    /// its annotation block plus wrapped value.
    AnnotationLengthMismatch {
        declared: u64,
        actual: u64,
        position: u64,
    },
    /// End of input where a descriptor, length or payload byte was mandatory.
    UnexpectedEof { position: u64 },
    /// A container declares more bytes than its parent has left.
    ContainerExceedsParent {
        declared: u64,
        available: u64,
        position: u64,
    },
    /// A variable-width integer field (field ID, annotation ID, length,
    /// exponent) exceeds the representable native width.
    VarIntOverflow { position: u64 },
    /// A float payload is neither empty nor exactly 8 bytes.
    InvalidFloatLength { length: u64, position: u64 },
    /// A timestamp component is outside its valid range.
    InvalidTimestamp {
        field: &'static str,
        value: u64,
        position: u64,
    },
    /// Invalid UTF-8 byte sequence in a string payload.
    InvalidUtf8 { position: u64 },
    /// A symbol ID payload is 0, exceeds the ID range, or is wider than 8 bytes.
    SymbolIdOutOfRange { id: u64, position: u64 },
    /// A header accessor was called before `next()` produced a value.
    NoCurrentValue,
    /// `step_in` was called on a value that is not a container.
    NotAContainer,
    /// `step_in` was called on a null container.
    StepIntoNull,
    /// `step_out` was called at depth 0.
    StepOutAtTopLevel,
    /// A byte-range operation was requested on a non-blob/clob value.
    NotALobValue,
    /// After `step_out` the stream position is beyond the recorded resume
    /// position. Indicates an internal accounting bug or corrupt lengths.
    PositionMismatch { expected: u64, actual: u64 },
    /// A requested scalar representation is incompatible with the
    /// authoritative decoded representation.
    TypeMismatch {
        /// Name of the authoritative representation.
        from: &'static str,
        /// Name of the requested representation.
        to: &'static str,
    },
    /// A scalar getter was invoked on a null value.
    NullValue,
    /// A numeric coercion does not fit the requested native width.
    CoercionOverflow { to: &'static str },
    /// A symbol ID could not be resolved to text by the symbol table handle.
    UnknownSymbol(SymbolId),
    /// The byte source failed. The first I/O failure is fatal to the stream.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTypeDescriptor { descriptor, position } => write!(
                f,
                "invalid type descriptor 0x{descriptor:02X} at position {position}"
            ),
            Self::InvalidBooleanFlag { nibble, position } => write!(
                f,
                "invalid length nibble {nibble} in boolean descriptor at position {position}"
            ),
            Self::InvalidOrderedStructLength { position } => {
                write!(f, "ordered struct with zero length at position {position}")
            }
            Self::InvalidVersionMarker { position } => {
                write!(f, "malformed version marker tail at position {position}")
            }
            Self::NestedAnnotation { position } => write!(
                f,
                "annotation wrapper wrapping another annotation wrapper at position {position}"
            ),
            Self::AnnotationLengthMismatch { declared, actual, position } => write!(
                f,
                "annotation wrapper declares {declared} bytes but its contents span {actual} \
                 at position {position}"
            ),
            Self::UnexpectedEof { position } => {
                write!(f, "unexpected end of input at position {position}")
            }
            Self::ContainerExceedsParent { declared, available, position } => write!(
                f,
                "container declares {declared} bytes but parent has only {available} left \
                 at position {position}"
            ),
            Self::VarIntOverflow { position } => write!(
                f,
                "variable-width integer too large for its native width at position {position}"
            ),
            Self::InvalidFloatLength { length, position } => write!(
                f,
                "float payload must be 0 or 8 bytes, got {length} at position {position}"
            ),
            Self::InvalidTimestamp { field, value, position } => {
                write!(f, "timestamp {field} {value} out of range at position {position}")
            }
            Self::InvalidUtf8 { position } => {
                write!(f, "invalid UTF-8 sequence in string payload at position {position}")
            }
            Self::SymbolIdOutOfRange { id, position } => write!(
                f,
                "symbol id {id} out of range (1..={}) at position {position}",
                crate::symbol::MAX_SYMBOL_ID
            ),
            Self::NoCurrentValue => write!(f, "no current value: call next() first"),
            Self::NotAContainer => write!(f, "step_in is only valid on list, sexp or struct"),
            Self::StepIntoNull => write!(f, "cannot step into a null container"),
            Self::StepOutAtTopLevel => write!(f, "step_out called at depth 0"),
            Self::NotALobValue => write!(f, "byte-range access is only valid on blob or clob"),
            Self::PositionMismatch { expected, actual } => write!(
                f,
                "position {actual} is past the container end {expected} after step_out"
            ),
            Self::TypeMismatch { from, to } => {
                write!(f, "cannot represent {from} value as {to}")
            }
            Self::NullValue => write!(f, "scalar getter called on a null value"),
            Self::CoercionOverflow { to } => write!(f, "value does not fit in {to}"),
            Self::UnknownSymbol(sid) => write!(f, "symbol id {sid} has no known text"),
            Self::Io(msg) => write!(f, "byte source error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
