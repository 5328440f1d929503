//! rion – Amazon Ion 1.0 binary reader library
//!
//! # Beispiel
//!
//! ```
//! use rion::{Reader, SliceSource, SystemSymbols, ValueType};
//!
//! // version marker, then the int 10
//! let data = [0xE0, 0x01, 0x00, 0xEA, 0x21, 0x0A];
//! let mut reader = Reader::new(SliceSource::new(&data), &SystemSymbols);
//!
//! assert_eq!(reader.next()?, Some(ValueType::Symbol));
//! assert_eq!(reader.string_value()?, "$ion_1_0");
//! assert_eq!(reader.next()?, Some(ValueType::Int));
//! assert_eq!(reader.long_value()?, 10);
//! assert_eq!(reader.next()?, None);
//! # Ok::<(), rion::Error>(())
//! ```

pub mod cursor;
pub mod decimal;
pub mod descriptor;
pub mod error;
pub mod float;
pub mod integer;
pub mod reader;
pub mod save_point;
pub mod source;
pub mod symbol;
pub mod text;
pub mod timestamp;
pub mod value;
pub mod varint;

pub use error::{Error, Result};

// Public API: reading
pub use cursor::RawCursor;
pub use reader::Reader;
pub use source::{ByteSource, SliceSource};

// Public API: values
pub use decimal::Decimal;
pub use descriptor::ValueType;
pub use timestamp::{Precision, Timestamp};

// Public API: symbols
pub use symbol::{SymbolId, SymbolLookup, SystemSymbols, MAX_SYMBOL_ID, SYSTEM_SYMBOLS};
