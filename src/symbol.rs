//! Symbol IDs and the symbol table handle contract.
//!
//! Der Reader konsumiert nur eine Lookup-Fähigkeit (ID → Text); Aufbau von
//! Symboltabellen und Import-Auflösung sind Sache höherer Schichten. Eine ID,
//! die das Handle nicht auflösen kann, ist eine eigene Unknown-Symbol-Bedingung
//! und wird nie stillschweigend durch einen Default ersetzt.

/// An integer identifier standing in for interned text.
pub type SymbolId = u32;

/// Largest valid symbol ID. IDs are 1-based; 0 is never valid.
pub const MAX_SYMBOL_ID: SymbolId = i32::MAX as SymbolId;

/// Lookup capability borrowed by the reader. Never mutated by it.
pub trait SymbolLookup {
    /// Resolves a symbol ID to its text, or `None` when the ID is not known
    /// to this table.
    fn find_text(&self, sid: SymbolId) -> Option<&str>;
}

/// The fixed system symbols of encoding context 1.0, IDs 1..=9.
///
/// ID 2 ist das Symbol, als das der 4-Byte-Versionsmarker im Stream
/// auftaucht.
pub const SYSTEM_SYMBOLS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

/// A [`SymbolLookup`] over the fixed system symbols only.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSymbols;

impl SymbolLookup for SystemSymbols {
    fn find_text(&self, sid: SymbolId) -> Option<&str> {
        if sid == 0 {
            return None;
        }
        SYSTEM_SYMBOLS.get(sid as usize - 1).copied()
    }
}

/// Any string slice doubles as a symbol table: index `sid - 1` holds the text.
/// Praktisch für Tests und für Aufrufer mit bereits materialisierten Tabellen.
impl<T: AsRef<str>> SymbolLookup for [T] {
    fn find_text(&self, sid: SymbolId) -> Option<&str> {
        if sid == 0 {
            return None;
        }
        self.get(sid as usize - 1).map(AsRef::as_ref)
    }
}

impl<T: AsRef<str>> SymbolLookup for Vec<T> {
    fn find_text(&self, sid: SymbolId) -> Option<&str> {
        self.as_slice().find_text(sid)
    }
}
