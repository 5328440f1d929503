//! End-to-end walks over complete binary documents.

use rion::{Error, Reader, SliceSource, SymbolLookup, SystemSymbols, ValueType};

/// Local table covering the system range plus sid 10 = "f", sid 11 = "g".
fn test_table() -> Vec<String> {
    let mut table: Vec<String> = rion::SYSTEM_SYMBOLS.iter().map(|s| s.to_string()).collect();
    table.push("f".to_string());
    table.push("g".to_string());
    table
}

fn reader<'a>(bytes: &'a [u8], symbols: &'a dyn SymbolLookup) -> Reader<'a, SliceSource<'a>> {
    Reader::new(SliceSource::new(bytes), symbols)
}

/// {f: "v", g: [g]} — field names, a nested list and a symbol element.
#[test]
fn struct_with_nested_list() {
    let data = [
        0xD7, // struct, 7 body bytes
        0x8A, 0x81, 0x76, // f: "v"
        0x8B, 0xB2, 0x71, 0x0B, // g: [symbol 11]
    ];
    let table = test_table();
    let mut r = reader(&data, &table);

    assert_eq!(r.next().unwrap(), Some(ValueType::Struct));
    r.step_in().unwrap();
    assert!(r.is_in_struct());

    assert_eq!(r.next().unwrap(), Some(ValueType::String));
    assert_eq!(r.field_name().unwrap(), Some("f"));
    assert_eq!(r.string_value().unwrap(), "v");

    assert_eq!(r.next().unwrap(), Some(ValueType::List));
    assert_eq!(r.field_name().unwrap(), Some("g"));
    r.step_in().unwrap();
    assert!(!r.is_in_struct());
    assert_eq!(r.depth(), 2);
    assert_eq!(r.next().unwrap(), Some(ValueType::Symbol));
    assert_eq!(r.string_value().unwrap(), "g");
    assert_eq!(r.next().unwrap(), None);
    r.step_out().unwrap();

    assert_eq!(r.next().unwrap(), None);
    r.step_out().unwrap();
    assert_eq!(r.depth(), 0);
    assert!(!r.has_next().unwrap());
}

/// A document that opens with the version marker: the marker is a readable
/// symbol value, and the values after it are unaffected.
#[test]
fn version_marker_then_values() {
    let data = [0xE0, 0x01, 0x00, 0xEA, 0x21, 0x2A, 0x83, b'i', b'o', b'n'];
    let mut r = reader(&data, &SystemSymbols);

    assert_eq!(r.next().unwrap(), Some(ValueType::Symbol));
    assert_eq!(r.symbol_id().unwrap(), 2);
    assert_eq!(r.string_value().unwrap(), "$ion_1_0");

    assert_eq!(r.next().unwrap(), Some(ValueType::Int));
    assert_eq!(r.long_value().unwrap(), 42);

    assert_eq!(r.next().unwrap(), Some(ValueType::String));
    assert_eq!(r.string_value().unwrap(), "ion");
    assert_eq!(r.next().unwrap(), None);
}

/// Values of every container kind can be skipped wholesale without being
/// entered, and traversal continues behind them.
#[test]
fn unopened_containers_are_skipped() {
    let data = [
        0xB3, 0x21, 0x01, 0x11, // [1, true]
        0xD2, 0x8A, 0x10, // {f: false}
        0xC2, 0x21, 0x07, // (7)
        0x21, 0x63, // 99
    ];
    let table = test_table();
    let mut r = reader(&data, &table);
    assert_eq!(r.next().unwrap(), Some(ValueType::List));
    assert_eq!(r.next().unwrap(), Some(ValueType::Struct));
    assert_eq!(r.next().unwrap(), Some(ValueType::Sexp));
    assert_eq!(r.next().unwrap(), Some(ValueType::Int));
    assert_eq!(r.long_value().unwrap(), 99);
    assert_eq!(r.next().unwrap(), None);
}

/// Deep nesting: every step_out lands exactly on the next sibling of the
/// container that was entered.
#[test]
fn nesting_restores_positions() {
    // [[["x"], 1], 2] then 3 at top level
    let data = [
        0xB8, // outer list, 8 bytes
        0xB5, // middle list, 5 bytes
        0xB2, 0x81, b'x', // ["x"]
        0x21, 0x01, // 1
        0x21, 0x02, // 2
        0x21, 0x03, // 3
    ];
    let mut r = reader(&data, &SystemSymbols);

    r.next().unwrap();
    r.step_in().unwrap();
    r.next().unwrap();
    r.step_in().unwrap();
    assert_eq!(r.next().unwrap(), Some(ValueType::List));
    r.step_in().unwrap();
    assert_eq!(r.depth(), 3);
    assert_eq!(r.next().unwrap(), Some(ValueType::String));
    // leave with the string unread; the rest of ["x"] is skipped
    r.step_out().unwrap();
    assert_eq!(r.next().unwrap(), Some(ValueType::Int));
    assert_eq!(r.long_value().unwrap(), 1);
    assert_eq!(r.next().unwrap(), None);
    r.step_out().unwrap();
    assert_eq!(r.next().unwrap(), Some(ValueType::Int));
    assert_eq!(r.long_value().unwrap(), 2);
    r.step_out().unwrap();
    assert_eq!(r.depth(), 0);
    assert_eq!(r.next().unwrap(), Some(ValueType::Int));
    assert_eq!(r.long_value().unwrap(), 3);
    assert_eq!(r.next().unwrap(), None);
}

/// Annotated struct fields resolve both the annotation and the field name.
#[test]
fn annotated_field_in_struct() {
    // {f: g::true} — field ID byte plus the 4-byte annotation wrapper
    let data = [0xD5, 0x8A, 0xE3, 0x81, 0x8B, 0x11];
    let table = test_table();
    let mut r = reader(&data, &table);
    r.next().unwrap();
    r.step_in().unwrap();
    assert_eq!(r.next().unwrap(), Some(ValueType::Bool));
    assert_eq!(r.field_name().unwrap(), Some("f"));
    assert_eq!(r.annotations().unwrap(), vec!["g"]);
    assert!(r.bool_value().unwrap());
}

/// Truncated documents fail with a positioned truncation error instead of
/// fabricating values.
#[test]
fn truncated_document() {
    // struct declares 5 body bytes, stream ends after 1
    let data = [0xD5, 0x8A];
    let table = test_table();
    let mut r = reader(&data, &table);
    r.next().unwrap();
    r.step_in().unwrap();
    assert!(matches!(r.next().unwrap_err(), Error::UnexpectedEof { .. }));
}

/// Invalid UTF-8 inside a nested string surfaces as an encoding error with
/// the payload position.
#[test]
fn invalid_utf8_in_nested_string() {
    // [ "..." ] with a truncated 3-byte sequence
    let data = [0xB3, 0x82, 0xE2, 0x82];
    let mut r = reader(&data, &SystemSymbols);
    r.next().unwrap();
    r.step_in().unwrap();
    assert_eq!(r.next().unwrap(), Some(ValueType::String));
    assert_eq!(r.string_value(), Err(Error::InvalidUtf8 { position: 2 }));
}
