// tests/decode_tests.rs
//
// The typed layer: text -> Json -> native value and back.

use std::collections::{BTreeMap, HashMap};

use parsnip::{decode, encode, json_record, ConversionError, Error, Json, ToJson};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq)]
struct Item {
    name: String,
    count: u32,
    tags: Vec<String>,
}

json_record!(Item { name, count, tags });

#[derive(Debug, Clone, PartialEq)]
struct Inventory {
    owner: Option<String>,
    items: Vec<Item>,
}

json_record!(Inventory { owner, items });

fn conversion_error<T: std::fmt::Debug>(result: Result<T, Error>) -> ConversionError {
    match result {
        Err(Error::Conversion(err)) => err,
        other => panic!("expected a conversion error, got {other:?}"),
    }
}

// ---
// Collections
// ---

#[test]
fn test_decode_number_list() {
    let numbers: Vec<f64> = decode("[1, 2, 3]").unwrap();
    assert_eq!(numbers, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_decode_string_keyed_map() {
    let map: HashMap<String, f64> = decode(r#"{ "value": 5 }"#).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["value"], 5.0);

    let ordered: BTreeMap<String, bool> = decode(r#"{ "b": true, "a": false }"#).unwrap();
    assert_eq!(ordered.keys().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_decode_nested_containers() {
    let grid: Vec<Vec<Option<i32>>> = decode("[[1, null], [], [3]]").unwrap();
    assert_eq!(grid, vec![vec![Some(1), None], vec![], vec![Some(3)]]);
}

#[test]
fn test_decode_json_passthrough() {
    let json: Json = decode(r#"{"k": [true]}"#).unwrap();
    assert_eq!(json, Json::object([("k", Json::array([Json::Bool(true)]))]));
}

// ---
// Records
// ---

#[test]
fn test_decode_record() {
    let text = r#"{
        "owner": "ada",
        "items": [
            { "name": "bolt", "count": 12, "tags": ["metal"] },
            { "name": "glue", "count": 1, "tags": [] }
        ]
    }"#;
    let inventory: Inventory = decode(text).unwrap();
    assert_eq!(inventory.owner.as_deref(), Some("ada"));
    assert_eq!(inventory.items.len(), 2);
    assert_eq!(
        inventory.items[0],
        Item {
            name: "bolt".to_string(),
            count: 12,
            tags: vec!["metal".to_string()],
        }
    );
}

#[test]
fn test_decode_record_null_option() {
    let inventory: Inventory = decode(r#"{ "owner": null, "items": [] }"#).unwrap();
    assert_eq!(inventory.owner, None);
    assert!(inventory.items.is_empty());
}

#[test]
fn test_decode_record_missing_field_path() {
    let text = r#"{ "owner": null, "items": [ { "name": "a", "count": 1, "tags": [] }, { "name": "b", "tags": [] } ] }"#;
    let err = conversion_error(decode::<Inventory>(text));
    assert_eq!(err.path(), "items[1]");
    assert_eq!(err.root(), &ConversionError::missing_field("count"));
}

#[test]
fn test_decode_record_type_mismatch_path() {
    let text = r#"{ "owner": "x", "items": [ { "name": "a", "count": 1, "tags": ["ok", 7] } ] }"#;
    let err = conversion_error(decode::<Inventory>(text));
    assert_eq!(err.path(), "items[0].tags[1]");
    assert_eq!(err.root(), &ConversionError::type_mismatch("string", "number"));
}

#[test]
fn test_decode_record_rejects_non_object() {
    let err = conversion_error(decode::<Item>("[1]"));
    assert_eq!(err, ConversionError::type_mismatch("object", "array"));
}

#[test]
fn test_decode_integer_out_of_range() {
    let err = conversion_error(decode::<Vec<u8>>("[1, 300]"));
    assert_eq!(err.path(), "[1]");
    assert!(matches!(
        err.root(),
        ConversionError::NumberOutOfRange { target: "u8", .. }
    ));
}

// ---
// Syntax errors through decode
// ---

#[test]
fn test_decode_reports_syntax_error() {
    let err = decode::<Vec<f64>>("[1, 2").unwrap_err();
    let syntax = err.as_syntax().expect("syntax error");
    assert_eq!(syntax.remaining, "");
    assert!(err.as_conversion().is_none());
}

#[test]
fn test_decode_rejects_trailing_text() {
    let err = decode::<f64>("1 2").unwrap_err();
    let syntax = err.as_syntax().expect("syntax error");
    assert_eq!(syntax.message, "endOfInput");
    assert_eq!(syntax.remaining, "2");
}

#[test]
fn test_error_display_is_transparent() {
    let err = decode::<bool>("1").unwrap_err();
    assert_eq!(err.to_string(), "type mismatch: expected bool, found number");
}

// ---
// Encoding
// ---

#[test]
fn test_encode_record() {
    let item = Item {
        name: "nut \"m4\"".to_string(),
        count: 3,
        tags: vec!["a".to_string(), "b".to_string()],
    };
    assert_eq!(
        encode(&item),
        r#"{"name":"nut \"m4\"","count":3,"tags":["a","b"]}"#
    );
}

#[test]
fn test_encode_primitives_and_slices() {
    assert_eq!(encode(&true), "true");
    assert_eq!(encode(&2.5), "2.5");
    assert_eq!(encode("text"), r#""text""#);
    assert_eq!(encode(&[1_i32, 2, 3][..]), "[1,2,3]");
    assert_eq!(encode(&Option::<u8>::None), "null");
}

#[test]
fn test_encode_then_decode_record() {
    let inventory = Inventory {
        owner: Some("grace".to_string()),
        items: vec![Item {
            name: "tape".to_string(),
            count: 0,
            tags: vec!["\u{e9}\n".to_string()],
        }],
    };
    let decoded: Inventory = decode(&encode(&inventory)).unwrap();
    assert_eq!(decoded, inventory);
    assert_eq!(inventory.to_json().get("owner").and_then(Json::raw_string), Some("grace"));
}

#[test]
fn test_infinities_survive_encoding() {
    let values = vec![f64::INFINITY, -1.5, f64::NEG_INFINITY];
    assert_eq!(encode(&values), "[1e999,-1.5,-1e999]");
    assert_eq!(decode::<Vec<f64>>(&encode(&values)).unwrap(), values);
    assert_eq!(encode(&f64::NAN), "null");
}

#[test]
fn test_wide_integers_decode_only() {
    assert_eq!(decode::<i64>("9007199254740992").unwrap(), 1_i64 << 53);
    assert_eq!(decode::<u64>("4294967296").unwrap(), 1_u64 << 32);
    let err = conversion_error(decode::<i64>("9223372036854775808"));
    assert!(matches!(err, ConversionError::NumberOutOfRange { target: "i64", .. }));
    assert_eq!(encode(&u32::MAX), "4294967295");
}
