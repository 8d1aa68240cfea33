//! Crop-list normalization over legacy and current stored shapes.

use harvest_model::{
    CropEntry, RawCropEntry, coerce_qty, crop_names, entries_to_value, normalize,
    normalize_entries, parse_quantity,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Value, json};

fn entry(name: &str, qty: u64) -> CropEntry {
    CropEntry {
        name: name.to_string(),
        qty,
    }
}

// ── Shapes ───────────────────────────────────────────────────────

#[test]
fn mixed_legacy_and_current_entries() {
    let raw = json!(["Rice", {"name": "Wheat", "qty": 5}]);
    assert_eq!(normalize(Some(&raw)), vec![entry("Rice", 0), entry("Wheat", 5)]);
}

#[test]
fn missing_qty_defaults_to_zero() {
    let raw = json!([{"name": "Bajra"}, {"name": "Jowar", "qty": null}]);
    assert_eq!(normalize(Some(&raw)), vec![entry("Bajra", 0), entry("Jowar", 0)]);
}

#[test]
fn quantity_key_is_read_as_qty() {
    let raw = json!([{"name": "Onion", "quantity": 12}]);
    assert_eq!(normalize(Some(&raw)), vec![entry("Onion", 12)]);
}

#[test]
fn absent_input_is_empty() {
    assert!(normalize(None).is_empty());
}

#[test]
fn non_array_input_is_empty() {
    assert!(normalize(Some(&json!("Rice"))).is_empty());
    assert!(normalize(Some(&json!({"name": "Rice"}))).is_empty());
    assert!(normalize(Some(&Value::Null)).is_empty());
}

#[test]
fn unusable_elements_are_dropped() {
    let raw = json!([42, null, {"qty": 3}, {"name": 7}, "  ", "Gram"]);
    assert_eq!(normalize(Some(&raw)), vec![entry("Gram", 0)]);
}

#[test]
fn names_are_trimmed() {
    let raw = json!(["  Rice ", {"name": " Wheat\t", "qty": 1}]);
    assert_eq!(normalize(Some(&raw)), vec![entry("Rice", 0), entry("Wheat", 1)]);
}

#[test]
fn order_is_preserved() {
    let raw = json!(["C", "A", "B"]);
    assert_eq!(crop_names(&normalize(Some(&raw))), vec!["C", "A", "B"]);
}

// ── Quantity coercion ────────────────────────────────────────────

#[test]
fn stored_quantities_coerce() {
    assert_eq!(coerce_qty(&json!(8)), 8);
    assert_eq!(coerce_qty(&json!(-4)), 0);
    assert_eq!(coerce_qty(&json!(2.9)), 2);
    assert_eq!(coerce_qty(&json!("15")), 15);
    assert_eq!(coerce_qty(&json!("lots")), 0);
    assert_eq!(coerce_qty(&json!(true)), 0);
}

#[test]
fn typed_quantities_parse() {
    assert_eq!(parse_quantity("42"), 42);
    assert_eq!(parse_quantity(" 7 "), 7);
    assert_eq!(parse_quantity("abc"), 0);
    assert_eq!(parse_quantity("-3"), 0);
    assert_eq!(parse_quantity(""), 0);
    assert_eq!(parse_quantity("4.5"), 0);
}

// ── Typed ingestion ──────────────────────────────────────────────

#[test]
fn typed_entries_normalize() {
    let raw = vec![
        RawCropEntry::from("Rice"),
        RawCropEntry::Object {
            name: "Wheat".into(),
            qty: Some(json!(5)),
        },
    ];
    assert_eq!(normalize_entries(raw), vec![entry("Rice", 0), entry("Wheat", 5)]);
}

#[test]
fn stored_shape_is_name_and_qty() {
    let value = entries_to_value(&[entry("Rice", 3)]);
    assert_eq!(value, json!([{"name": "Rice", "qty": 3}]));
}

// ── Properties ───────────────────────────────────────────────────

fn raw_element() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[ a-zA-Z]{0,12}".prop_map(Value::from),
        ("[ a-zA-Z]{0,12}", any::<i64>()).prop_map(|(n, q)| json!({"name": n, "qty": q})),
        ("[ a-zA-Z]{0,12}", "[0-9a-z-]{0,4}").prop_map(|(n, q)| json!({"name": n, "quantity": q})),
        "[a-z]{0,6}".prop_map(|n| json!({"name": n})),
        any::<i32>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

proptest! {
    /// normalize(normalize(x)) == normalize(x)
    #[test]
    fn normalization_is_idempotent(items in prop::collection::vec(raw_element(), 0..12)) {
        let raw = Value::Array(items);
        let once = normalize(Some(&raw));
        let twice = normalize(Some(&entries_to_value(&once)));
        prop_assert_eq!(once, twice);
    }

    /// Canonical entries never carry blank or untrimmed names.
    #[test]
    fn names_are_canonical(items in prop::collection::vec(raw_element(), 0..12)) {
        for e in normalize(Some(&Value::Array(items))) {
            prop_assert!(!e.name.is_empty());
            prop_assert_eq!(e.name.trim(), e.name.as_str());
        }
    }

    /// Normalization never produces more entries than it was given.
    #[test]
    fn never_grows(items in prop::collection::vec(raw_element(), 0..12)) {
        let len = items.len();
        prop_assert!(normalize(Some(&Value::Array(items))).len() <= len);
    }
}
