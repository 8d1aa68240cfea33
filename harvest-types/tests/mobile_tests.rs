use harvest_types::{Error, MOBILE_DIGITS, Mobile};
use proptest::prelude::*;

// ── Canonicalization ──────────────────────────────────────────────

#[test]
fn plain_ten_digits_are_kept() {
    let m = Mobile::canonicalize("9876543210").unwrap();
    assert_eq!(m.as_str(), "9876543210");
}

#[test]
fn separators_are_stripped() {
    let m = Mobile::canonicalize("98765-43210").unwrap();
    assert_eq!(m.as_str(), "9876543210");
    let m = Mobile::canonicalize(" (987) 654 3210 ").unwrap();
    assert_eq!(m.as_str(), "9876543210");
}

#[test]
fn country_code_is_dropped() {
    let m = Mobile::canonicalize("+91 98765-43210").unwrap();
    assert_eq!(m.as_str(), "9876543210");
}

#[test]
fn twelve_digits_without_plus_are_rejected() {
    assert_eq!(
        Mobile::canonicalize("919876543210"),
        Err(Error::InvalidMobile { digits: 12 })
    );
}

#[test]
fn short_numbers_are_rejected() {
    assert_eq!(
        Mobile::canonicalize("12345"),
        Err(Error::InvalidMobile { digits: 5 })
    );
    assert_eq!(
        Mobile::canonicalize("call me"),
        Err(Error::InvalidMobile { digits: 0 })
    );
}

#[test]
fn with_country_code_prefixes() {
    let m = Mobile::canonicalize("9876543210").unwrap();
    assert_eq!(m.with_country_code("+91"), "+919876543210");
}

// ── Serde ─────────────────────────────────────────────────────────

#[test]
fn deserialize_canonicalizes() {
    let m: Mobile = serde_json::from_str(r#""98765 43210""#).unwrap();
    assert_eq!(m.as_str(), "9876543210");
}

#[test]
fn deserialize_rejects_invalid() {
    assert!(serde_json::from_str::<Mobile>(r#""123""#).is_err());
}

// ── Properties ────────────────────────────────────────────────────

proptest! {
    /// Canonical output is always ten ASCII digits.
    #[test]
    fn canonical_form_is_ten_digits(raw in "[0-9 +()-]{0,20}") {
        if let Ok(m) = Mobile::canonicalize(&raw) {
            prop_assert_eq!(m.as_str().len(), MOBILE_DIGITS);
            prop_assert!(m.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    /// Canonicalizing a canonical number is a no-op.
    #[test]
    fn canonicalize_is_idempotent(digits in "[0-9]{10}") {
        let once = Mobile::canonicalize(&digits).unwrap();
        let twice = Mobile::canonicalize(once.as_str()).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Interleaved separators never change the result.
    #[test]
    fn separators_do_not_matter(digits in "[0-9]{10}") {
        let spaced: String = digits.chars().flat_map(|c| [c, '-']).collect();
        let m = Mobile::canonicalize(&spaced).unwrap();
        prop_assert_eq!(m.as_str(), digits.as_str());
    }
}
