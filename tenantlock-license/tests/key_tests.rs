use proptest::prelude::*;
use std::collections::HashSet;
use tenantlock_license::{
    KeyGenerator, LicenseError, LicenseKey, RandomKeyGenerator, GROUP_SIZE, KEY_ALPHABET,
    KEY_SYMBOLS,
};

// ── Format ───────────────────────────────────────────────────────

#[test]
fn generated_key_has_five_groups_of_four() {
    let key = RandomKeyGenerator.generate();
    let groups: Vec<&str> = key.as_str().split('-').collect();
    assert_eq!(groups.len(), KEY_SYMBOLS / GROUP_SIZE);
    for group in groups {
        assert_eq!(group.len(), GROUP_SIZE);
        assert!(group.bytes().all(|b| KEY_ALPHABET.contains(&b)));
    }
}

#[test]
fn generated_key_parses_back() {
    let key = RandomKeyGenerator.generate();
    let parsed = LicenseKey::parse(key.as_str()).unwrap();
    assert_eq!(parsed, key);
}

#[test]
fn ten_thousand_generated_keys_are_distinct() {
    let keys: HashSet<LicenseKey> = (0..10_000).map(|_| RandomKeyGenerator.generate()).collect();
    assert_eq!(keys.len(), 10_000);
}

// ── Normalization ────────────────────────────────────────────────

#[test]
fn parse_accepts_lowercase_spaces_and_missing_dashes() {
    let key = RandomKeyGenerator.generate();
    let compact = key.as_str().replace('-', "");
    let spaced = key.as_str().replace('-', " ").to_lowercase();

    assert_eq!(LicenseKey::parse(&compact).unwrap(), key);
    assert_eq!(LicenseKey::parse(&format!("  {spaced}\n")).unwrap(), key);
}

#[test]
fn parse_known_keys() {
    assert_eq!(
        LicenseKey::parse("2222222222222222222 2").unwrap().as_str(),
        "2222-2222-2222-2222-2222"
    );
    assert!(LicenseKey::parse("3222-2222-2222-2222-2223").is_ok());
}

// ── Rejection ────────────────────────────────────────────────────

#[test]
fn parse_rejects_wrong_length() {
    let err = LicenseKey::parse("2222-2222").unwrap_err();
    assert!(matches!(err, LicenseError::InvalidKey(_)));
    assert!(LicenseKey::parse("").is_err());
    assert!(LicenseKey::parse("2222-2222-2222-2222-2222-2").is_err());
}

#[test]
fn parse_rejects_ambiguous_characters() {
    for bad in ["O222-2222-2222-2222-2222", "0222-2222-2222-2222-2222", "I222-2222-2222-2222-2222"] {
        let err = LicenseKey::parse(bad).unwrap_err();
        assert!(err.to_string().contains("invalid character"), "{bad}: {err}");
    }
}

#[test]
fn parse_rejects_bad_checksum() {
    let err = LicenseKey::parse("2222-2222-2222-2222-2223").unwrap_err();
    assert!(err.to_string().contains("checksum"));
}

#[test]
fn every_single_symbol_substitution_is_rejected() {
    let key = RandomKeyGenerator.generate();
    let original: Vec<u8> = key.as_str().bytes().collect();

    for (pos, current) in original.iter().enumerate() {
        if *current == b'-' {
            continue;
        }
        for replacement in KEY_ALPHABET.iter().filter(|s| *s != current) {
            let mut mutated = original.clone();
            mutated[pos] = *replacement;
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(
                LicenseKey::parse(&mutated).is_err(),
                "substitution at {pos} accepted: {mutated}"
            );
        }
    }
}

#[test]
fn replacing_a_separator_with_a_symbol_is_rejected() {
    let key = RandomKeyGenerator.generate();
    let mutated = key.as_str().replacen('-', "A", 1);
    assert!(LicenseKey::parse(&mutated).is_err());
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serde_uses_canonical_string_and_validates() {
    let key = RandomKeyGenerator.generate();
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(json, format!("\"{key}\""));
    assert!(serde_json::from_str::<LicenseKey>("\"2222-2222-2222-2222-2223\"").is_err());
}

proptest! {
    #[test]
    fn adjacent_payload_transpositions_are_rejected(pos in 0usize..18) {
        let key = RandomKeyGenerator.generate();
        let mut symbols: Vec<u8> = key.as_str().bytes().filter(|b| *b != b'-').collect();
        prop_assume!(symbols[pos] != symbols[pos + 1]);
        symbols.swap(pos, pos + 1);
        let swapped = String::from_utf8(symbols).unwrap();
        prop_assert!(LicenseKey::parse(&swapped).is_err());
    }

    #[test]
    fn arbitrary_text_never_panics(input in "\\PC{0,40}") {
        let _ = LicenseKey::parse(&input);
    }
}
