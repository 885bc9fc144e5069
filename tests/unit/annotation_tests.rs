//! Annotation grammar tests
//!
//! Exercises the public parser with the modifier combinations schemas use.

use fuzzy_schema::{CompileError, parse_annotation};
use proptest::prelude::*;

#[test]
fn test_all_modifiers_together() {
    let descriptor = parse_annotation("contact+!=~0.25").unwrap();
    assert_eq!(descriptor.name, "contact");
    assert!(descriptor.required);
    assert!(descriptor.repeatable);
    assert!(descriptor.mutating);
    assert!(descriptor.scored);
    assert_eq!(descriptor.weight, 0.25);
}

#[test]
fn test_every_duplicate_is_rejected() {
    for annotation in ["x!!", "x??", "x++", "x==", "x!+=!", "x?=?"] {
        assert!(
            matches!(
                parse_annotation(annotation),
                Err(CompileError::DuplicateModifier { .. })
            ),
            "{annotation}"
        );
    }
}

#[test]
fn test_skip_quality_with_weight_is_rejected() {
    assert!(matches!(
        parse_annotation("x?~3"),
        Err(CompileError::WeightWithSkipQuality { .. })
    ));
    assert!(matches!(
        parse_annotation("x~abc"),
        Err(CompileError::InvalidWeight { .. })
    ));
}

#[test]
fn test_zero_weight_without_skip_quality() {
    let descriptor = parse_annotation("x~0").unwrap();
    assert_eq!(descriptor.weight, 0.0);
    assert!(descriptor.scored);
}

#[test]
fn test_names_with_punctuation() {
    let descriptor = parse_annotation("e-mail.address!").unwrap();
    assert_eq!(descriptor.name, "e-mail.address");

    let descriptor = parse_annotation("why?|").unwrap();
    assert_eq!(descriptor.name, "why?");
    assert!(descriptor.scored);
}

proptest! {
    #[test]
    fn prop_plain_names_round_trip(name in "[a-z_][a-z0-9_]{0,12}") {
        let descriptor = parse_annotation(&name).unwrap();
        prop_assert_eq!(descriptor.name, name);
        prop_assert_eq!(descriptor.weight, 1.0);
        prop_assert!(!descriptor.required && !descriptor.repeatable && !descriptor.mutating);
    }

    #[test]
    fn prop_weights_parse(name in "[a-z]{1,8}", weight in 0.0f64..1000.0) {
        let descriptor = parse_annotation(&format!("{name}!~{weight}")).unwrap();
        prop_assert_eq!(descriptor.name, name);
        prop_assert_eq!(descriptor.weight, weight);
        prop_assert!(descriptor.required);
    }
}
