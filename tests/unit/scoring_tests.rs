//! Quality score invariants
//!
//! Property tests over generated documents: every successful application
//! scores within bounds, and a cleaned document is still valid input.

use fuzzy_schema::{Diagnostics, Metadata, RuntimeScore, SchemaOptions};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

use crate::common::test_helpers::{assert_score_bounds, diagnostic_options, schema, schema_with};

fn scored_schema() -> serde_json::Value {
    json!({
        "age~2": "int= minimum=0:int maximum=130:int",
        "name": "str= strip=true:bool",
        "email": "email",
        "tags+": "str=",
        "note?": "str",
    })
}

fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        // Text that neither parses as a number nor strips down to nothing
        "[a-z@.][ a-z0-9@.]{0,11}".prop_map(Value::from),
    ]
}

fn document() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(field_value()),
        proptest::option::of(field_value()),
        proptest::option::of(field_value()),
        proptest::option::of(prop::collection::vec(field_value(), 0..4)),
    )
        .prop_map(|(age, name, email, tags)| {
            let mut map = Map::new();
            for (key, value) in [("age", age), ("name", name), ("email", email)] {
                if let Some(value) = value {
                    map.insert(key.to_string(), value);
                }
            }
            if let Some(tags) = tags {
                map.insert("tags".to_string(), Value::Array(tags));
            }
            Value::Object(map)
        })
}

#[test]
fn test_runtime_score_accumulates() {
    let mut score = RuntimeScore::default();
    assert_eq!(score.quality(), 1.0);

    score.add(2.0, 0.5);
    score.miss(2.0);
    assert_eq!(score.score, 1.0);
    assert_eq!(score.possible, 4.0);
    assert_eq!(score.quality(), 0.25);
}

#[test]
fn test_metadata_serialization() {
    let mut diagnostics = Diagnostics::new(true, false);
    diagnostics.field_score("age", 1.0);

    let mut schema_metadata = Map::new();
    schema_metadata.insert("schema_version".to_string(), json!("2"));

    let score = RuntimeScore {
        score: 1.0,
        possible: 2.0,
    };
    let value = Metadata::new(schema_metadata, &score, diagnostics).to_value();
    assert_eq!(
        value,
        json!({"schema_version": "2", "score": 0.5, "field_scores": {"age": 1.0}})
    );
}

#[test]
fn test_all_null_list_reads_as_absent_on_reapply() {
    let schema = schema(scored_schema());
    let first = schema.apply(&json!({"tags": [null]})).unwrap();
    assert!(first.fields().get("tags").is_none());

    let second = schema.apply(&Value::Object(first.fields().clone())).unwrap();
    assert_eq!(second.fields(), first.fields());
    assert!(second.score() < first.score());
}

#[test]
fn test_skip_quality_fields_do_not_count() {
    let schema = schema(json!({"a": "str", "b?": "int"}));
    let cleaned = schema.apply(&json!({"a": "x", "b": "nope"})).unwrap();
    assert_eq!(cleaned.score(), 1.0);
    assert!(cleaned.fields().get("b").is_some());
}

proptest! {
    #[test]
    fn prop_score_within_bounds(document in document()) {
        let schema = schema_with(scored_schema(), diagnostic_options());
        let cleaned = schema.apply(&document).unwrap();
        assert_score_bounds(&cleaned);

        let scores = cleaned.metadata().field_scores.clone().unwrap_or_default();
        for (path, ratio) in scores {
            prop_assert!((0.0..=1.0).contains(&ratio), "{} scored {}", path, ratio);
        }
    }

    #[test]
    fn prop_cleaned_output_applies_again(document in document()) {
        let schema = schema_with(scored_schema(), SchemaOptions::default());
        let first = schema.apply(&document).unwrap();
        let fields = Value::Object(first.fields().clone());

        // The score may drop: a list whose slots were all dropped reads as absent
        let second = schema.apply(&fields).unwrap();
        prop_assert_eq!(second.fields(), first.fields());
        assert_score_bounds(&second);
    }
}
