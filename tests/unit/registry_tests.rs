//! Custom validators plugged in through the registry

use std::sync::Arc;

use fuzzy_schema::SchemaOptions;
use serde_json::{Value, json};

use crate::common::mocks::{RecordingValidator, registry_with};
use crate::common::test_helpers::{diagnostic_options, schema_over};

#[test]
fn test_chain_stops_once_value_is_dropped() {
    let recorder = RecordingValidator::accepting();
    let schema = schema_over(
        json!({"age": ["int!", "recorder"]}),
        registry_with("recorder", Arc::clone(&recorder)),
        diagnostic_options(),
    );

    let cleaned = schema.apply(&json!({"age": "old"})).unwrap();
    assert!(cleaned.fields().get("age").is_none());
    assert_eq!(recorder.calls(), 0);

    let cleaned = schema.apply(&json!({"age": "7"})).unwrap();
    assert_eq!(cleaned.fields()["age"], json!("7"));
    assert_eq!(recorder.seen(), vec![json!("7")]);
}

#[test]
fn test_mutating_result_feeds_next_validator() {
    let recorder = RecordingValidator::accepting();
    let schema = schema_over(
        json!({"age": ["int=", "recorder"]}),
        registry_with("recorder", Arc::clone(&recorder)),
        SchemaOptions::default(),
    );

    schema.apply(&json!({"age": " 12 "})).unwrap();
    assert_eq!(recorder.seen(), vec![json!(12)]);
}

#[test]
fn test_repeatable_field_calls_per_element() {
    let recorder = RecordingValidator::new(|value| value.as_str().is_some_and(|s| s.len() > 1));
    let schema = schema_over(
        json!({"tags+": "recorder!"}),
        registry_with("recorder", Arc::clone(&recorder)),
        diagnostic_options(),
    );

    let cleaned = schema
        .apply(&json!({"tags": ["ab", "c", null, "de"]}))
        .unwrap();
    assert_eq!(cleaned.fields()["tags"], json!(["ab", "de"]));
    // Null elements never reach the chain
    assert_eq!(recorder.calls(), 3);

    let explanations = cleaned.metadata().explain.clone().unwrap();
    assert_eq!(explanations.len(), 1);
    assert!(explanations[0].contains("required validator recorder!"));
}

#[test]
fn test_rejecting_validator_escalates_on_required_field() {
    let recorder = RecordingValidator::rejecting();
    let schema = schema_over(
        json!({"id!": "recorder!", "rest": "recorder"}),
        registry_with("recorder", Arc::clone(&recorder)),
        diagnostic_options(),
    );

    let error = schema.apply(&json!({"id": 1, "rest": 2})).unwrap_err();
    assert!(error.to_string().contains("id rejected by recorder!: 1 rejected by mock"));
    // Collecting mode keeps walking after the failure
    assert_eq!(recorder.calls(), 2);
}

#[test]
fn test_compiles_once_across_parallel_batch() {
    let recorder = RecordingValidator::accepting();
    let schema = schema_over(
        json!({"n": "recorder"}),
        registry_with("recorder", Arc::clone(&recorder)),
        SchemaOptions::default(),
    );

    let documents: Vec<Value> = (1..=64).map(|n| json!({"n": n})).collect();
    let results = schema.apply_all(&documents).unwrap();

    assert!(schema.is_compiled());
    assert_eq!(results.len(), 64);
    for (index, result) in results.iter().enumerate() {
        let cleaned = result.as_ref().unwrap();
        assert_eq!(cleaned.fields()["n"], json!(index + 1));
    }
    assert_eq!(recorder.calls(), 64);
}
