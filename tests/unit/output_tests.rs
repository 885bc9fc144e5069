use fuzzy_schema::{Output, OutputFormat, Record, SchemaOptions, VerbosityLevel};
use serde_json::{Value, json};

use crate::common::test_helpers::schema_with;

fn batch() -> fuzzy_schema::ApplyResults {
    let schema = schema_with(json!({"age!": "int=! maximum=10:int"}), SchemaOptions::default());
    let compiled = schema.compiled().unwrap();
    compiled.apply_records(&[
        Record::new("first", json!({"age": "5"})),
        Record::new("second", json!({"age": "50"})),
    ])
}

#[test]
fn test_human_output_lists_failures() {
    let text = Output::plain(VerbosityLevel::Normal, OutputFormat::Human).format_results(&batch());
    assert!(text.contains("✗ FAILED  second"));
    assert!(text.contains("age rejected by int=! maximum=10:int: Provided value of 50 is above"));
    assert!(!text.contains("✓ PASSED  first"));
    assert!(text.contains("Total records: 2"));
    assert!(text.contains("Success rate: 50.0%"));
}

#[test]
fn test_verbose_output_lists_passes() {
    let text = Output::plain(VerbosityLevel::Verbose, OutputFormat::Human).format_results(&batch());
    assert!(text.contains("✓ PASSED  first"));
    assert!(text.contains("quality 1.000"));
}

#[test]
fn test_json_output_carries_cleaned_records() {
    let text = Output::plain(VerbosityLevel::Normal, OutputFormat::Json).format_results(&batch());
    let value: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["total_records"], json!(2));
    let first = &value["record_results"][0];
    assert_eq!(first["source"], json!("first"));
    assert_eq!(first["output"]["age"], json!(5));
    assert_eq!(first["output"]["__metadata__"]["score"], json!(1.0));
}

#[test]
fn test_summary_output() {
    let text = Output::plain(VerbosityLevel::Normal, OutputFormat::Summary).format_results(&batch());
    assert!(text.starts_with("Summary:"));
    assert!(text.contains("Failed: 1"));
    assert!(!text.contains("second"));
}
