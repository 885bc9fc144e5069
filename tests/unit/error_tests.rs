use fuzzy_schema::error_reporter::ErrorReporter;
use fuzzy_schema::{CompileError, Error, SchemaOptions, VerbosityLevel};
use serde_json::json;

use crate::common::test_helpers::{diagnostic_options, failure_messages, schema, schema_with};

#[test]
fn test_compile_errors_carry_field_path() {
    let error = fuzzy_schema::Schema::with_builtins(
        json!({"contact": {"phone!": "int maximum=x:money"}}),
        SchemaOptions {
            precompile: true,
            ..SchemaOptions::default()
        },
    )
    .unwrap_err();

    let Error::Compile(compile) = error else {
        panic!("expected a compile error");
    };
    assert!(matches!(compile, CompileError::AtPath { ref path, .. } if path == "contact.phone"));
    assert!(matches!(compile.root(), CompileError::UnknownType { .. }));
}

#[test]
fn test_fail_fast_reports_first_failure_only() {
    let schema = schema(json!({"a!": "int", "b!": "int"}));
    assert_eq!(
        failure_messages(&schema, &json!({})),
        vec!["a required but not specified"]
    );
}

#[test]
fn test_collected_failures_keep_walk_order() {
    let schema = schema_with(
        json!({"a!": "int", "b!": "int!", "c": {"d!": "str"}}),
        diagnostic_options(),
    );
    assert_eq!(
        failure_messages(&schema, &json!({"b": "x", "c": {"e": 1}})),
        vec![
            "a required but not specified",
            "b rejected by int!: invalid literal for int: 'x'",
            "c.d required but not specified",
        ]
    );
}

#[test]
fn test_reporter_verbosity() {
    let error: Error = CompileError::DuplicateModifier {
        annotation: "age!!".to_string(),
        modifier: '!',
    }
    .at("age!!")
    .into();

    let quiet = ErrorReporter::new(VerbosityLevel::Quiet).format_error(&error);
    assert_eq!(quiet, "INVALID SCHEMA");

    let verbose = ErrorReporter::new(VerbosityLevel::Verbose).format_error(&error);
    assert!(verbose.contains("more than once"));
    assert!(verbose.contains("Field: age!!"));
    assert!(verbose.contains("Suggestion:"));
}
