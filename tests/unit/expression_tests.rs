//! Expression parsing tests against custom registries

use fuzzy_schema::registry::value_text;
use fuzzy_schema::{CompileError, Registry, ValidationFailure, parse_expression};
use serde_json::json;

fn money_registry() -> Registry {
    let mut registry = Registry::with_builtins();
    registry.register("money", |value, _| {
        let text = value_text(&value);
        text.trim_start_matches('$')
            .parse::<f64>()
            .map(|amount| json!((amount * 100.0).round() as i64))
            .map_err(|_| ValidationFailure::new(format!("{text} is not money")))
    });
    registry
}

#[test]
fn test_custom_converter_types_literals() {
    let reference = parse_expression("int maximum=$12.50:money", &money_registry()).unwrap();
    assert_eq!(reference.kwargs["maximum"], json!(1250));
}

#[test]
fn test_custom_converter_rejection() {
    let error = parse_expression("int maximum=lots:money", &money_registry()).unwrap_err();
    match error {
        CompileError::InvalidLiteral {
            literal,
            type_name,
            reason,
        } => {
            assert_eq!(literal, "lots");
            assert_eq!(type_name, "money");
            assert!(reason.contains("not money"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_type_lists_registry() {
    let registry = Registry::with_builtins();
    let message = parse_expression("int maximum=1:decimal", &registry)
        .unwrap_err()
        .to_string();
    assert!(message.contains("decimal"));
    assert!(message.contains("int, ip"));
}

#[test]
fn test_typed_positional_arguments() {
    let registry = Registry::with_builtins();
    let reference = parse_expression("one_of 1:int 2:int true:bool", &registry).unwrap();
    assert_eq!(reference.args, vec![json!(1), json!(2), json!(true)]);
}

#[test]
fn test_extra_whitespace_is_ignored() {
    let registry = Registry::with_builtins();
    let reference = parse_expression("  str   longest=3:int\tcut=true:bool ", &registry).unwrap();
    assert_eq!(reference.name(), "str");
    assert_eq!(reference.kwargs["longest"], json!(3));
    assert_eq!(reference.kwargs["cut"], json!(true));
    assert_eq!(reference.source, "str   longest=3:int\tcut=true:bool");
}
