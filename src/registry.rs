//! Validator registry for looking up named validators and converters.
//!
//! A registry is assembled once, then shared read-only behind an `Arc` by every
//! schema compiled against it. The same table serves validator names in
//! expressions and `:<type>` converters on argument literals.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ValidationFailure;

/// Arguments passed to a validator alongside the value.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    positional: &'a [Value],
    keyword: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    pub fn new(positional: &'a [Value], keyword: &'a Map<String, Value>) -> Self {
        Self {
            positional,
            keyword: Some(keyword),
        }
    }

    /// No arguments, as used for converter calls
    pub fn empty() -> Args<'static> {
        Args {
            positional: &[],
            keyword: None,
        }
    }

    pub fn positional(&self) -> &'a [Value] {
        self.positional
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.keyword.and_then(|keyword| keyword.get(key))
    }

    /// Keyword value, falling back to the positional argument at `index`
    pub fn get_or_positional(&self, key: &str, index: usize) -> Option<&'a Value> {
        self.get(key).or_else(|| self.positional.get(index))
    }

    /// Boolean keyword; absent means `false`
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(truthy_flag)
    }

    /// Boolean keyword with an explicit default
    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, truthy_flag)
    }

    /// Integer keyword, accepting numbers and numeric strings
    pub fn integer(&self, key: &str) -> Result<Option<i64>, ValidationFailure> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        };
        parsed.map(Some).ok_or_else(|| {
            ValidationFailure::new(format!("Argument {key} must be an integer not {value}"))
        })
    }

    /// Float keyword, accepting numbers and numeric strings
    pub fn number(&self, key: &str) -> Result<Option<f64>, ValidationFailure> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        };
        parsed.map(Some).ok_or_else(|| {
            ValidationFailure::new(format!("Argument {key} must be a number not {value}"))
        })
    }

    /// Text keyword; non-string literals are rendered as JSON
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(value_text)
    }
}

/// Render a value the way a validator sees it as text
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truthy_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => !matches!(
            text.to_lowercase().as_str(),
            "false" | "f" | "0" | "" | "no"
        ),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A named validator: accepts a value and returns the (possibly transformed)
/// value, or rejects it with a human-readable failure.
pub trait ValidatorFn: Send + Sync {
    fn call(&self, value: Value, args: &Args<'_>) -> Result<Value, ValidationFailure>;
}

impl<F> ValidatorFn for F
where
    F: Fn(Value, &Args<'_>) -> Result<Value, ValidationFailure> + Send + Sync,
{
    fn call(&self, value: Value, args: &Args<'_>) -> Result<Value, ValidationFailure> {
        self(value, args)
    }
}

/// Registry of available validators.
#[derive(Default, Clone)]
pub struct Registry {
    validators: HashMap<String, Arc<dyn ValidatorFn>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in validators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_all(&mut registry);
        registry
    }

    /// Register a validator, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(Value, &Args<'_>) -> Result<Value, ValidationFailure> + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
    }

    /// Register a validator that's already in an Arc.
    pub fn register_arc(&mut self, name: impl Into<String>, validator: Arc<dyn ValidatorFn>) {
        self.validators.insert(name.into(), validator);
    }

    /// Look up a validator by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ValidatorFn>> {
        self.validators.get(name)
    }

    /// Check if a validator exists.
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Invoke a validator by name.
    pub fn call(
        &self,
        name: &str,
        value: Value,
        args: &Args<'_>,
    ) -> Result<Value, ValidationFailure> {
        match self.validators.get(name) {
            Some(validator) => validator.call(value, args),
            None => Err(ValidationFailure::new(format!(
                "No validator named \"{name}\" is registered"
            ))),
        }
    }

    /// List all validator names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.validators.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("validators", &self.names())
            .finish()
    }
}
