use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use fuzzy_schema::registry::value_text;
use fuzzy_schema::{Args, Registry, ValidationFailure, ValidatorFn};

/// Validator that records every value it sees and answers from a fixed rule
pub struct RecordingValidator {
    calls: AtomicUsize,
    seen: Mutex<Vec<Value>>,
    accept: fn(&Value) -> bool,
}

impl RecordingValidator {
    pub fn new(accept: fn(&Value) -> bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            accept,
        })
    }

    /// Accepts everything
    pub fn accepting() -> Arc<Self> {
        Self::new(|_| true)
    }

    /// Rejects everything
    pub fn rejecting() -> Arc<Self> {
        Self::new(|_| false)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Value> {
        self.seen.lock().expect("seen values").clone()
    }
}

impl ValidatorFn for RecordingValidator {
    fn call(&self, value: Value, _args: &Args<'_>) -> Result<Value, ValidationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("seen values").push(value.clone());
        if (self.accept)(&value) {
            Ok(value)
        } else {
            Err(ValidationFailure::new(format!(
                "{} rejected by mock",
                value_text(&value)
            )))
        }
    }
}

/// Built-in registry plus a recording validator under `name`
pub fn registry_with(name: &str, validator: Arc<RecordingValidator>) -> Registry {
    let mut registry = Registry::with_builtins();
    registry.register_arc(name, validator);
    registry
}
