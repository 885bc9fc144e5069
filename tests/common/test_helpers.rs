use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use fuzzy_schema::{CleanedDocument, Error, Registry, Schema, SchemaOptions};

/// Schema over the built-in registry with default options
pub fn schema(definition: Value) -> Schema {
    Schema::with_builtins(definition, SchemaOptions::default()).expect("schema definition")
}

/// Schema over the built-in registry with the given options
pub fn schema_with(definition: Value, options: SchemaOptions) -> Schema {
    Schema::with_builtins(definition, options).expect("schema definition")
}

/// Schema over a custom registry
pub fn schema_over(definition: Value, registry: Registry, options: SchemaOptions) -> Schema {
    Schema::new(definition, Arc::new(registry), options).expect("schema definition")
}

/// Options that collect every failure and record diagnostics
pub fn diagnostic_options() -> SchemaOptions {
    SchemaOptions {
        fail_fast: false,
        score_fields: true,
        explain: true,
        precompile: true,
    }
}

/// Apply and return the cleaned fields as a JSON value
pub fn cleaned_fields(schema: &Schema, document: &Value) -> Value {
    let cleaned = schema.apply(document).expect("document passes");
    Value::Object(cleaned.into_fields())
}

/// Apply and expect failure messages
pub fn failure_messages(schema: &Schema, document: &Value) -> Vec<String> {
    match schema.apply(document) {
        Err(Error::Apply(error)) => error.messages(),
        Err(other) => panic!("expected an application failure, got {other}"),
        Ok(cleaned) => panic!("expected failure, got {:?}", cleaned.fields()),
    }
}

/// Check the score invariants every successful application must hold
pub fn assert_score_bounds(cleaned: &CleanedDocument) {
    let score = cleaned.score();
    assert!(
        (0.0..=1.0).contains(&score),
        "quality {score} outside [0, 1]"
    );
}

/// Temporary directory holding a schema file and record files
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temporary directory"),
        }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
