//! Schema construction and application
//!
//! A [`Schema`] owns a resolved definition and compiles it at most once, either
//! eagerly (`precompile`) or on first use. The compiled form is cached for the
//! schema's lifetime and shared by every call, including parallel batches.

use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::aggregate::ErrorMode;
use crate::error::{CompileError, CompileResult, Error, Result};
use crate::registry::Registry;
use crate::scoring::METADATA_KEY;
use crate::validator::{CleanedDocument, CompiledValidator};

/// Options fixed when a schema is constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Abort on the first required failure instead of collecting them all
    pub fail_fast: bool,
    /// Record a score for every field under its dotted path
    pub score_fields: bool,
    /// Record a human-readable reason for every missing or rejected value
    pub explain: bool,
    /// Compile when the schema is constructed rather than on first apply
    pub precompile: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            fail_fast: true,
            score_fields: false,
            explain: false,
            precompile: false,
        }
    }
}

impl SchemaOptions {
    pub fn error_mode(&self) -> ErrorMode {
        ErrorMode::from_fail_fast(self.fail_fast)
    }
}

/// A resolved schema definition with its lazily compiled validator
#[derive(Debug)]
pub struct Schema {
    definition: Map<String, Value>,
    metadata: Map<String, Value>,
    registry: Arc<Registry>,
    options: SchemaOptions,
    compiled: OnceLock<CompileResult<Arc<CompiledValidator>>>,
}

impl Schema {
    /// Build a schema from a resolved definition
    ///
    /// A top-level `__metadata__` mapping is taken out of the field map and
    /// attached to every result.
    pub fn new(definition: Value, registry: Arc<Registry>, options: SchemaOptions) -> Result<Self> {
        let mut definition = match definition {
            Value::Object(definition) => definition,
            other => {
                return Err(CompileError::InvalidDefinition {
                    details: format!("a schema definition must be a mapping, found {other}"),
                }
                .into());
            }
        };

        let metadata = match definition.shift_remove(METADATA_KEY) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(metadata)) => metadata,
            Some(other) => {
                return Err(CompileError::InvalidDefinition {
                    details: format!("{METADATA_KEY} must be a mapping, found {other}"),
                }
                .into());
            }
        };

        let schema = Self {
            definition,
            metadata,
            registry,
            options,
            compiled: OnceLock::new(),
        };

        if schema.options.precompile {
            schema.compiled()?;
        }
        Ok(schema)
    }

    /// Build a schema against the built-in registry
    pub fn with_builtins(definition: Value, options: SchemaOptions) -> Result<Self> {
        Self::new(definition, Arc::new(Registry::with_builtins()), options)
    }

    pub fn definition(&self) -> &Map<String, Value> {
        &self.definition
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// `schema_version` from the schema metadata, when given
    pub fn version(&self) -> Option<&str> {
        self.metadata.get("schema_version").and_then(Value::as_str)
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// The compiled validator, compiling on first call
    pub fn compiled(&self) -> CompileResult<Arc<CompiledValidator>> {
        self.compiled
            .get_or_init(|| {
                debug!(
                    fields = self.definition.len(),
                    version = self.version(),
                    "Compiling schema"
                );
                CompiledValidator::compile(
                    &self.definition,
                    Arc::clone(&self.registry),
                    self.options.clone(),
                    self.metadata.clone(),
                )
                .map(Arc::new)
            })
            .clone()
    }

    /// Validate and clean one raw document
    pub fn apply(&self, document: &Value) -> Result<CleanedDocument> {
        let compiled = self.compiled()?;
        Ok(compiled.apply(document)?)
    }

    /// Apply to every document in parallel, preserving input order
    pub fn apply_all(&self, documents: &[Value]) -> Result<Vec<Result<CleanedDocument>>> {
        let compiled = self.compiled()?;
        Ok(documents
            .par_iter()
            .map(|document| compiled.apply(document).map_err(Error::from))
            .collect())
    }
}
