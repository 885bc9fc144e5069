//! Validator chain execution
//!
//! A [`Walk`] carries the invocation-local state (running score, diagnostics,
//! collected failures) through one pass over a compiled [`SchemaNode`] tree.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::aggregate::{ErrorAggregator, ErrorMode};
use crate::annotation::{CATCH_ALL, Descriptor};
use crate::compile::{SchemaNode, join};
use crate::error::{AggregatedError, FieldFailure};
use crate::expression::ValidatorRef;
use crate::registry::{Registry, value_text};
use crate::scoring::{Diagnostics, RuntimeScore, Tally};

/// Presence test applied to raw field values
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Outcome of a successful walk
#[derive(Debug)]
pub struct WalkOutput {
    pub fields: Map<String, Value>,
    pub score: RuntimeScore,
    pub diagnostics: Diagnostics,
}

/// Walk `document` with `nodes`, producing the cleaned fields and score
pub fn execute(
    nodes: &[SchemaNode],
    registry: &Registry,
    document: &Map<String, Value>,
    mode: ErrorMode,
    diagnostics: Diagnostics,
) -> Result<WalkOutput, AggregatedError> {
    let mut walk = Walk {
        registry,
        score: RuntimeScore::default(),
        diagnostics,
        errors: ErrorAggregator::new(mode),
    };

    let fields = walk.fields(nodes, document, "")?;
    walk.errors.finish().inspect_err(|error| {
        debug!(failures = error.len(), "Schema application failed");
    })?;

    Ok(WalkOutput {
        fields,
        score: walk.score,
        diagnostics: walk.diagnostics,
    })
}

struct Walk<'a> {
    registry: &'a Registry,
    score: RuntimeScore,
    diagnostics: Diagnostics,
    errors: ErrorAggregator,
}

impl Walk<'_> {
    fn fields(
        &mut self,
        nodes: &[SchemaNode],
        input: &Map<String, Value>,
        prefix: &str,
    ) -> Result<Map<String, Value>, AggregatedError> {
        let mut output = Map::new();

        for node in nodes {
            if let SchemaNode::CatchAll {
                descriptor,
                chain,
                known,
            } = node
            {
                self.catch_all(descriptor, chain, known, input, prefix, &mut output)?;
                continue;
            }

            let descriptor = node.descriptor();
            let path = join(prefix, &descriptor.name);
            let raw = match input.get(&descriptor.name) {
                Some(raw) if is_truthy(raw) => raw,
                _ => {
                    self.absent(descriptor, &path)?;
                    continue;
                }
            };

            match node {
                SchemaNode::Leaf { descriptor, chain } => {
                    self.leaf(descriptor, chain, raw, &path, &mut output)?;
                }
                SchemaNode::Nested {
                    descriptor,
                    children,
                } => {
                    let nested = self.fields(children, as_mapping(raw), &path)?;
                    output.insert(descriptor.name.clone(), Value::Object(nested));
                }
                SchemaNode::NestedArray {
                    descriptor,
                    children,
                } => {
                    self.nested_array(descriptor, children, raw, &path, &mut output)?;
                }
                SchemaNode::CatchAll { .. } => {}
            }
        }

        Ok(output)
    }

    fn absent(&mut self, descriptor: &Descriptor, path: &str) -> Result<(), AggregatedError> {
        if descriptor.required {
            trace!(path, "Required field not given");
            return self.errors.record(FieldFailure::Missing {
                path: path.to_string(),
            });
        }

        self.score.miss(descriptor.weight);
        self.diagnostics.field_score(path, 0.0);
        if descriptor.weight > 0.0 {
            self.diagnostics
                .explain(|| format!("Value for {path} was not given."));
        }
        Ok(())
    }

    fn leaf(
        &mut self,
        descriptor: &Descriptor,
        chain: &[ValidatorRef],
        raw: &Value,
        path: &str,
        output: &mut Map<String, Value>,
    ) -> Result<(), AggregatedError> {
        if chain.is_empty() {
            output.insert(descriptor.name.clone(), raw.clone());
            return Ok(());
        }

        let mut tally = Tally::new();
        let cleaned = if descriptor.repeatable {
            let mut kept = Vec::new();
            for item in as_items(raw) {
                let result = self.chain(descriptor, chain, item.clone(), path, &mut tally)?;
                if !result.is_null() {
                    kept.push(result);
                }
            }
            Value::Array(kept)
        } else {
            self.chain(descriptor, chain, raw.clone(), path, &mut tally)?
        };

        self.score.add(descriptor.weight, tally.ratio());
        self.diagnostics.field_score(path, tally.ratio());

        let dropped = match &cleaned {
            Value::Null => true,
            Value::Array(kept) => descriptor.repeatable && kept.is_empty(),
            _ => false,
        };
        if !dropped {
            output.insert(descriptor.name.clone(), cleaned);
        }
        Ok(())
    }

    fn nested_array(
        &mut self,
        descriptor: &Descriptor,
        children: &[SchemaNode],
        raw: &Value,
        path: &str,
        output: &mut Map<String, Value>,
    ) -> Result<(), AggregatedError> {
        let mut kept = Vec::new();
        for item in as_items(raw) {
            let nested = self.fields(children, as_mapping(item), path)?;
            if !nested.is_empty() {
                kept.push(Value::Object(nested));
            }
        }

        if kept.is_empty() {
            if descriptor.required {
                trace!(path, "Required list produced no entries");
                self.errors.record(FieldFailure::EmptyList {
                    path: path.to_string(),
                })?;
            }
            return Ok(());
        }

        output.insert(descriptor.name.clone(), Value::Array(kept));
        Ok(())
    }

    fn catch_all(
        &mut self,
        descriptor: &Descriptor,
        chain: &[ValidatorRef],
        known: &BTreeSet<String>,
        input: &Map<String, Value>,
        prefix: &str,
        output: &mut Map<String, Value>,
    ) -> Result<(), AggregatedError> {
        let mut tally = Tally::new();

        for (key, value) in input.iter().filter(|(key, _)| !known.contains(*key)) {
            let path = join(prefix, key);
            let result = self.chain(descriptor, chain, value.clone(), &path, &mut tally)?;
            if !result.is_null() {
                output.insert(key.clone(), result);
            }
        }

        self.score.add(descriptor.weight, tally.ratio());
        self.diagnostics
            .field_score(&join(prefix, CATCH_ALL), tally.ratio());
        Ok(())
    }

    /// Thread one value through an ordered chain
    fn chain(
        &mut self,
        field: &Descriptor,
        chain: &[ValidatorRef],
        value: Value,
        path: &str,
        tally: &mut Tally,
    ) -> Result<Value, AggregatedError> {
        let mut current = value;

        for validator in chain {
            if current.is_null() {
                break;
            }

            let construct = &validator.construct;
            if construct.scored {
                tally.possible += construct.weight;
            }

            let failure = match self.registry.call(
                validator.name(),
                current.clone(),
                &validator.arguments(),
            ) {
                Ok(result) => {
                    if construct.mutating {
                        current = result;
                    }
                    if construct.scored {
                        tally.earned += construct.weight;
                    }
                    continue;
                }
                Err(failure) => failure,
            };

            trace!(
                path,
                validator = validator.name(),
                required = construct.required,
                %failure,
                "Validator rejected value"
            );

            if construct.required && field.required {
                self.errors.record(FieldFailure::Rejected {
                    path: path.to_string(),
                    validator: validator.source.clone(),
                    failure,
                })?;
            } else if construct.required {
                self.diagnostics.explain(|| {
                    format!(
                        "Provided value for {path} field did not match required validator {}: {failure}",
                        validator.source
                    )
                });
                current = Value::Null;
            } else {
                self.diagnostics.explain(|| {
                    format!(
                        "Provided value of {} for {path} field did not match {}: {failure}",
                        value_text(&current),
                        validator.source
                    )
                });
            }
        }

        Ok(current)
    }
}

fn as_items(raw: &Value) -> Vec<&Value> {
    match raw {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    }
}

fn as_mapping(raw: &Value) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    match raw {
        Value::Object(map) => map,
        _ => EMPTY.get_or_init(Map::new),
    }
}
