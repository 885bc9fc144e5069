//! Definition tree compilation
//!
//! Turns a resolved field map into an immutable [`SchemaNode`] tree. Node shape
//! is decided here once; the executor only walks it.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::annotation::{Descriptor, parse_annotation};
use crate::error::{CompileError, CompileResult};
use crate::expression::{ValidatorRef, parse_expression};
use crate::registry::Registry;

/// One compiled field of a schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A value validated by an ordered chain
    Leaf {
        descriptor: Descriptor,
        chain: Vec<ValidatorRef>,
    },
    /// A mapping with its own field scope
    Nested {
        descriptor: Descriptor,
        children: Vec<SchemaNode>,
    },
    /// A list of mappings, each walked with the same field scope
    NestedArray {
        descriptor: Descriptor,
        children: Vec<SchemaNode>,
    },
    /// Every input key not named by a sibling
    CatchAll {
        descriptor: Descriptor,
        chain: Vec<ValidatorRef>,
        known: BTreeSet<String>,
    },
}

impl SchemaNode {
    pub fn descriptor(&self) -> &Descriptor {
        match self {
            SchemaNode::Leaf { descriptor, .. }
            | SchemaNode::Nested { descriptor, .. }
            | SchemaNode::NestedArray { descriptor, .. }
            | SchemaNode::CatchAll { descriptor, .. } => descriptor,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Number of nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        match self {
            SchemaNode::Nested { children, .. } | SchemaNode::NestedArray { children, .. } => {
                1 + children.iter().map(SchemaNode::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

/// Compile a top-level field map
pub fn compile_definition(
    definition: &Map<String, Value>,
    registry: &Registry,
) -> CompileResult<Vec<SchemaNode>> {
    let nodes = compile_fields(definition, registry, "")?;
    debug!(
        fields = nodes.len(),
        nodes = nodes.iter().map(SchemaNode::node_count).sum::<usize>(),
        "Compiled schema definition"
    );
    Ok(nodes)
}

fn compile_fields(
    definition: &Map<String, Value>,
    registry: &Registry,
    prefix: &str,
) -> CompileResult<Vec<SchemaNode>> {
    let mut nodes = Vec::with_capacity(definition.len());
    let mut catch_all: Option<(Descriptor, Vec<ValidatorRef>)> = None;

    for (annotation, value) in definition {
        let descriptor = parse_annotation(annotation).map_err(|e| e.at(&join(prefix, annotation)))?;
        let path = join(prefix, &descriptor.name);

        if descriptor.is_catch_all() {
            if descriptor.required || descriptor.repeatable {
                return Err(CompileError::CatchAllModifiers {
                    annotation: annotation.clone(),
                }
                .at(&path));
            }
            if catch_all.is_some() {
                return Err(CompileError::InvalidDefinition {
                    details: "more than one catch-all field in the same scope".to_string(),
                }
                .at(&path));
            }
            if value.is_object() {
                return Err(CompileError::InvalidDefinition {
                    details: "a catch-all field takes a validator chain, not a mapping"
                        .to_string(),
                }
                .at(&path));
            }
            let chain = compile_chain(value, registry).map_err(|e| e.at(&path))?;
            catch_all = Some((descriptor, chain));
            continue;
        }

        let node = match value {
            Value::Object(children) => {
                let children = compile_fields(children, registry, &path)?;
                if descriptor.repeatable {
                    SchemaNode::NestedArray {
                        descriptor,
                        children,
                    }
                } else {
                    SchemaNode::Nested {
                        descriptor,
                        children,
                    }
                }
            }
            chain => SchemaNode::Leaf {
                chain: compile_chain(chain, registry).map_err(|e| e.at(&path))?,
                descriptor,
            },
        };
        nodes.push(node);
    }

    // The catch-all runs last so it only sees keys its siblings did not name
    if let Some((descriptor, chain)) = catch_all {
        let known = nodes.iter().map(|node| node.name().to_string()).collect();
        nodes.push(SchemaNode::CatchAll {
            descriptor,
            chain,
            known,
        });
    }

    Ok(nodes)
}

fn compile_chain(value: &Value, registry: &Registry) -> CompileResult<Vec<ValidatorRef>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(expression) => Ok(vec![parse_expression(expression, registry)?]),
        Value::Array(expressions) => expressions
            .iter()
            .map(|expression| match expression {
                Value::String(expression) => parse_expression(expression, registry),
                other => Err(CompileError::InvalidDefinition {
                    details: format!("validator chain entries must be strings, found {other}"),
                }),
            })
            .collect(),
        other => Err(CompileError::InvalidDefinition {
            details: format!("expected a validator chain or a mapping, found {other}"),
        }),
    }
}

/// Dotted path of `name` under `prefix`
pub(crate) fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
