//! Validator expression parsing
//!
//! An expression is a whitespace-separated token list: the first token is a
//! validator annotation, the rest are arguments. `key=value` tokens are keyword
//! arguments, anything else is positional. A literal may carry a `:<type>`
//! suffix naming a registered validator that converts it.

use serde_json::{Map, Value};

use crate::annotation::{Descriptor, parse_annotation};
use crate::error::{CompileError, CompileResult};
use crate::registry::{Args, Registry};

/// A validator reference with its arguments bound at compile time
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorRef {
    pub construct: Descriptor,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
    /// Expression text, used in explain messages
    pub source: String,
}

impl ValidatorRef {
    pub fn name(&self) -> &str {
        &self.construct.name
    }

    pub fn arguments(&self) -> Args<'_> {
        Args::new(&self.args, &self.kwargs)
    }
}

/// Parse an expression such as `int= minimum=1:int cut=true` against `registry`
pub fn parse_expression(expression: &str, registry: &Registry) -> CompileResult<ValidatorRef> {
    let mut tokens = expression.split_whitespace();
    let head = tokens.next().ok_or(CompileError::EmptyExpression)?;

    let construct = parse_annotation(head)?;
    if !registry.contains(&construct.name) {
        return Err(CompileError::UnknownValidator {
            name: construct.name,
        });
    }

    let mut args = Vec::new();
    let mut repeated: Vec<(String, Vec<Value>)> = Vec::new();

    for token in tokens {
        match token.split_once('=') {
            Some((key, literal)) => {
                if key.is_empty() {
                    return Err(CompileError::EmptyKeyword {
                        token: token.to_string(),
                    });
                }
                let value = parse_literal(literal, registry)?;
                match repeated.iter_mut().find(|(existing, _)| existing == key) {
                    Some((_, values)) => values.push(value),
                    None => repeated.push((key.to_string(), vec![value])),
                }
            }
            None => args.push(parse_literal(token, registry)?),
        }
    }

    let kwargs = repeated
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            (key, value)
        })
        .collect();

    Ok(ValidatorRef {
        construct,
        args,
        kwargs,
        source: expression.trim().to_string(),
    })
}

/// Convert a literal, honoring an optional `:<type>` suffix
fn parse_literal(literal: &str, registry: &Registry) -> CompileResult<Value> {
    let Some((raw, type_name)) = literal
        .rsplit_once(':')
        .filter(|(_, type_name)| is_type_name(type_name))
    else {
        return Ok(Value::String(literal.to_string()));
    };

    let Some(converter) = registry.get(type_name) else {
        return Err(CompileError::UnknownType {
            type_name: type_name.to_string(),
            supported: registry.names().join(", "),
        });
    };

    converter
        .call(Value::String(raw.to_string()), &Args::empty())
        .map_err(|failure| CompileError::InvalidLiteral {
            literal: raw.to_string(),
            type_name: type_name.to_string(),
            reason: failure.message().to_string(),
        })
}

// Only identifier-like suffixes are type annotations, so `12:30` stays a string
fn is_type_name(candidate: &str) -> bool {
    candidate
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
