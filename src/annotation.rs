//! Annotation parsing
//!
//! Field names and validator names share one terse modifier syntax. Reading
//! right to left, an annotation is:
//!
//! - an optional `~<float>` weight suffix,
//! - then any of `!` (required), `?` (skip quality), `+` (repeatable) and
//!   `=` (mutating), each at most once,
//! - then the literal name.
//!
//! A `|` ends the modifier run without producing a modifier, so `ratio=|`
//! names a field literally called `ratio=`.

use crate::error::{CompileError, CompileResult};

/// Field name that applies its chain to every input key not otherwise named
pub const CATCH_ALL: &str = "**";

/// Parsed modifier set of a field or validator annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// Literal name with all modifiers stripped
    pub name: String,
    /// Contribution to the quality score
    pub weight: f64,
    /// Missing or rejected values fail the whole document
    pub required: bool,
    /// The value is a list and every element is validated on its own
    pub repeatable: bool,
    /// A validator's return value replaces the value being validated
    pub mutating: bool,
    /// Counts toward the quality score; false exactly when `weight` is zero
    /// because of the skip-quality modifier
    pub scored: bool,
}

impl Descriptor {
    /// Descriptor with no modifiers and the default weight
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 1.0,
            required: false,
            repeatable: false,
            mutating: false,
            scored: true,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        self.name == CATCH_ALL
    }
}

/// Parse an annotation such as `contact+!~2` into its descriptor.
pub fn parse_annotation(annotation: &str) -> CompileResult<Descriptor> {
    let (body, weight) = match annotation.rsplit_once('~') {
        Some((body, raw)) => (body, Some(parse_weight(annotation, raw)?)),
        None => (annotation, None),
    };

    let mut descriptor = Descriptor::named(String::new());
    if let Some(weight) = weight {
        descriptor.weight = weight;
    }

    let duplicate = |modifier| CompileError::DuplicateModifier {
        annotation: annotation.to_string(),
        modifier,
    };

    let mut consumed = 0;
    for character in body.chars().rev() {
        match character {
            '!' => {
                if descriptor.required {
                    return Err(duplicate('!'));
                }
                descriptor.required = true;
            }
            '?' => {
                if !descriptor.scored {
                    return Err(duplicate('?'));
                }
                if descriptor.weight != 1.0 {
                    return Err(CompileError::WeightWithSkipQuality {
                        annotation: annotation.to_string(),
                    });
                }
                descriptor.scored = false;
                descriptor.weight = 0.0;
            }
            '+' => {
                if descriptor.repeatable {
                    return Err(duplicate('+'));
                }
                descriptor.repeatable = true;
            }
            '=' => {
                if descriptor.mutating {
                    return Err(duplicate('='));
                }
                descriptor.mutating = true;
            }
            '|' => {
                consumed += 1;
                break;
            }
            _ => break,
        }
        consumed += 1;
    }

    // Every modifier is a single ASCII byte
    let name = &body[..body.len() - consumed];
    if name.is_empty() {
        return Err(CompileError::EmptyName {
            annotation: annotation.to_string(),
        });
    }
    descriptor.name = name.to_string();

    Ok(descriptor)
}

fn parse_weight(annotation: &str, raw: &str) -> CompileResult<f64> {
    let invalid = || CompileError::InvalidWeight {
        annotation: annotation.to_string(),
        weight: raw.to_string(),
    };

    let weight: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(invalid());
    }
    Ok(weight)
}
