//! Quality scoring and diagnostics
//!
//! A document's quality is earned weight over possible weight, accumulated
//! while the executor walks the schema.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Key under which a cleaned document's metadata is exposed
pub const METADATA_KEY: &str = "__metadata__";

/// Running weighted score for one document
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuntimeScore {
    pub score: f64,
    pub possible: f64,
}

impl RuntimeScore {
    /// Credit a field of `weight` that earned `ratio` of its validators
    pub fn add(&mut self, weight: f64, ratio: f64) {
        self.score += weight * ratio;
        self.possible += weight;
    }

    /// Record an optional field that was not given
    pub fn miss(&mut self, weight: f64) {
        self.possible += weight;
    }

    /// Overall quality in `[0, 1]`; a schema with nothing to score is perfect
    pub fn quality(&self) -> f64 {
        if self.possible == 0.0 {
            1.0
        } else {
            self.score / self.possible
        }
    }
}

/// Earned/possible weight of the validators in one field's chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tally {
    pub earned: f64,
    pub possible: f64,
}

impl Tally {
    /// Presence of the value counts as one earned unit
    pub fn new() -> Self {
        Self {
            earned: 1.0,
            possible: 1.0,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.possible == 0.0 {
            1.0
        } else {
            self.earned / self.possible
        }
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

/// Optional per-field scores and explanations collected during a walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    field_scores: Option<BTreeMap<String, f64>>,
    explain: Option<Vec<String>>,
}

impl Diagnostics {
    pub fn new(score_fields: bool, explain: bool) -> Self {
        Self {
            field_scores: score_fields.then(BTreeMap::new),
            explain: explain.then(Vec::new),
        }
    }

    pub fn field_score(&mut self, path: &str, ratio: f64) {
        if let Some(scores) = self.field_scores.as_mut() {
            scores.insert(path.to_string(), ratio);
        }
    }

    /// Record an explanation; the message is only built when explaining
    pub fn explain(&mut self, message: impl FnOnce() -> String) {
        if let Some(explain) = self.explain.as_mut() {
            explain.push(message());
        }
    }

    pub fn field_scores(&self) -> Option<&BTreeMap<String, f64>> {
        self.field_scores.as_ref()
    }

    pub fn explanations(&self) -> Option<&[String]> {
        self.explain.as_deref()
    }
}

/// Metadata attached to a cleaned document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    /// User-supplied schema metadata such as `schema_version`
    #[serde(flatten)]
    pub schema: Map<String, Value>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_scores: Option<BTreeMap<String, f64>>,
    #[serde(rename = "explain_scores", skip_serializing_if = "Option::is_none")]
    pub explain: Option<Vec<String>>,
}

impl Metadata {
    pub fn new(schema: Map<String, Value>, score: &RuntimeScore, diagnostics: Diagnostics) -> Self {
        Self {
            schema,
            score: score.quality(),
            field_scores: diagnostics.field_scores,
            explain: diagnostics.explain,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
