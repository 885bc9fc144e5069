//! Compiled validator and batch application
//!
//! A [`CompiledValidator`] is the immutable result of compiling a schema
//! definition. It is `Send + Sync` and applied concurrently by batch callers:
//! every call builds its own score, diagnostics and failure list.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::compile::{SchemaNode, compile_definition};
use crate::error::{AggregatedError, CompileResult};
use crate::executor::execute;
use crate::registry::Registry;
use crate::schema::SchemaOptions;
use crate::scoring::{Diagnostics, METADATA_KEY, Metadata};

/// Executable form of a schema definition
#[derive(Debug, Clone)]
pub struct CompiledValidator {
    nodes: Vec<SchemaNode>,
    registry: Arc<Registry>,
    options: SchemaOptions,
    metadata: Map<String, Value>,
}

impl CompiledValidator {
    /// Compile `definition` against `registry`
    pub fn compile(
        definition: &Map<String, Value>,
        registry: Arc<Registry>,
        options: SchemaOptions,
        metadata: Map<String, Value>,
    ) -> CompileResult<Self> {
        let nodes = compile_definition(definition, &registry)?;
        Ok(Self {
            nodes,
            registry,
            options,
            metadata,
        })
    }

    pub fn nodes(&self) -> &[SchemaNode] {
        &self.nodes
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Validate and clean one raw document
    ///
    /// A document that is not a mapping is treated as an empty mapping, so
    /// every field is reported absent.
    pub fn apply(&self, document: &Value) -> Result<CleanedDocument, AggregatedError> {
        let empty = Map::new();
        let input = document.as_object().unwrap_or(&empty);

        let output = execute(
            &self.nodes,
            &self.registry,
            input,
            self.options.error_mode(),
            Diagnostics::new(self.options.score_fields, self.options.explain),
        )?;

        Ok(CleanedDocument {
            metadata: Metadata::new(self.metadata.clone(), &output.score, output.diagnostics),
            fields: output.fields,
        })
    }

    /// Apply to a batch of records in parallel, summarizing the outcome
    pub fn apply_records(&self, records: &[Record]) -> ApplyResults {
        let started = Instant::now();
        let results: Vec<RecordResult> = records
            .par_iter()
            .map(|record| {
                let start = Instant::now();
                match self.apply(&record.document) {
                    Ok(cleaned) => RecordResult::passed(record.source.clone(), cleaned, start.elapsed()),
                    Err(error) => RecordResult::failed(record.source.clone(), &error, start.elapsed()),
                }
            })
            .collect();

        let results = ApplyResults::aggregate(results).with_wall_time(started.elapsed());
        debug!(
            total = results.total_records,
            passed = results.passed_records,
            failed = results.failed_records,
            "Applied schema to records"
        );
        results
    }
}

/// The fields that passed plus per-call metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDocument {
    fields: Map<String, Value>,
    metadata: Metadata,
}

impl CleanedDocument {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Overall quality in `[0, 1]`
    pub fn score(&self) -> f64 {
        self.metadata.score
    }

    /// Fields with the metadata under `__metadata__`
    pub fn into_value(self) -> Value {
        let mut fields = self.fields;
        fields.insert(METADATA_KEY.to_string(), self.metadata.to_value());
        Value::Object(fields)
    }
}

/// One raw record with a label naming where it came from
#[derive(Debug, Clone)]
pub struct Record {
    pub source: String,
    pub document: Value,
}

impl Record {
    pub fn new(source: impl Into<String>, document: Value) -> Self {
        Self {
            source: source.into(),
            document,
        }
    }
}

/// Status of a single record application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Every required constraint held
    Passed { score: f64 },
    /// At least one required constraint failed
    Failed { failure_count: usize },
    /// The record could not be read
    Error { message: String },
}

impl RecordStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, RecordStatus::Passed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecordStatus::Failed { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RecordStatus::Error { .. })
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            RecordStatus::Passed { score } => Some(*score),
            _ => None,
        }
    }
}

/// Result of applying a schema to one record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResult {
    pub source: String,
    pub status: RecordStatus,
    /// Cleaned document with its metadata, when the record passed
    pub output: Option<Value>,
    pub duration: Duration,
    /// Failure messages when the record did not pass
    pub error_details: Vec<String>,
}

impl RecordResult {
    pub fn passed(source: String, cleaned: CleanedDocument, duration: Duration) -> Self {
        Self {
            source,
            status: RecordStatus::Passed {
                score: cleaned.score(),
            },
            output: Some(cleaned.into_value()),
            duration,
            error_details: Vec::new(),
        }
    }

    pub fn failed(source: String, error: &AggregatedError, duration: Duration) -> Self {
        Self {
            source,
            status: RecordStatus::Failed {
                failure_count: error.len(),
            },
            output: None,
            duration,
            error_details: error.messages(),
        }
    }

    pub fn error(source: String, message: String) -> Self {
        Self {
            source,
            status: RecordStatus::Error {
                message: message.clone(),
            },
            output: None,
            duration: Duration::ZERO,
            error_details: vec![message],
        }
    }
}

/// Aggregated results of applying a schema to many records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResults {
    pub total_records: usize,
    pub passed_records: usize,
    pub failed_records: usize,
    pub error_records: usize,
    /// Sum of per-record durations
    pub total_duration: Duration,
    pub average_duration: Duration,
    /// Elapsed time for the whole batch
    pub wall_time: Duration,
    /// Mean quality over passed records
    pub average_score: Option<f64>,
    pub min_score: Option<f64>,
    pub record_results: Vec<RecordResult>,
}

impl ApplyResults {
    /// Aggregate individual record results into summary
    pub fn aggregate(record_results: Vec<RecordResult>) -> Self {
        let total_records = record_results.len();
        let mut passed_records = 0;
        let mut failed_records = 0;
        let mut error_records = 0;
        let mut total_duration = Duration::ZERO;
        let mut scores = Vec::new();

        for result in &record_results {
            match result.status {
                RecordStatus::Passed { score } => {
                    passed_records += 1;
                    scores.push(score);
                }
                RecordStatus::Failed { .. } => failed_records += 1,
                RecordStatus::Error { .. } => error_records += 1,
            }
            total_duration += result.duration;
        }

        let average_duration = if total_records > 0 {
            total_duration / total_records as u32
        } else {
            Duration::ZERO
        };

        let average_score =
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);
        let min_score = scores.iter().copied().reduce(f64::min);

        Self {
            total_records,
            passed_records,
            failed_records,
            error_records,
            total_duration,
            average_duration,
            wall_time: total_duration,
            average_score,
            min_score,
            record_results,
        }
    }

    pub fn with_wall_time(mut self, wall_time: Duration) -> Self {
        self.wall_time = wall_time;
        self
    }

    /// Merge in records that could not be read, keeping the counts in step
    ///
    /// Each error is paired with the number of readable records that came
    /// before it, so the merged results follow input order.
    pub fn with_errors(mut self, errors: Vec<(usize, RecordResult)>) -> Self {
        let mut errors = errors.into_iter().peekable();
        let mut results = Vec::with_capacity(self.record_results.len() + errors.len());
        for (index, result) in self.record_results.into_iter().enumerate() {
            while let Some((_, error)) = errors.next_if(|(position, _)| *position <= index) {
                results.push(error);
            }
            results.push(result);
        }
        results.extend(errors.map(|(_, error)| error));

        let wall_time = self.wall_time;
        self = Self::aggregate(results);
        self.wall_time = wall_time;
        self
    }

    /// Check if every record passed
    pub fn all_passed(&self) -> bool {
        self.passed_records == self.total_records && self.total_records > 0
    }

    /// Check if any record failed or could not be read
    pub fn has_failures(&self) -> bool {
        self.failed_records > 0 || self.error_records > 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.passed_records as f64 / self.total_records as f64) * 100.0
        }
    }
}
