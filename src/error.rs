use thiserror::Error;

use crate::config::ConfigError;

/// Main library error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema compilation error: {0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Apply(#[from] AggregatedError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while turning a schema definition into a compiled validator.
///
/// These are fatal: a schema that fails to compile can never be applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Modifier '{modifier}' appears more than once in \"{annotation}\"")]
    DuplicateModifier { annotation: String, modifier: char },

    #[error("Weight must be a non-negative float value not \"{weight}\" in \"{annotation}\"")]
    InvalidWeight { annotation: String, weight: String },

    #[error("Cannot set a quality weight and also skip quality in \"{annotation}\"")]
    WeightWithSkipQuality { annotation: String },

    #[error("Annotation \"{annotation}\" has an empty name")]
    EmptyName { annotation: String },

    #[error("Validator expression is empty")]
    EmptyExpression,

    #[error("Empty keyword in argument \"{token}\"")]
    EmptyKeyword { token: String },

    #[error("Unknown validator \"{name}\"")]
    UnknownValidator { name: String },

    #[error("Provided type of \"{type_name}\" not one of the supported value types: {supported}")]
    UnknownType { type_name: String, supported: String },

    #[error("Literal \"{literal}\" rejected by type \"{type_name}\": {reason}")]
    InvalidLiteral {
        literal: String,
        type_name: String,
        reason: String,
    },

    #[error("Catch-all field \"{annotation}\" cannot be required or repeatable")]
    CatchAllModifiers { annotation: String },

    #[error("Invalid definition: {details}")]
    InvalidDefinition { details: String },

    #[error("{path}: {error}")]
    AtPath {
        path: String,
        error: Box<CompileError>,
    },
}

impl CompileError {
    /// Attach the dotted schema path the error was raised under.
    pub fn at(self, path: &str) -> Self {
        match self {
            already @ CompileError::AtPath { .. } => already,
            error => CompileError::AtPath {
                path: path.to_string(),
                error: Box::new(error),
            },
        }
    }

    /// The error with any path context stripped.
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::AtPath { error, .. } => error.root(),
            error => error,
        }
    }
}

/// A validator rejected a value.
///
/// Returned by registry functions; the executor decides whether it drops the value,
/// gets swallowed, or escalates into an [`AggregatedError`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A single required failure found while walking a document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldFailure {
    #[error("{path} required but not specified")]
    Missing { path: String },

    #[error("At least one {path} is required")]
    EmptyList { path: String },

    #[error("{path} rejected by {validator}: {failure}")]
    Rejected {
        path: String,
        validator: String,
        failure: ValidationFailure,
    },
}

impl FieldFailure {
    /// Dotted path of the field that failed
    pub fn path(&self) -> &str {
        match self {
            FieldFailure::Missing { path }
            | FieldFailure::EmptyList { path }
            | FieldFailure::Rejected { path, .. } => path,
        }
    }
}

/// The only error surfaced from applying a compiled schema.
///
/// Fail-fast schemas carry exactly one failure; collecting schemas carry every
/// required failure found in the document, in walk order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", render_failures(.failures))]
pub struct AggregatedError {
    failures: Vec<FieldFailure>,
}

impl AggregatedError {
    pub fn new(failures: Vec<FieldFailure>) -> Self {
        Self { failures }
    }

    pub fn single(failure: FieldFailure) -> Self {
        Self {
            failures: vec![failure],
        }
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<FieldFailure> {
        self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable message for each failure
    pub fn messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

fn render_failures(failures: &[FieldFailure]) -> String {
    match failures {
        [only] => only.to_string(),
        many => format!(
            "Errors occurred when applying the schema: {}",
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Compilation result type alias
pub type CompileResult<T> = std::result::Result<T, CompileError>;
