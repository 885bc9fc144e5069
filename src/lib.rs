//! # fuzzy-schema Library
//!
//! Data-quality validation for noisy records. A schema maps annotated field
//! names to validator chains; applying it produces a cleaned record plus a
//! quality score in `[0, 1]` instead of a plain pass/fail.
//!
//! ```
//! use fuzzy_schema::{Schema, SchemaOptions};
//! use serde_json::json;
//!
//! let schema = Schema::with_builtins(
//!     json!({"age!": "int= minimum=1:int maximum=10:int", "name": "str"}),
//!     SchemaOptions::default(),
//! )?;
//!
//! let cleaned = schema.apply(&json!({"age": "5"}))?;
//! assert_eq!(cleaned.fields()["age"], json!(5));
//! assert_eq!(cleaned.score(), 0.5);
//! # Ok::<(), fuzzy_schema::Error>(())
//! ```

pub mod aggregate;
pub mod annotation;
pub mod builtins;
pub mod cli;
pub mod compile;
pub mod config;
pub mod error;
pub mod error_reporter;
pub mod executor;
pub mod expression;
pub mod output;
pub mod records;
pub mod registry;
pub mod schema;
pub mod scoring;
pub mod validator;

pub use aggregate::{ErrorAggregator, ErrorMode};
pub use annotation::{CATCH_ALL, Descriptor, parse_annotation};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use compile::{SchemaNode, compile_definition};
pub use config::{Config, ConfigError, ConfigManager};
pub use error::{
    AggregatedError, CompileError, CompileResult, Error, FieldFailure, Result, ValidationFailure,
};
pub use executor::is_truthy;
pub use expression::{ValidatorRef, parse_expression};
pub use output::Output;
pub use registry::{Args, Registry, ValidatorFn};
pub use schema::{Schema, SchemaOptions};
pub use scoring::{Diagnostics, METADATA_KEY, Metadata, RuntimeScore};
pub use validator::{
    ApplyResults, CleanedDocument, CompiledValidator, Record, RecordResult, RecordStatus,
};
