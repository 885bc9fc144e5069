use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show failures
    Quiet,
    /// Show the summary
    #[default]
    Normal,
    /// Show every record that did not pass
    Verbose,
    /// Show every record with its cleaned output
    Debug,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored per-record lines and a summary
    Human,
    /// One JSON document with every result
    Json,
    /// Summary counts only
    Summary,
}

/// Fuzzy data-quality validation
#[derive(Parser, Debug, Clone)]
#[command(name = "fuzzy-schema")]
#[command(about = "Apply an annotated schema to JSON records, cleaning them and scoring their quality")]
#[command(version)]
pub struct Cli {
    /// Schema definition (JSON)
    #[arg(help = "Schema definition file (JSON)")]
    pub schema: PathBuf,

    /// Record files; standard input when none are given
    #[arg(help = "JSON document, JSON array or JSON lines files")]
    pub inputs: Vec<PathBuf>,

    /// Collect every required failure instead of stopping at the first
    #[arg(long = "collect-errors")]
    pub collect_errors: bool,

    /// Include per-field scores in the metadata
    #[arg(long = "field-scores")]
    pub field_scores: bool,

    /// Include explanations for missing and rejected values
    #[arg(long = "explain")]
    pub explain: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of worker threads
    #[arg(
        short = 't',
        long = "threads",
        help = "Number of threads used to apply the schema"
    )]
    pub threads: Option<usize>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (failures only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.schema.exists() {
            return Err(format!("Schema does not exist: {}", self.schema.display()));
        }
        if let Some(missing) = self.inputs.iter().find(|input| !input.exists()) {
            return Err(format!("Input does not exist: {}", missing.display()));
        }
        if let Some(threads) = self.threads
            && threads == 0
        {
            return Err("Number of threads must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_cli_parsing() {
        let args = vec!["fuzzy-schema", "schema.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.schema, PathBuf::from("schema.json"));
        assert!(cli.inputs.is_empty());
        assert!(!cli.collect_errors);
        assert_eq!(cli.format, None);
        assert_eq!(cli.verbosity(), VerbosityLevel::Normal);
    }

    #[test]
    fn test_full_cli_parsing() {
        let args = vec![
            "fuzzy-schema",
            "schema.json",
            "a.jsonl",
            "b.json",
            "--collect-errors",
            "--field-scores",
            "--explain",
            "--format",
            "json",
            "--threads",
            "3",
            "-q",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert!(cli.collect_errors && cli.field_scores && cli.explain);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.threads, Some(3));
        assert_eq!(cli.verbosity(), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let args = vec!["fuzzy-schema", "schema.json", "-v", "-q"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_schema() {
        let cli = Cli::try_parse_from(["fuzzy-schema", "/definitely/not/here.json"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
