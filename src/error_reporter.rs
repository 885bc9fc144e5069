use crate::cli::VerbosityLevel;
use crate::config::ConfigError;
use crate::error::{CompileError, Error};

/// Error reporter with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_timestamps: false,
        }
    }

    /// Create a new error reporter with additional options
    pub fn with_options(verbosity: VerbosityLevel, show_timestamps: bool) -> Self {
        Self {
            verbosity,
            show_timestamps,
        }
    }

    /// Report a crate error with appropriate verbosity
    pub fn report_error(&self, error: &Error) {
        eprintln!("{}", self.format_error(error));
    }

    /// Report a configuration error
    pub fn report_config_error(&self, error: &ConfigError) {
        eprintln!("{}", self.format_config_error(error));
    }

    pub fn format_error(&self, error: &Error) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => self.format_error_brief(error),
            VerbosityLevel::Normal => self.format_error_normal(error),
            VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => self.format_error_debug(error),
        }
    }

    pub fn format_config_error(&self, error: &ConfigError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("Config error: {}", error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                format!(
                    "Configuration Error: {}\n{}",
                    error,
                    self.get_config_help(error)
                )
            }
            VerbosityLevel::Debug => {
                format!(
                    "Configuration Error: {}\nDebug: {:?}\n{}",
                    error,
                    error,
                    self.get_config_help(error)
                )
            }
        }
    }

    /// Format error for brief output (quiet mode)
    fn format_error_brief(&self, error: &Error) -> String {
        match error {
            Error::Compile(_) => "INVALID SCHEMA".to_string(),
            Error::Apply(failures) => format!("FAILED: {} failure(s)", failures.len()),
            _ => format!("ERROR: {}", error),
        }
    }

    /// Format error for normal output
    fn format_error_normal(&self, error: &Error) -> String {
        let timestamp = if self.show_timestamps {
            format!("[{}] ", chrono::Utc::now().format("%H:%M:%S"))
        } else {
            String::new()
        };

        format!("{}{}", timestamp, error)
    }

    /// Format error for verbose output
    fn format_error_verbose(&self, error: &Error) -> String {
        let mut output = self.format_error_normal(error);

        match error {
            Error::Compile(compile) => {
                if let CompileError::AtPath { path, .. } = compile {
                    output.push_str(&format!("\nField: {}", path));
                }
                output.push_str(&format!("\nSuggestion: {}", compile_help(compile.root())));
            }
            Error::Apply(failures) => {
                for failure in failures.failures() {
                    output.push_str(&format!("\n  {}: {}", failure.path(), failure));
                }
            }
            Error::Json(_) => {
                output.push_str("\nSuggestion: Schemas and records must be valid JSON");
            }
            _ => {}
        }

        output
    }

    /// Format error for debug output
    fn format_error_debug(&self, error: &Error) -> String {
        let mut output = self.format_error_verbose(error);
        output.push_str(&format!("\nDebug Info: {:?}", error));

        output.push_str("\nError Chain:");
        let mut current_error: &dyn std::error::Error = error;
        let mut level = 0;
        while let Some(source) = current_error.source() {
            output.push_str(&format!("\n  {}: {}", level + 1, source));
            current_error = source;
            level += 1;
        }

        output
    }

    /// Get helpful suggestions for configuration errors
    fn get_config_help(&self, error: &ConfigError) -> String {
        match error {
            ConfigError::Io(_) => "Check that the configuration file exists and is readable".to_string(),
            ConfigError::TomlParsing(_) | ConfigError::JsonParsing(_) => {
                "Check the configuration file syntax (TOML/JSON format expected)".to_string()
            }
            ConfigError::UnsupportedFormat(_) => {
                "Use a .toml or .json configuration file".to_string()
            }
            ConfigError::Environment(_) => {
                "Check the FUZZY_SCHEMA_* environment variables".to_string()
            }
            ConfigError::Validation(_) => {
                "Resolve conflicting configuration values between file, environment, and CLI"
                    .to_string()
            }
        }
    }
}

fn compile_help(error: &CompileError) -> &'static str {
    match error {
        CompileError::DuplicateModifier { .. } => "Use each of ! ? + = at most once per name",
        CompileError::InvalidWeight { .. } | CompileError::WeightWithSkipQuality { .. } => {
            "Weights follow ~ as a non-negative number and cannot be combined with ?"
        }
        CompileError::UnknownValidator { .. } | CompileError::UnknownType { .. } => {
            "Register the validator before compiling the schema"
        }
        CompileError::CatchAllModifiers { .. } => "Remove ! and + from the ** field",
        _ => "Check the schema definition",
    }
}
