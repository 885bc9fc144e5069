use crate::cli::{Cli, OutputFormat};
use crate::schema::SchemaOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub schema: SchemaConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

/// Options every compiled schema is built with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Stop at the first required failure
    pub fail_fast: bool,
    /// Report a score for every field
    pub score_fields: bool,
    /// Report reasons for missing and rejected values
    pub explain: bool,
    /// Compile before reading any record
    pub precompile: bool,
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of worker threads
    pub threads: Option<usize>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (failures only)
    pub quiet: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        let options = SchemaOptions::default();
        Self {
            fail_fast: options.fail_fast,
            score_fields: options.score_fields,
            explain: options.explain,
            precompile: options.precompile,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Options for schemas built under this configuration
    pub fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            fail_fast: self.schema.fail_fast,
            score_fields: self.schema.score_fields,
            explain: self.schema.explain,
            precompile: self.schema.precompile,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path)?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file()? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Some("json") => {
                let config: Config = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    let config: Config = serde_json::from_str(&content)?;
                    Ok(config)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        Self::find_config_file_in(&PathBuf::from("."))
    }

    /// Find configuration file in `dir`, then in the user config directory
    pub fn find_config_file_in(dir: &Path) -> Result<Option<Config>> {
        let config_names = [
            "fuzzy-schema.toml",
            "fuzzy-schema.json",
            ".fuzzy-schema.toml",
            ".fuzzy-schema.json",
        ];

        for name in &config_names {
            let path = dir.join(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path)?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("fuzzy-schema");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path)?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        let flag = |key: &str| -> Result<Option<bool>> {
            env.get(key)
                .map(|value| {
                    value.parse().map_err(|_| {
                        ConfigError::Environment(format!("Invalid {key} value: {value}"))
                    })
                })
                .transpose()
        };

        // Schema settings
        if let Some(fail_fast) = flag("FUZZY_SCHEMA_FAIL_FAST")? {
            config.schema.fail_fast = fail_fast;
        }
        if let Some(score_fields) = flag("FUZZY_SCHEMA_FIELD_SCORES")? {
            config.schema.score_fields = score_fields;
        }
        if let Some(explain) = flag("FUZZY_SCHEMA_EXPLAIN")? {
            config.schema.explain = explain;
        }
        if let Some(precompile) = flag("FUZZY_SCHEMA_PRECOMPILE")? {
            config.schema.precompile = precompile;
        }

        // Processing settings
        if let Some(threads) = env.get("FUZZY_SCHEMA_THREADS") {
            config.processing.threads = Some(threads.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid FUZZY_SCHEMA_THREADS value: {}", threads))
            })?);
        }

        // Output settings
        if let Some(verbose) = flag("FUZZY_SCHEMA_VERBOSE")? {
            config.output.verbose = verbose;
        }
        if let Some(quiet) = flag("FUZZY_SCHEMA_QUIET")? {
            config.output.quiet = quiet;
        }

        if let Some(format) = env.get("FUZZY_SCHEMA_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid FUZZY_SCHEMA_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    ///
    /// Flags only switch settings on; an absent flag leaves the configured value.
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.collect_errors {
            config.schema.fail_fast = false;
        }
        if cli.field_scores {
            config.schema.score_fields = true;
        }
        if cli.explain {
            config.schema.explain = true;
        }

        if cli.threads.is_some() {
            config.processing.threads = cli.threads;
        }

        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        config
    }

    /// Merge two configurations (second takes precedence for non-None values)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        base.schema = override_config.schema;

        if override_config.processing.threads.is_some() {
            base.processing.threads = override_config.processing.threads;
        }

        base.output = override_config.output;

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if let Some(threads) = config.processing.threads {
            if threads == 0 {
                return Err(ConfigError::Validation(
                    "Number of threads must be greater than 0".to_string(),
                ));
            }
            if threads > 1000 {
                return Err(ConfigError::Validation(
                    "Number of threads cannot exceed 1000".to_string(),
                ));
            }
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the effective thread count
    pub fn get_thread_count(config: &Config) -> usize {
        config.processing.threads.unwrap_or_else(num_cpus::get)
    }
}
