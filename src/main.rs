use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fuzzy_schema::cli::Cli;
use fuzzy_schema::config::ConfigManager;
use fuzzy_schema::error_reporter::ErrorReporter;
use fuzzy_schema::output::Output;
use fuzzy_schema::records::{self, ParsedRecords};
use fuzzy_schema::{Error, Schema};

fn main() -> Result<ExitCode> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse_args();
    let reporter = ErrorReporter::new(cli.verbosity());

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        return Ok(ExitCode::FAILURE);
    }

    let config = match ConfigManager::load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            reporter.report_config_error(&error);
            return Ok(ExitCode::FAILURE);
        }
    };

    let threads = ConfigManager::get_thread_count(&config);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to configure the worker pool")?;
    debug!(threads, "Configured worker pool");

    let definition = std::fs::read_to_string(&cli.schema)
        .with_context(|| format!("Failed to read schema {}", cli.schema.display()))?;
    let definition = serde_json::from_str(&definition)
        .with_context(|| format!("Schema {} is not valid JSON", cli.schema.display()))?;

    // Compile before reading any record so a broken schema fails once
    let compiled = match Schema::with_builtins(definition, config.schema_options())
        .and_then(|schema| schema.compiled().map_err(Error::from))
    {
        Ok(compiled) => compiled,
        Err(error) => {
            reporter.report_error(&error);
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut parsed = ParsedRecords::default();
    if cli.inputs.is_empty() {
        parsed.extend(records::read_stdin().context("Failed to read standard input")?);
    } else {
        for input in &cli.inputs {
            parsed.extend(
                records::read_file(input)
                    .with_context(|| format!("Failed to read {}", input.display()))?,
            );
        }
    }
    info!(
        records = parsed.records.len(),
        unreadable = parsed.errors.len(),
        "Read records"
    );

    let results = compiled
        .apply_records(&parsed.records)
        .with_errors(parsed.errors);

    let verbosity = if config.output.quiet {
        fuzzy_schema::VerbosityLevel::Quiet
    } else if config.output.verbose {
        fuzzy_schema::VerbosityLevel::Verbose
    } else {
        fuzzy_schema::VerbosityLevel::Normal
    };
    let output = Output::new(verbosity, config.output.format.into());
    print!("{}", output.format_results(&results));

    Ok(if results.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
