use clap::Parser;
use fuzzy_schema::config::OutputFormatConfig;
use fuzzy_schema::{Cli, Config, ConfigError, ConfigManager, OutputFormat};

use crate::common::test_helpers::Workspace;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["fuzzy-schema", "schema.json"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_toml_file_sets_schema_options() {
    let workspace = Workspace::new();
    let path = workspace.write(
        "fuzzy-schema.toml",
        r#"
[schema]
fail_fast = false
explain = true

[processing]
threads = 3

[output]
format = "summary"
"#,
    );

    let config = ConfigManager::load_from_file(&path).unwrap();
    let options = config.schema_options();
    assert!(!options.fail_fast);
    assert!(options.explain);
    assert!(!options.score_fields);
    assert_eq!(config.processing.threads, Some(3));
    assert_eq!(config.output.format, OutputFormatConfig::Summary);
    assert_eq!(ConfigManager::get_thread_count(&config), 3);
}

#[test]
fn test_discovery_in_directory() {
    let workspace = Workspace::new();
    workspace.write(".fuzzy-schema.json", r#"{"schema": {"score_fields": true}}"#);
    let found = ConfigManager::find_config_file_in(workspace.dir.path())
        .unwrap()
        .unwrap();
    assert!(found.schema.score_fields);
    assert!(found.schema.fail_fast);
}

#[test]
fn test_cli_flags_override_file() {
    let base = Config::default();
    let merged = ConfigManager::merge_with_cli(
        base,
        &cli(&["--collect-errors", "--field-scores", "-f", "json", "-t", "2"]),
    );

    let options = merged.schema_options();
    assert!(!options.fail_fast);
    assert!(options.score_fields);
    assert!(!options.explain);
    assert_eq!(OutputFormat::from(merged.output.format), OutputFormat::Json);
    assert_eq!(merged.processing.threads, Some(2));
}

#[test]
fn test_absent_flags_keep_configured_values() {
    let mut base = Config::default();
    base.schema.fail_fast = false;
    base.schema.explain = true;
    base.output.format = OutputFormatConfig::Summary;

    let merged = ConfigManager::merge_with_cli(base.clone(), &cli(&[]));
    assert_eq!(merged, base);
}

#[test]
fn test_invalid_configurations() {
    let workspace = Workspace::new();

    let yaml = workspace.write("config.yaml", "schema: {}");
    assert!(matches!(
        ConfigManager::load_from_file(&yaml),
        Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
    ));

    let broken = workspace.write("config.toml", "[schema\nfail_fast = ");
    assert!(matches!(
        ConfigManager::load_from_file(&broken),
        Err(ConfigError::TomlParsing(_))
    ));

    let mut config = Config::default();
    config.processing.threads = Some(0);
    assert!(ConfigManager::validate_config(&config).is_err());
}
