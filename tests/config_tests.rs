//! Configuration loading tests.

use junos_facts::config::{Config, LogFormat, LogLevel};
use junos_facts::facts::{FactsGatherer, RoutingEngineOptions};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_toml_file() {
    let file = write_config(
        ".toml",
        r#"
[facts]
infrastructure = "FM-1"
ignore_failures = false

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.facts.infrastructure, "FM-1");
    assert!(!config.facts.ignore_failures);
    assert!(config.facts.warn_on_duplicate_re);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_yaml_file() {
    let file = write_config(
        ".yml",
        r#"
facts:
  warn_on_duplicate_re: false
logging:
  filter: junos_facts=trace
"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.logging.filter.as_deref(), Some("junos_facts=trace"));
    assert_eq!(config.facts.infrastructure, "FM-0");
    assert!(!config.facts.warn_on_duplicate_re);
}

#[test]
fn test_invalid_file_reports_path() {
    let file = write_config(".toml", "[facts\ninfrastructure = ");

    let err = Config::from_file(file.path()).unwrap_err();

    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let file = write_config(
        ".toml",
        "[facts]\ninfrastructure = \"FM-1\"\nignore_failures = false\n",
    );
    std::env::set_var("JUNOS_FACTS_INFRASTRUCTURE", "FM-3");

    let config = Config::load(Some(file.path()));

    std::env::remove_var("JUNOS_FACTS_INFRASTRUCTURE");

    let config = config.unwrap();
    assert_eq!(config.facts.infrastructure, "FM-3");
    assert!(!config.facts.ignore_failures);
}

#[test]
#[serial]
fn test_facts_config_drives_collectors() {
    let file = write_config(".toml", "[facts]\ninfrastructure = \"FM-2\"\n");

    let config = Config::load(Some(file.path())).unwrap();
    let options = RoutingEngineOptions::from(&config.facts);
    let gatherer = FactsGatherer::with_builtins(&config.facts);

    assert_eq!(options.infrastructure, "FM-2");
    assert_eq!(gatherer.names(), vec!["routing_engines"]);
}
