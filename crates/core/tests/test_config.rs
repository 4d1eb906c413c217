//! Tests for configuration parsing

use schemalint_core::config::{CONFIG_FILE_NAME, LintConfig};
use schemalint_core::Severity;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_default_config() {
    let config = LintConfig::default();
    assert_eq!(
        config.schema.modules,
        vec!["effect/Schema", "@effect/schema/Schema"]
    );
    assert_eq!(config.schema.barrels, vec!["effect", "@effect/schema"]);
    assert_eq!(config.schema.namespace, "Schema");
    assert!(config.rules.is_empty());
}

#[test]
fn test_parse_partial_config() {
    let config = LintConfig::parse(
        r#"
[schema]
namespace = "S"

[rules]
schemaUnsafeNumbers = "error"
schemaDeprecatedTypes = "hint"
"#,
    )
    .unwrap();

    assert_eq!(config.schema.namespace, "S");
    // Unset fields keep their defaults
    assert_eq!(config.schema.barrels, vec!["effect", "@effect/schema"]);
    assert_eq!(
        config.severity_for("schemaUnsafeNumbers", Severity::Off),
        Severity::Error
    );
    assert_eq!(
        config.severity_for("schemaDeprecatedTypes", Severity::Off),
        Severity::Hint
    );
    assert_eq!(
        config.severity_for("schemaUnsafeTypes", Severity::Off),
        Severity::Off
    );
}

#[test]
fn test_invalid_severity_rejected() {
    assert!(LintConfig::parse("[rules]\nschemaUnsafeTypes = \"fatal\"\n").is_err());
}

#[test]
fn test_from_file() {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "[schema]\nmodules = [\"@acme/schema\"]").unwrap();

    let config = LintConfig::from_file(tmp.path()).unwrap();
    assert_eq!(config.schema.modules, vec!["@acme/schema"]);
}

#[test]
fn test_find_and_load_from_nested_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[rules]\nschemaUnsafeTypes = \"warning\"\n",
    )
    .unwrap();
    let nested = dir.path().join("src").join("models");
    std::fs::create_dir_all(&nested).unwrap();

    let config = LintConfig::find_and_load(&nested).unwrap();
    assert_eq!(
        config.severity_for("schemaUnsafeTypes", Severity::Off),
        Severity::Warning
    );
}

#[test]
fn test_find_and_load_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let config = LintConfig::find_and_load(dir.path()).unwrap();
    assert_eq!(config.schema.namespace, "Schema");
}

#[test]
fn test_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    let mut config = LintConfig::default();
    config.schema.namespace = "Sch".to_string();
    config
        .rules
        .insert("schemaUnsafeNumbers".to_string(), Severity::Warning);
    config.save(&path).unwrap();

    let loaded = LintConfig::from_file(&path).unwrap();
    assert_eq!(loaded.schema.namespace, "Sch");
    assert_eq!(
        loaded.rules.get("schemaUnsafeNumbers"),
        Some(&Severity::Warning)
    );
}
