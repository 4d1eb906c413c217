//! Configuration file parsing for .schemalint.toml

use crate::finding::Severity;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name looked up by [`LintConfig::find_and_load`]
pub const CONFIG_FILE_NAME: &str = ".schemalint.toml";

/// Main configuration structure for .schemalint.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Severity overrides keyed by rule name (e.g. `schemaUnsafeNumbers = "warning"`)
    #[serde(default)]
    pub rules: BTreeMap<String, Severity>,
}

/// Where the schema module lives and how it is re-exported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Import specifiers that denote the schema module itself
    #[serde(default = "default_schema_modules")]
    pub modules: Vec<String>,

    /// Barrel packages re-exporting the schema module as a namespace
    #[serde(default = "default_barrels")]
    pub barrels: Vec<String>,

    /// Name of the namespace export in the barrels, also the fallback local
    /// name when synthesizing references
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

// Default functions
fn default_schema_modules() -> Vec<String> {
    vec![
        "effect/Schema".to_string(),
        "@effect/schema/Schema".to_string(),
    ]
}

fn default_barrels() -> Vec<String> {
    vec!["effect".to_string(), "@effect/schema".to_string()]
}

fn default_namespace() -> String {
    "Schema".to_string()
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            schema: SchemaConfig::default(),
            rules: BTreeMap::new(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            modules: default_schema_modules(),
            barrels: default_barrels(),
            namespace: default_namespace(),
        }
    }
}

impl LintConfig {
    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: LintConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Find and load .schemalint.toml from the given directory or ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading config");
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Effective severity of a rule: the override if present, else its default
    pub fn severity_for(&self, rule_name: &str, default: Severity) -> Severity {
        self.rules.get(rule_name).copied().unwrap_or(default)
    }
}
