//! Diagnostic rules and the registry that runs them
//!
//! Every rule has the same shape: walk the file breadth-first, pre-filter
//! nodes by kind and spelling, confirm candidates with the
//! [`SemanticMatcher`], and report a [`Finding`] with deferred [`Fix`]es.
//! Rules never touch the tree; edits happen later, when a caller invokes a fix.

pub mod deprecated_types;
pub mod unsafe_numbers;
pub mod unsafe_types;

use crate::config::LintConfig;
use crate::factory::Expr;
use crate::finding::{Diagnostic, Finding, Severity};
use crate::fix::{Fix, FixError};
use crate::semantic::{ConfiguredResolver, ExportQuery, MatchOutcome, SemanticMatcher, SemanticModel};
use crate::suppress;
use crate::syntax::{NodeId, ParseError, SourceFile};
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Capabilities handed to a rule invocation
pub struct RuleContext<'a> {
    pub file: &'a SourceFile,
    pub matcher: &'a dyn SemanticMatcher,
    /// Local name to use for the schema namespace when the file binds none
    pub schema_namespace: &'a str,
}

/// Where rules send findings
pub trait ReportSink {
    fn report(&mut self, finding: Finding);
}

impl ReportSink for Vec<Finding> {
    fn report(&mut self, finding: Finding) {
        self.push(finding);
    }
}

/// A named, coded unit of analysis
pub trait Rule: Send + Sync {
    /// Unique rule name (e.g. `schemaUnsafeNumbers`)
    fn name(&self) -> &'static str;

    /// Unique numeric code
    fn code(&self) -> u32;

    fn default_severity(&self) -> Severity;

    /// Analyze `ctx.file`, reporting zero or more findings
    fn apply(&self, ctx: &RuleContext<'_>, report: &mut dyn ReportSink);
}

/// Errors raised while registering rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a rule named `{0}` is already registered")]
    DuplicateName(String),

    #[error("rule code {code} is already used by `{existing}`")]
    DuplicateCode { code: u32, existing: String },
}

/// One analyzed file together with its diagnostics
#[derive(Debug)]
pub struct FileAnalysis {
    pub file: SourceFile,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of analyzing one input of [`RuleRegistry::analyze_sources`]
#[derive(Debug)]
pub struct SourceReport {
    pub path: PathBuf,
    pub outcome: Result<FileAnalysis, ParseError>,
}

/// Dispatches analysis across all registered rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a registry with all built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(deprecated_types::DeprecatedTypesRule::new()),
                Box::new(unsafe_numbers::UnsafeNumbersRule::new()),
                Box::new(unsafe_types::UnsafeTypesRule::new()),
            ],
        }
    }

    /// Create a registry with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule; names and codes must be unique
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RegistryError> {
        for existing in &self.rules {
            if existing.name() == rule.name() {
                return Err(RegistryError::DuplicateName(rule.name().to_string()));
            }
            if existing.code() == rule.code() {
                return Err(RegistryError::DuplicateCode {
                    code: rule.code(),
                    existing: existing.name().to_string(),
                });
            }
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| &**rule)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules().find(|rule| rule.name() == name)
    }

    /// Run every enabled rule over one file with the built-in semantic model
    pub fn analyze(&self, file: &SourceFile, config: &LintConfig) -> Vec<Diagnostic> {
        let resolver = ConfiguredResolver::new(&config.schema);
        let model = SemanticModel::build(file, &resolver);
        self.analyze_with(file, &model, config)
    }

    /// Run every enabled rule over one file with a caller-supplied matcher.
    ///
    /// Rules run in registration order, each with its own findings buffer.
    /// Findings silenced by a `schemalint-ignore` comment are dropped.
    pub fn analyze_with(
        &self,
        file: &SourceFile,
        matcher: &dyn SemanticMatcher,
        config: &LintConfig,
    ) -> Vec<Diagnostic> {
        let ctx = RuleContext {
            file,
            matcher,
            schema_namespace: &config.schema.namespace,
        };
        let suppressions = suppress::parse_suppressions(file.text());
        let mut diagnostics = Vec::new();

        for rule in &self.rules {
            let severity = config.severity_for(rule.name(), rule.default_severity());
            if severity == Severity::Off {
                continue;
            }

            let mut findings: Vec<Finding> = Vec::new();
            rule.apply(&ctx, &mut findings);
            tracing::debug!(
                file = %file.path().display(),
                rule = rule.name(),
                findings = findings.len(),
                "rule finished"
            );

            for finding in findings {
                if suppress::is_suppressed(&suppressions, finding.line, rule.name(), rule.code()) {
                    continue;
                }
                diagnostics.push(Diagnostic {
                    rule: rule.name(),
                    code: rule.code(),
                    severity,
                    finding,
                });
            }
        }

        diagnostics
    }

    /// Parse and analyze many sources in parallel. Files share nothing, so
    /// each runs on its own rayon task; a parse failure only affects its file.
    pub fn analyze_sources(
        &self,
        sources: Vec<(PathBuf, String)>,
        config: &LintConfig,
    ) -> Vec<SourceReport> {
        sources
            .into_par_iter()
            .map(|(path, text)| {
                let outcome = SourceFile::parse(path.clone(), text).map(|file| {
                    let diagnostics = self.analyze(&file, config);
                    FileAnalysis { file, diagnostics }
                });
                if let Err(e) = &outcome {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unparsable file");
                }
                SourceReport { path, outcome }
            })
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-filter on spelling, then resolve. Indeterminate counts as no match.
pub(crate) fn references_export(ctx: &RuleContext<'_>, node: NodeId, export: &str) -> bool {
    let query = ExportQuery::schema(export);
    // A property access is spelled by its member name
    let spelling = match ctx.file.access_member(node) {
        Some(member) => ctx.file.node_text(member),
        None => ctx.file.node_text(node),
    };
    if !ctx.matcher.is_candidate_name(spelling, &query) {
        return false;
    }
    match ctx.matcher.reference_to(node, &query) {
        MatchOutcome::Matched => true,
        MatchOutcome::NotMatched => false,
        MatchOutcome::Indeterminate => {
            tracing::trace!(
                line = ctx.file.node(node).line,
                export,
                "indeterminate reference, not reporting"
            );
            false
        }
    }
}

/// Fix that swaps one identifier for another name
pub(crate) fn rename_fix(
    name: &str,
    description: String,
    node: NodeId,
    replacement: &'static str,
) -> Fix {
    Fix::new(name, description, move |tracker| {
        tracker.replace_node(node, &Expr::identifier(replacement))
    })
}

/// Guard for fix bodies that inspect the tree before staging
pub(crate) fn ensure_member(file: &SourceFile, node: NodeId) -> Result<(), FixError> {
    if file.contains(node) {
        Ok(())
    } else {
        Err(FixError::ForeignNode(node))
    }
}
