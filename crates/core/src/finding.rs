//! Finding types that bridge rule results to the reporting layer

use crate::fix::Fix;
use crate::syntax::{NodeId, SourceFile, Span};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Hint,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Off => write!(f, "off"),
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single finding reported by a rule
#[derive(Debug)]
pub struct Finding {
    /// Node the finding points at
    pub location: NodeId,

    pub span: Span,

    /// 1-indexed line of `span.start`
    pub line: usize,

    /// 1-indexed column of `span.start`
    pub column: usize,

    /// Human-readable message
    pub message: String,

    /// Proposed fixes in preference order (empty = not auto-fixable)
    pub fixes: Vec<Fix>,
}

impl Finding {
    pub fn new(file: &SourceFile, location: NodeId, message: impl Into<String>) -> Self {
        let node = file.node(location);
        Self {
            location,
            span: node.span,
            line: node.line,
            column: node.column,
            message: message.into(),
            fixes: Vec::new(),
        }
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fixes.push(fix);
        self
    }

    pub fn is_fixable(&self) -> bool {
        !self.fixes.is_empty()
    }
}

/// A finding stamped with the identity of the rule that produced it
#[derive(Debug)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub code: u32,
    pub severity: Severity,
    pub finding: Finding,
}

impl Diagnostic {
    /// Serializable snapshot (fix bodies are not serializable, only their names)
    pub fn record(&self, file: &SourceFile) -> DiagnosticRecord {
        DiagnosticRecord {
            rule: self.rule.to_string(),
            code: self.code,
            severity: self.severity,
            message: self.finding.message.clone(),
            file: file.path().to_path_buf(),
            line: self.finding.line,
            column: self.finding.column,
            text: file.node_text(self.finding.location).to_string(),
            fixes: self
                .finding
                .fixes
                .iter()
                .map(|fix| FixRecord {
                    name: fix.name.clone(),
                    description: fix.description.clone(),
                })
                .collect(),
        }
    }
}

/// JSON-ready view of a [`Diagnostic`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub rule: String,
    pub code: u32,
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,

    /// Source text at the finding location
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<FixRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRecord {
    pub name: String,
    pub description: String,
}

/// Summary of an analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub errors: usize,
    pub warnings: usize,
    pub hints: usize,
    pub fixable: usize,
    pub files_analyzed: usize,
}

impl DiagnosticSummary {
    pub fn add(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Hint => self.hints += 1,
            Severity::Off => {}
        }
        if diagnostic.finding.is_fixable() {
            self.fixable += 1;
        }
    }

    /// Check whether diagnostics reach the given severity threshold.
    ///
    /// - `Error` → fail if errors > 0
    /// - `Warning` → fail if errors or warnings > 0
    /// - `Hint` → fail if anything was reported
    /// - `Off` → always pass
    pub fn exceeds_threshold(&self, fail_on: Severity) -> bool {
        match fail_on {
            Severity::Error => self.errors > 0,
            Severity::Warning => self.errors > 0 || self.warnings > 0,
            Severity::Hint => self.errors > 0 || self.warnings > 0 || self.hints > 0,
            Severity::Off => false,
        }
    }
}
