//! Batch fix application — applies the preferred fix of each diagnostic
//!
//! All fixes for one file are staged in a single [`ChangeTracker`] session.
//! A fix that conflicts with one already staged is reported as failed rather
//! than merged; the caller can re-run diagnostics on the fixed text and try
//! again.

use crate::finding::Diagnostic;
use crate::fix::{apply_edits, ChangeTracker, FixError, TextEdit};
use crate::syntax::SourceFile;
use anyhow::{Context, Result};

/// Result of applying a single fix
#[derive(Debug, Clone)]
pub struct FixResult {
    pub rule: &'static str,
    pub fix: String,
    pub line: usize,
}

/// A fix that could not be staged
#[derive(Debug, Clone)]
pub struct FailedFix {
    pub rule: &'static str,
    pub fix: String,
    pub line: usize,
    pub error: FixError,
}

/// Summary of all fixes applied
#[derive(Debug, Clone, Default)]
pub struct FixReport {
    /// Number of fixes staged
    pub applied: usize,
    /// Number of diagnostics without any fix
    pub skipped: usize,
    /// Details of each applied fix
    pub results: Vec<FixResult>,
    /// Fixes rejected by the change tracker
    pub failed: Vec<FailedFix>,
}

/// Fixed text plus the edits that produced it
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub text: String,
    pub edits: Vec<TextEdit>,
    pub report: FixReport,
}

/// Apply the first fix of every diagnostic, in order, to `file`'s text
pub fn apply_fixes(
    file: &SourceFile,
    diagnostics: &[Diagnostic],
) -> Result<FixOutcome, FixError> {
    let mut report = FixReport::default();
    let mut tracker = ChangeTracker::new(file);

    for diagnostic in diagnostics {
        let Some(fix) = diagnostic.finding.fixes.first() else {
            report.skipped += 1;
            continue;
        };

        match fix.apply(&mut tracker) {
            Ok(()) => {
                report.applied += 1;
                report.results.push(FixResult {
                    rule: diagnostic.rule,
                    fix: fix.name.clone(),
                    line: diagnostic.finding.line,
                });
            }
            Err(error) => {
                tracing::warn!(
                    file = %file.path().display(),
                    rule = diagnostic.rule,
                    fix = %fix.name,
                    %error,
                    "fix not applied"
                );
                report.failed.push(FailedFix {
                    rule: diagnostic.rule,
                    fix: fix.name.clone(),
                    line: diagnostic.finding.line,
                    error,
                });
            }
        }
    }

    let edits = tracker.finalize();
    let text = apply_edits(file.text(), &edits)?;
    Ok(FixOutcome {
        text,
        edits,
        report,
    })
}

/// Apply fixes and write the result back to `file.path()`.
/// Files are modified in-place (user reviews via `git diff`).
pub fn write_fixes(file: &SourceFile, diagnostics: &[Diagnostic]) -> Result<FixReport> {
    let outcome = apply_fixes(file, diagnostics)?;
    if outcome.edits.is_empty() {
        return Ok(outcome.report);
    }
    std::fs::write(file.path(), &outcome.text)
        .with_context(|| format!("Failed to write {}", file.path().display()))?;
    Ok(outcome.report)
}
