//! Deprecated schema types — `Schema.Number` and `Schema.Date`
//!
//! `Number` accepts NaN and ±Infinity and `Date` accepts invalid dates; both
//! have drop-in replacements, so the fix is a plain identifier swap.

use super::{references_export, rename_fix, ReportSink, Rule, RuleContext};
use crate::finding::{Finding, Severity};
use crate::syntax::SyntaxKind;

struct DeprecatedType {
    name: &'static str,
    replacement: &'static str,
    fix_name: &'static str,
}

/// Checked in this order; the first match wins
const DEPRECATED_TYPES: &[DeprecatedType] = &[
    DeprecatedType {
        name: "Number",
        replacement: "JsonNumber",
        fix_name: "schemaDeprecatedTypes_replaceWithJsonNumber",
    },
    DeprecatedType {
        name: "Date",
        replacement: "ValidDate",
        fix_name: "schemaDeprecatedTypes_replaceWithValidDate",
    },
];

pub struct DeprecatedTypesRule;

impl DeprecatedTypesRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeprecatedTypesRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for DeprecatedTypesRule {
    fn name(&self) -> &'static str {
        "schemaDeprecatedTypes"
    }

    fn code(&self) -> u32 {
        34
    }

    fn default_severity(&self) -> Severity {
        Severity::Off
    }

    fn apply(&self, ctx: &RuleContext<'_>, report: &mut dyn ReportSink) {
        let file = ctx.file;

        for node in file.descendants() {
            match file.kind(node) {
                SyntaxKind::Identifier => {}
                SyntaxKind::PropertyAccess | SyntaxKind::CallExpression | SyntaxKind::Other => {
                    continue
                }
            }

            let Some(deprecated) = DEPRECATED_TYPES
                .iter()
                .find(|entry| references_export(ctx, node, entry.name))
            else {
                continue;
            };

            let mut finding = Finding::new(
                file,
                node,
                format!(
                    "Schema.{} is deprecated. Use Schema.{} instead.",
                    deprecated.name, deprecated.replacement
                ),
            );
            // A renamed import (`Number as N`) cannot be fixed by renaming one use
            if file.node_text(node) == deprecated.name {
                finding = finding.with_fix(rename_fix(
                    deprecated.fix_name,
                    format!("Replace with Schema.{}", deprecated.replacement),
                    node,
                    deprecated.replacement,
                ));
            }
            report.report(finding);
        }
    }
}
