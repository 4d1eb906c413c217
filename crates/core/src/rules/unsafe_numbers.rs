//! Unsafe numeric schemas — members like `Schema.Positive` that admit ±Infinity
//!
//! The fix rebuilds the access on `JsonNumber`, optionally piped through the
//! matching refinement: `Schema.Positive` → `Schema.JsonNumber.pipe(Schema.positive())`.
//! The receiver chain is cloned node by node so `Outer.Inner.Positive` keeps
//! `Outer.Inner`.

use super::{ensure_member, references_export, ReportSink, Rule, RuleContext};
use crate::factory::{clone_receiver, Expr};
use crate::finding::{Finding, Severity};
use crate::fix::Fix;
use crate::syntax::SyntaxKind;

struct UnsafeNumber {
    name: &'static str,
    replacement: &'static str,
    combinator: Option<&'static str>,
    reason: &'static str,
}

const UNSAFE_NUMBERS: &[UnsafeNumber] = &[
    UnsafeNumber {
        name: "Number",
        replacement: "JsonNumber",
        combinator: None,
        reason: "allows both NaN and +- Infinity",
    },
    UnsafeNumber {
        name: "Positive",
        replacement: "JsonNumber",
        combinator: Some("positive"),
        reason: "allows Infinity",
    },
    UnsafeNumber {
        name: "NonNegative",
        replacement: "JsonNumber",
        combinator: Some("nonNegative"),
        reason: "allows Infinity",
    },
    UnsafeNumber {
        name: "Negative",
        replacement: "JsonNumber",
        combinator: Some("negative"),
        reason: "allows -Infinity",
    },
    UnsafeNumber {
        name: "NonPositive",
        replacement: "JsonNumber",
        combinator: Some("nonPositive"),
        reason: "allows -Infinity",
    },
];

pub struct UnsafeNumbersRule;

impl UnsafeNumbersRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsafeNumbersRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnsafeNumbersRule {
    fn name(&self) -> &'static str {
        "schemaUnsafeNumbers"
    }

    fn code(&self) -> u32 {
        35
    }

    fn default_severity(&self) -> Severity {
        Severity::Off
    }

    fn apply(&self, ctx: &RuleContext<'_>, report: &mut dyn ReportSink) {
        let file = ctx.file;

        for access in file.descendants() {
            match file.kind(access) {
                SyntaxKind::PropertyAccess => {}
                SyntaxKind::Identifier | SyntaxKind::CallExpression | SyntaxKind::Other => continue,
            }
            let (Some(receiver), Some(member)) =
                (file.access_receiver(access), file.access_member(access))
            else {
                continue;
            };
            let name = file.node_text(member);
            let Some(unsafe_number) = UNSAFE_NUMBERS.iter().find(|entry| entry.name == name) else {
                continue;
            };
            if !references_export(ctx, access, unsafe_number.name) {
                continue;
            }

            let description = match unsafe_number.combinator {
                Some(combinator) => format!(
                    "Replace with Schema.{}.pipe(Schema.{combinator}())",
                    unsafe_number.replacement
                ),
                None => format!("Replace with Schema.{}", unsafe_number.replacement),
            };
            let replacement = unsafe_number.replacement;
            let combinator = unsafe_number.combinator;
            let fix = Fix::new("schemaUnsafeNumbers_fix", description, move |tracker| {
                let file = tracker.file();
                ensure_member(file, access)?;

                let mut expr = Expr::property_access(clone_receiver(file, receiver), replacement);
                if let Some(combinator) = combinator {
                    expr = expr.pipe(Expr::call(
                        Expr::property_access(clone_receiver(file, receiver), combinator),
                        Vec::new(),
                    ));
                }
                tracker.replace_node(access, &expr)
            });

            report.report(
                Finding::new(
                    file,
                    access,
                    format!(
                        "Schema.{} is unsafe because: {}.",
                        unsafe_number.name, unsafe_number.reason
                    ),
                )
                .with_fix(fix),
            );
        }
    }
}
