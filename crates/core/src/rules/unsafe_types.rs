//! Unsafe schema types — `Schema.Number` and `Schema.Date`
//!
//! Number is swapped for `JsonNumber`. Date has no renamed replacement; the
//! whole reference is wrapped as `Schema.Date.pipe(Schema.validDate())`, so
//! when the match is the member of `Schema.Date` the edit targets the access,
//! not the trailing identifier.

use super::{ensure_member, references_export, rename_fix, ReportSink, Rule, RuleContext};
use crate::factory::{clone_receiver, Expr};
use crate::finding::{Finding, Severity};
use crate::fix::Fix;
use crate::semantic::{ExportQuery, SCHEMA_MODULE};
use crate::syntax::{NodeId, SourceFile, SyntaxKind};

pub struct UnsafeTypesRule;

impl UnsafeTypesRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsafeTypesRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnsafeTypesRule {
    fn name(&self) -> &'static str {
        "schemaUnsafeTypes"
    }

    fn code(&self) -> u32 {
        36
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

            if references_export(ctx, node, "Number") {
                let mut finding = Finding::new(
                    file,
                    node,
                    "Schema.Number is unsafe. Use Schema.JsonNumber instead.",
                );
                if file.node_text(node) == "Number" {
                    finding = finding.with_fix(rename_fix(
                        "schemaUnsafeTypes_replaceWithJsonNumber",
                        "Replace with Schema.JsonNumber".to_string(),
                        node,
                        "JsonNumber",
                    ));
                }
                report.report(finding);
            } else if references_export(ctx, node, "Date") {
                let target = qualified_reference(file, node);
                // `Outer.Schema.Date` validates through `Outer.Schema`; a bare
                // `Date` needs the file's namespace binding
                let receiver = file.access_receiver(target);
                let namespace = match receiver {
                    Some(receiver) => file.node_text(receiver).to_string(),
                    None => ctx
                        .matcher
                        .imported_module_identifier(SCHEMA_MODULE)
                        .unwrap_or_else(|| ctx.schema_namespace.to_string()),
                };
                if is_validated(ctx, target, &namespace) {
                    continue;
                }

                let fix = Fix::new(
                    "schemaUnsafeTypes_replaceWithValidDate",
                    "Replace with Schema.Date.pipe(Schema.validDate())",
                    move |tracker| {
                        let file = tracker.file();
                        ensure_member(file, target)?;
                        let scope = match receiver {
                            Some(receiver) => clone_receiver(file, receiver),
                            None => Expr::identifier(namespace.as_str()),
                        };
                        let validator =
                            Expr::call(Expr::property_access(scope, "validDate"), Vec::new());
                        tracker.replace_node(target, &Expr::original(target).pipe(validator))
                    },
                );

                report.report(
                    Finding::new(
                        file,
                        node,
                        "Schema.Date is unsafe. Use Schema.Date.pipe(Schema.validDate()) instead.",
                    )
                    .with_fix(fix),
                );
            }
        }
    }
}

/// `Date` inside `Schema.Date` → the access; a bare `Date` → itself
fn qualified_reference(file: &SourceFile, identifier: NodeId) -> NodeId {
    match file.parent(identifier) {
        Some(parent) if file.access_member(parent) == Some(identifier) => parent,
        _ => identifier,
    }
}

/// Whether `target` already reads `target.pipe(..., validDate(), ...)`. The
/// validator either resolves to the schema export or is spelled exactly as
/// this rule's fix spells it (`<namespace>.validDate`, where `namespace` is
/// the receiver text of a qualified target).
fn is_validated(ctx: &RuleContext<'_>, target: NodeId, namespace: &str) -> bool {
    let file = ctx.file;
    let Some(access) = file.parent(target) else {
        return false;
    };
    if file.access_receiver(access) != Some(target)
        || file.access_member(access).map(|m| file.node_text(m)) != Some("pipe")
    {
        return false;
    }
    let Some(call) = file.parent(access) else {
        return false;
    };
    if file.kind(call) != SyntaxKind::CallExpression
        || file.child_by_field(call, "function") != Some(access)
    {
        return false;
    }
    let Some(arguments) = file.child_by_field(call, "arguments") else {
        return false;
    };

    let query = ExportQuery::schema("validDate");
    let is_validator = |callee: NodeId| {
        if ctx.matcher.reference_to(callee, &query).is_match() {
            return true;
        }
        match (file.access_receiver(callee), file.access_member(callee)) {
            (Some(receiver), Some(member)) => {
                file.node_text(member) == "validDate" && file.node_text(receiver) == namespace
            }
            _ => false,
        }
    };
    file.children(arguments).iter().any(|arg| {
        file.kind(*arg) == SyntaxKind::CallExpression
            && file
                .child_by_field(*arg, "function")
                .is_some_and(&is_validator)
    })
}
