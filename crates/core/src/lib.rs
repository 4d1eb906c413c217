//! Schemalint Core - Schema API Diagnostic Engine
//!
//! This crate flags uses of unsafe or deprecated schema APIs in TypeScript and
//! offers source rewrites:
//! - AST parsing via Tree-sitter into an owned node arena
//! - Breadth-first traversal shared by every rule
//! - Semantic matching of nodes against module exports (aliases, shadowing)
//! - Deferred fixes staged through a non-overlapping change tracker

pub mod config;
pub mod factory;
pub mod finding;
pub mod fix;
pub mod fixer;
pub mod rules;
pub mod semantic;
pub mod suppress;
pub mod syntax;
pub mod traverse;

pub use config::LintConfig;
pub use factory::Expr;
pub use finding::{Diagnostic, DiagnosticRecord, DiagnosticSummary, Finding, Severity};
pub use fix::{apply_edits, ChangeTracker, Fix, FixError, TextEdit};
pub use fixer::{apply_fixes, FixReport};
pub use rules::{ReportSink, Rule, RuleContext, RuleRegistry};
pub use semantic::{
    ConfiguredResolver, ExportQuery, MatchOutcome, ModuleResolver, SemanticMatcher, SemanticModel,
};
pub use syntax::{NodeId, ParseError, SourceFile, Span, SyntaxKind};

/// Schemalint version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
