//! Tests for semantic matching: aliases, re-exports, shadowing, indeterminacy

use schemalint_core::config::SchemaConfig;
use schemalint_core::semantic::{
    ConfiguredResolver, ExportQuery, MatchOutcome, ModuleResolution, ModuleResolver,
    SemanticMatcher, SemanticModel, SCHEMA_MODULE,
};
use schemalint_core::syntax::{NodeId, SourceFile};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Last node (in source order) whose text is exactly `text`
fn last_node(file: &SourceFile, text: &str) -> NodeId {
    file.descendants()
        .filter(|id| file.node_text(*id) == text)
        .max_by_key(|id| (file.node(*id).span.start, std::cmp::Reverse(file.node(*id).span.end)))
        .unwrap_or_else(|| panic!("no node spelled {text:?}"))
}

fn outcome(source: &str, text: &str, export: &str) -> MatchOutcome {
    let file = SourceFile::parse("test.ts", source).unwrap();
    let resolver = ConfiguredResolver::default();
    let model = SemanticModel::build(&file, &resolver);
    model.reference_to(last_node(&file, text), &ExportQuery::schema(export))
}

// ── Import forms ──────────────────────────────────────────────────────────────

#[test]
fn test_namespace_import_alias() {
    let src = "import * as S from \"effect/Schema\"\nconst x = S.Number";
    assert_eq!(outcome(src, "S.Number", "Number"), MatchOutcome::Matched);
    assert_eq!(outcome(src, "Number", "Number"), MatchOutcome::Matched);
    assert_eq!(outcome(src, "Number", "Date"), MatchOutcome::NotMatched);
}

#[test]
fn test_barrel_named_import() {
    let src = "import { Schema } from \"effect\"\nconst x = Schema.Date";
    assert_eq!(outcome(src, "Schema.Date", "Date"), MatchOutcome::Matched);
}

#[test]
fn test_barrel_namespace_import() {
    let src = "import * as Effect from \"effect\"\nconst x = Effect.Schema.Positive";
    assert_eq!(
        outcome(src, "Effect.Schema.Positive", "Positive"),
        MatchOutcome::Matched
    );
    // The namespace itself is not an export match
    assert_eq!(
        outcome(src, "Effect.Schema", "Positive"),
        MatchOutcome::NotMatched
    );
}

#[test]
fn test_renamed_named_import() {
    let src = "import { Number as N } from \"effect/Schema\"\nconst x = N";
    assert_eq!(outcome(src, "N", "Number"), MatchOutcome::Matched);

    let file = SourceFile::parse("test.ts", src).unwrap();
    let resolver = ConfiguredResolver::default();
    let model = SemanticModel::build(&file, &resolver);
    assert!(model.is_candidate_name("N", &ExportQuery::schema("Number")));
    assert!(!model.is_candidate_name("M", &ExportQuery::schema("Number")));
}

#[test]
fn test_import_specifier_is_not_a_reference() {
    let src = "import { Number } from \"effect/Schema\"";
    assert_eq!(outcome(src, "Number", "Number"), MatchOutcome::NotMatched);
}

#[test]
fn test_default_import_is_not_namespace() {
    let src = "import S from \"effect/Schema\"\nconst x = S.Number";
    assert_eq!(outcome(src, "S.Number", "Number"), MatchOutcome::NotMatched);
}

// ── Shadowing ─────────────────────────────────────────────────────────────────

#[test]
fn test_parameter_shadows_namespace() {
    let src = "import { Schema } from \"effect\"\nfunction f(Schema: any) { return Schema.Number }";
    assert_eq!(outcome(src, "Schema.Number", "Number"), MatchOutcome::NotMatched);
}

#[test]
fn test_destructured_parameter_shadows_namespace() {
    let src = "import { Schema } from \"effect\"\nconst f = ({ Schema }: any) => Schema.Number";
    assert_eq!(outcome(src, "Schema.Number", "Number"), MatchOutcome::NotMatched);
}

#[test]
fn test_local_const_shadows_named_import() {
    let src = "import { Number } from \"effect/Schema\"\nfunction f() {\n  const Number = 1\n  return Number\n}";
    assert_eq!(outcome(src, "Number", "Number"), MatchOutcome::NotMatched);
}

#[test]
fn test_shadow_does_not_leak_out_of_block() {
    let src = "import { Number } from \"effect/Schema\"\nif (true) { const Number = 1 }\nexport const y = Number";
    assert_eq!(outcome(src, "Number", "Number"), MatchOutcome::Matched);
}

#[test]
fn test_var_is_function_scoped() {
    let src = "import { Number } from \"effect/Schema\"\nfunction f() {\n  if (true) { var Number = 1 }\n  return Number\n}";
    assert_eq!(outcome(src, "Number", "Number"), MatchOutcome::NotMatched);
}

#[test]
fn test_catch_parameter_shadows() {
    let src = "import { Date } from \"effect/Schema\"\ntry {} catch (Date) { use(Date) }";
    assert_eq!(outcome(src, "Date", "Date"), MatchOutcome::NotMatched);
}

#[test]
fn test_for_of_binding_shadows() {
    let src = "import { Date } from \"effect/Schema\"\nfor (const Date of dates) { use(Date) }";
    assert_eq!(outcome(src, "Date", "Date"), MatchOutcome::NotMatched);
}

#[test]
fn test_var_in_for_of_is_function_scoped() {
    let top = "import { Schema } from \"effect\"\nfor (var Schema of xs) {}\nconst x = Schema.Number";
    assert_eq!(outcome(top, "Schema.Number", "Number"), MatchOutcome::NotMatched);

    let nested = "import { Schema } from \"effect\"\nfunction f(xs: any) {\n  for (var Schema of xs) {}\n  return Schema.Number\n}";
    assert_eq!(outcome(nested, "Schema.Number", "Number"), MatchOutcome::NotMatched);

    let block = "import { Schema } from \"effect\"\nfor (let Schema of xs) {}\nconst x = Schema.Number";
    assert_eq!(outcome(block, "Schema.Number", "Number"), MatchOutcome::Matched);
}

// ── Local aliases ─────────────────────────────────────────────────────────────

#[test]
fn test_const_alias_of_namespace() {
    let src = "import { Schema } from \"effect\"\nconst S2 = Schema\nconst x = S2.Number";
    assert_eq!(outcome(src, "S2.Number", "Number"), MatchOutcome::Matched);

    let chained = "import * as S from \"effect/Schema\"\nconst A = S\nconst B = A\nconst x = B.Date";
    assert_eq!(outcome(chained, "B.Date", "Date"), MatchOutcome::Matched);
}

#[test]
fn test_const_alias_of_export() {
    let src = "import { Schema } from \"effect\"\nconst N = Schema.Number\nexport const x = N";
    assert_eq!(outcome(src, "N", "Number"), MatchOutcome::Matched);

    let file = SourceFile::parse("test.ts", src).unwrap();
    let resolver = ConfiguredResolver::default();
    let model = SemanticModel::build(&file, &resolver);
    assert!(model.is_candidate_name("N", &ExportQuery::schema("Number")));
    assert!(!model.is_candidate_name("N", &ExportQuery::schema("Date")));
}

#[test]
fn test_let_is_not_an_alias() {
    let src = "import { Schema } from \"effect\"\nlet S2 = Schema\nconst x = S2.Number";
    assert_eq!(outcome(src, "S2.Number", "Number"), MatchOutcome::NotMatched);
}

#[test]
fn test_alias_cycle_is_indeterminate() {
    let src = "const a = b\nconst b = a\nconst x = a.Number";
    assert_eq!(outcome(src, "a.Number", "Number"), MatchOutcome::Indeterminate);
}

#[test]
fn test_global_is_not_matched() {
    assert_eq!(
        outcome("const n = Number(\"1\")", "Number", "Number"),
        MatchOutcome::NotMatched
    );
}

// ── Indeterminate ─────────────────────────────────────────────────────────────

#[test]
fn test_relative_import_is_indeterminate() {
    let src = "import * as S from \"./schema\"\nconst x = S.Number";
    assert_eq!(outcome(src, "S.Number", "Number"), MatchOutcome::Indeterminate);
}

#[test]
fn test_call_receiver_is_indeterminate() {
    let src = "import { Schema } from \"effect\"\nconst x = load().Number";
    assert_eq!(outcome(src, "load().Number", "Number"), MatchOutcome::Indeterminate);
}

#[test]
fn test_external_package_not_matched() {
    let src = "import * as z from \"zod\"\nconst x = z.Number";
    assert_eq!(outcome(src, "z.Number", "Number"), MatchOutcome::NotMatched);
}

// ── Companion lookup and resolver ─────────────────────────────────────────────

#[test]
fn test_imported_module_identifier() {
    let file = SourceFile::parse(
        "test.ts",
        "import { pipe } from \"effect\"\nimport { Schema as S } from \"effect\"",
    )
    .unwrap();
    let resolver = ConfiguredResolver::default();
    let model = SemanticModel::build(&file, &resolver);
    assert_eq!(
        model.imported_module_identifier(SCHEMA_MODULE),
        Some("S".to_string())
    );

    let bare = SourceFile::parse("test.ts", "const x = 1").unwrap();
    let model = SemanticModel::build(&bare, &resolver);
    assert_eq!(model.imported_module_identifier(SCHEMA_MODULE), None);
}

#[test]
fn test_configured_resolver() {
    let config = SchemaConfig {
        modules: vec!["@acme/schema".to_string()],
        barrels: vec!["@acme/core".to_string()],
        namespace: "Sch".to_string(),
    };
    let resolver = ConfiguredResolver::new(&config);
    assert_eq!(
        resolver.resolve("@acme/schema"),
        ModuleResolution::Module(SCHEMA_MODULE.to_string())
    );
    assert_eq!(resolver.resolve("effect"), ModuleResolution::External);
    assert_eq!(resolver.resolve("../local"), ModuleResolution::Unresolved);
    assert_eq!(
        resolver.namespace_reexport("@acme/core", "Sch"),
        Some(SCHEMA_MODULE.to_string())
    );
    assert_eq!(resolver.namespace_reexport("@acme/core", "Schema"), None);

    let file = SourceFile::parse(
        "test.ts",
        "import { Sch } from \"@acme/core\"\nconst x = Sch.Number",
    )
    .unwrap();
    let model = SemanticModel::build(&file, &resolver);
    assert_eq!(
        model.reference_to(last_node(&file, "Sch.Number"), &ExportQuery::schema("Number")),
        MatchOutcome::Matched
    );
}
