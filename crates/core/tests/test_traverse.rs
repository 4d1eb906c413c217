//! Tests for breadth-first traversal

use schemalint_core::syntax::{NodeId, SourceFile};
use schemalint_core::traverse::breadth_first;

fn texts(file: &SourceFile, order: &[NodeId]) -> Vec<String> {
    order.iter().map(|id| file.node_text(*id).to_string()).collect()
}

#[test]
fn test_children_before_grandchildren() {
    let file = SourceFile::parse("a.ts", "f(a); g(b);").unwrap();
    let order: Vec<NodeId> = file.descendants().collect();
    assert_eq!(
        texts(&file, &order),
        vec!["f(a);", "g(b);", "f(a)", "g(b)", "f", "(a)", "g", "(b)", "a", "b"]
    );
}

#[test]
fn test_declaration_order() {
    let file = SourceFile::parse("a.ts", "const x = S.Number").unwrap();
    let kinds: Vec<&str> = file
        .descendants()
        .map(|id| file.node(id).grammar_kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            "lexical_declaration",
            "variable_declarator",
            "identifier",
            "member_expression",
            "identifier",
            "property_identifier",
        ]
    );
}

#[test]
fn test_traversal_is_idempotent() {
    let source = r#"
import { Schema } from "effect"

export const User = Schema.Struct({
  id: Schema.Number,
  created: Schema.Date,
  tags: Schema.Array(Schema.String),
})

function check(input: unknown) {
  return Schema.decodeUnknownSync(User)(input)
}
"#;
    let file = SourceFile::parse("user.ts", source).unwrap();
    let first: Vec<NodeId> = file.descendants().collect();
    let second: Vec<NodeId> = file.descendants().collect();
    assert_eq!(first, second);
}

#[test]
fn test_visits_every_node_once() {
    let source = "const a = [1, [2, [3, { b: c.d.e }]]]; if (a) { f(g(h)) }";
    let file = SourceFile::parse("a.ts", source).unwrap();
    let mut order: Vec<NodeId> = file.descendants().collect();
    // Everything except the root
    assert_eq!(order.len(), file.len() - 1);
    order.sort_by_key(|id| id.index());
    order.dedup();
    assert_eq!(order.len(), file.len() - 1);
}

#[test]
fn test_subtree_walk() {
    let file = SourceFile::parse("a.ts", "x; y.z;").unwrap();
    let second_statement = file.children(file.root())[1];
    let order: Vec<NodeId> = breadth_first(&file, second_statement).collect();
    assert_eq!(texts(&file, &order), vec!["y.z", "y", "z"]);
}
