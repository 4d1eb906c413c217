//! Source files and the syntax node arena
//!
//! A [`SourceFile`] owns the text of one compilation unit and an arena of
//! [`SyntaxNode`]s lowered from the Tree-sitter concrete tree. Nodes refer to
//! each other by [`NodeId`]; the parent link is a back-reference only, the
//! arena owns every node.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;
use tree_sitter::{Node as TsNode, Parser, Tree};

/// Error types for parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

static NEXT_FILE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one parse. Two parses of the same text get different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);

impl FileId {
    fn fresh() -> Self {
        Self(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a node inside a specific [`SourceFile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    file: FileId,
    index: u32,
}

impl NodeId {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.file.0, self.index)
    }
}

/// Half-open byte range into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The node kinds rules dispatch on. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    Identifier,
    PropertyAccess,
    CallExpression,
    Other,
}

impl SyntaxKind {
    fn from_grammar(kind: &str) -> Self {
        match kind {
            "identifier" | "property_identifier" => SyntaxKind::Identifier,
            "member_expression" => SyntaxKind::PropertyAccess,
            "call_expression" => SyntaxKind::CallExpression,
            _ => SyntaxKind::Other,
        }
    }
}

/// One named node of the lowered tree
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// Tree-sitter grammar kind (e.g. `"lexical_declaration"`)
    pub grammar_kind: &'static str,
    /// Field role inside the parent (e.g. `"object"`, `"property"`)
    pub field: Option<&'static str>,
    pub span: Span,
    /// 1-indexed line
    pub line: usize,
    /// 1-indexed column (bytes)
    pub column: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// One parsed compilation unit
#[derive(Debug)]
pub struct SourceFile {
    id: FileId,
    path: PathBuf,
    text: String,
    nodes: Vec<SyntaxNode>,
    has_errors: bool,
}

impl SourceFile {
    /// Parse TypeScript source. `.tsx` paths use the TSX grammar.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let text = text.into();

        let tree = parse_tree(&path, &text)?;
        let id = FileId::fresh();
        let nodes = lower(&tree, id);

        Ok(Self {
            id,
            path,
            text,
            nodes,
            has_errors: tree.root_node().has_error(),
        })
    }

    /// Read and parse a file from disk
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, text)
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the parse produced ERROR or MISSING nodes
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            file: self.id,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` was produced by this parse
    pub fn contains(&self, id: NodeId) -> bool {
        id.file == self.id && id.index() < self.nodes.len()
    }

    /// Checked lookup, `None` for nodes of another file
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        if id.file != self.id {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Node lookup for ids handed out by this file
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        debug_assert_eq!(id.file, self.id, "node {id} is foreign to this file");
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Source text covered by a node
    pub fn node_text(&self, id: NodeId) -> &str {
        let span = self.node(id).span;
        &self.text[span.start..span.end]
    }

    /// First child playing the given field role
    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.node(*child).field == Some(field))
    }

    /// Receiver of a property access (`a.b` → `a`)
    pub fn access_receiver(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id) != SyntaxKind::PropertyAccess {
            return None;
        }
        self.child_by_field(id, "object")
    }

    /// Member name node of a property access (`a.b` → `b`)
    pub fn access_member(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id) != SyntaxKind::PropertyAccess {
            return None;
        }
        self.child_by_field(id, "property")
    }

    /// Every node below the root, breadth-first
    pub fn descendants(&self) -> crate::traverse::BreadthFirst<'_> {
        crate::traverse::breadth_first(self, self.root())
    }
}

fn parse_tree(path: &Path, text: &str) -> Result<Tree, ParseError> {
    let language: tree_sitter::Language = match path.extension().and_then(|e| e.to_str()) {
        Some("tsx") => tree_sitter_typescript::LANGUAGE_TSX.into(),
        _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    };

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::TreeSitter(e.to_string()))?;
    parser
        .parse(text, None)
        .ok_or_else(|| ParseError::ParseFailed(format!("{}", path.display())))
}

/// Lower the Tree-sitter tree into the arena, pre-order. Anonymous tokens and
/// comments are not kept.
fn lower(tree: &Tree, file: FileId) -> Vec<SyntaxNode> {
    let mut nodes: Vec<SyntaxNode> = Vec::new();
    let mut stack: Vec<(TsNode<'_>, Option<NodeId>, Option<&'static str>)> =
        vec![(tree.root_node(), None, None)];

    while let Some((ts_node, parent, field)) = stack.pop() {
        let id = NodeId {
            file,
            index: nodes.len() as u32,
        };
        let start = ts_node.start_position();
        nodes.push(SyntaxNode {
            kind: SyntaxKind::from_grammar(ts_node.kind()),
            grammar_kind: ts_node.kind(),
            field,
            span: Span::new(ts_node.start_byte(), ts_node.end_byte()),
            line: start.row + 1,
            column: start.column + 1,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            nodes[parent.index()].children.push(id);
        }

        let mut pending = Vec::new();
        let mut cursor = ts_node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_named() && !child.is_extra() {
                    pending.push((child, Some(id), cursor.field_name()));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        // Reverse so the first child is popped (and numbered) first
        stack.extend(pending.into_iter().rev());
    }

    nodes
}
