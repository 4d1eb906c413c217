//! Semantic matching — does a node denote a specific module export?
//!
//! Rules never compare spellings alone. They ask a [`SemanticMatcher`] whether
//! a node resolves to `(module, export)`, which follows import aliases,
//! barrel re-exports and lexical shadowing.
//!
//! [`SemanticModel`] is the built-in matcher. It runs a single-file scope
//! analysis and delegates import specifiers to a [`ModuleResolver`]; anything
//! it cannot see (relative imports, values produced by calls) resolves to
//! [`MatchOutcome::Indeterminate`].

use crate::config::SchemaConfig;
use crate::syntax::{NodeId, SourceFile, SyntaxKind};
use std::collections::{HashMap, HashSet};

/// Canonical name of the schema module, whatever specifier imported it
pub const SCHEMA_MODULE: &str = "effect/Schema";

/// Result of a semantic reference check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NotMatched,
    /// Declaration information unavailable; callers treat this as not matched
    Indeterminate,
}

impl MatchOutcome {
    pub fn is_match(self) -> bool {
        self == MatchOutcome::Matched
    }
}

/// An external API point: export `export` of module `module`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportQuery<'a> {
    pub module: &'a str,
    pub export: &'a str,
}

impl<'a> ExportQuery<'a> {
    pub const fn new(module: &'a str, export: &'a str) -> Self {
        Self { module, export }
    }

    /// Export of the schema module
    pub const fn schema(export: &'a str) -> Self {
        Self::new(SCHEMA_MODULE, export)
    }
}

/// Declaration-resolution capability consumed by rules
pub trait SemanticMatcher: Send + Sync {
    /// Whether `node` resolves to the queried export. May be expensive.
    fn reference_to(&self, node: NodeId, query: &ExportQuery<'_>) -> MatchOutcome;

    /// Cheap spelling pre-filter run before [`reference_to`](Self::reference_to).
    /// Must accept every local name the export may be bound to.
    fn is_candidate_name(&self, text: &str, query: &ExportQuery<'_>) -> bool {
        text == query.export
    }

    /// Local identifier the file binds to `module`'s namespace, if any
    fn imported_module_identifier(&self, module: &str) -> Option<String>;
}

/// What an import specifier points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleResolution {
    /// A module the resolver knows, by canonical name
    Module(String),
    /// A package that is known not to be of interest
    External,
    /// The resolver cannot tell (e.g. relative paths)
    Unresolved,
}

/// Import resolution capability
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, specifier: &str) -> ModuleResolution;

    /// Canonical module re-exported as namespace `name` by `module`
    /// (e.g. `effect` exports the schema module as `Schema`)
    fn namespace_reexport(&self, module: &str, name: &str) -> Option<String>;
}

/// [`ModuleResolver`] driven by the `[schema]` config section
#[derive(Debug, Clone)]
pub struct ConfiguredResolver {
    schema_modules: Vec<String>,
    barrels: Vec<String>,
    namespace: String,
}

impl ConfiguredResolver {
    pub fn new(config: &SchemaConfig) -> Self {
        Self {
            schema_modules: config.modules.clone(),
            barrels: config.barrels.clone(),
            namespace: config.namespace.clone(),
        }
    }
}

impl Default for ConfiguredResolver {
    fn default() -> Self {
        Self::new(&SchemaConfig::default())
    }
}

impl ModuleResolver for ConfiguredResolver {
    fn resolve(&self, specifier: &str) -> ModuleResolution {
        if specifier.starts_with('.') || specifier.starts_with('/') {
            return ModuleResolution::Unresolved;
        }
        if self.schema_modules.iter().any(|m| m == specifier) {
            return ModuleResolution::Module(SCHEMA_MODULE.to_string());
        }
        if self.barrels.iter().any(|b| b == specifier) {
            return ModuleResolution::Module(specifier.to_string());
        }
        ModuleResolution::External
    }

    fn namespace_reexport(&self, module: &str, name: &str) -> Option<String> {
        if name == self.namespace && self.barrels.iter().any(|b| b == module) {
            Some(SCHEMA_MODULE.to_string())
        } else {
            None
        }
    }
}

/// What an expression denotes after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denotation {
    /// A module namespace object
    Namespace(String),
    /// A named export of a module
    Export { module: String, name: String },
    /// A local, global, or otherwise non-module value
    Value,
    /// Not enough information
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Imported {
    Namespace,
    Default,
    Named(String),
}

#[derive(Debug, Clone)]
struct ImportBinding {
    local: String,
    denotation: Denotation,
}

#[derive(Debug, Clone, Copy)]
enum Binding {
    Local,
    Import(usize),
    /// `const name = <identifier or access chain>`
    Alias(NodeId),
}

/// Alias chains longer than this resolve to [`Denotation::Unknown`]
const MAX_ALIAS_DEPTH: usize = 16;

const SCOPE_KINDS: &[&str] = &[
    "program",
    "statement_block",
    "function_declaration",
    "function_expression",
    "generator_function_declaration",
    "generator_function",
    "arrow_function",
    "method_definition",
    "for_statement",
    "for_in_statement",
    "catch_clause",
];

const FUNCTION_SCOPE_KINDS: &[&str] = &[
    "program",
    "function_declaration",
    "function_expression",
    "generator_function_declaration",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Single-file scope analysis implementing [`SemanticMatcher`]
pub struct SemanticModel<'a> {
    file: &'a SourceFile,
    resolver: &'a dyn ModuleResolver,
    scopes: HashMap<NodeId, HashMap<String, Binding>>,
    /// Import bindings in source order
    imports: Vec<ImportBinding>,
    /// `const` aliases: local name and the aliased expression
    aliases: Vec<(String, NodeId)>,
    /// Identifiers that declare a name rather than reference one
    binding_sites: HashSet<NodeId>,
}

impl<'a> SemanticModel<'a> {
    pub fn build(file: &'a SourceFile, resolver: &'a dyn ModuleResolver) -> Self {
        let mut model = Self {
            file,
            resolver,
            scopes: HashMap::new(),
            imports: Vec::new(),
            aliases: Vec::new(),
            binding_sites: HashSet::new(),
        };

        for node in file.descendants() {
            match file.node(node).grammar_kind {
                "import_statement" => model.collect_import(node),
                "variable_declarator" => {
                    let function_scoped = file
                        .parent(node)
                        .is_some_and(|p| file.node(p).grammar_kind == "variable_declaration");
                    let kinds = if function_scoped {
                        FUNCTION_SCOPE_KINDS
                    } else {
                        SCOPE_KINDS
                    };
                    let scope = model.enclosing(node, kinds);
                    if let Some(pattern) = file.child_by_field(node, "name") {
                        model.bind_pattern(scope, pattern);
                        model.bind_alias(scope, node, pattern);
                    }
                }
                "function_declaration"
                | "generator_function_declaration"
                | "class_declaration"
                | "abstract_class_declaration"
                | "enum_declaration" => {
                    let scope = model.enclosing(node, SCOPE_KINDS);
                    if let Some(name) = file.child_by_field(node, "name") {
                        model.bind_pattern(scope, name);
                    }
                }
                "function_expression" | "generator_function" => {
                    if let Some(name) = file.child_by_field(node, "name") {
                        model.bind_pattern(node, name);
                    }
                }
                "formal_parameters" => {
                    let Some(function) = file.parent(node) else {
                        continue;
                    };
                    for param in file.children(node) {
                        match file.child_by_field(*param, "pattern") {
                            Some(pattern) => model.bind_pattern(function, pattern),
                            None => model.bind_pattern(function, *param),
                        }
                    }
                }
                "arrow_function" => {
                    if let Some(param) = file.child_by_field(node, "parameter") {
                        model.bind_pattern(node, param);
                    }
                }
                "catch_clause" => {
                    if let Some(param) = file.child_by_field(node, "parameter") {
                        model.bind_pattern(node, param);
                    }
                }
                "for_in_statement" => {
                    if let Some(left) = file.child_by_field(node, "left") {
                        let head = &file.text()[file.node(node).span.start..file.node(left).span.start];
                        let has_word =
                            |kw: &str| head.split(|c: char| !c.is_alphanumeric()).any(|w| w == kw);
                        if has_word("var") {
                            let scope = model.enclosing(node, FUNCTION_SCOPE_KINDS);
                            model.bind_pattern(scope, left);
                        } else if has_word("const") || has_word("let") {
                            model.bind_pattern(node, left);
                        }
                    }
                }
                _ => {}
            }
        }

        tracing::trace!(
            file = %file.path().display(),
            imports = model.imports.len(),
            scopes = model.scopes.len(),
            "built semantic model"
        );
        model
    }

    /// Resolve what an expression denotes
    pub fn denotation(&self, node: NodeId) -> Denotation {
        self.denote(node, 0)
    }

    fn denote(&self, node: NodeId, depth: usize) -> Denotation {
        let file = self.file;
        match file.kind(node) {
            SyntaxKind::Identifier => {
                if let Some(parent) = file.parent(node) {
                    if file.kind(parent) == SyntaxKind::PropertyAccess
                        && file.node(node).field == Some("property")
                    {
                        return self.denote_access(parent, depth);
                    }
                }
                self.denote_identifier(node, depth)
            }
            SyntaxKind::PropertyAccess => self.denote_access(node, depth),
            SyntaxKind::CallExpression => Denotation::Unknown,
            SyntaxKind::Other => match file.node(node).grammar_kind {
                "parenthesized_expression" | "non_null_expression" => match file.children(node) {
                    [inner] => self.denote(*inner, depth),
                    _ => Denotation::Unknown,
                },
                "string" | "number" | "template_string" | "array" | "object" | "true"
                | "false" | "null" | "undefined" => Denotation::Value,
                _ => Denotation::Unknown,
            },
        }
    }

    fn denote_identifier(&self, node: NodeId, depth: usize) -> Denotation {
        let file = self.file;
        // Object keys, method names and the like are not references
        if file.node(node).grammar_kind != "identifier" || self.binding_sites.contains(&node) {
            return Denotation::Value;
        }
        match self.lookup(node, file.node_text(node)) {
            Some(Binding::Import(index)) => self.imports[index].denotation.clone(),
            Some(Binding::Alias(value)) => self.denote_alias(value, depth),
            Some(Binding::Local) | None => Denotation::Value,
        }
    }

    fn denote_alias(&self, value: NodeId, depth: usize) -> Denotation {
        if depth >= MAX_ALIAS_DEPTH {
            return Denotation::Unknown;
        }
        self.denote(value, depth + 1)
    }

    fn denote_access(&self, access: NodeId, depth: usize) -> Denotation {
        let file = self.file;
        let (Some(receiver), Some(member)) = (file.access_receiver(access), file.access_member(access))
        else {
            return Denotation::Unknown;
        };
        let name = file.node_text(member);
        match self.denote(receiver, depth) {
            Denotation::Namespace(module) => match self.resolver.namespace_reexport(&module, name) {
                Some(target) => Denotation::Namespace(target),
                None => Denotation::Export {
                    module,
                    name: name.to_string(),
                },
            },
            Denotation::Unknown => Denotation::Unknown,
            Denotation::Export { .. } | Denotation::Value => Denotation::Value,
        }
    }

    fn lookup(&self, node: NodeId, name: &str) -> Option<Binding> {
        let mut current = self.file.parent(node);
        while let Some(scope) = current {
            if let Some(binding) = self.scopes.get(&scope).and_then(|names| names.get(name)) {
                return Some(*binding);
            }
            current = self.file.parent(scope);
        }
        None
    }

    /// Nearest ancestor (exclusive) whose grammar kind is in `kinds`
    fn enclosing(&self, node: NodeId, kinds: &[&str]) -> NodeId {
        let mut current = self.file.parent(node);
        while let Some(candidate) = current {
            if kinds.contains(&self.file.node(candidate).grammar_kind) {
                return candidate;
            }
            current = self.file.parent(candidate);
        }
        self.file.root()
    }

    fn bind_pattern(&mut self, scope: NodeId, pattern: NodeId) {
        let mut names = Vec::new();
        collect_pattern(self.file, pattern, &mut names);
        for name in names {
            self.binding_sites.insert(name);
            self.scopes
                .entry(scope)
                .or_default()
                .insert(self.file.node_text(name).to_string(), Binding::Local);
        }
    }

    /// Rebind a `const` declarator whose value is a name or access chain as an
    /// alias of that value
    fn bind_alias(&mut self, scope: NodeId, declarator: NodeId, name: NodeId) {
        let file = self.file;
        let Some(declaration) = file.parent(declarator) else {
            return;
        };
        if file.node(declaration).grammar_kind != "lexical_declaration"
            || !file.node_text(declaration).starts_with("const")
            || file.node(name).grammar_kind != "identifier"
        {
            return;
        }
        let Some(value) = file.child_by_field(declarator, "value") else {
            return;
        };
        match file.kind(value) {
            SyntaxKind::Identifier | SyntaxKind::PropertyAccess => {}
            SyntaxKind::CallExpression | SyntaxKind::Other => return,
        }

        let local = file.node_text(name).to_string();
        self.scopes
            .entry(scope)
            .or_default()
            .insert(local.clone(), Binding::Alias(value));
        self.aliases.push((local, value));
    }

    fn collect_import(&mut self, statement: NodeId) {
        let file = self.file;

        // Nothing inside an import statement is a reference
        for inner in crate::traverse::breadth_first(file, statement) {
            if file.kind(inner) == SyntaxKind::Identifier {
                self.binding_sites.insert(inner);
            }
        }

        let Some(source) = file.child_by_field(statement, "source") else {
            return;
        };
        let specifier = file
            .node_text(source)
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();

        let Some(clause) = file
            .children(statement)
            .iter()
            .copied()
            .find(|c| file.node(*c).grammar_kind == "import_clause")
        else {
            return;
        };

        for part in file.children(clause) {
            match file.node(*part).grammar_kind {
                "identifier" => self.add_import(*part, &specifier, Imported::Default),
                "namespace_import" => {
                    if let Some(local) = file
                        .children(*part)
                        .iter()
                        .copied()
                        .find(|c| file.node(*c).grammar_kind == "identifier")
                    {
                        self.add_import(local, &specifier, Imported::Namespace);
                    }
                }
                "named_imports" => {
                    for spec in file.children(*part) {
                        if file.node(*spec).grammar_kind != "import_specifier" {
                            continue;
                        }
                        let Some(name) = file.child_by_field(*spec, "name") else {
                            continue;
                        };
                        let local = file.child_by_field(*spec, "alias").unwrap_or(name);
                        let imported = Imported::Named(
                            file.node_text(name)
                                .trim_matches(|c| c == '"' || c == '\'')
                                .to_string(),
                        );
                        self.add_import(local, &specifier, imported);
                    }
                }
                _ => {}
            }
        }
    }

    fn add_import(&mut self, local: NodeId, specifier: &str, imported: Imported) {
        let resolver = self.resolver;
        let denotation = match resolver.resolve(specifier) {
            ModuleResolution::Unresolved => Denotation::Unknown,
            ModuleResolution::External => import_denotation(specifier.to_string(), imported, None),
            ModuleResolution::Module(module) => {
                let reexport = match &imported {
                    Imported::Named(name) => resolver.namespace_reexport(&module, name),
                    _ => None,
                };
                import_denotation(module, imported, reexport)
            }
        };

        let name = self.file.node_text(local).to_string();
        let index = self.imports.len();
        self.imports.push(ImportBinding {
            local: name.clone(),
            denotation,
        });
        let root = self.file.root();
        self.scopes
            .entry(root)
            .or_default()
            .insert(name, Binding::Import(index));
    }
}

impl SemanticMatcher for SemanticModel<'_> {
    fn reference_to(&self, node: NodeId, query: &ExportQuery<'_>) -> MatchOutcome {
        match self.denotation(node) {
            Denotation::Export { module, name } if module == query.module && name == query.export => {
                MatchOutcome::Matched
            }
            Denotation::Unknown => MatchOutcome::Indeterminate,
            _ => MatchOutcome::NotMatched,
        }
    }

    fn is_candidate_name(&self, text: &str, query: &ExportQuery<'_>) -> bool {
        let exports = |denotation: &Denotation| {
            matches!(
                denotation,
                Denotation::Export { module, name }
                    if module == query.module && name == query.export
            )
        };
        text == query.export
            || self
                .imports
                .iter()
                .any(|binding| binding.local == text && exports(&binding.denotation))
            || self
                .aliases
                .iter()
                .any(|(local, value)| local == text && exports(&self.denotation(*value)))
    }

    fn imported_module_identifier(&self, module: &str) -> Option<String> {
        self.imports
            .iter()
            .find(|binding| matches!(&binding.denotation, Denotation::Namespace(m) if m == module))
            .map(|binding| binding.local.clone())
    }
}

fn import_denotation(module: String, imported: Imported, reexport: Option<String>) -> Denotation {
    if let Some(target) = reexport {
        return Denotation::Namespace(target);
    }
    match imported {
        Imported::Namespace => Denotation::Namespace(module),
        Imported::Default => Denotation::Export {
            module,
            name: "default".to_string(),
        },
        Imported::Named(name) => Denotation::Export { module, name },
    }
}

/// Identifiers introduced by a binding pattern, skipping default values and
/// the keys of `{ key: value }` patterns
fn collect_pattern(file: &SourceFile, pattern: NodeId, out: &mut Vec<NodeId>) {
    match file.node(pattern).grammar_kind {
        "identifier" | "type_identifier" | "shorthand_property_identifier_pattern" => {
            out.push(pattern)
        }
        "pair_pattern" => {
            if let Some(value) = file.child_by_field(pattern, "value") {
                collect_pattern(file, value, out);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = file.child_by_field(pattern, "left") {
                collect_pattern(file, left, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            for child in file.children(pattern) {
                collect_pattern(file, *child, out);
            }
        }
        _ => {}
    }
}
