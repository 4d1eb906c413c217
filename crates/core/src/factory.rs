//! Replacement expression construction
//!
//! Fixes never splice strings by hand. They build an [`Expr`] out of
//! identifiers, property accesses and calls, and the change tracker prints it.
//! [`Expr::Original`] embeds an existing node verbatim.

use crate::fix::FixError;
use crate::syntax::{NodeId, SourceFile, SyntaxKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Identifier(String),
    PropertyAccess { object: Box<Expr>, name: String },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// An existing node, reproduced from the source text
    Original(NodeId),
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn property_access(object: Expr, name: impl Into<String>) -> Self {
        Expr::PropertyAccess {
            object: Box::new(object),
            name: name.into(),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn original(node: NodeId) -> Self {
        Expr::Original(node)
    }

    /// `self.pipe(arg)`
    pub fn pipe(self, arg: Expr) -> Self {
        Expr::call(Expr::property_access(self, "pipe"), vec![arg])
    }

    /// Serialize against `file`, validating every slot
    pub fn print(&self, file: &SourceFile) -> Result<String, FixError> {
        let mut out = String::new();
        self.write(file, &mut out)?;
        Ok(out)
    }

    fn write(&self, file: &SourceFile, out: &mut String) -> Result<(), FixError> {
        match self {
            Expr::Identifier(name) => {
                check_name(name)?;
                out.push_str(name);
            }
            Expr::PropertyAccess { object, name } => {
                check_name(name)?;
                object.write(file, out)?;
                out.push('.');
                out.push_str(name);
            }
            Expr::Call { callee, args } => {
                callee.write(file, out)?;
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.write(file, out)?;
                }
                out.push(')');
            }
            Expr::Original(node) => {
                if !file.contains(*node) {
                    return Err(FixError::ForeignNode(*node));
                }
                out.push_str(file.node_text(*node));
            }
        }
        Ok(())
    }
}

fn check_name(name: &str) -> Result<(), FixError> {
    if is_identifier_name(name) {
        Ok(())
    } else {
        Err(FixError::MalformedReplacement(format!(
            "`{name}` is not a valid identifier"
        )))
    }
}

/// ECMAScript IdentifierName, ASCII-plus-Unicode-letters approximation
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Rebuild an identifier or property-access chain node by node. Any other
/// receiver shape is kept as a reference to the original node.
pub fn clone_receiver(file: &SourceFile, node: NodeId) -> Expr {
    match file.kind(node) {
        SyntaxKind::Identifier => Expr::identifier(file.node_text(node)),
        SyntaxKind::PropertyAccess => {
            match (file.access_receiver(node), file.access_member(node)) {
                (Some(receiver), Some(member))
                    if file.kind(member) == SyntaxKind::Identifier =>
                {
                    Expr::property_access(clone_receiver(file, receiver), file.node_text(member))
                }
                _ => Expr::original(node),
            }
        }
        SyntaxKind::CallExpression | SyntaxKind::Other => Expr::original(node),
    }
}
