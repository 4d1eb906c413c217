//! Fixes and the change tracker that stages their edits
//!
//! A [`Fix`] is inert: building one captures what it needs and nothing else.
//! Invoking it stages text edits into a [`ChangeTracker`], which rejects edits
//! against foreign nodes and edits whose spans overlap an already staged one.

use crate::factory::Expr;
use crate::syntax::{NodeId, SourceFile, Span};
use std::fmt;
use thiserror::Error;

/// Why a fix could not be staged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    #[error("node {0} is not part of this source file")]
    ForeignNode(NodeId),

    #[error("edit at {span} overlaps staged edit at {existing}")]
    OverlappingEdit { span: Span, existing: Span },

    #[error("malformed replacement: {0}")]
    MalformedReplacement(String),

    #[error("edit at {span} does not fit a text of {len} bytes")]
    InvalidSpan { span: Span, len: usize },
}

type FixBody = Box<dyn Fn(&mut ChangeTracker<'_>) -> Result<(), FixError> + Send + Sync>;

/// A named, deferred transformation
pub struct Fix {
    pub name: String,
    pub description: String,
    body: FixBody,
}

impl Fix {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body: impl Fn(&mut ChangeTracker<'_>) -> Result<(), FixError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            body: Box::new(body),
        }
    }

    /// Stage this fix's edits. On error, nothing it staged is kept.
    pub fn apply(&self, tracker: &mut ChangeTracker<'_>) -> Result<(), FixError> {
        let mark = tracker.edits.len();
        let result = (self.body)(tracker);
        if result.is_err() {
            tracker.edits.truncate(mark);
        }
        result
    }
}

impl fmt::Debug for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fix")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A staged replacement of one node's span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub target: NodeId,
    pub span: Span,
    pub replacement: String,
}

/// Pending edit set for one source file
pub struct ChangeTracker<'a> {
    file: &'a SourceFile,
    edits: Vec<TextEdit>,
}

impl<'a> ChangeTracker<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        Self {
            file,
            edits: Vec::new(),
        }
    }

    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    /// Edits staged so far, in staging order
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Stage replacing `target` with the printed form of `replacement`
    pub fn replace_node(&mut self, target: NodeId, replacement: &Expr) -> Result<(), FixError> {
        if !self.file.contains(target) {
            return Err(FixError::ForeignNode(target));
        }
        let span = self.file.node(target).span;
        if let Some(existing) = self.edits.iter().find(|edit| edit.span.overlaps(&span)) {
            return Err(FixError::OverlappingEdit {
                span,
                existing: existing.span,
            });
        }

        let replacement = replacement.print(self.file)?;
        tracing::trace!(
            file = %self.file.path().display(),
            %span,
            %replacement,
            "staged edit"
        );
        self.edits.push(TextEdit {
            target,
            span,
            replacement,
        });
        Ok(())
    }

    /// Close the session; edits come back sorted by position
    pub fn finalize(self) -> Vec<TextEdit> {
        let mut edits = self.edits;
        edits.sort_by_key(|edit| edit.span);
        edits
    }
}

/// Apply non-overlapping edits to `text`. Edits may come in any order; spans
/// must lie on character boundaries inside `text` and must not overlap.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, FixError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| edit.span);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut previous: Option<Span> = None;
    for edit in ordered {
        let span = edit.span;
        if span.start > span.end
            || span.end > text.len()
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            return Err(FixError::InvalidSpan {
                span,
                len: text.len(),
            });
        }
        match previous {
            Some(existing) if span.start < cursor => {
                return Err(FixError::OverlappingEdit { span, existing });
            }
            _ => {}
        }
        out.push_str(&text[cursor..span.start]);
        out.push_str(&edit.replacement);
        cursor = span.end;
        previous = Some(span);
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}
