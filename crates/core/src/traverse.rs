//! Breadth-first tree traversal
//!
//! Every rule walks the file with [`breadth_first`]: the root's children are
//! queued first, and each dequeued node queues its own children behind the
//! siblings already waiting. The queue lives inside the iterator, so two walks
//! over the same tree yield the same sequence.

use crate::syntax::{NodeId, SourceFile};
use std::collections::VecDeque;

/// Iterator over the descendants of a node, breadth-first
pub struct BreadthFirst<'a> {
    file: &'a SourceFile,
    queue: VecDeque<NodeId>,
    yielded: usize,
}

/// Walk every descendant of `root` exactly once. `root` itself is not yielded.
pub fn breadth_first(file: &SourceFile, root: NodeId) -> BreadthFirst<'_> {
    let mut queue = VecDeque::new();
    queue.extend(file.children(root).iter().copied());
    BreadthFirst {
        file,
        queue,
        yielded: 0,
    }
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.queue.pop_front()?;
        self.queue.extend(self.file.children(node).iter().copied());

        self.yielded += 1;
        // A parser-built tree is acyclic; more visits than nodes means a cycle
        debug_assert!(
            self.yielded <= self.file.len(),
            "traversal revisited nodes in {}",
            self.file.path().display()
        );
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxKind;

    #[test]
    fn test_excludes_root() {
        let file = SourceFile::parse("a.ts", "a;").unwrap();
        assert!(file.descendants().all(|id| id != file.root()));
    }

    #[test]
    fn test_ancestor_before_descendant() {
        let file = SourceFile::parse("a.ts", "f(a.b.c);").unwrap();
        let order: Vec<NodeId> = file.descendants().collect();
        for (pos, id) in order.iter().enumerate() {
            if let Some(parent) = file.parent(*id) {
                if parent == file.root() {
                    continue;
                }
                let parent_pos = order.iter().position(|p| *p == parent).unwrap();
                assert!(parent_pos < pos);
            }
        }
        assert!(order
            .iter()
            .any(|id| file.kind(*id) == SyntaxKind::CallExpression));
    }
}
