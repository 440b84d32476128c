//! Segment trie, one per HTTP method.
//!
//! Each [`Node`] owns its children outright; insert and search are plain
//! stack recursion, so there are no parent links.
//!
//! A position in the tree holds **at most one dynamic child**. Every `:name`
//! pattern at that depth shares it, whatever the name; `*name` patterns share
//! it with other wildcards only. The names a match binds are read back from
//! the terminal node's stored pattern, not from the node's own `part`.
//!
//! Search prefers a literal child over the dynamic child at every level and
//! backtracks into the dynamic child only when the literal branch finds no
//! terminal node. `/user/new` therefore beats `/user/:id` for `/user/new`.

use crate::pattern::{PatternError, Segment, SegmentKind};

/// One trie level.
#[derive(Debug, Default)]
pub struct Node {
    part: String,
    is_wild: bool,
    /// Set only on nodes that terminate a registered route.
    pattern: Option<String>,
    children: Vec<Node>,
}

impl Node {
    fn child(segment: &Segment<'_>) -> Self {
        Self {
            part: segment.raw().to_owned(),
            is_wild: segment.is_dynamic(),
            ..Self::default()
        }
    }

    /// The raw segment text this node matches (`:id`, `*file`, `users`).
    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn is_wild(&self) -> bool {
        self.is_wild
    }

    /// The full registered pattern, if this node is a route terminus.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    fn is_catch_all(&self) -> bool {
        self.part.starts_with('*')
    }

    /// Inserts `segments[depth..]` below this node and marks the final node
    /// with `pattern`.
    ///
    /// Returns the pattern previously stored on that terminal node when it
    /// differs from `pattern` (two `:name` spellings sharing the dynamic
    /// slot). Registering the same pattern twice reuses the same node.
    pub fn insert(
        &mut self,
        pattern: &str,
        segments: &[Segment<'_>],
        depth: usize,
    ) -> Result<Option<String>, PatternError> {
        let Some(segment) = segments.get(depth) else {
            let previous = self.pattern.replace(pattern.to_owned());
            return Ok(previous.filter(|p| p != pattern));
        };

        let index = match self.children.iter().position(|c| c.part == segment.raw()) {
            Some(i) => i,
            None => match self.dynamic_slot(segment)? {
                Some(i) => i,
                None => {
                    self.children.push(Node::child(segment));
                    self.children.len() - 1
                }
            },
        };

        self.children[index].insert(pattern, segments, depth + 1)
    }

    /// Index of the dynamic child `segment` may reuse.
    fn dynamic_slot(&self, segment: &Segment<'_>) -> Result<Option<usize>, PatternError> {
        if !segment.is_dynamic() {
            return Ok(None);
        }
        let Some(index) = self.children.iter().position(|c| c.is_wild) else {
            return Ok(None);
        };

        let existing = &self.children[index];
        if existing.is_catch_all() != (segment.kind() == SegmentKind::Wildcard) {
            return Err(PatternError::DynamicConflict {
                segment: segment.raw().to_owned(),
                existing: existing.part.clone(),
            });
        }
        Ok(Some(index))
    }

    /// Finds the terminal node matching `segments[depth..]`.
    pub fn search(&self, segments: &[Segment<'_>], depth: usize) -> Option<&Node> {
        if depth == segments.len() || self.is_catch_all() {
            return self.pattern.is_some().then_some(self);
        }

        let part = segments[depth].raw();
        let literal = self.children.iter().filter(|c| !c.is_wild && c.part == part);
        let dynamic = self.children.iter().filter(|c| c.is_wild);

        literal
            .chain(dynamic)
            .find_map(|child| child.search(segments, depth + 1))
    }

    /// Every terminal node below (and including) this one, in pre-order.
    pub fn terminals(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a Node>) {
        if self.pattern.is_some() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_terminals(out);
        }
    }
}
