use super::{ModelError, Node};

#[derive(Debug, Clone, Copy)]
struct PathEntry<'a> {
    node: &'a Node,
    index: usize,
    /// Absolute position where the child at `index` starts.
    offset: usize,
}

/// A position resolved against one document snapshot: the chain of
/// ancestors from the root down to the innermost node containing `pos`,
/// with the child index taken at each depth.
///
/// Borrows the snapshot, so it has to be dropped before the document is
/// changed. Use [`BlockSpan`] to carry a range across edits.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pub pos: usize,
    path: Vec<PathEntry<'a>>,
    pub parent_offset: usize,
}

impl<'a> ResolvedPos<'a> {
    pub(crate) fn resolve(doc: &'a Node, pos: usize) -> Result<Self, ModelError> {
        if pos > doc.content_size() {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: doc.content_size(),
            });
        }
        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = doc;
        loop {
            let (index, offset) = node.content().find_index(parent_offset)?;
            let rem = parent_offset - offset;
            path.push(PathEntry {
                node,
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            node = node.child(index);
            if node.is_text() {
                break;
            }
            parent_offset = rem - 1;
            start += offset + 1;
        }
        Ok(Self {
            pos,
            path,
            parent_offset,
        })
    }

    /// Depth of the innermost node containing the position. Zero is the root.
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn node(&self, depth: usize) -> &'a Node {
        self.path[depth].node
    }

    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    pub fn doc(&self) -> &'a Node {
        self.node(0)
    }

    /// Index into the node at `depth` of the child the position sits in or
    /// before.
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Index of the first child of the node at `depth` that starts at or
    /// after the position.
    pub fn index_after(&self, depth: usize) -> usize {
        let bump = if depth == self.depth() && self.text_offset() == 0 {
            0
        } else {
            1
        };
        self.index(depth) + bump
    }

    /// Start of the content of the node at `depth`.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.path[depth - 1].offset + 1
        }
    }

    /// End of the content of the node at `depth`.
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position directly before the node at `depth`. The root has no such
    /// position, so `depth` must be at least 1.
    pub fn before(&self, depth: usize) -> usize {
        debug_assert!(depth > 0, "there is no position before the top-level node");
        self.path[depth - 1].offset
    }

    /// Position directly after the node at `depth`, which must be at least 1.
    /// One level below the position's own depth this is the position itself,
    /// as with `before`.
    pub fn after(&self, depth: usize) -> usize {
        if depth == self.depth() + 1 {
            return self.pos;
        }
        self.before(depth) + self.node(depth).node_size()
    }

    /// Offset into the text node the position points into, zero on a node
    /// boundary.
    pub fn text_offset(&self) -> usize {
        self.pos - self.path[self.depth()].offset
    }

    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.maybe_child(index)?;
        let offset = self.text_offset();
        Some(if offset > 0 {
            child.cut(offset, child.text_len())
        } else {
            child.clone()
        })
    }

    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let offset = self.text_offset();
        if offset > 0 {
            return parent.maybe_child(index).map(|child| child.cut(0, offset));
        }
        if index == 0 {
            None
        } else {
            parent.maybe_child(index - 1).cloned()
        }
    }

    /// Position before the child at `index` of the node at `depth`.
    pub fn pos_at_index(&self, index: usize, depth: usize) -> usize {
        let node = self.node(depth);
        let mut pos = self.start(depth);
        for child in node.content().iter().take(index) {
            pos += child.node_size();
        }
        pos
    }

    /// Deepest depth whose node contains both this position and `pos`.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&depth| self.start(depth) <= pos && self.end(depth) >= pos)
            .unwrap_or(0)
    }

    pub fn same_parent(&self, other: &ResolvedPos<'_>) -> bool {
        self.pos - self.parent_offset == other.pos - other.parent_offset
    }

    /// The range of whole sibling blocks around this position and `other`,
    /// taken at the deepest depth whose node contains both and satisfies
    /// `pred`. Positions inside a textblock select the textblock itself.
    pub fn block_range(
        &self,
        other: &ResolvedPos<'a>,
        pred: Option<&dyn Fn(&Node) -> bool>,
    ) -> Option<NodeRange<'a>> {
        if other.pos < self.pos {
            return other.block_range(self, pred);
        }
        let skip = usize::from(self.parent().is_textblock() || self.pos == other.pos);
        let top = (self.depth() + 1).saturating_sub(skip);
        (0..top).rev().find_map(|depth| {
            let accepted = pred.is_none_or(|p| p(self.node(depth)));
            (other.pos <= self.end(depth) && accepted)
                .then(|| NodeRange::new(self.clone(), other.clone(), depth))
        })
    }
}

/// A flat run of siblings inside the node at `depth`, bounded by two resolved
/// positions.
#[derive(Debug, Clone)]
pub struct NodeRange<'a> {
    pub from: ResolvedPos<'a>,
    pub to: ResolvedPos<'a>,
    pub depth: usize,
}

impl<'a> NodeRange<'a> {
    pub fn new(from: ResolvedPos<'a>, to: ResolvedPos<'a>, depth: usize) -> Self {
        Self { from, to, depth }
    }

    /// Position before the first node in the range.
    pub fn start(&self) -> usize {
        self.from.before(self.depth + 1)
    }

    /// Position after the last node in the range.
    pub fn end(&self) -> usize {
        self.to.after(self.depth + 1)
    }

    pub fn parent(&self) -> &'a Node {
        self.from.node(self.depth)
    }

    pub fn start_index(&self) -> usize {
        self.from.index(self.depth)
    }

    pub fn end_index(&self) -> usize {
        self.to.index_after(self.depth)
    }

    pub fn span(&self) -> BlockSpan {
        BlockSpan {
            from: self.from.pos,
            to: self.to.pos,
            depth: self.depth,
        }
    }
}

/// The snapshot-free form of a [`NodeRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub from: usize,
    pub to: usize,
    pub depth: usize,
}

impl BlockSpan {
    pub fn resolve<'a>(&self, doc: &'a Node) -> Result<NodeRange<'a>, ModelError> {
        Ok(NodeRange::new(
            doc.resolve(self.from)?,
            doc.resolve(self.to)?,
            self.depth,
        ))
    }
}
