use std::fmt;

use super::{Fragment, Node};

/// A piece of document content. `open_start` and `open_end` count how many
/// of the nodes along the left and right edges are cut open, so their
/// content continues into whatever the slice is inserted into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slice {
    pub content: Fragment,
    pub open_start: usize,
    pub open_end: usize,
}

impl Slice {
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Self {
        Self {
            content,
            open_start,
            open_end,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A closed slice holding a single node.
    pub fn from_node(node: Node) -> Self {
        Self::new(Fragment::from_node(node), 0, 0)
    }

    /// Size the slice adds when inserted.
    pub fn size(&self) -> usize {
        self.content.size() - self.open_start - self.open_end
    }

    /// Inserts `fragment` at `pos` (counted like [`Slice::size`]).
    pub fn insert_at(&self, pos: usize, fragment: Fragment) -> Option<Slice> {
        let content = insert_into(&self.content, pos + self.open_start, fragment)?;
        Some(Slice::new(content, self.open_start, self.open_end))
    }
}

fn insert_into(content: &Fragment, dist: usize, insert: Fragment) -> Option<Fragment> {
    let (index, offset) = content.find_index(dist).ok()?;
    let child = content.maybe_child(index);
    if offset == dist || child.is_some_and(Node::is_text) {
        return Some(
            content
                .cut(0, dist)
                .append(&insert)
                .append(&content.cut(dist, content.size())),
        );
    }
    let child = child?;
    let inner = insert_into(child.content(), dist - offset - 1, insert)?;
    Some(content.replace_child(index, child.copy(inner)))
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>({},{})", self.content, self.open_start, self.open_end)
    }
}
