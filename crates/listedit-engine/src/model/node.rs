use std::fmt;

use super::replace::replace;
use super::{Attrs, AttrValue, ModelError, NodeKind, ResolvedPos, Slice};

/// A document tree node. Children are owned; ancestry is recovered through
/// [`ResolvedPos`] when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    attrs: Attrs,
    content: Fragment,
    text: Option<String>,
}

impl Node {
    /// Creates a node without checking its content. Undeclared attributes are
    /// dropped and missing ones take their defaults.
    pub fn new(kind: NodeKind, attrs: Option<&Attrs>, content: Fragment) -> Self {
        Self {
            kind,
            attrs: kind.compute_attrs(attrs),
            content,
            text: None,
        }
    }

    /// Like [`Node::new`] but rejects content the schema does not allow.
    pub fn checked(
        kind: NodeKind,
        attrs: Option<&Attrs>,
        content: Fragment,
    ) -> Result<Self, ModelError> {
        if !kind.valid_content(&content) {
            return Err(ModelError::InvalidContent { kind: kind.name() });
        }
        Ok(Self::new(kind, attrs, content))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            attrs: Attrs::new(),
            content: Fragment::empty(),
            text: Some(text.into()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn text_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    pub fn is_block(&self) -> bool {
        self.kind.is_block()
    }

    pub fn is_textblock(&self) -> bool {
        self.kind.is_textblock()
    }

    pub fn is_list(&self) -> bool {
        self.kind.is_list()
    }

    pub fn is_list_item(&self) -> bool {
        self.kind.is_list_item()
    }

    /// Length of a text node in characters, zero for everything else.
    pub fn text_len(&self) -> usize {
        self.text.as_ref().map_or(0, |t| t.chars().count())
    }

    /// Size of this node in the position space.
    pub fn node_size(&self) -> usize {
        if self.is_text() {
            self.text_len()
        } else if self.is_leaf() {
            1
        } else {
            self.content.size() + 2
        }
    }

    pub fn content_size(&self) -> usize {
        self.content.size()
    }

    pub fn child_count(&self) -> usize {
        self.content.child_count()
    }

    pub fn child(&self, index: usize) -> &Node {
        self.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.content.maybe_child(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.content.first_child()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.content.last_child()
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.content.iter().map(Node::text_content).collect(),
        }
    }

    /// Same kind and attributes, new content.
    pub fn copy(&self, content: Fragment) -> Node {
        Node {
            kind: self.kind,
            attrs: self.attrs.clone(),
            content,
            text: None,
        }
    }

    /// Cuts the node down to the given content range. For text nodes the
    /// range is in characters.
    pub fn cut(&self, from: usize, to: usize) -> Node {
        match &self.text {
            Some(text) => {
                if from == 0 && to == self.text_len() {
                    return self.clone();
                }
                Node::text(char_range(text, from, to))
            }
            None => {
                if from == 0 && to == self.content.size() {
                    return self.clone();
                }
                self.copy(self.content.cut(from, to))
            }
        }
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, ModelError> {
        ResolvedPos::resolve(self, pos)
    }

    /// The node directly after `pos`, if any.
    pub fn node_at(&self, mut pos: usize) -> Option<&Node> {
        let mut node = self;
        loop {
            let (index, offset) = node.content.find_index(pos).ok()?;
            node = node.maybe_child(index)?;
            if offset == pos || node.is_text() {
                return Some(node);
            }
            pos -= offset + 1;
        }
    }

    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        if from == to {
            return Ok(Slice::empty());
        }
        let rp_from = self.resolve(from)?;
        let rp_to = self.resolve(to)?;
        let depth = rp_from.shared_depth(to);
        let start = rp_from.start(depth);
        let content = rp_from.node(depth).content.cut(from - start, to - start);
        Ok(Slice::new(
            content,
            rp_from.depth() - depth,
            rp_to.depth() - depth,
        ))
    }

    /// Replaces `from..to` with the slice, returning the new tree.
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> Result<Node, ModelError> {
        replace(&self.resolve(from)?, &self.resolve(to)?, slice)
    }

    /// Whether replacing children `from..to` by `replacement` keeps this
    /// node's content valid.
    pub fn can_replace(&self, from: usize, to: usize, replacement: &Fragment) -> bool {
        if from > to || to > self.child_count() {
            return false;
        }
        let kinds: Vec<NodeKind> = self.content.nodes[..from]
            .iter()
            .chain(replacement.iter())
            .chain(self.content.nodes[to..].iter())
            .map(Node::kind)
            .collect();
        self.kind.accepts_sequence(&kinds)
    }

    pub fn can_replace_with(&self, from: usize, to: usize, kind: NodeKind) -> bool {
        if from > to || to > self.child_count() {
            return false;
        }
        let kinds: Vec<NodeKind> = self.content.nodes[..from]
            .iter()
            .map(Node::kind)
            .chain(std::iter::once(kind))
            .chain(self.content.nodes[to..].iter().map(Node::kind))
            .collect();
        self.kind.accepts_sequence(&kinds)
    }

    pub fn can_append(&self, other: &Node) -> bool {
        self.can_replace(self.child_count(), self.child_count(), other.content())
    }

    /// Calls `f` for each descendant overlapping `from..to` with its absolute
    /// position. Returning `false` skips the node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.content.nodes_between(from, to, f, 0);
    }

    /// Recursively validates the tree against the schema.
    pub fn check(&self) -> Result<(), ModelError> {
        if let Some(text) = &self.text {
            if text.is_empty() {
                return Err(ModelError::EmptyText);
            }
            return Ok(());
        }
        if !self.kind.valid_content(&self.content) {
            return Err(ModelError::InvalidContent {
                kind: self.kind.name(),
            });
        }
        self.content.iter().try_for_each(Node::check)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.text {
            return write!(f, "{text:?}");
        }
        f.write_str(self.kind.name())?;
        let defaults = self.kind.default_attrs();
        let changed: Vec<String> = self
            .attrs
            .iter()
            .filter(|(name, value)| defaults.get(*name) != Some(*value))
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        if !changed.is_empty() {
            write!(f, "[{}]", changed.join(", "))?;
        }
        if !self.is_leaf() {
            write!(f, "({})", self.content)?;
        }
        Ok(())
    }
}

fn char_range(text: &str, from: usize, to: usize) -> &str {
    let byte_at = |n: usize| text.char_indices().nth(n).map_or(text.len(), |(i, _)| i);
    let start = byte_at(from);
    let end = byte_at(to).max(start);
    &text[start..end]
}

/// An ordered run of sibling nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    nodes: Vec<Node>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a fragment, merging adjacent text nodes.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut merged: Vec<Node> = Vec::new();
        for node in nodes {
            if let (Some(last), Some(text)) = (merged.last_mut(), node.text.as_ref()) {
                if let Some(prev) = last.text.as_mut() {
                    prev.push_str(text);
                    continue;
                }
            }
            merged.push(node);
        }
        let size = merged.iter().map(Node::node_size).sum();
        Self {
            nodes: merged,
            size,
        }
    }

    pub fn from_node(node: Node) -> Self {
        let size = node.node_size();
        Self {
            nodes: vec![node],
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn child(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn append(&self, other: &Fragment) -> Fragment {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        Fragment::from_nodes(self.nodes.iter().chain(other.nodes.iter()).cloned())
    }

    /// The part of this fragment between two content positions.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to == self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in &self.nodes {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let piece = if pos < from || end > to {
                        if child.is_text() {
                            child.cut(from.saturating_sub(pos), (to - pos).min(child.text_len()))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                (to - pos - 1).min(child.content_size()),
                            )
                        }
                    } else {
                        child.clone()
                    };
                    result.push(piece);
                }
                pos = end;
            }
        }
        Fragment::from_nodes(result)
    }

    pub fn cut_by_index(&self, from: usize, to: usize) -> Fragment {
        let to = to.min(self.nodes.len());
        if from >= to {
            return Fragment::empty();
        }
        Fragment::from_nodes(self.nodes[from..to].iter().cloned())
    }

    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.nodes.clone();
        nodes[index] = node;
        Fragment::from_nodes(nodes)
    }

    /// Finds the child index at a content position, plus the position where
    /// that child starts. A position on a boundary maps to the child after it.
    pub(crate) fn find_index(&self, pos: usize) -> Result<(usize, usize), ModelError> {
        if pos == 0 {
            return Ok((0, 0));
        }
        if pos == self.size {
            return Ok((self.nodes.len(), pos));
        }
        if pos > self.size {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: self.size,
            });
        }
        let mut cur = 0;
        for (i, child) in self.nodes.iter().enumerate() {
            let end = cur + child.node_size();
            if end >= pos {
                if end == pos {
                    return Ok((i + 1, end));
                }
                return Ok((i, cur));
            }
            cur = end;
        }
        Err(ModelError::PositionOutOfRange {
            pos,
            size: self.size,
        })
    }

    fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F, node_start: usize)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        let mut pos = 0;
        for child in &self.nodes {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, node_start + pos) && child.content_size() > 0 {
                let start = pos + 1;
                child.content.nodes_between(
                    from.saturating_sub(start),
                    child.content_size().min(to.saturating_sub(start)),
                    f,
                    node_start + start,
                );
            }
            pos = end;
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{bullet_list, checkbox, doc, item, p, p_with};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_node_sizes() {
        let list = bullet_list([item([p("ab")]), item([p("")])]);

        assert_eq!(p("ab").node_size(), 4);
        assert_eq!(p("").node_size(), 2);
        // 2 (list) + 2 + 4 (first item) + 2 + 2 (second item)
        assert_eq!(list.node_size(), 12);
    }

    #[test]
    fn test_inline_leaf_takes_one_position() {
        let para = p_with([checkbox(), Node::text("done")]);

        assert_eq!(para.node_size(), 7);
        assert_eq!(para.text_content(), "done");
        assert_eq!(para.to_string(), r#"p(checkbox, "done")"#);
        assert_eq!(para.node_at(0).map(Node::kind), Some(NodeKind::Checkbox));
        assert_eq!(para.node_at(1).and_then(Node::text_str), Some("done"));
        assert_eq!(doc([para]).check(), Ok(()));
    }

    #[test]
    fn test_adjacent_text_merges() {
        let frag = Fragment::from_nodes([Node::text("ab"), Node::text("cd")]);

        assert_eq!(frag.child_count(), 1);
        assert_eq!(frag.child(0).text_str(), Some("abcd"));
        assert_eq!(frag.size(), 4);
    }

    #[test]
    fn test_cut_splits_text_by_chars() {
        let para = p("héllo");

        assert_eq!(para.cut(1, 3), p("él"));
    }

    #[test]
    fn test_node_at() {
        let d = doc([p("ab"), bullet_list([item([p("c")])])]);

        assert_eq!(d.node_at(0).map(Node::kind), Some(NodeKind::Paragraph));
        assert_eq!(d.node_at(1).and_then(Node::text_str), Some("ab"));
        assert!(d.node_at(4).is_some_and(Node::is_list));
        assert!(d.node_at(5).is_some_and(Node::is_list_item));
        assert!(d.node_at(d.content_size()).is_none());
    }

    #[test]
    fn test_check_rejects_invalid_nesting() {
        let bad = doc([bullet_list([item([bullet_list([item([p("x")])])])])]);

        assert_eq!(
            bad.check(),
            Err(ModelError::InvalidContent { kind: "item" })
        );
        assert_eq!(doc([p("x")]).check(), Ok(()));
    }

    #[test]
    fn test_display_shows_changed_attrs_only() {
        let d = doc([p("a")]);

        assert_eq!(d.to_string(), r#"doc(p("a"))"#);
        let mut attrs = Attrs::new();
        attrs.insert("order".to_string(), AttrValue::Int(3));
        let list = Node::new(
            NodeKind::List(crate::model::ContainerKind::Ordered),
            Some(&attrs),
            Fragment::from_node(item([p("")])),
        );
        assert_eq!(list.to_string(), "ordered_list[order=3](item(p()))");
    }
}
