//! Structural step builders and the validity queries that go with them.

use crate::model::{Attrs, Fragment, ModelError, Node, NodeKind, NodeRange, Slice};

use super::step::Step;
use super::TransformError;

/// A node type (plus attributes) to wrap content in or to give the second
/// half of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    pub kind: NodeKind,
    pub attrs: Option<Attrs>,
}

impl Wrapper {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, attrs: None }
    }

    pub fn with_attrs(kind: NodeKind, attrs: Attrs) -> Self {
        Self {
            kind,
            attrs: Some(attrs),
        }
    }

    fn create(&self, content: Fragment) -> Node {
        Node::new(self.kind, self.attrs.as_ref(), content)
    }
}

/// Whether anything other than node boundaries lies between `from` and `to`.
pub(crate) fn content_between(doc: &Node, from: usize, to: usize) -> Result<bool, ModelError> {
    let rp = doc.resolve(from)?;
    let mut dist = to.saturating_sub(from);
    let mut depth = rp.depth();
    while dist > 0 && depth > 0 && rp.index_after(depth) == rp.node(depth).child_count() {
        depth -= 1;
        dist -= 1;
    }
    if dist > 0 {
        let mut next = rp.node(depth).maybe_child(rp.index_after(depth));
        while dist > 0 {
            match next {
                Some(node) if !node.is_leaf() => {
                    next = node.first_child();
                    dist -= 1;
                }
                _ => return Ok(true),
            }
        }
    }
    Ok(false)
}

fn can_cut(node: &Node, start: usize, end: usize) -> bool {
    (start == 0 || node.can_replace(start, node.child_count(), &Fragment::empty()))
        && (end == node.child_count() || node.can_replace(0, end, &Fragment::empty()))
}

/// The depth the content of `range` can be lifted to, i.e. the nearest
/// ancestor that accepts the range's children directly, given that every
/// node in between can be cut around them.
pub fn lift_target(range: &NodeRange<'_>) -> Option<usize> {
    let content = range
        .parent()
        .content()
        .cut_by_index(range.start_index(), range.end_index());
    let mut depth = range.depth;
    loop {
        let node = range.from.node(depth);
        let index = range.from.index(depth);
        let end_index = range.to.index_after(depth);
        if depth < range.depth && node.can_replace(index, end_index, &content) {
            return Some(depth);
        }
        if depth == 0 || !can_cut(node, index, end_index) {
            return None;
        }
        depth -= 1;
    }
}

pub(crate) fn lift_step(range: &NodeRange<'_>, target: usize) -> Step {
    let (from, to, depth) = (&range.from, &range.to, range.depth);
    let gap_start = from.before(depth + 1);
    let gap_end = to.after(depth + 1);
    let mut start = gap_start;
    let mut end = gap_end;

    let mut before = Fragment::empty();
    let mut open_start = 0;
    let mut splitting = false;
    for d in (target + 1..=depth).rev() {
        if splitting || from.index(d) > 0 {
            splitting = true;
            before = Fragment::from_node(from.node(d).copy(before));
            open_start += 1;
        } else {
            start -= 1;
        }
    }

    let mut after = Fragment::empty();
    let mut open_end = 0;
    splitting = false;
    for d in (target + 1..=depth).rev() {
        if splitting || to.after(d + 1) < to.end(d) {
            splitting = true;
            after = Fragment::from_node(to.node(d).copy(after));
            open_end += 1;
        } else {
            end += 1;
        }
    }

    let insert = before.size() - open_start;
    Step::ReplaceAround {
        from: start,
        to: end,
        gap_from: gap_start,
        gap_to: gap_end,
        slice: Slice::new(before.append(&after), open_start, open_end),
        insert,
        structure: true,
    }
}

pub(crate) fn wrap_step(range: &NodeRange<'_>, wrappers: &[Wrapper]) -> Result<Step, TransformError> {
    let mut content = Fragment::empty();
    for wrapper in wrappers.iter().rev() {
        if content.size() > 0 && !wrapper.kind.valid_content(&content) {
            return Err(TransformError::WrapperMismatch {
                kind: wrapper.kind.name(),
            });
        }
        content = Fragment::from_node(wrapper.create(content));
    }
    let start = range.start();
    let end = range.end();
    Ok(Step::ReplaceAround {
        from: start,
        to: end,
        gap_from: start,
        gap_to: end,
        slice: Slice::new(content, 0, 0),
        insert: wrappers.len(),
        structure: true,
    })
}

/// Builds the step that splits the `depth` innermost ancestors of `pos`.
/// `types_after[i]` overrides the type of the new node at that level,
/// outermost first.
pub(crate) fn split_step(
    doc: &Node,
    pos: usize,
    depth: usize,
    types_after: &[Option<Wrapper>],
) -> Result<Step, TransformError> {
    let rp = doc.resolve(pos)?;
    if depth == 0 || depth > rp.depth() {
        return Err(TransformError::SplitTooDeep { depth });
    }
    let base = rp.depth() - depth;
    let mut before = Fragment::empty();
    let mut after = Fragment::empty();
    for d in (base + 1..=rp.depth()).rev() {
        before = Fragment::from_node(rp.node(d).copy(before));
        let node_after = match types_after.get(d - base - 1).and_then(Option::as_ref) {
            Some(wrapper) => wrapper.create(after),
            None => rp.node(d).copy(after),
        };
        after = Fragment::from_node(node_after);
    }
    Ok(Step::Replace {
        from: pos,
        to: pos,
        slice: Slice::new(before.append(&after), depth, depth),
        structure: true,
    })
}

/// Whether splitting at `pos` with [`split_step`]'s arguments yields valid
/// nodes on both sides at every level.
pub fn can_split(doc: &Node, pos: usize, depth: usize, types_after: &[Option<Wrapper>]) -> bool {
    let Ok(rp) = doc.resolve(pos) else {
        return false;
    };
    if depth == 0 || depth > rp.depth() {
        return false;
    }
    let base = rp.depth() - depth;
    let override_at = |i: usize| types_after.get(i).and_then(Option::as_ref);

    let parent = rp.parent();
    let index = rp.index(rp.depth());
    let inner_kind = types_after
        .last()
        .and_then(Option::as_ref)
        .map_or(parent.kind(), |w| w.kind);
    if !parent.can_replace(index, parent.child_count(), &Fragment::empty())
        || !inner_kind.valid_content(&parent.content().cut_by_index(index, parent.child_count()))
    {
        return false;
    }

    for d in (base + 1..rp.depth()).rev() {
        let i = d - base - 1;
        let node = rp.node(d);
        let index = rp.index(d);
        let mut rest = node.content().cut_by_index(index, node.child_count());
        if let Some(child) = override_at(i + 1) {
            rest = rest.replace_child(0, child.create(Fragment::empty()));
        }
        let after_kind = override_at(i).map_or(node.kind(), |w| w.kind);
        if !node.can_replace(index + 1, node.child_count(), &Fragment::empty())
            || !after_kind.valid_content(&rest)
        {
            return false;
        }
    }

    let index = rp.index_after(base);
    let base_kind = override_at(0).map_or(rp.node(base + 1).kind(), |w| w.kind);
    rp.node(base).can_replace_with(index, index, base_kind)
}

/// Whether the nodes on either side of `pos` can be joined into one.
pub fn can_join(doc: &Node, pos: usize) -> bool {
    let Ok(rp) = doc.resolve(pos) else {
        return false;
    };
    let index = rp.index(rp.depth());
    match (rp.node_before(), rp.node_after()) {
        (Some(before), Some(after)) => {
            !before.is_leaf()
                && before.can_append(&after)
                && rp.parent().can_replace(index, index + 1, &Fragment::empty())
        }
        _ => false,
    }
}
