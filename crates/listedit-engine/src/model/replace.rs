//! Structural replace: cuts `from..to` out of a tree and stitches a slice in,
//! joining the open sides of the slice with the nodes around the cut.

use super::{Fragment, ModelError, Node, ResolvedPos, Slice};

pub(crate) fn replace(
    from: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    slice: &Slice,
) -> Result<Node, ModelError> {
    if slice.open_start > from.depth() {
        return Err(ModelError::InsertedTooDeep);
    }
    if from.depth() - slice.open_start != to.depth().wrapping_sub(slice.open_end) {
        return Err(ModelError::InconsistentOpenDepths);
    }
    replace_outer(from, to, slice, 0)
}

fn replace_outer(
    from: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    slice: &Slice,
    depth: usize,
) -> Result<Node, ModelError> {
    let index = from.index(depth);
    let node = from.node(depth);
    if index == to.index(depth) && depth < from.depth() - slice.open_start {
        let inner = replace_outer(from, to, slice, depth + 1)?;
        return Ok(node.copy(node.content().replace_child(index, inner)));
    }
    if slice.content.size() == 0 {
        return close(node, replace_two_way(from, to, depth)?);
    }
    if slice.open_start == 0
        && slice.open_end == 0
        && from.depth() == depth
        && to.depth() == depth
    {
        let parent = from.parent();
        let content = parent.content();
        let joined = content
            .cut(0, from.parent_offset)
            .append(&slice.content)
            .append(&content.cut(to.parent_offset, content.size()));
        return close(parent, joined);
    }
    // Wrap the slice in copies of the nodes above the insertion point so its
    // boundaries can be walked at the same depths as `from` and `to`.
    let extra = from.depth() - slice.open_start;
    let mut wrapped = from.node(extra).copy(slice.content.clone());
    for d in (0..extra).rev() {
        wrapped = from.node(d).copy(Fragment::from_node(wrapped));
    }
    let start = wrapped.resolve(slice.open_start + extra)?;
    let end = wrapped.resolve(wrapped.content_size() - slice.open_end - extra)?;
    close(node, replace_three_way(from, &start, &end, to, depth)?)
}

fn check_join(main: &Node, sub: &Node) -> Result<(), ModelError> {
    if !sub.kind().compatible_content(main.kind()) {
        return Err(ModelError::CannotJoin {
            sub: sub.kind().name(),
            main: main.kind().name(),
        });
    }
    Ok(())
}

fn joinable<'n>(
    before: &ResolvedPos<'n>,
    after: &ResolvedPos<'_>,
    depth: usize,
) -> Result<&'n Node, ModelError> {
    let node = before.node(depth);
    check_join(node, after.node(depth))?;
    Ok(node)
}

fn add_node(child: Node, target: &mut Vec<Node>) {
    if let (Some(last), Some(text)) = (target.last(), child.text_str()) {
        if let Some(prev) = last.text_str() {
            let merged = Node::text(format!("{prev}{text}"));
            target.pop();
            target.push(merged);
            return;
        }
    }
    target.push(child);
}

fn add_range(
    start: Option<&ResolvedPos<'_>>,
    end: Option<&ResolvedPos<'_>>,
    depth: usize,
    target: &mut Vec<Node>,
) {
    let node = match (start, end) {
        (_, Some(end)) => end.node(depth),
        (Some(start), None) => start.node(depth),
        (None, None) => return,
    };
    let end_index = end.map_or(node.child_count(), |e| e.index(depth));
    let mut start_index = 0;
    if let Some(start) = start {
        start_index = start.index(depth);
        if start.depth() > depth {
            start_index += 1;
        } else if start.text_offset() > 0 {
            if let Some(after) = start.node_after() {
                add_node(after, target);
            }
            start_index += 1;
        }
    }
    for i in start_index..end_index {
        add_node(node.child(i).clone(), target);
    }
    if let Some(end) = end {
        if end.depth() == depth && end.text_offset() > 0 {
            if let Some(before) = end.node_before() {
                add_node(before, target);
            }
        }
    }
}

fn close(node: &Node, content: Fragment) -> Result<Node, ModelError> {
    if !node.kind().valid_content(&content) {
        return Err(ModelError::InvalidContent {
            kind: node.kind().name(),
        });
    }
    Ok(node.copy(content))
}

fn replace_three_way(
    from: &ResolvedPos<'_>,
    start: &ResolvedPos<'_>,
    end: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    depth: usize,
) -> Result<Fragment, ModelError> {
    let open_start = if from.depth() > depth {
        Some(joinable(from, start, depth + 1)?)
    } else {
        None
    };
    let open_end = if to.depth() > depth {
        Some(joinable(end, to, depth + 1)?)
    } else {
        None
    };

    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    match (open_start, open_end) {
        (Some(open_start), Some(open_end)) if start.index(depth) == end.index(depth) => {
            check_join(open_start, open_end)?;
            let inner = replace_three_way(from, start, end, to, depth + 1)?;
            add_node(close(open_start, inner)?, &mut content);
        }
        (open_start, open_end) => {
            if let Some(open_start) = open_start {
                let inner = replace_two_way(from, start, depth + 1)?;
                add_node(close(open_start, inner)?, &mut content);
            }
            add_range(Some(start), Some(end), depth, &mut content);
            if let Some(open_end) = open_end {
                let inner = replace_two_way(end, to, depth + 1)?;
                add_node(close(open_end, inner)?, &mut content);
            }
        }
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_nodes(content))
}

fn replace_two_way(
    from: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    depth: usize,
) -> Result<Fragment, ModelError> {
    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    if from.depth() > depth {
        let kind = joinable(from, to, depth + 1)?;
        let inner = replace_two_way(from, to, depth + 1)?;
        add_node(close(kind, inner)?, &mut content);
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_nodes(content))
}
