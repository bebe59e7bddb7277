use crate::model::{Fragment, Node, NodeRange};
use crate::transform::{Transaction, TransformError};

use super::{calculate_item_range, run};

/// Nests the selected items under the item before them.
///
/// The previous item is the sibling before the run, or, when the run starts
/// its list, the last item of a list directly before it.
pub fn indent_list(tr: &mut Transaction) -> bool {
    run(tr, "indent_list", indent)
}

struct PreviousItem<'a> {
    node: &'a Node,
    start: usize,
    same_list: bool,
}

fn find_previous_item<'a>(range: &NodeRange<'a>) -> Option<PreviousItem<'a>> {
    let list = range.parent();
    let previous = if range.start_index() > 0 {
        let node = list.child(range.start_index() - 1);
        PreviousItem {
            node,
            start: range.start() - node.node_size(),
            same_list: true,
        }
    } else {
        let depth = range.depth;
        if depth == 0 {
            return None;
        }
        let index = range.from.index(depth - 1);
        if index == 0 {
            return None;
        }
        let sibling = range.from.node(depth - 1).child(index - 1);
        if !sibling.is_list() {
            return None;
        }
        let node = sibling.last_child()?;
        PreviousItem {
            node,
            // the sibling list closes directly before our list opens
            start: range.from.before(depth) - 1 - node.node_size(),
            same_list: false,
        }
    };
    previous.node.is_list_item().then_some(previous)
}

/// Appends `tail` to `content`, merging a list at the seam into a list of the
/// same kind before it. Reports whether lists were merged.
fn append_joining(content: &Fragment, tail: &Fragment) -> (Fragment, bool) {
    match (content.last_child(), tail.first_child()) {
        (Some(last), Some(first)) if last.is_list() && last.kind() == first.kind() => {
            let merged = last.copy(last.content().append(first.content()));
            let head = content.replace_child(content.child_count() - 1, merged);
            (head.append(&tail.cut_by_index(1, tail.child_count())), true)
        }
        _ => (content.append(tail), false),
    }
}

fn indent(tr: &mut Transaction) -> Result<bool, TransformError> {
    let (delete_from, delete_to, previous_start, previous_size, rebuilt, shift) = {
        let doc = tr.doc();
        let Some(range) = calculate_item_range(doc, tr.selection()) else {
            return Ok(false);
        };
        let list = range.parent();
        if !list.is_list() {
            return Ok(false);
        }
        let Some(previous) = find_previous_item(&range) else {
            return Ok(false);
        };

        // Split off what follows the block holding the selection end inside
        // the last item, which stays at its current level
        let depth = range.depth;
        let (start, end) = (range.start(), range.end());
        let mid = if range.to.depth() >= depth + 2 {
            range.to.end(depth + 2)
        } else {
            end - 1
        };
        let (selected, unselected) = if mid + 1 >= end {
            (doc.slice(start, end)?.content, Fragment::empty())
        } else {
            (
                doc.slice(start, mid)?.content,
                doc.slice(mid + 1, end - 1)?.content,
            )
        };

        // An existing trailing sublist of the same kind takes the run
        // directly, and so does the new sublist for carried-over content
        let (content, merged) = append_joining(
            previous.node.content(),
            &Fragment::from_node(list.copy(selected)),
        );
        let (content, _) = append_joining(&content, &unselected);
        let rebuilt = Node::checked(previous.node.kind(), Some(previous.node.attrs()), content)?;

        let whole_list = range.start_index() == 0 && range.end_index() == list.child_count();
        let (delete_from, delete_to) = if whole_list {
            (range.from.before(depth), range.from.after(depth))
        } else {
            (start, end)
        };

        let mut shift: isize = if previous.same_list { 0 } else { -2 };
        if merged {
            shift -= 2;
        }
        (
            delete_from,
            delete_to,
            previous.start,
            previous.node.node_size(),
            rebuilt,
            shift,
        )
    };

    let selection = tr.selection().shifted(shift);
    tr.delete(delete_from, delete_to)?;
    tr.replace_with(previous_start, previous_start + previous_size, rebuilt)?;
    tr.set_selection(selection);
    Ok(true)
}
