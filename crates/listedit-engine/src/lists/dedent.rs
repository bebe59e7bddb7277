use crate::model::{Fragment, Node, NodeKind, Slice};
use crate::transform::{Assoc, Transaction, TransformError, lift_target};

use super::{calculate_item_range, run};

/// Moves the selected items out of their nested list into the list that
/// holds the parent item.
///
/// Only the selected items move. Items after them in the same list, and
/// blocks after the list in the parent item, become children of the last
/// moved item so that document order is kept.
pub fn dedent_list(tr: &mut Transaction) -> bool {
    run(tr, "dedent_list", dedent)
}

fn dedent(tr: &mut Transaction) -> Result<bool, TransformError> {
    {
        let Some(range) = calculate_item_range(tr.doc(), tr.selection()) else {
            return Ok(false);
        };
        let depth = range.depth;
        if depth < 2
            || !range.from.node(depth - 1).is_list_item()
            || !range.from.node(depth - 2).is_list()
        {
            return Ok(false);
        }
    }

    nest_trailing_items(tr)?;
    absorb_parent_tail(tr)?;
    retype_items(tr)?;

    let base = tr.mapping().len();
    let (span, target, end) = {
        let Some(range) = calculate_item_range(tr.doc(), tr.selection()) else {
            return Ok(false);
        };
        let Some(target) = lift_target(&range) else {
            return Ok(false);
        };
        (range.span(), target, range.end())
    };
    tr.lift(span, target)?;

    let item_end = tr.mapping().map_from(base, end, Assoc::Before);
    join_sublists(tr, item_end)?;
    Ok(true)
}

/// Items after the run in the same list become a sublist of its last item.
fn nest_trailing_items(tr: &mut Transaction) -> Result<(), TransformError> {
    let (end, end_of_list, holder) = {
        let Some(range) = calculate_item_range(tr.doc(), tr.selection()) else {
            return Ok(());
        };
        let end = range.end();
        let end_of_list = range.to.end(range.depth);
        if end >= end_of_list {
            return Ok(());
        }
        let last = range.parent().child(range.end_index() - 1);
        let holder = last.copy(Fragment::from_node(range.parent().copy(Fragment::empty())));
        (end, end_of_list, holder)
    };
    tr.replace_around(
        end - 1,
        end_of_list,
        end,
        end_of_list,
        Slice::new(Fragment::from_node(holder), 1, 0),
        1,
    )
}

/// Blocks after the list inside the parent item move to the end of the last
/// selected item.
fn absorb_parent_tail(tr: &mut Transaction) -> Result<(), TransformError> {
    let (end, list_end, parent_end, holder) = {
        let Some(range) = calculate_item_range(tr.doc(), tr.selection()) else {
            return Ok(());
        };
        let depth = range.depth;
        let list_end = range.to.after(depth);
        let parent_end = range.to.end(depth - 1);
        if list_end >= parent_end {
            return Ok(());
        }
        let last = range.parent().child(range.end_index() - 1);
        let holder = range
            .parent()
            .copy(Fragment::from_node(last.copy(Fragment::empty())));
        (range.end(), list_end, parent_end, holder)
    };
    tr.replace_around(
        end - 1,
        parent_end,
        list_end,
        parent_end,
        Slice::new(Fragment::from_node(holder), 2, 0),
        0,
    )
}

/// Gives the run the item kind its new list expects. The run is split into a
/// list of its own first, and that list is rebuilt with the new list kind so
/// the tree stays valid in between.
fn retype_items(tr: &mut Transaction) -> Result<(), TransformError> {
    let (target_list, target_item, split_at) = {
        let Some(range) = calculate_item_range(tr.doc(), tr.selection()) else {
            return Ok(());
        };
        let grandparent = range.from.node(range.depth - 2);
        let NodeKind::List(container) = grandparent.kind() else {
            return Ok(());
        };
        let target_item = NodeKind::Item(container.item_kind());
        let mismatched = range
            .parent()
            .content()
            .iter()
            .skip(range.start_index())
            .take(range.end_index() - range.start_index())
            .any(|item| item.kind() != target_item);
        if !mismatched {
            return Ok(());
        }
        let split_at = (range.start_index() > 0).then(|| range.start());
        (grandparent.kind(), target_item, split_at)
    };

    if let Some(pos) = split_at {
        tr.split(pos, 1, &[])?;
    }

    let selection = *tr.selection();
    let (from, to, rebuilt) = {
        let Some(range) = calculate_item_range(tr.doc(), &selection) else {
            return Ok(());
        };
        let list = range.parent();
        let items: Vec<Node> = list
            .content()
            .iter()
            .map(|item| Node::new(target_item, Some(item.attrs()), item.content().clone()))
            .collect();
        let rebuilt = Node::new(target_list, None, Fragment::from_nodes(items));
        (
            range.from.before(range.depth),
            range.from.after(range.depth),
            rebuilt,
        )
    };
    tr.replace_with(from, to, rebuilt)?;
    tr.set_selection(selection);
    Ok(())
}

/// Joins neighbouring lists of the same kind inside the item ending at
/// `item_end`.
fn join_sublists(tr: &mut Transaction, mut item_end: usize) -> Result<(), TransformError> {
    loop {
        let seam = {
            let rp = tr.doc().resolve(item_end)?;
            let Some(item) = rp.node_before() else {
                return Ok(());
            };
            if !item.is_list_item() {
                return Ok(());
            }
            let mut pos = item_end - item.node_size() + 1;
            let mut previous: Option<&Node> = None;
            let mut seam = None;
            for child in item.content() {
                if previous.is_some_and(|prev| prev.is_list() && prev.kind() == child.kind()) {
                    seam = Some(pos);
                    break;
                }
                pos += child.node_size();
                previous = Some(child);
            }
            seam
        };
        let Some(pos) = seam else {
            return Ok(());
        };
        tr.join(pos, 1)?;
        item_end -= 2;
    }
}
