//! Moving the selected items out of their list by one level.

use crate::model::{BlockSpan, Fragment, Slice};
use crate::transform::{Assoc, Transaction, TransformError, can_join, lift_target};

use super::{calculate_item_range, run};

/// Lifts the selected items one level: out of a nested list into the
/// enclosing one, or out of a top-level list entirely, leaving their blocks
/// in the list's parent.
pub fn lift_list_item(tr: &mut Transaction) -> bool {
    run(tr, "lift_list_item", lift_items)
}

pub(crate) fn lift_items(tr: &mut Transaction) -> Result<bool, TransformError> {
    let nested = match calculate_item_range(tr.doc(), tr.selection()) {
        Some(range) => range.depth >= 1 && range.from.node(range.depth - 1).is_list_item(),
        None => return Ok(false),
    };
    if nested {
        lift_to_outer_list(tr)
    } else {
        lift_out_of_list(tr)
    }
}

fn lift_to_outer_list(tr: &mut Transaction) -> Result<bool, TransformError> {
    let base = tr.mapping().len();
    let (span, end, end_of_list, trailing_holder) = {
        let Some(range) = calculate_item_range(tr.doc(), tr.selection()) else {
            return Ok(false);
        };
        let last = range.parent().child(range.end_index() - 1);
        let holder = last.copy(Fragment::from_node(range.parent().copy(Fragment::empty())));
        (range.span(), range.end(), range.to.end(range.depth), holder)
    };

    let mut span = span;
    if end < end_of_list {
        // Siblings after the run become a sublist of its last item
        tr.replace_around(
            end - 1,
            end_of_list,
            end,
            end_of_list,
            Slice::new(Fragment::from_node(trailing_holder), 1, 0),
            1,
        )?;
        span = BlockSpan {
            to: end_of_list,
            ..span
        };
    }

    let target = match lift_target(&span.resolve(tr.doc())?) {
        Some(target) => target,
        None => return Ok(false),
    };
    tr.lift(span, target)?;

    let after = tr.mapping().map_from(base, end, Assoc::Before) - 1;
    let same_kind = {
        let rp = tr.doc().resolve(after)?;
        matches!(
            (rp.node_before(), rp.node_after()),
            (Some(before), Some(next)) if before.kind() == next.kind()
        )
    };
    if same_kind && can_join(tr.doc(), after) {
        tr.join(after, 1)?;
    }
    Ok(true)
}

fn lift_out_of_list(tr: &mut Transaction) -> Result<bool, TransformError> {
    let base = tr.mapping().len();
    let (start, end, at_start, at_end, shell, boundaries) = {
        let Some(range) = calculate_item_range(tr.doc(), tr.selection()) else {
            return Ok(false);
        };
        let list = range.parent();
        let mut boundaries = Vec::new();
        let mut pos = range.end();
        for i in (range.start_index() + 1..range.end_index()).rev() {
            pos -= list.child(i).node_size();
            boundaries.push(pos);
        }
        (
            range.start(),
            range.end(),
            range.start_index() == 0,
            range.end_index() == list.child_count(),
            list.copy(Fragment::empty()),
            boundaries,
        )
    };

    // Merge the selected items into one
    for pos in boundaries {
        tr.delete(pos - 1, pos + 1)?;
    }

    let item_end = {
        let rp = tr.doc().resolve(start)?;
        let Some(item) = rp.node_after() else {
            return Ok(false);
        };
        let item_end = start + item.node_size();
        if tr.mapping().map_from(base, end, Assoc::After) != item_end {
            return Ok(false);
        }
        let depth = rp.depth();
        if depth == 0 {
            return Ok(false);
        }
        let parent = rp.node(depth - 1);
        let index = rp.index(depth - 1);
        let mut replacement = item.content().clone();
        if !at_end {
            replacement = replacement.append(&Fragment::from_node(shell.clone()));
        }
        if !parent.can_replace(index + usize::from(!at_start), index + 1, &replacement) {
            return Ok(false);
        }
        item_end
    };

    // Strip the list around the item, closing it on the sides where items
    // remain and dropping it on the sides where the run reaches its edge
    let mut closers = Fragment::empty();
    if !at_start {
        closers = closers.append(&Fragment::from_node(shell.clone()));
    }
    if !at_end {
        closers = closers.append(&Fragment::from_node(shell));
    }
    tr.replace_around(
        start - usize::from(at_start),
        item_end + usize::from(at_end),
        start + 1,
        item_end - 1,
        Slice::new(closers, usize::from(!at_start), usize::from(!at_end)),
        usize::from(!at_start),
    )?;
    Ok(true)
}
