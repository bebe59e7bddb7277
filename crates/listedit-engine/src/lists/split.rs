use crate::editing::Selection;
use crate::model::{Attrs, Fragment, ItemKind, Node, NodeKind, Slice};
use crate::transform::{Transaction, TransformError, Wrapper, can_split};

use super::lift::lift_items;
use super::run;

/// Enter inside a list item.
///
/// Splits the item at the cursor. On an empty last block the item is left
/// instead: the block moves to a new sibling item, or, when it is the only
/// block, the item is lifted out of its list. Attributes named in
/// `ignored_attrs` are not carried over to the new item.
pub fn split_list_item(tr: &mut Transaction, item: ItemKind, ignored_attrs: &[String]) -> bool {
    run(tr, "split_list_item", |tr| split(tr, item, ignored_attrs))
}

enum Plan {
    Lift,
    NewSibling {
        from: usize,
        to: usize,
        slice: Slice,
    },
    Split {
        from: usize,
        to: usize,
        at_end: bool,
        attrs: Attrs,
    },
}

fn split(tr: &mut Transaction, item: ItemKind, ignored_attrs: &[String]) -> Result<bool, TransformError> {
    let item_kind = NodeKind::Item(item);

    let plan = {
        let doc = tr.doc();
        let selection = *tr.selection();
        if let Selection::Node { from, .. } = selection {
            if doc
                .node_at(from)
                .is_some_and(|node| node.is_block() || node.is_list_item())
            {
                return Ok(false);
            }
        }
        let from = doc.resolve(selection.from())?;
        let to = doc.resolve(selection.to())?;
        let depth = from.depth();
        if depth < 2 || !from.same_parent(&to) {
            return Ok(false);
        }
        let list_item = from.node(depth - 1);
        if list_item.kind() != item_kind {
            return Ok(false);
        }

        let mut attrs = list_item.attrs().clone();
        attrs.retain(|name, _| !ignored_attrs.contains(name));

        let block_empty = from.parent().content_size() == 0;
        let last_block = from.index_after(depth - 1) == list_item.child_count();
        if block_empty && last_block {
            if list_item.child_count() == 1 {
                Plan::Lift
            } else {
                // Drop the empty block and open a fresh item after this one
                let fresh = Node::new(
                    item_kind,
                    Some(&attrs),
                    Fragment::from_node(from.parent().copy(Fragment::empty())),
                );
                let content = Fragment::from_nodes([list_item.copy(Fragment::empty()), fresh]);
                Plan::NewSibling {
                    from: from.before(depth),
                    to: from.after(depth - 1),
                    slice: Slice::new(content, 1, 0),
                }
            }
        } else {
            Plan::Split {
                from: from.pos,
                to: to.pos,
                at_end: to.pos == from.end(depth),
                attrs,
            }
        }
    };

    match plan {
        Plan::Lift => lift_items(tr),
        Plan::NewSibling { from, to, slice } => {
            tr.replace(from, to, slice)?;
            tr.set_selection(Selection::cursor(from + 3));
            Ok(true)
        }
        Plan::Split {
            from,
            to,
            at_end,
            attrs,
        } => {
            if from < to {
                tr.delete(from, to)?;
            }
            let types_after = if at_end {
                vec![
                    Some(Wrapper::with_attrs(item_kind, attrs)),
                    Some(Wrapper::new(NodeKind::Paragraph)),
                ]
            } else {
                vec![Some(Wrapper::with_attrs(item_kind, attrs)), None]
            };
            if !can_split(tr.doc(), from, 2, &types_after) {
                return Ok(false);
            }
            tr.split(from, 2, &types_after)?;
            Ok(true)
        }
    }
}
