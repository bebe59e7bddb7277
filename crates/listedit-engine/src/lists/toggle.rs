use crate::model::{ContainerKind, Fragment, ItemKind, Node, NodeKind, Slice};
use crate::transform::{Transaction, TransformError, Wrapper, can_split};

use super::lift::lift_items;
use super::run;

/// Turns the selected blocks into a `container` list, retypes the list they
/// are already in, or lifts them out of it when it already is a `container`
/// list.
pub fn toggle_list(tr: &mut Transaction, container: ContainerKind, item: ItemKind) -> bool {
    run(tr, "toggle_list", |tr| toggle(tr, container, item))
}

enum Plan {
    Unwrap,
    Retype {
        pos: usize,
    },
    Convert {
        from: usize,
        to: usize,
        nodes: Vec<Node>,
        shift: isize,
    },
    Wrap {
        span: crate::model::BlockSpan,
        start: usize,
        sizes: Vec<usize>,
    },
}

fn toggle(tr: &mut Transaction, container: ContainerKind, item: ItemKind) -> Result<bool, TransformError> {
    let list_kind = NodeKind::List(container);
    let item_kind = NodeKind::Item(item);

    let plan = {
        let doc = tr.doc();
        let selection = *tr.selection();
        let from = doc.resolve(selection.from())?;
        let to = doc.resolve(selection.to())?;
        let Some(range) = from.block_range(&to, None) else {
            return Ok(false);
        };
        let list_depth = (1..=range.depth)
            .rev()
            .find(|&depth| from.node(depth).is_list());

        match list_depth {
            Some(depth) if range.depth - depth <= 1 => {
                let list = from.node(depth);
                if list.kind() == list_kind {
                    Plan::Unwrap
                } else if list_kind.valid_content(list.content()) {
                    Plan::Retype {
                        pos: from.before(depth),
                    }
                } else {
                    let first = from.index(depth);
                    let end = to.index_after(depth);
                    let mut items = Vec::new();
                    for child in list.content().iter().skip(first).take(end.saturating_sub(first)) {
                        items.push(Node::checked(item_kind, None, child.content().clone())?);
                    }
                    let before = list.content().cut_by_index(0, first);
                    let after = list.content().cut_by_index(end, list.child_count());
                    let mut nodes = Vec::new();
                    if !before.is_empty() {
                        nodes.push(list.copy(before));
                    }
                    nodes.push(Node::new(list_kind, None, Fragment::from_nodes(items)));
                    if !after.is_empty() {
                        nodes.push(list.copy(after));
                    }
                    Plan::Convert {
                        from: from.before(depth),
                        to: from.after(depth),
                        shift: if first > 0 { 2 } else { 0 },
                        nodes,
                    }
                }
            }
            _ => {
                let blocks = range
                    .parent()
                    .content()
                    .cut_by_index(range.start_index(), range.end_index());
                if !item_kind.valid_content(&blocks) {
                    return Ok(false);
                }
                Plan::Wrap {
                    span: range.span(),
                    start: range.start(),
                    sizes: blocks.iter().map(Node::node_size).collect(),
                }
            }
        }
    };

    match plan {
        Plan::Unwrap => lift_items(tr),
        Plan::Retype { pos } => {
            tr.set_node_markup(pos, list_kind, None)?;
            Ok(true)
        }
        Plan::Convert {
            from,
            to,
            nodes,
            shift,
        } => {
            let selection = tr.selection().shifted(shift);
            tr.replace(from, to, Slice::new(Fragment::from_nodes(nodes), 0, 0))?;
            tr.set_selection(selection);
            Ok(true)
        }
        Plan::Wrap { span, start, sizes } => {
            tr.wrap(span, &[Wrapper::new(list_kind), Wrapper::new(item_kind)])?;
            // One item per block, where the block can start an item
            let mut split_pos = start + 2;
            for (i, size) in sizes.into_iter().enumerate() {
                if i > 0 && can_split(tr.doc(), split_pos, 1, &[]) {
                    tr.split(split_pos, 1, &[])?;
                    split_pos += 2;
                }
                split_pos += size;
            }
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{bullet_list, doc, item, ordered_list, p, tagged, task_item, task_list};
    use crate::editing::Selection;
    use pretty_assertions::assert_eq;

    fn toggled(t: crate::builders::Tagged, container: ContainerKind, item: ItemKind) -> Transaction {
        let selection = t.selection();
        let mut tr = Transaction::new(t.doc, selection);
        assert!(toggle_list(&mut tr, container, item));
        tr
    }

    #[test]
    fn test_paragraph_becomes_task_list() {
        let tr = toggled(
            tagged(doc([p("make <cursor>list")])),
            ContainerKind::Task,
            ItemKind::Task,
        );

        assert_eq!(tr.doc(), &doc([task_list([task_item(false, [p("make list")])])]));
        assert_eq!(tr.selection().head(), 8);
    }

    #[test]
    fn test_each_selected_paragraph_gets_an_item() {
        let tr = toggled(
            tagged(doc([p("<anchor>a"), p("b"), p("c<head>")])),
            ContainerKind::Bullet,
            ItemKind::Plain,
        );

        assert_eq!(
            tr.doc(),
            &doc([bullet_list([
                item([p("a")]),
                item([p("b")]),
                item([p("c")]),
            ])])
        );
    }

    #[test]
    fn test_bullet_retyped_to_ordered_in_place() {
        let t = tagged(doc([bullet_list([item([p("a")]), item([p("b<cursor>")])])]));
        let cursor = t.selection();

        let tr = toggled(t, ContainerKind::Ordered, ItemKind::Plain);

        assert_eq!(
            tr.doc(),
            &doc([ordered_list([item([p("a")]), item([p("b")])])])
        );
        assert_eq!(tr.selection(), &cursor);
        assert_eq!(tr.steps().len(), 1);
    }

    #[test]
    fn test_bullet_item_converted_to_task_item() {
        let t = tagged(doc([bullet_list([
            item([p("a")]),
            item([p("b<cursor>")]),
            item([p("c")]),
        ])]));

        let tr = toggled(t, ContainerKind::Task, ItemKind::Task);

        insta::assert_snapshot!(
            tr.doc(),
            @r#"doc(bullet_list(item(p("a"))), task_list(task_item(p("b"))), bullet_list(item(p("c"))))"#
        );
        // the cursor stays after "b"
        assert_eq!(tr.selection().head(), 11);
    }

    #[test]
    fn test_selected_item_node_converted_to_task_item() {
        let d = doc([bullet_list([item([p("a")]), item([p("b")])])]);
        let selection = Selection::node(&d, 6).unwrap();
        let mut tr = Transaction::new(d, selection);

        assert!(toggle_list(&mut tr, ContainerKind::Task, ItemKind::Task));

        assert_eq!(
            tr.doc(),
            &doc([
                bullet_list([item([p("a")])]),
                task_list([task_item(false, [p("b")])]),
            ])
        );
        assert_eq!(tr.selection(), &Selection::Node { from: 8, to: 13 });
    }

    #[test]
    fn test_same_kind_unwraps() {
        let t = tagged(doc([bullet_list([item([p("make <cursor>list")])])]));

        let tr = toggled(t, ContainerKind::Bullet, ItemKind::Plain);

        assert_eq!(tr.doc(), &doc([p("make list")]));
    }
}
