use crate::model::Node;
use crate::transform::{Assoc, StepMap};

/// The user's selection, in document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A text range. `anchor` stays put while `head` moves; either may come
    /// first.
    Text { anchor: usize, head: usize },
    /// A whole node selected, spanning `from..to`.
    Node { from: usize, to: usize },
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Selection::Text {
            anchor: pos,
            head: pos,
        }
    }

    pub fn text(anchor: usize, head: usize) -> Self {
        Selection::Text { anchor, head }
    }

    /// Selects the node starting at `pos`, if there is one.
    pub fn node(doc: &Node, pos: usize) -> Option<Self> {
        let node = doc.node_at(pos)?;
        Some(Selection::Node {
            from: pos,
            to: pos + node.node_size(),
        })
    }

    pub fn from(&self) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.min(head),
            Selection::Node { from, .. } => from,
        }
    }

    pub fn to(&self) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.max(head),
            Selection::Node { to, .. } => to,
        }
    }

    pub fn head(&self) -> usize {
        match *self {
            Selection::Text { head, .. } => head,
            Selection::Node { to, .. } => to,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from() == self.to()
    }

    /// Moves a text selection by a fixed offset, as when the content around
    /// it was rewrapped without changing its text.
    pub fn shifted(&self, delta: isize) -> Self {
        match *self {
            Selection::Text { anchor, head } => Selection::Text {
                anchor: anchor.saturating_add_signed(delta),
                head: head.saturating_add_signed(delta),
            },
            Selection::Node { from, to } => Selection::Node {
                from: from.saturating_add_signed(delta),
                to: to.saturating_add_signed(delta),
            },
        }
    }

    /// Maps the selection through a step into the new document `doc`. Text
    /// endpoints that no longer land in a textblock snap to the nearest one.
    pub fn map(&self, doc: &Node, map: &StepMap) -> Selection {
        match *self {
            Selection::Text { anchor, head } => {
                let head = map.map(head, Assoc::After);
                if !in_textblock(doc, head) {
                    return Selection::near(doc, head, 1);
                }
                let anchor = map.map(anchor, Assoc::After);
                if in_textblock(doc, anchor) {
                    Selection::Text { anchor, head }
                } else {
                    Selection::cursor(head)
                }
            }
            Selection::Node { from, to } => {
                let new_from = map.map(from, Assoc::After);
                let new_to = map.map(to, Assoc::Before);
                match doc.node_at(new_from) {
                    Some(node) if new_from + node.node_size() == new_to => Selection::Node {
                        from: new_from,
                        to: new_to,
                    },
                    _ => Selection::near(doc, new_from, 1),
                }
            }
        }
    }

    /// A cursor in the textblock nearest to `pos`, searching forward first
    /// when `bias` is positive.
    pub fn near(doc: &Node, pos: usize, bias: i8) -> Selection {
        let mut blocks = Vec::new();
        doc.nodes_between(0, doc.content_size(), &mut |node, at| {
            if node.is_textblock() {
                blocks.push((at + 1, at + 1 + node.content_size()));
                return false;
            }
            true
        });
        if let Some(&(start, end)) = blocks.iter().find(|(s, e)| *s <= pos && pos <= *e) {
            return Selection::cursor(pos.clamp(start, end));
        }
        let forward = blocks.iter().find(|(s, _)| *s >= pos).map(|&(s, _)| s);
        let backward = blocks.iter().rev().find(|(_, e)| *e <= pos).map(|&(_, e)| e);
        let found = if bias >= 0 {
            forward.or(backward)
        } else {
            backward.or(forward)
        };
        Selection::cursor(found.unwrap_or(pos.min(doc.content_size())))
    }
}

fn in_textblock(doc: &Node, pos: usize) -> bool {
    doc.resolve(pos).is_ok_and(|rp| rp.parent().is_textblock())
}
