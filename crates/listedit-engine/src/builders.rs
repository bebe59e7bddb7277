//! Terse constructors for documents, plus `<name>` position markers.
//!
//! ```
//! use listedit_engine::builders::{bullet_list, doc, item, p, tagged};
//!
//! let t = tagged(doc([bullet_list([item([p("make <cursor>list")])])]));
//! assert_eq!(t.tag("cursor"), Some(8));
//! assert_eq!(t.doc.to_string(), r#"doc(bullet_list(item(p("make list"))))"#);
//! ```

use std::collections::BTreeMap;

use crate::editing::Selection;
use crate::model::{Attrs, AttrValue, ContainerKind, Fragment, ItemKind, Node, NodeKind};

pub fn doc(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Doc, None, Fragment::from_nodes(children))
}

/// A paragraph holding `text`. An empty string gives an empty paragraph.
pub fn p(text: &str) -> Node {
    let content = if text.is_empty() {
        Fragment::empty()
    } else {
        Fragment::from_node(Node::text(text))
    };
    Node::new(NodeKind::Paragraph, None, content)
}

/// A paragraph with arbitrary inline children.
pub fn p_with(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Paragraph, None, Fragment::from_nodes(children))
}

pub fn checkbox() -> Node {
    Node::new(NodeKind::Checkbox, None, Fragment::empty())
}

pub fn bullet_list(items: impl IntoIterator<Item = Node>) -> Node {
    list(ContainerKind::Bullet, items)
}

pub fn ordered_list(items: impl IntoIterator<Item = Node>) -> Node {
    list(ContainerKind::Ordered, items)
}

pub fn task_list(items: impl IntoIterator<Item = Node>) -> Node {
    list(ContainerKind::Task, items)
}

pub fn list(kind: ContainerKind, items: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::List(kind), None, Fragment::from_nodes(items))
}

pub fn item(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(
        NodeKind::Item(ItemKind::Plain),
        None,
        Fragment::from_nodes(children),
    )
}

pub fn task_item(checked: bool, children: impl IntoIterator<Item = Node>) -> Node {
    let mut attrs = Attrs::new();
    attrs.insert("checked".to_string(), AttrValue::Bool(checked));
    Node::new(
        NodeKind::Item(ItemKind::Task),
        Some(&attrs),
        Fragment::from_nodes(children),
    )
}

/// A document with its `<name>` markers stripped out and recorded.
#[derive(Debug, Clone)]
pub struct Tagged {
    pub doc: Node,
    pub tags: BTreeMap<String, usize>,
}

impl Tagged {
    pub fn tag(&self, name: &str) -> Option<usize> {
        self.tags.get(name).copied()
    }

    /// `<anchor>`/`<head>` give a text selection, `<cursor>` a collapsed one.
    /// Without markers the cursor sits at the start of the first textblock.
    pub fn selection(&self) -> Selection {
        match (self.tag("anchor"), self.tag("head"), self.tag("cursor")) {
            (Some(anchor), Some(head), _) => Selection::text(anchor, head),
            (_, _, Some(cursor)) => Selection::cursor(cursor),
            _ => Selection::near(&self.doc, 0, 1),
        }
    }
}

pub fn tagged(node: Node) -> Tagged {
    let mut tags = BTreeMap::new();
    let content = strip_content(&node, 0, &mut tags);
    Tagged {
        doc: node.copy(content),
        tags,
    }
}

fn strip_content(node: &Node, content_start: usize, tags: &mut BTreeMap<String, usize>) -> Fragment {
    let mut children = Vec::new();
    let mut pos = content_start;
    for child in node.content() {
        match child.text_str() {
            Some(text) => {
                let clean = strip_markers(text, pos, tags);
                if !clean.is_empty() {
                    pos += clean.chars().count();
                    children.push(Node::text(clean));
                }
            }
            None => {
                let inner = strip_content(child, pos + 1, tags);
                let rebuilt = if child.is_leaf() {
                    child.clone()
                } else {
                    child.copy(inner)
                };
                pos += rebuilt.node_size();
                children.push(rebuilt);
            }
        }
    }
    Fragment::from_nodes(children)
}

fn strip_markers(text: &str, start: usize, tags: &mut BTreeMap<String, usize>) -> String {
    let mut clean = String::new();
    let mut clean_len = 0;
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        let (before, after) = rest.split_at(open);
        clean.push_str(before);
        clean_len += before.chars().count();
        let name_len = after[1..]
            .find('>')
            .filter(|&n| n > 0 && after[1..1 + n].chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        match name_len {
            Some(n) => {
                tags.insert(after[1..1 + n].to_string(), start + clean_len);
                rest = &after[n + 2..];
            }
            None => {
                clean.push('<');
                clean_len += 1;
                rest = &after[1..];
            }
        }
    }
    clean.push_str(rest);
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tags_in_nested_text() {
        let t = tagged(doc([
            p("a<anchor>b"),
            bullet_list([item([p("<head>")])]),
        ]));

        assert_eq!(t.doc, doc([p("ab"), bullet_list([item([p("")])])]));
        assert_eq!(t.tag("anchor"), Some(2));
        assert_eq!(t.tag("head"), Some(7));
        assert_eq!(t.selection(), Selection::text(2, 7));
    }

    #[test]
    fn test_literal_angle_brackets_survive() {
        let t = tagged(doc([p("a < b <> c")]));

        assert_eq!(t.doc, doc([p("a < b <> c")]));
        assert!(t.tags.is_empty());
    }
}
