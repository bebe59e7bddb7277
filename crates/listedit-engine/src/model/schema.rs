use std::collections::BTreeMap;
use std::fmt;

use super::Fragment;

/// The list container variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerKind {
    Bullet,
    Ordered,
    Task,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [
        ContainerKind::Bullet,
        ContainerKind::Ordered,
        ContainerKind::Task,
    ];

    /// The only item kind this container accepts.
    pub fn item_kind(self) -> ItemKind {
        match self {
            ContainerKind::Bullet | ContainerKind::Ordered => ItemKind::Plain,
            ContainerKind::Task => ItemKind::Task,
        }
    }
}

/// The list item variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    Plain,
    Task,
}

/// Every node type the built-in schema knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Text,
    /// Inline atom rendered as a task checkbox.
    Checkbox,
    List(ContainerKind),
    Item(ItemKind),
}

/// What a node kind may contain, as a sequence rule over child kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentRule {
    /// No children at all.
    Leaf,
    /// `inline*`
    Inline,
    /// `block+`
    Blocks,
    /// `paragraph block*`
    ItemBody,
    /// `item+` for one item kind
    Items(ItemKind),
}

impl ContentRule {
    fn matches(self, kinds: &[NodeKind]) -> bool {
        match self {
            ContentRule::Leaf => kinds.is_empty(),
            ContentRule::Inline => kinds.iter().all(|k| k.is_inline()),
            ContentRule::Blocks => !kinds.is_empty() && kinds.iter().all(|k| k.is_block()),
            ContentRule::ItemBody => match kinds.split_first() {
                Some((first, rest)) => {
                    *first == NodeKind::Paragraph && rest.iter().all(|k| k.is_block())
                }
                None => false,
            },
            ContentRule::Items(item) => {
                !kinds.is_empty() && kinds.iter().all(|k| *k == NodeKind::Item(item))
            }
        }
    }

    /// Whether some child kind is allowed by both rules.
    fn overlaps(self, other: ContentRule) -> bool {
        use ContentRule::*;
        match (self, other) {
            (Leaf, _) | (_, Leaf) => false,
            (Inline, Inline) => true,
            (Blocks | ItemBody, Blocks | ItemBody) => true,
            (Items(a), Items(b)) => a == b,
            _ => false,
        }
    }
}

impl NodeKind {
    fn content_rule(self) -> ContentRule {
        match self {
            NodeKind::Doc => ContentRule::Blocks,
            NodeKind::Paragraph => ContentRule::Inline,
            NodeKind::Text | NodeKind::Checkbox => ContentRule::Leaf,
            NodeKind::List(container) => ContentRule::Items(container.item_kind()),
            NodeKind::Item(_) => ContentRule::ItemBody,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "p",
            NodeKind::Text => "text",
            NodeKind::Checkbox => "checkbox",
            NodeKind::List(ContainerKind::Bullet) => "bullet_list",
            NodeKind::List(ContainerKind::Ordered) => "ordered_list",
            NodeKind::List(ContainerKind::Task) => "task_list",
            NodeKind::Item(ItemKind::Plain) => "item",
            NodeKind::Item(ItemKind::Task) => "task_item",
        }
    }

    pub fn is_text(self) -> bool {
        self == NodeKind::Text
    }

    pub fn is_leaf(self) -> bool {
        self.content_rule() == ContentRule::Leaf
    }

    pub fn is_inline(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Checkbox)
    }

    pub fn is_block(self) -> bool {
        matches!(self, NodeKind::Paragraph | NodeKind::List(_))
    }

    pub fn is_textblock(self) -> bool {
        self.content_rule() == ContentRule::Inline
    }

    pub fn is_list(self) -> bool {
        matches!(self, NodeKind::List(_))
    }

    pub fn is_list_item(self) -> bool {
        matches!(self, NodeKind::Item(_))
    }

    /// Whether `content` is a complete, valid child sequence for this kind.
    pub fn valid_content(self, content: &Fragment) -> bool {
        let kinds: Vec<NodeKind> = content.iter().map(|n| n.kind()).collect();
        self.content_rule().matches(&kinds)
    }

    pub(crate) fn accepts_sequence(self, kinds: &[NodeKind]) -> bool {
        self.content_rule().matches(kinds)
    }

    /// Whether the two kinds share at least one allowed child kind, which is
    /// what it takes for their contents to be joined.
    pub fn compatible_content(self, other: NodeKind) -> bool {
        self == other || self.content_rule().overlaps(other.content_rule())
    }

    pub fn default_attrs(self) -> Attrs {
        let mut attrs = Attrs::new();
        match self {
            NodeKind::List(ContainerKind::Ordered) => {
                attrs.insert("order".to_string(), AttrValue::Int(1));
            }
            NodeKind::Item(ItemKind::Task) => {
                attrs.insert("checked".to_string(), AttrValue::Bool(false));
            }
            _ => {}
        }
        attrs
    }

    /// Declared attributes only, taking given values over defaults.
    pub fn compute_attrs(self, given: Option<&Attrs>) -> Attrs {
        let mut attrs = self.default_attrs();
        if let Some(given) = given {
            for (name, value) in attrs.iter_mut() {
                if let Some(v) = given.get(name) {
                    *value = v.clone();
                }
            }
        }
        attrs
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type Attrs = BTreeMap<String, AttrValue>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("null"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}
