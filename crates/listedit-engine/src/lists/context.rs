use std::collections::BTreeMap;

use listedit_config::{Config, ListStyle};

use crate::editing::{Cmd, Selection};
use crate::model::{ContainerKind, ItemKind, Node, NodeKind};

impl From<ListStyle> for ContainerKind {
    fn from(style: ListStyle) -> Self {
        match style {
            ListStyle::Bullet => ContainerKind::Bullet,
            ListStyle::Ordered => ContainerKind::Ordered,
            ListStyle::Task => ContainerKind::Task,
        }
    }
}

/// How one list variant behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantBehavior {
    pub container: ContainerKind,
    pub item: ItemKind,
    /// Item attributes a split resets instead of copying.
    pub ignored_attrs: Vec<String>,
    pub toggle_key: Option<String>,
}

/// The enabled list variants and the keys bound to list commands, built once
/// from configuration and passed to whatever handles input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContext {
    variants: BTreeMap<ContainerKind, VariantBehavior>,
    indent_keys: Vec<String>,
    dedent_keys: Vec<String>,
    split_keys: Vec<String>,
}

impl ListContext {
    pub fn from_config(config: &Config) -> Self {
        let variants = config
            .variants
            .iter()
            .map(|variant| {
                let container = ContainerKind::from(variant.style);
                let behavior = VariantBehavior {
                    container,
                    item: container.item_kind(),
                    ignored_attrs: variant.split_ignored_attrs.clone(),
                    toggle_key: variant.toggle_key.clone(),
                };
                (container, behavior)
            })
            .collect();
        Self {
            variants,
            indent_keys: config.keymap.indent.clone(),
            dedent_keys: config.keymap.dedent.clone(),
            split_keys: config.keymap.split.clone(),
        }
    }

    /// Builds the context from the user's config file, or from defaults when
    /// there is none.
    pub fn load() -> anyhow::Result<Self> {
        let config = Config::load()?.unwrap_or_default();
        config.validate()?;
        Ok(Self::from_config(&config))
    }

    pub fn variants(&self) -> impl Iterator<Item = &VariantBehavior> {
        self.variants.values()
    }

    pub fn variant(&self, container: ContainerKind) -> Option<&VariantBehavior> {
        self.variants.get(&container)
    }

    /// The toggle command for an enabled variant.
    pub fn toggle(&self, container: ContainerKind) -> Option<Cmd> {
        let variant = self.variant(container)?;
        Some(Cmd::ToggleList {
            container: variant.container,
            item: variant.item,
        })
    }

    /// The split command for the innermost list around the selection.
    pub fn split_for(&self, doc: &Node, selection: &Selection) -> Option<Cmd> {
        let rp = doc.resolve(selection.from()).ok()?;
        let container = (1..=rp.depth()).rev().find_map(|depth| match rp.node(depth).kind() {
            NodeKind::List(container) => Some(container),
            _ => None,
        })?;
        let variant = self.variant(container)?;
        Some(Cmd::SplitListItem {
            item: variant.item,
            ignored_attrs: variant.ignored_attrs.clone(),
        })
    }

    pub fn command_for_key(&self, key: &str, doc: &Node, selection: &Selection) -> Option<Cmd> {
        let bound = |keys: &[String]| keys.iter().any(|k| k == key);
        if bound(&self.split_keys) {
            return self.split_for(doc, selection);
        }
        if bound(&self.indent_keys) {
            return Some(Cmd::IndentList);
        }
        if bound(&self.dedent_keys) {
            return Some(Cmd::DedentList);
        }
        self.variants
            .values()
            .find(|variant| variant.toggle_key.as_deref() == Some(key))
            .and_then(|variant| self.toggle(variant.container))
    }
}

impl Default for ListContext {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{bullet_list, doc, item, p, tagged, task_item, task_list};
    use listedit_config::VariantConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_keys() {
        let ctx = ListContext::default();
        let t = tagged(doc([p("a<cursor>")]));
        let sel = t.selection();

        assert_eq!(ctx.command_for_key("Tab", &t.doc, &sel), Some(Cmd::IndentList));
        assert_eq!(
            ctx.command_for_key("Shift-Tab", &t.doc, &sel),
            Some(Cmd::DedentList)
        );
        assert_eq!(
            ctx.command_for_key("Mod-Shift-7", &t.doc, &sel),
            Some(Cmd::ToggleList {
                container: ContainerKind::Task,
                item: ItemKind::Task,
            })
        );
        assert_eq!(ctx.command_for_key("Enter", &t.doc, &sel), None);
        assert_eq!(ctx.command_for_key("x", &t.doc, &sel), None);
    }

    #[test]
    fn test_split_uses_innermost_list_variant() {
        let ctx = ListContext::default();
        let t = tagged(doc([bullet_list([item([
            p("a"),
            task_list([task_item(true, [p("b<cursor>")])]),
        ])])]));

        assert_eq!(
            ctx.split_for(&t.doc, &t.selection()),
            Some(Cmd::SplitListItem {
                item: ItemKind::Task,
                ignored_attrs: vec!["checked".to_string()],
            })
        );
    }

    #[test]
    fn test_disabled_variant_has_no_toggle() {
        let config = Config {
            variants: vec![VariantConfig::new(ListStyle::Bullet, "Mod-8")],
            ..Config::default()
        };
        let ctx = ListContext::from_config(&config);

        assert!(ctx.toggle(ContainerKind::Ordered).is_none());
        assert_eq!(ctx.variants().count(), 1);
        assert_eq!(ctx.variant(ContainerKind::Bullet).map(|v| v.item), Some(ItemKind::Plain));
    }
}
