use crate::editing::commands::run_command;
use crate::editing::{Cmd, Patch, Selection};
use crate::lists::{self, ListContext};
use crate::model::{ModelError, Node, NodeRange};
use crate::transform::{Assoc, Transaction, TransformError};

/// Editing state for one document: the current snapshot, the selection and
/// a version counter.
///
/// Every change goes through a [`Transaction`]. Commands build one against
/// the current snapshot, and [`Document::dispatch`] swaps in its result and
/// reports what changed as a [`Patch`]. Nothing is committed when a command
/// does not apply.
///
/// ```
/// use listedit_engine::builders::{doc, p, tagged};
/// use listedit_engine::editing::{Cmd, Document};
/// use listedit_engine::model::{ContainerKind, ItemKind};
///
/// let t = tagged(doc([p("make <cursor>list")]));
/// let mut document = Document::new(t.doc.clone())
///     .unwrap()
///     .with_selection(t.selection());
///
/// let patch = document.apply(Cmd::ToggleList {
///     container: ContainerKind::Task,
///     item: ItemKind::Task,
/// });
///
/// assert_eq!(patch.map(|p| p.version), Some(1));
/// assert_eq!(
///     document.doc().to_string(),
///     r#"doc(task_list(task_item(p("make list"))))"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    doc: Node,
    selection: Selection,
    version: u64,
}

impl Document {
    /// Wraps a schema-valid tree. The cursor starts in the first textblock.
    pub fn new(doc: Node) -> Result<Self, ModelError> {
        doc.check()?;
        let selection = Selection::near(&doc, 0, 1);
        Ok(Self {
            doc,
            selection,
            version: 0,
        })
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// A fresh transaction over the current snapshot and selection.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.doc.clone(), self.selection)
    }

    /// Whether `cmd` would do anything here, probed on a throwaway
    /// transaction.
    pub fn can_apply(&self, cmd: &Cmd) -> bool {
        run_command(&mut self.transaction(), cmd)
    }

    /// The list item range around the selection, for enabling list controls.
    pub fn item_range(&self) -> Option<NodeRange<'_>> {
        lists::calculate_item_range(&self.doc, &self.selection)
    }

    /// Apply command to document
    ///
    /// Returns `None` when the command does not apply, in which case the
    /// document, selection and version are unchanged.
    pub fn apply(&mut self, cmd: Cmd) -> Option<Patch> {
        let mut tr = self.transaction();
        if !run_command(&mut tr, &cmd) {
            log::debug!("command not applicable: {cmd:?}");
            return None;
        }
        match self.dispatch(tr) {
            Ok(patch) => Some(patch),
            Err(err) => {
                log::warn!("dropping transaction for {cmd:?}: {err}");
                None
            }
        }
    }

    /// Runs whatever command `ctx` binds to `key`.
    pub fn handle_key(&mut self, ctx: &ListContext, key: &str) -> Option<Patch> {
        let cmd = ctx.command_for_key(key, &self.doc, &self.selection)?;
        self.apply(cmd)
    }

    /// Commits a transaction built from the current snapshot.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<Patch, TransformError> {
        if tr.before() != &self.doc {
            return Err(TransformError::StaleTransaction);
        }
        let (doc, selection, mapping, ops) = tr.into_parts();

        // Each step's written ranges, carried forward through later steps
        let mut changed = Vec::new();
        for (index, map) in mapping.maps().iter().enumerate() {
            for (start, end) in map.touched() {
                let start = mapping.map_from(index + 1, start, Assoc::Before);
                let end = mapping.map_from(index + 1, end, Assoc::After);
                changed.push(start..end.max(start));
            }
        }

        self.doc = doc;
        self.selection = selection;
        self.version += 1;

        Ok(Patch {
            changed,
            new_selection: selection,
            version: self.version,
            ops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{bullet_list, doc, item, p, tagged};
    use crate::model::{ContainerKind, ItemKind};
    use pretty_assertions::assert_eq;

    fn document(t: crate::builders::Tagged) -> Document {
        Document::new(t.doc.clone())
            .unwrap()
            .with_selection(t.selection())
    }

    #[test]
    fn test_new_rejects_invalid_tree() {
        let invalid = doc([bullet_list([])]);

        assert!(Document::new(invalid).is_err());
    }

    #[test]
    fn test_apply_bumps_version_and_reports_change() {
        let mut document = document(tagged(doc([p("a<cursor>b")])));

        let patch = document
            .apply(Cmd::InsertText {
                at: 2,
                text: "x".to_string(),
            })
            .unwrap();

        assert_eq!(patch.version, 1);
        assert_eq!(patch.changed, vec![2..3]);
        assert_eq!(patch.new_selection, Selection::cursor(3));
        assert_eq!(document.version(), 1);
    }

    #[test]
    fn test_inapplicable_command_changes_nothing() {
        let mut document = document(tagged(doc([p("a<cursor>b")])));

        assert!(!document.can_apply(&Cmd::IndentList));
        assert_eq!(document.apply(Cmd::IndentList), None);
        assert_eq!(document.version(), 0);
        assert!(document.item_range().is_none());
    }

    #[test]
    fn test_stale_transaction_is_refused() {
        let mut document = document(tagged(doc([p("a<cursor>b")])));
        let stale = document.transaction();
        document.apply(Cmd::InsertText {
            at: 1,
            text: "x".to_string(),
        });

        assert_eq!(
            document.dispatch(stale).unwrap_err(),
            TransformError::StaleTransaction
        );
    }

    #[test]
    fn test_patch_ops_replay_onto_previous_snapshot() {
        let mut document = document(tagged(doc([p("one<cursor>"), p("two")])));
        let before = document.doc().clone();

        let patch = document
            .apply(Cmd::ToggleList {
                container: ContainerKind::Bullet,
                item: ItemKind::Plain,
            })
            .unwrap();

        let replayed = crate::transform::replay(before, &patch.ops).unwrap();
        assert_eq!(&replayed, document.doc());
        assert_eq!(
            document.doc(),
            &doc([bullet_list([item([p("one")])]), p("two")])
        );
    }
}
