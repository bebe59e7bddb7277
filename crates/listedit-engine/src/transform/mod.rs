/*!
 * # Transactions
 *
 * A [`Transaction`] starts from a document snapshot and a selection, and
 * collects edits. Each primitive (`delete`, `lift`, `wrap`, `split`, ...):
 *
 * 1. builds one [`Step`];
 * 2. applies it, and refuses the result unless the whole tree is still valid;
 * 3. maps the selection through the step;
 * 4. appends an [`EditOp`] describing the edit in the terms it was asked for.
 *
 * A failed primitive leaves the transaction exactly as it was. The edit log
 * can be replayed onto the starting snapshot with [`replay`].
 *
 * Commands that chain several primitives run inside
 * [`Transaction::attempt`], so a command that gives up halfway leaves no
 * trace either.
 */

mod step;
mod structure;

pub use step::{Assoc, Mapping, Step, StepMap};
pub use structure::{Wrapper, can_join, can_split, lift_target};

use thiserror::Error;

use crate::editing::Selection;
use crate::model::{Attrs, BlockSpan, Fragment, ModelError, Node, NodeKind, Slice};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Structure replace would overwrite content")]
    StructureOverwrite,

    #[error("Gap is not a flat range")]
    GapNotFlat,

    #[error("Gap content does not fit the replacement slice")]
    GapDoesNotFit,

    #[error("No node at position {pos}")]
    NoNodeAt { pos: usize },

    #[error("Wrapper {kind} cannot hold the wrappers inside it")]
    WrapperMismatch { kind: &'static str },

    #[error("Cannot split {depth} levels at this position")]
    SplitTooDeep { depth: usize },

    #[error("Transaction was built from a different document version")]
    StaleTransaction,
}

/// One entry of the edit log, in the terms the edit was requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Delete {
        from: usize,
        to: usize,
    },
    Insert {
        pos: usize,
        content: Fragment,
    },
    Replace {
        from: usize,
        to: usize,
        slice: Slice,
    },
    ReplaceAround {
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
        slice: Slice,
        insert: usize,
    },
    SetMarkup {
        pos: usize,
        kind: NodeKind,
        attrs: Option<Attrs>,
    },
    Lift {
        range: BlockSpan,
        target: usize,
    },
    Wrap {
        range: BlockSpan,
        wrappers: Vec<Wrapper>,
    },
    Split {
        pos: usize,
        depth: usize,
        types_after: Vec<Option<Wrapper>>,
    },
}

impl EditOp {
    /// Re-issues this edit against `tr`.
    pub fn apply(&self, tr: &mut Transaction) -> Result<(), TransformError> {
        match self {
            EditOp::Delete { from, to } => tr.delete(*from, *to),
            EditOp::Insert { pos, content } => tr.insert(*pos, content.clone()),
            EditOp::Replace { from, to, slice } => tr.replace(*from, *to, slice.clone()),
            EditOp::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                insert,
            } => tr.replace_around(*from, *to, *gap_from, *gap_to, slice.clone(), *insert),
            EditOp::SetMarkup { pos, kind, attrs } => {
                tr.set_node_markup(*pos, *kind, attrs.clone())
            }
            EditOp::Lift { range, target } => tr.lift(*range, *target),
            EditOp::Wrap { range, wrappers } => tr.wrap(*range, wrappers),
            EditOp::Split {
                pos,
                depth,
                types_after,
            } => tr.split(*pos, *depth, types_after),
        }
    }
}

/// Applies an edit log to `doc` from scratch.
pub fn replay(doc: Node, ops: &[EditOp]) -> Result<Node, TransformError> {
    let selection = Selection::near(&doc, 0, 1);
    let mut tr = Transaction::new(doc, selection);
    for op in ops {
        op.apply(&mut tr)?;
    }
    Ok(tr.doc)
}

#[derive(Debug, Clone)]
pub struct Transaction {
    before: Node,
    doc: Node,
    steps: Vec<Step>,
    ops: Vec<EditOp>,
    mapping: Mapping,
    selection: Selection,
}

impl Transaction {
    pub fn new(doc: Node, selection: Selection) -> Self {
        Self {
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            ops: Vec::new(),
            mapping: Mapping::default(),
            selection,
        }
    }

    /// The current document, with every edit so far applied.
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// The snapshot the transaction started from.
    pub fn before(&self) -> &Node {
        &self.before
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Node, Selection, Mapping, Vec<EditOp>) {
        (self.doc, self.selection, self.mapping, self.ops)
    }

    /// Runs `f` against a copy of this transaction and keeps the copy only if
    /// `f` reports success.
    pub fn attempt<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Transaction) -> bool,
    {
        let mut scratch = self.clone();
        if f(&mut scratch) {
            *self = scratch;
            true
        } else {
            false
        }
    }

    fn step(&mut self, step: Step, op: EditOp) -> Result<(), TransformError> {
        let doc = step.apply(&self.doc)?;
        doc.check()?;
        let map = step.map();
        self.selection = self.selection.map(&doc, &map);
        self.mapping.push(map);
        self.doc = doc;
        self.steps.push(step);
        log::trace!("applied {op:?}");
        self.ops.push(op);
        Ok(())
    }

    pub fn replace(&mut self, from: usize, to: usize, slice: Slice) -> Result<(), TransformError> {
        let step = Step::Replace {
            from,
            to,
            slice: slice.clone(),
            structure: false,
        };
        self.step(step, EditOp::Replace { from, to, slice })
    }

    /// Replaces `from..to` with a single node.
    pub fn replace_with(&mut self, from: usize, to: usize, node: Node) -> Result<(), TransformError> {
        self.replace(from, to, Slice::from_node(node))
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<(), TransformError> {
        let step = Step::Replace {
            from,
            to,
            slice: Slice::empty(),
            structure: false,
        };
        self.step(step, EditOp::Delete { from, to })
    }

    pub fn insert(&mut self, pos: usize, content: Fragment) -> Result<(), TransformError> {
        let step = Step::Replace {
            from: pos,
            to: pos,
            slice: Slice::new(content.clone(), 0, 0),
            structure: false,
        };
        self.step(step, EditOp::Insert { pos, content })
    }

    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<(), TransformError> {
        if text.is_empty() {
            return Ok(());
        }
        self.insert(pos, Fragment::from_node(Node::text(text)))
    }

    pub fn replace_around(
        &mut self,
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
        slice: Slice,
        insert: usize,
    ) -> Result<(), TransformError> {
        let step = Step::ReplaceAround {
            from,
            to,
            gap_from,
            gap_to,
            slice: slice.clone(),
            insert,
            structure: true,
        };
        let op = EditOp::ReplaceAround {
            from,
            to,
            gap_from,
            gap_to,
            slice,
            insert,
        };
        self.step(step, op)
    }

    /// Changes the kind and attributes of the node at `pos`, keeping its
    /// content.
    pub fn set_node_markup(
        &mut self,
        pos: usize,
        kind: NodeKind,
        attrs: Option<Attrs>,
    ) -> Result<(), TransformError> {
        let step = {
            let node = self.doc.node_at(pos).ok_or(TransformError::NoNodeAt { pos })?;
            if !kind.valid_content(node.content()) {
                return Err(ModelError::InvalidContent { kind: kind.name() }.into());
            }
            let size = node.node_size();
            let retyped = Node::new(kind, attrs.as_ref(), Fragment::empty());
            Step::ReplaceAround {
                from: pos,
                to: pos + size,
                gap_from: pos + 1,
                gap_to: pos + size - 1,
                slice: Slice::from_node(retyped),
                insert: 1,
                structure: true,
            }
        };
        self.step(step, EditOp::SetMarkup { pos, kind, attrs })
    }

    /// Moves the blocks of `range` out to the ancestor at depth `target`,
    /// splitting the nodes in between around them.
    pub fn lift(&mut self, range: BlockSpan, target: usize) -> Result<(), TransformError> {
        let step = structure::lift_step(&range.resolve(&self.doc)?, target);
        self.step(step, EditOp::Lift { range, target })
    }

    /// Wraps the blocks of `range` in `wrappers`, outermost first.
    pub fn wrap(&mut self, range: BlockSpan, wrappers: &[Wrapper]) -> Result<(), TransformError> {
        let step = structure::wrap_step(&range.resolve(&self.doc)?, wrappers)?;
        let op = EditOp::Wrap {
            range,
            wrappers: wrappers.to_vec(),
        };
        self.step(step, op)
    }

    pub fn split(
        &mut self,
        pos: usize,
        depth: usize,
        types_after: &[Option<Wrapper>],
    ) -> Result<(), TransformError> {
        let step = structure::split_step(&self.doc, pos, depth, types_after)?;
        let op = EditOp::Split {
            pos,
            depth,
            types_after: types_after.to_vec(),
        };
        self.step(step, op)
    }

    /// Joins the nodes around `pos`, `depth` levels deep.
    pub fn join(&mut self, pos: usize, depth: usize) -> Result<(), TransformError> {
        let from = pos.checked_sub(depth).ok_or(TransformError::NoNodeAt { pos })?;
        let to = pos + depth;
        let step = Step::Replace {
            from,
            to,
            slice: Slice::empty(),
            structure: true,
        };
        self.step(step, EditOp::Delete { from, to })
    }
}
