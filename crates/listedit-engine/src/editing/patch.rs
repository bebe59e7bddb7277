use crate::editing::Selection;
use crate::transform::EditOp;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Ranges of the new document written by the edit.
    pub changed: Vec<std::ops::Range<usize>>,
    pub new_selection: Selection,
    pub version: u64,
    /// The edit log that produced this patch, in order.
    pub ops: Vec<EditOp>,
}
