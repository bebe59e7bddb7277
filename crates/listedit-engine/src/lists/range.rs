use crate::editing::Selection;
use crate::model::{Node, NodeRange};

use super::is_list;

/// The run of list items covered by `selection`, inside the deepest list
/// that holds both ends of it.
///
/// When the ends sit at different nesting levels the range climbs to the
/// shallowest list containing both, so it always spans whole items.
pub fn calculate_item_range<'a>(doc: &'a Node, selection: &Selection) -> Option<NodeRange<'a>> {
    let from = doc.resolve(selection.from()).ok()?;
    let to = doc.resolve(selection.to()).ok()?;
    let pred: &dyn Fn(&Node) -> bool = &is_list;
    from.block_range(&to, Some(pred))
}
