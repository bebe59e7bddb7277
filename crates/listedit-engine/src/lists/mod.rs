/*!
 * # List Commands
 *
 * Structural editing of nested lists: toggling a selection between list
 * variants, indenting and dedenting runs of items, and splitting an item on
 * Enter.
 *
 * Every command takes a `&mut Transaction` and returns `true` when it
 * appended its edits, or `false` with the transaction left exactly as it was.
 * Commands work on a scratch copy of the transaction and only keep it when
 * they succeed, so a command that gives up halfway never leaves partial
 * edits behind.
 *
 * ## Module Structure
 *
 * - **`range`**: `calculate_item_range`, the item run a command acts on
 * - **`lift`**: `lift_list_item`, moving items out one level
 * - **`toggle`**: `toggle_list`
 * - **`indent`**: `indent_list`
 * - **`dedent`**: `dedent_list`
 * - **`split`**: `split_list_item`
 * - **`context`**: `ListContext`, per-variant behavior and key bindings
 */

mod context;
mod dedent;
mod indent;
mod lift;
mod range;
mod split;
mod toggle;

pub use context::{ListContext, VariantBehavior};
pub use dedent::dedent_list;
pub use indent::indent_list;
pub use lift::lift_list_item;
pub use range::calculate_item_range;
pub use split::split_list_item;
pub use toggle::toggle_list;

use crate::model::Node;
use crate::transform::{Transaction, TransformError};

pub fn is_list(node: &Node) -> bool {
    node.is_list()
}

pub fn is_list_item(node: &Node) -> bool {
    node.is_list_item()
}

/// Runs one list command on a scratch copy of `tr`, keeping the result only
/// when the command reports success.
fn run<F>(tr: &mut Transaction, name: &str, command: F) -> bool
where
    F: FnOnce(&mut Transaction) -> Result<bool, TransformError>,
{
    tr.attempt(|tr| match command(tr) {
        Ok(true) => true,
        Ok(false) => {
            log::debug!("{name}: not applicable here");
            false
        }
        Err(err) => {
            log::warn!("{name} failed: {err}");
            false
        }
    })
}
