/*!
 * # Editing Core Module
 *
 * The command loop on top of the document model.
 *
 * ## Architecture Overview
 *
 * ### 1. Immutable snapshots
 * - A [`Document`] holds the current tree as an immutable [`Node`](crate::model::Node)
 * - Edits never touch the snapshot in place. A [`Transaction`](crate::transform::Transaction)
 *   builds the next tree, and the document swaps it in on dispatch
 *
 * ### 2. Command-Based Editing
 * - All edits are represented as **Commands** (`Cmd` enum)
 * - A command either applies completely or not at all
 * - Inapplicable commands are not errors: `apply` returns `None`
 *
 * ### 3. Selection tracking
 * - The selection is mapped through every step of a transaction
 * - List commands that rebuild whole subtrees set the selection explicitly
 *   so the cursor keeps its place in the text
 *
 * ## Module Structure
 *
 * - **`document`**: `Document`, the snapshot + selection + version holder
 * - **`commands`**: `Cmd` enum and its dispatch to the list engines
 * - **`selection`**: `Selection`, text and node selections in document positions
 * - **`patch`**: Edit result metadata including changed ranges and new selection
 */

pub mod commands;
pub mod document;
pub mod patch;
pub mod selection;

pub use commands::Cmd;
pub use document::Document;
pub use patch::Patch;
pub use selection::Selection;
