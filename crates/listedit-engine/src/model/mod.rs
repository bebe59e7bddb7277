/*!
 * # Document Model
 *
 * The tree the list commands operate on, and the queries they need from it.
 *
 * ## Position space
 *
 * Every location in a document is a single integer. Walking the tree in
 * pre-order, entering or leaving a non-leaf node costs one unit, each text
 * character costs one unit and a leaf atom (a [`NodeKind::Checkbox`]) costs
 * one unit. So `doc(p("ab"))` has positions `0..=4`: `0` before the
 * paragraph, `1..=3` inside it and `4` after it.
 *
 * ## Module Structure
 *
 * - **`schema`**: node kinds, content rules and attribute defaults
 * - **`node`**: `Node` and `Fragment`
 * - **`resolved`**: `ResolvedPos`, `NodeRange` and `BlockSpan`
 * - **`slice`**: `Slice`, content with open boundaries
 * - **`replace`**: the structural replace that stitches a slice into a tree
 */

mod node;
mod replace;
mod resolved;
mod schema;
mod slice;

pub use node::{Fragment, Node};
pub use resolved::{BlockSpan, NodeRange, ResolvedPos};
pub use schema::{AttrValue, Attrs, ContainerKind, ItemKind, NodeKind};
pub use slice::Slice;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Position {pos} outside of content of size {size}")]
    PositionOutOfRange { pos: usize, size: usize },

    #[error("Inserted content deeper than insertion position")]
    InsertedTooDeep,

    #[error("Inconsistent open depths")]
    InconsistentOpenDepths,

    #[error("Cannot join {sub} onto {main}")]
    CannotJoin {
        sub: &'static str,
        main: &'static str,
    },

    #[error("Invalid content for node {kind}")]
    InvalidContent { kind: &'static str },

    #[error("Empty text nodes are not allowed")]
    EmptyText,
}
