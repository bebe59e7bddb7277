pub mod builders;
pub mod editing;
pub mod lists;
pub mod model;
pub mod transform;

// Re-export key types for easier usage
pub use editing::{Cmd, Document, Patch, Selection};
pub use lists::{
    ListContext, calculate_item_range, dedent_list, indent_list, lift_list_item, split_list_item,
    toggle_list,
};
pub use model::{ContainerKind, ItemKind, Node, NodeKind};
pub use transform::{EditOp, Transaction, TransformError};
