use crate::lists;
use crate::model::{ContainerKind, ItemKind};
use crate::transform::Transaction;

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText {
        at: usize,
        text: String,
    },
    DeleteRange {
        range: std::ops::Range<usize>,
    },
    ToggleList {
        container: ContainerKind,
        item: ItemKind,
    },
    IndentList,
    DedentList,
    SplitListItem {
        item: ItemKind,
        ignored_attrs: Vec<String>,
    },
}

/// Runs a command against `tr`. Returns `false`, with `tr` untouched, when
/// the command does not apply.
pub(crate) fn run_command(tr: &mut Transaction, cmd: &Cmd) -> bool {
    match cmd {
        Cmd::InsertText { at, text } => match tr.insert_text(*at, text) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("cannot insert text at {at}: {err}");
                false
            }
        },
        Cmd::DeleteRange { range } => match tr.delete(range.start, range.end) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("cannot delete {range:?}: {err}");
                false
            }
        },
        Cmd::ToggleList { container, item } => lists::toggle_list(tr, *container, *item),
        Cmd::IndentList => lists::indent_list(tr),
        Cmd::DedentList => lists::dedent_list(tr),
        Cmd::SplitListItem {
            item,
            ignored_attrs,
        } => lists::split_list_item(tr, *item, ignored_attrs),
    }
}
