//! End-to-end list editing through `Document` and `Cmd`.

use listedit_engine::builders::{
    Tagged, bullet_list, doc, item, list, ordered_list, p, tagged, task_item, task_list,
};
use listedit_engine::editing::{Cmd, Document, Selection};
use listedit_engine::lists::{ListContext, calculate_item_range};
use listedit_engine::model::{ContainerKind, ItemKind, Node, NodeKind};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn open(t: &Tagged) -> Document {
    init_logging();
    Document::new(t.doc.clone())
        .unwrap()
        .with_selection(t.selection())
}

fn toggle(container: ContainerKind) -> Cmd {
    Cmd::ToggleList {
        container,
        item: container.item_kind(),
    }
}

fn insert_at_cursor(document: &mut Document, text: &str) {
    let at = document.selection().head();
    document
        .apply(Cmd::InsertText {
            at,
            text: text.to_string(),
        })
        .unwrap();
}

fn entry(kind: ContainerKind, text: &str) -> Node {
    match kind.item_kind() {
        ItemKind::Task => task_item(false, [p(text)]),
        ItemKind::Plain => item([p(text)]),
    }
}

/// True when some node holds two adjacent lists of the same kind.
fn has_adjacent_same_kind_lists(node: &Node) -> bool {
    let children: Vec<&Node> = node.content().iter().collect();
    children
        .windows(2)
        .any(|pair| pair[0].is_list() && pair[0].kind() == pair[1].kind())
        || children.iter().any(|child| has_adjacent_same_kind_lists(child))
}

#[rstest]
#[case::single_paragraph(doc([p("a<cursor>b")]))]
#[case::second_paragraph(doc([p("a"), p("<cursor>b")]))]
#[case::across_paragraphs(doc([p("<anchor>a"), p("b<head>")]))]
#[case::paragraph_after_list(doc([bullet_list([item([p("a")])]), p("b<cursor>")]))]
fn test_selection_outside_lists_changes_nothing(#[case] node: Node) {
    let t = tagged(node);
    let mut document = open(&t);

    assert!(calculate_item_range(document.doc(), &document.selection()).is_none());
    for cmd in [
        Cmd::IndentList,
        Cmd::DedentList,
        Cmd::SplitListItem {
            item: ItemKind::Plain,
            ignored_attrs: Vec::new(),
        },
    ] {
        assert!(!document.can_apply(&cmd));
        assert_eq!(document.apply(cmd), None);
    }
    assert_eq!(document.doc(), &t.doc);
    assert_eq!(document.version(), 0);
}

#[rstest]
#[case::bullet(ContainerKind::Bullet)]
#[case::ordered(ContainerKind::Ordered)]
#[case::task(ContainerKind::Task)]
fn test_toggle_twice_restores_paragraphs(#[case] container: ContainerKind) {
    let t = tagged(doc([p("<anchor>one"), p("two<head>"), p("three")]));
    let mut document = open(&t);

    document.apply(toggle(container)).unwrap();
    assert!(document.doc().child(0).is_list());
    assert_eq!(document.doc().child(0).child_count(), 2);

    document.apply(toggle(container)).unwrap();
    assert_eq!(document.doc(), &t.doc);
    assert_eq!(document.version(), 2);
}

#[test]
fn test_task_list_round_trip_through_other_kinds() {
    let t = tagged(doc([p("make <cursor>list")]));
    let mut document = open(&t);

    document.apply(toggle(ContainerKind::Task)).unwrap();
    document.apply(toggle(ContainerKind::Bullet)).unwrap();
    document.apply(toggle(ContainerKind::Task)).unwrap();
    insta::assert_snapshot!(
        document.doc(),
        @r#"doc(task_list(task_item(p("make list"))))"#
    );

    document.apply(toggle(ContainerKind::Task)).unwrap();
    assert_eq!(document.doc(), &t.doc);
}

#[rstest]
#[case::bullet(ContainerKind::Bullet)]
#[case::ordered(ContainerKind::Ordered)]
#[case::task(ContainerKind::Task)]
fn test_indent_then_dedent_restores_siblings(#[case] kind: ContainerKind) {
    let original = doc([list(kind, [entry(kind, "A"), entry(kind, "B")])]);
    let mut document = open(&tagged(original.clone()));
    // the start of "B"
    document.set_selection(Selection::cursor(8));

    document.apply(Cmd::IndentList).unwrap();
    let nested = document.doc().child(0).child(0);
    assert_eq!(nested.child_count(), 2);
    assert!(nested.child(1).is_list());
    assert_eq!(nested.child(1).text_content(), "B");

    document.apply(Cmd::DedentList).unwrap();
    assert_eq!(document.doc(), &original);
    assert_eq!(document.selection(), Selection::cursor(8));
}

#[test]
fn test_untoggle_bullet_then_type() {
    let t = tagged(doc([bullet_list([item([p("make <cursor>list")])])]));
    let mut document = open(&t);

    document.apply(toggle(ContainerKind::Bullet)).unwrap();
    insert_at_cursor(&mut document, "xx");

    assert_eq!(document.doc(), &doc([p("make xxlist")]));
}

#[test]
fn test_toggle_task_then_type() {
    let t = tagged(doc([p("make <cursor>list")]));
    let mut document = open(&t);

    document.apply(toggle(ContainerKind::Task)).unwrap();
    insert_at_cursor(&mut document, "xx");

    assert_eq!(
        document.doc(),
        &doc([task_list([task_item(false, [p("make xxlist")])])])
    );
}

fn three_items_with_nested_ordered(a: &str, c: &str, d: &str, e: &str) -> Node {
    doc([bullet_list([
        item([p(a)]),
        item([p("b"), ordered_list([item([p(c)]), item([p(d)])])]),
        item([p(e)]),
    ])])
}

#[rstest]
#[case::first_item_to_nested(["<anchor>a", "c<head>", "d", "e"], ContainerKind::Bullet, 1, (0, 2))]
#[case::nested_to_last(["a", "<anchor>c", "d", "e<head>"], ContainerKind::Bullet, 1, (1, 3))]
#[case::inside_nested_list(["a", "<anchor>c", "d<head>", "e"], ContainerKind::Ordered, 3, (0, 2))]
fn test_range_across_nesting_levels(
    #[case] texts: [&str; 4],
    #[case] container: ContainerKind,
    #[case] depth: usize,
    #[case] indices: (usize, usize),
) {
    let [a, c, d, e] = texts;
    let t = tagged(three_items_with_nested_ordered(a, c, d, e));

    let range = calculate_item_range(&t.doc, &t.selection()).unwrap();

    assert_eq!(range.depth, depth);
    assert_eq!(range.parent().kind(), NodeKind::List(container));
    assert_eq!((range.start_index(), range.end_index()), indices);
}

fn two_items() -> Node {
    doc([bullet_list([item([p("a")]), item([p("b")])])])
}

fn nested_item() -> Node {
    doc([bullet_list([item([p("a"), bullet_list([item([p("b")])])])])])
}

#[rstest]
#[case::second_item(two_items(), 6, Some((1, (1, 2), (6, 11))))]
#[case::paragraph_of_second_item(two_items(), 7, Some((1, (1, 2), (6, 11))))]
#[case::first_item(two_items(), 1, Some((1, (0, 1), (1, 6))))]
#[case::nested_item(nested_item(), 6, Some((3, (0, 1), (6, 11))))]
#[case::whole_list(two_items(), 0, None)]
fn test_node_selection_item_range(
    #[case] node: Node,
    #[case] pos: usize,
    #[case] expected: Option<(usize, (usize, usize), (usize, usize))>,
) {
    let selection = Selection::node(&node, pos).unwrap();

    let range = calculate_item_range(&node, &selection).map(|range| {
        (
            range.depth,
            (range.start_index(), range.end_index()),
            (range.start(), range.end()),
        )
    });

    assert_eq!(range, expected);
}

#[rstest]
#[case::indent_second_item(
    two_items(),
    6,
    Cmd::IndentList,
    Some(doc([bullet_list([item([p("a"), bullet_list([item([p("b")])])])])]))
)]
#[case::indent_first_item(two_items(), 1, Cmd::IndentList, None)]
#[case::dedent_nested_item(
    nested_item(),
    6,
    Cmd::DedentList,
    Some(two_items())
)]
#[case::untoggle_second_item(
    two_items(),
    6,
    toggle(ContainerKind::Bullet),
    Some(doc([bullet_list([item([p("a")])]), p("b")]))
)]
#[case::untoggle_paragraph_of_second_item(
    two_items(),
    7,
    toggle(ContainerKind::Bullet),
    Some(doc([bullet_list([item([p("a")])]), p("b")]))
)]
#[case::retype_nested_item(
    nested_item(),
    6,
    toggle(ContainerKind::Ordered),
    Some(doc([bullet_list([item([p("a"), ordered_list([item([p("b")])])])])]))
)]
#[case::whole_list_is_not_an_item(two_items(), 0, Cmd::IndentList, None)]
fn test_command_on_selected_node(
    #[case] node: Node,
    #[case] pos: usize,
    #[case] cmd: Cmd,
    #[case] expected: Option<Node>,
) {
    init_logging();
    let selection = Selection::node(&node, pos).unwrap();
    let mut document = Document::new(node.clone())
        .unwrap()
        .with_selection(selection);

    let patch = document.apply(cmd);

    assert_eq!(patch.is_some(), expected.is_some());
    assert_eq!(document.doc(), expected.as_ref().unwrap_or(&node));
}

/// Every list command on every kind of selected node either refuses and
/// leaves the document alone, or produces a valid tree with the same text.
#[rstest]
fn test_commands_on_node_selections_keep_document_valid(
    #[values(
        (two_items(), 0),
        (two_items(), 1),
        (two_items(), 6),
        (two_items(), 7),
        (nested_item(), 0),
        (nested_item(), 5),
        (nested_item(), 6),
        (nested_item(), 7),
        (doc([p("x"), p("y")]), 0)
    )]
    case: (Node, usize),
    #[values(
        toggle(ContainerKind::Bullet),
        toggle(ContainerKind::Ordered),
        toggle(ContainerKind::Task),
        Cmd::IndentList,
        Cmd::DedentList,
        Cmd::SplitListItem { item: ItemKind::Plain, ignored_attrs: Vec::new() }
    )]
    cmd: Cmd,
) {
    init_logging();
    let (node, pos) = case;
    let selection = Selection::node(&node, pos).unwrap();
    let mut document = Document::new(node.clone())
        .unwrap()
        .with_selection(selection);

    match document.apply(cmd) {
        Some(_) => {
            assert!(document.doc().check().is_ok());
            assert_eq!(document.doc().text_content(), node.text_content());
        }
        None => assert_eq!(document.doc(), &node),
    }
}

#[test]
fn test_enter_on_empty_last_item_leaves_list() {
    let t = tagged(doc([bullet_list([
        item([p("123")]),
        item([p("<cursor>")]),
    ])]));
    let mut document = open(&t);

    let patch = document.handle_key(&ListContext::default(), "Enter").unwrap();

    insta::assert_snapshot!(document.doc(), @r#"doc(bullet_list(item(p("123"))), p())"#);
    assert_eq!(patch.new_selection, Selection::cursor(10));
    assert_eq!(document.doc().child(1).content_size(), 0);
}

#[test]
fn test_enter_in_task_item_resets_checked() {
    let t = tagged(doc([task_list([task_item(true, [p("done<cursor>")])])]));
    let mut document = open(&t);

    document.handle_key(&ListContext::default(), "Enter").unwrap();

    assert_eq!(
        document.doc(),
        &doc([task_list([
            task_item(true, [p("done")]),
            task_item(false, [p("")]),
        ])])
    );
}

#[rstest]
#[case::sublist_meets_trailing_siblings(doc([bullet_list([item([
    p("a"),
    bullet_list([
        item([p("<cursor>b"), bullet_list([item([p("b1")])])]),
        item([p("c")]),
    ]),
])])]))]
#[case::single_nested_item(doc([bullet_list([item([
    p("a"),
    bullet_list([item([p("<cursor>b")])]),
])])]))]
#[case::different_sublist_kind(doc([bullet_list([item([
    p("a"),
    bullet_list([
        item([p("<cursor>b"), ordered_list([item([p("b1")])])]),
        item([p("c")]),
    ]),
])])]))]
fn test_dedent_never_leaves_adjacent_same_kind_lists(#[case] node: Node) {
    let t = tagged(node);
    let mut document = open(&t);

    document.apply(Cmd::DedentList).unwrap();

    assert!(document.doc().check().is_ok());
    assert!(!has_adjacent_same_kind_lists(document.doc()));
    assert_eq!(document.doc().text_content(), t.doc.text_content());
}

#[rstest]
#[case::top_level(doc([bullet_list([item([p("a<cursor>")]), item([p("b")])])]))]
#[case::nested(doc([bullet_list([item([
    p("a"),
    ordered_list([item([p("<anchor>b")]), item([p("c<head>")])]),
])])]))]
#[case::task(doc([p("x"), task_list([task_item(true, [p("<cursor>t")])])]))]
fn test_slice_and_reinsert_is_identity(#[case] node: Node) {
    let t = tagged(node);
    let document = open(&t);
    let range = document.item_range().unwrap();
    let (start, end) = (range.start(), range.end());

    let slice = t.doc.slice(start, end).unwrap();
    assert_eq!(t.doc.replace(start, end, &slice).unwrap(), t.doc);

    let mut tr = document.transaction();
    tr.replace(start, end, slice).unwrap();
    assert_eq!(tr.doc(), &t.doc);
}

#[test]
fn test_patch_reports_edit_log() {
    let t = tagged(doc([bullet_list([
        item([p("a")]),
        item([p("<cursor>b")]),
    ])]));
    let mut document = open(&t);

    let patch = document.apply(Cmd::IndentList).unwrap();

    assert_eq!(patch.version, 1);
    assert!(!patch.changed.is_empty());
    assert_eq!(
        listedit_engine::transform::replay(t.doc.clone(), &patch.ops).unwrap(),
        *document.doc()
    );
}
