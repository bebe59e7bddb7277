// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use listedit_engine::builders::{bullet_list, doc, item, ordered_list, p};
use listedit_engine::model::Node;

/// A flat bullet list with `items` single-paragraph items.
#[allow(dead_code)]
pub fn generate_flat_list(items: usize) -> Node {
    doc([bullet_list(
        (0..items).map(|i| item([p(&format!("Item number {i}"))])),
    )])
}

/// `sections` top-level items, each holding lists nested `depth` levels deep.
#[allow(dead_code)]
pub fn generate_nested_list(sections: usize, depth: usize) -> Node {
    doc([bullet_list(
        (0..sections).map(|section| nested_item(section, depth)),
    )])
}

#[allow(dead_code)]
fn nested_item(section: usize, remaining_depth: usize) -> Node {
    let text = p(&format!("Section {section} level {remaining_depth}"));
    if remaining_depth == 0 {
        return item([text]);
    }
    item([
        text,
        ordered_list((0..3).map(|_| nested_item(section, remaining_depth - 1))),
    ])
}

/// Paragraphs only, for wrapping into a list.
#[allow(dead_code)]
pub fn generate_paragraphs(count: usize) -> Node {
    doc((0..count).map(|i| p(&format!("Paragraph with some content {i}"))))
}

/// Position of the first character of the `index`th textblock.
#[allow(dead_code)]
pub fn textblock_start(node: &Node, index: usize) -> usize {
    fn walk(node: &Node, content_start: usize, out: &mut Vec<usize>) {
        let mut pos = content_start;
        for child in node.content() {
            if child.is_textblock() {
                out.push(pos + 1);
            } else if !child.is_leaf() {
                walk(child, pos + 1, out);
            }
            pos += child.node_size();
        }
    }
    let mut starts = Vec::new();
    walk(node, 0, &mut starts);
    starts[index.min(starts.len() - 1)]
}
