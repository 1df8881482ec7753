//! Renders the outline tree back to its indentation-based text form.

use crate::model::item::{Item, SPACES_PER_LEVEL};
use crate::model::tree::{NodeId, Tree};

/// Serialize the outline to save-file lines, starting from the children
/// of the tree's true root (the synthetic root itself is never written).
/// Indentation is the canonical `SPACES_PER_LEVEL` spaces per level;
/// subtitle lines are emitted unindented, as the parser only looks at
/// their trimmed content.
pub fn serialize_outline(tree: &Tree<Item>) -> String {
    let mut lines = Vec::new();
    for &child in tree.children(tree.root()) {
        write_node(tree, child, &mut lines);
    }
    lines.join("\n")
}

fn write_node(tree: &Tree<Item>, node: NodeId, lines: &mut Vec<String>) {
    let indent = " ".repeat(tree.level(node).max(0) as usize * SPACES_PER_LEVEL);
    let rendered = tree.data(node).to_string();
    let mut parts = rendered.lines();
    if let Some(first) = parts.next() {
        lines.push(format!("{indent}- {first}"));
    }
    lines.extend(parts.map(str::to_string));
    for &child in tree.children(node) {
        write_node(tree, child, lines);
    }
}
