//! Builds the outline tree from its indentation-based text form.

use crate::model::item::Item;
use crate::model::tree::Tree;

/// Parse save-file text into an outline tree.
///
/// Pairs [`Tree::from_text`] with [`Item::parse_line`]: each line either
/// produces a node at the level encoded by its indentation, merges into
/// the previous node as a quoted subtitle, or is silently skipped when
/// malformed (bad indent multiple, missing `- ` marker). Empty input
/// yields a tree with a childless root.
pub fn parse_outline(text: &str) -> Tree<Item> {
    Tree::from_text(Item::new("root"), text, Item::parse_line)
}
