//! The stateful controller between the outline tree and the UI.
//!
//! All reads go through row/title projections; all writes go through the
//! named operations below, each a finite synchronous pass over the tree.
//! Undo snapshots are whole-tree deep copies taken before destructive
//! mutations, so later edits can never alias a pushed snapshot.

use crate::io::config_io::ConfigStore;
use crate::model::item::Item;
use crate::model::tree::{ChildPosition, NodeId, Tree};

/// One visible row, projected and windowed for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub text: String,
    pub indent: usize,
    pub is_selected: bool,
    pub has_children: bool,
    pub is_completed: bool,
    pub is_collapsed: bool,
    pub is_search_result: bool,
}

/// Where a pending insert will attach relative to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPos {
    Before,
    After,
}

/// The mutually exclusive interaction modes. The view model does not
/// police transitions between non-idle modes; the UI driver only starts
/// one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Inserting(InsertPos),
    Editing {
        /// Copy of the selected item when the edit began. The live node
        /// is only mutated on commit, so cancel has nothing to revert;
        /// the copy marks the session and seeds the input field.
        snapshot: Item,
    },
    Searching {
        query: String,
    },
}

/// Selection and collapse state captured when a search session starts,
/// for exact restoration on cancel.
#[derive(Debug, Default)]
struct StateBeforeSearch {
    selected: Option<NodeId>,
    /// Ancestors whose collapsed flag the search forced off.
    uncollapsed: Vec<NodeId>,
}

pub struct ViewModel<C: ConfigStore> {
    tree: Tree<Item>,
    /// The subtree currently viewed ("zoom"). A reference into the one
    /// tree, never a copy.
    view_root: NodeId,
    selected: Option<NodeId>,
    mode: Mode,
    /// Detached node awaiting paste.
    cut_item: Option<NodeId>,
    search_results: Vec<NodeId>,
    state_before_search: Option<StateBeforeSearch>,
    undo_stack: Vec<Tree<Item>>,
    window_height: usize,
    first_row: usize,
    last_row: usize,
    config: C,
}

impl<C: ConfigStore> ViewModel<C> {
    pub fn new(tree: Tree<Item>, config: C) -> Self {
        let view_root = tree.root();
        let mut vm = ViewModel {
            tree,
            view_root,
            selected: None,
            mode: Mode::Idle,
            cut_item: None,
            search_results: Vec::new(),
            state_before_search: None,
            undo_stack: Vec::new(),
            window_height: 0,
            first_row: 0,
            last_row: 0,
            config,
        };
        vm.recompute_visibility();
        vm.restore_saved_root();
        if vm.selected.is_none() {
            vm.selected = vm.tree.first_child(vm.view_root, true);
        }
        vm
    }

    pub fn tree(&self) -> &Tree<Item> {
        &self.tree
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_inserting(&self) -> bool {
        matches!(self.mode, Mode::Inserting(_))
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing { .. })
    }

    pub fn inserting_pos(&self) -> Option<InsertPos> {
        match self.mode {
            Mode::Inserting(pos) => Some(pos),
            _ => None,
        }
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.mode, Mode::Searching { .. })
    }

    pub fn search_query(&self) -> Option<&str> {
        match &self.mode {
            Mode::Searching { query } => Some(query),
            _ => None,
        }
    }

    /// Copy of the item captured by [`ViewModel::start_edit`].
    pub fn editing_snapshot(&self) -> Option<&Item> {
        match &self.mode {
            Mode::Editing { snapshot } => Some(snapshot),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------------

    /// Ordered row descriptors for the current scroll window. Adjusts
    /// the window first so the selection is always inside it.
    pub fn list_items(&mut self) -> Vec<ListRow> {
        let root_level = self.tree.level(self.view_root);
        let rows: Vec<ListRow> = self
            .tree
            .visible_descendants(self.view_root)
            .map(|id| {
                let item = self.tree.data(id);
                ListRow {
                    text: item.text.clone(),
                    indent: (self.tree.level(id) - root_level - 1).max(0) as usize,
                    is_selected: self.selected == Some(id),
                    has_children: self.tree.has_children(id),
                    is_completed: item.complete,
                    is_collapsed: item.collapsed,
                    is_search_result: self.search_results.contains(&id),
                }
            })
            .collect();
        self.update_scrolling(rows.len());
        let end = self.last_row.min(rows.len());
        let start = self.first_row.min(end);
        rows[start..end].to_vec()
    }

    /// Title of the current zoom node plus a breadcrumb string of its
    /// ancestors (below the true root), oldest first.
    pub fn list_title(&self) -> (String, String) {
        let top = self.tree.root_of(self.view_root);
        if self.view_root == top {
            return ("Top level".to_string(), String::new());
        }
        let title = self.tree.data(self.view_root).text.clone();
        let mut breadcrumbs = String::new();
        let mut node = self.view_root;
        while let Some(parent) = self.tree.parent(node) {
            if parent == top {
                break;
            }
            breadcrumbs = format!("{} > {}", self.tree.data(parent).text, breadcrumbs);
            node = parent;
        }
        (title, breadcrumbs)
    }

    /// Row index of the selection among visible rows (0 when nothing is
    /// selected or the selection is filtered out).
    pub fn index_of_selected_node(&self) -> usize {
        let Some(sel) = self.selected else { return 0 };
        self.tree
            .visible_descendants(self.view_root)
            .position(|n| n == sel)
            .unwrap_or(0)
    }

    /// Indent, in levels relative to the view root, at which a pending
    /// inserted item will appear.
    pub fn insertion_indent(&self) -> usize {
        let Some(sel) = self.selected else { return 0 };
        let indent = self.tree.level(sel) - self.tree.level(self.view_root);
        if self.tree.has_children(sel) && !self.tree.data(sel).collapsed {
            indent.max(0) as usize
        } else {
            (indent - 1).max(0) as usize
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select_next(&mut self) {
        match self.selected {
            None => self.select_first(),
            Some(node) => {
                let next = self.tree.node_after(self.view_root, node, true);
                if next != self.view_root {
                    self.selected = Some(next);
                }
            }
        }
    }

    pub fn select_previous(&mut self) {
        match self.selected {
            None => self.select_first(),
            Some(node) => {
                let previous = self.tree.node_before(self.view_root, node, true);
                if previous != self.view_root {
                    self.selected = Some(previous);
                }
            }
        }
    }

    pub fn select_first(&mut self) {
        self.selected = self.tree.first_child(self.view_root, true);
    }

    pub fn select_top(&mut self) {
        if let Some(&id) = self.visible_nodes().get(self.first_row) {
            self.selected = Some(id);
        }
    }

    pub fn select_bottom(&mut self) {
        if self.last_row == 0 {
            return;
        }
        if let Some(&id) = self.visible_nodes().get(self.last_row - 1) {
            self.selected = Some(id);
        }
    }

    pub fn select_middle(&mut self) {
        let middle = (self.first_row + self.last_row) / 2;
        if let Some(&id) = self.visible_nodes().get(middle) {
            self.selected = Some(id);
        }
    }

    // -----------------------------------------------------------------------
    // Zoom
    // -----------------------------------------------------------------------

    /// Re-root the view at `node`, revealing its children even if it was
    /// collapsed, and persist the zoom position. No-op on `None`.
    pub fn set_as_root(&mut self, node: Option<NodeId>) {
        let Some(node) = node else { return };
        self.view_root = node;
        self.tree.data_mut(node).collapsed = false;
        self.recompute_visibility();
        self.selected = self.tree.first_child(node, true);
        let top = self.tree.root_of(node);
        self.config
            .set_root_node_index(self.tree.index_for_node(top, node));
    }

    /// Zoom out one level, selecting the previous root and scrolling it
    /// to the top of the window. No-op at the true root.
    pub fn move_root_upwards(&mut self) {
        let Some(parent) = self.tree.parent(self.view_root) else {
            return;
        };
        self.selected = Some(self.view_root);
        self.view_root = parent;
        self.first_row = self.index_of_selected_node();
        self.last_row = self.first_row + self.window_height;
        let top = self.tree.root_of(self.view_root);
        self.config
            .set_root_node_index(self.tree.index_for_node(top, self.view_root));
    }

    // -----------------------------------------------------------------------
    // Collapse and completion
    // -----------------------------------------------------------------------

    pub fn toggle_collapse_node(&mut self) {
        if let Some(sel) = self.selected {
            let item = self.tree.data_mut(sel);
            item.collapsed = !item.collapsed;
        }
        self.last_row = self.first_row + self.window_height;
        self.recompute_visibility();
    }

    /// Completing a node cascades to its whole subtree; un-completing
    /// affects only the node itself, leaving descendants complete.
    pub fn toggle_complete(&mut self) {
        let Some(node) = self.selected else { return };
        // Move the selection off the row before it can be filtered out.
        if self.config.hide_complete_items() {
            self.select_previous();
        }
        if !self.tree.data(node).complete {
            self.tree.for_each_subtree(node, |item| item.complete = true);
        } else {
            self.tree.data_mut(node).complete = false;
        }
        self.recompute_visibility();
    }

    pub fn toggle_hide_complete_items(&mut self) {
        let hide = !self.config.hide_complete_items();
        self.config.set_hide_complete_items(hide);
        self.last_row = self.first_row + self.window_height;
        self.recompute_visibility();
        // A selected completed row is about to vanish: make it passable
        // for one traversal so the selection can move off it.
        if hide
            && let Some(sel) = self.selected
            && self.tree.data(sel).complete
        {
            self.tree.data_mut(sel).complete = false;
            self.recompute_visibility();
            self.select_next();
            self.tree.data_mut(sel).complete = true;
            self.recompute_visibility();
        }
    }

    // -----------------------------------------------------------------------
    // Insert and edit
    // -----------------------------------------------------------------------

    pub fn start_insert_after(&mut self) {
        self.mode = Mode::Inserting(InsertPos::After);
    }

    pub fn start_insert_before(&mut self) {
        self.mode = Mode::Inserting(InsertPos::Before);
    }

    pub fn cancel_insert(&mut self) {
        if self.is_inserting() {
            self.mode = Mode::Idle;
        }
    }

    /// Commit a pending insert. An expanded parent receives the new node
    /// as its first child; otherwise the node lands next to the
    /// selection (before/after per the insert mode), or at the end of
    /// the view root's children when nothing is selected.
    pub fn insert_item(&mut self, text: &str) {
        self.push_undo_state();
        let new = self.tree.alloc(Item::new(text));
        match self.selected {
            Some(sel) => {
                let as_child = self.tree.has_children(sel) && !self.tree.data(sel).collapsed;
                if as_child {
                    self.tree.attach_child(sel, new, ChildPosition::First);
                } else if matches!(self.mode, Mode::Inserting(InsertPos::Before)) {
                    self.tree.attach_sibling_before(sel, new);
                } else {
                    self.tree.attach_sibling_after(sel, new);
                }
            }
            None => self
                .tree
                .attach_child(self.view_root, new, ChildPosition::Last),
        }
        self.mode = Mode::Idle;
        self.selected = Some(new);
        self.last_row += 1;
        self.recompute_visibility();
    }

    pub fn start_edit(&mut self) {
        if let Some(sel) = self.selected {
            self.mode = Mode::Editing {
                snapshot: self.tree.data(sel).clone(),
            };
        }
    }

    pub fn cancel_edit(&mut self) {
        if self.is_editing() {
            self.mode = Mode::Idle;
        }
    }

    /// Commit an edit session. Requires an active session and a present
    /// selection; violating either is a caller bug.
    pub fn finish_edit(&mut self, new_text: &str) {
        assert!(self.is_editing(), "finish_edit without an active edit session");
        let sel = self.selected.expect("finish_edit with no selection");
        self.tree.data_mut(sel).text = new_text.to_string();
        self.mode = Mode::Idle;
    }

    // -----------------------------------------------------------------------
    // Cut, paste, delete, undo
    // -----------------------------------------------------------------------

    /// Move the selected subtree into the cut buffer, discarding any
    /// previous buffer contents, and land the selection on a neighbor.
    pub fn delete_item(&mut self) {
        let Some(node) = self.selected else { return };
        self.push_undo_state();
        self.cut_item = Some(node);
        self.select_previous();
        self.tree.remove_node(self.view_root, node);
        self.recompute_visibility();
        self.select_next();
        if !self.tree.has_children(self.view_root) {
            self.selected = None;
        }
    }

    /// Reattach the cut buffer next to the selection (or under the view
    /// root when nothing is selected) and repair its levels. The
    /// selection stays where it is. No-op when the buffer is empty, or
    /// when the zoomed root sits inside the buffered subtree.
    pub fn paste_item(&mut self, before: bool) {
        let Some(cut) = self.cut_item else { return };
        // An undo restore can reattach the buffered node and then land
        // the zoom root or the selection inside its subtree. The subtree
        // cannot host the view it is pasted into, so such a paste is
        // dropped; a selection inside it falls back to the view root.
        let mut node = self.view_root;
        loop {
            if node == cut {
                return;
            }
            match self.tree.parent(node) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        self.tree.detach(cut);
        let target = self
            .selected
            .filter(|&sel| self.tree.root_of(sel) != cut);
        match target {
            Some(sel) => {
                if before {
                    self.tree.attach_sibling_before(sel, cut);
                } else {
                    self.tree.attach_sibling_after(sel, cut);
                }
            }
            None => self
                .tree
                .attach_child(self.view_root, cut, ChildPosition::Last),
        }
        self.tree.update_level_to_parent(cut);
        self.cut_item = None;
        self.recompute_visibility();
    }

    /// Restore the most recent snapshot, re-resolving the zoom root and
    /// selection by pre-order index (best-effort: unresolvable indices
    /// leave the reference unset). No-op on an empty stack.
    pub fn undo(&mut self) {
        let Some(snapshot) = self.undo_stack.pop() else { return };
        let top = self.tree.root_of(self.view_root);
        let root_index = self.tree.index_for_node(top, self.view_root);
        let selected_index = self
            .selected
            .and_then(|sel| self.tree.index_for_node(top, sel));

        self.tree = snapshot;
        self.view_root = self.tree.root();
        self.selected = None;
        // Handles minted after the snapshot do not exist in it.
        self.cut_item = self.cut_item.filter(|&id| self.tree.contains(id));
        self.recompute_visibility();

        if let Some(index) = root_index {
            let node = self.tree.node_at_index(self.tree.root(), index);
            self.set_as_root(node);
        }
        if let Some(index) = selected_index {
            self.selected = self.tree.node_at_index(self.tree.root(), index);
        }
        self.recompute_visibility();
    }

    fn push_undo_state(&mut self) {
        self.undo_stack.push(self.tree.clone());
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Start or refine a search. Captures the pre-search selection once
    /// per session; each call re-runs the match pass and force-
    /// uncollapses ancestors of matches, selecting the first match.
    pub fn update_search(&mut self, query: &str) {
        if self.state_before_search.is_none() {
            self.state_before_search = Some(StateBeforeSearch {
                selected: self.selected,
                uncollapsed: Vec::new(),
            });
        }
        self.mode = Mode::Searching {
            query: query.to_string(),
        };
        self.update_search_results();
        if let Some(&first) = self.search_results.first() {
            self.selected = Some(first);
        }
        self.recompute_visibility();
    }

    /// Drop the search, restoring the pre-search selection and
    /// re-collapsing every node the session force-uncollapsed.
    pub fn cancel_search(&mut self) {
        self.mode = Mode::Idle;
        self.search_results.clear();
        if let Some(state) = self.state_before_search.take() {
            self.selected = state.selected;
            for node in state.uncollapsed {
                self.tree.data_mut(node).collapsed = true;
            }
        }
        self.recompute_visibility();
    }

    /// Leave the search, keeping the current selection and any forced
    /// uncollapses.
    pub fn finish_search(&mut self) {
        self.mode = Mode::Idle;
        self.search_results.clear();
        self.state_before_search = None;
    }

    pub fn select_next_search_result(&mut self) {
        let Some(sel) = self.selected else { return };
        if let Some(i) = self.search_results.iter().position(|&n| n == sel) {
            self.selected = Some(self.search_results[(i + 1) % self.search_results.len()]);
        }
    }

    pub fn select_previous_search_result(&mut self) {
        let Some(sel) = self.selected else { return };
        if let Some(i) = self.search_results.iter().position(|&n| n == sel) {
            let len = self.search_results.len();
            self.selected = Some(self.search_results[(i + len - 1) % len]);
        }
    }

    fn update_search_results(&mut self) {
        self.search_results.clear();
        let query = match &self.mode {
            Mode::Searching { query } => query.clone(),
            _ => return,
        };
        // Single characters match too much to be useful.
        if query.chars().count() < 2 {
            return;
        }
        let needle = query.to_lowercase();
        let matches: Vec<NodeId> = self
            .tree
            .descendants(self.view_root)
            .filter(|&id| self.tree.data(id).text.to_lowercase().contains(&needle))
            .collect();
        for &result in &matches {
            let mut node = result;
            while let Some(parent) = self.tree.parent(node) {
                if self.tree.data(parent).collapsed {
                    self.tree.data_mut(parent).collapsed = false;
                    if let Some(state) = self.state_before_search.as_mut() {
                        state.uncollapsed.push(parent);
                    }
                }
                node = parent;
            }
        }
        self.search_results = matches;
    }

    // -----------------------------------------------------------------------
    // Window and visibility
    // -----------------------------------------------------------------------

    pub fn set_window_size(&mut self, _width: usize, height: usize) {
        self.window_height = height;
        self.first_row = 0;
        self.last_row = height;
    }

    pub fn window_height(&self) -> usize {
        self.window_height
    }

    fn update_scrolling(&mut self, num_rows: usize) {
        if num_rows <= self.window_height {
            self.first_row = 0;
            self.last_row = num_rows;
        }
        let selection_index = self.index_of_selected_node();
        if selection_index < self.first_row {
            self.first_row = selection_index;
            self.last_row = (self.first_row + self.window_height).min(num_rows);
        } else if selection_index >= self.last_row {
            self.last_row = selection_index + 1;
            self.first_row = self.last_row.saturating_sub(self.window_height);
        }
    }

    fn visible_nodes(&self) -> Vec<NodeId> {
        self.tree.visible_descendants(self.view_root).collect()
    }

    fn restore_saved_root(&mut self) {
        if let Some(index) = self.config.root_node_index() {
            let top = self.tree.root_of(self.view_root);
            if let Some(node) = self.tree.node_at_index(top, index) {
                self.set_as_root(Some(node));
            }
        }
    }

    /// A node is visible iff it passes the hide-completed filter and its
    /// parent is both visible and not collapsed. Recomputed in full,
    /// top-down from the true root, after any change to those inputs.
    fn recompute_visibility(&mut self) {
        let hide_complete = self.config.hide_complete_items();
        let top = self.tree.root_of(self.view_root);
        let mut stack = vec![(top, true, false)];
        while let Some((id, parent_visible, parent_collapsed)) = stack.pop() {
            let (complete, collapsed) = {
                let item = self.tree.data(id);
                (item.complete, item.collapsed)
            };
            let visible = (!hide_complete || !complete) && parent_visible && !parent_collapsed;
            self.tree.set_visible(id, visible);
            for &child in self.tree.children(id) {
                stack.push((child, visible, collapsed));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config_io::MemoryConfig;
    use crate::parse::{parse_outline, serialize_outline};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn showing_completed() -> MemoryConfig {
        MemoryConfig {
            hide_complete_items: false,
            ..MemoryConfig::default()
        }
    }

    fn vm(text: &str) -> ViewModel<MemoryConfig> {
        ViewModel::new(parse_outline(text), showing_completed())
    }

    fn vm_hiding(text: &str) -> ViewModel<MemoryConfig> {
        ViewModel::new(parse_outline(text), MemoryConfig::default())
    }

    fn tall(mut vm: ViewModel<MemoryConfig>) -> ViewModel<MemoryConfig> {
        vm.set_window_size(80, 100);
        vm
    }

    fn node_by_text(vm: &ViewModel<MemoryConfig>, text: &str) -> NodeId {
        let root = vm.tree.root_of(vm.view_root);
        vm.tree
            .descendants(root)
            .find(|&id| vm.tree.data(id).text == text)
            .unwrap_or_else(|| panic!("no node with text {text:?}"))
    }

    fn select(vm: &mut ViewModel<MemoryConfig>, text: &str) {
        vm.selected = Some(node_by_text(vm, text));
    }

    fn selected_text(vm: &ViewModel<MemoryConfig>) -> String {
        vm.tree.data(vm.selected.expect("nothing selected")).text.clone()
    }

    fn row_texts(vm: &mut ViewModel<MemoryConfig>) -> Vec<String> {
        vm.list_items().into_iter().map(|r| r.text).collect()
    }

    const BASIC: &str = "- A\n  - B\n  - C\n- D\n- E\n  - F";

    // -----------------------------------------------------------------------
    // Projection
    // -----------------------------------------------------------------------

    #[test]
    fn scenario_rows_and_indentation() {
        let mut vm = tall(vm("- A\n  - B\n  - C\n- D"));
        let rows = vm.list_items();
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C", "D"]);
        let indents: Vec<usize> = rows.iter().map(|r| r.indent).collect();
        assert_eq!(indents, vec![0, 1, 1, 0]);
    }

    #[test]
    fn initial_selection_is_first_visible_child() {
        let vm = vm(BASIC);
        assert_eq!(selected_text(&vm), "A");
    }

    #[test]
    fn empty_outline_has_no_selection_and_no_rows() {
        let mut vm = tall(vm(""));
        assert!(vm.selected.is_none());
        assert!(vm.list_items().is_empty());
    }

    #[test]
    fn title_at_true_root_has_no_breadcrumbs() {
        let vm = vm(BASIC);
        assert_eq!(vm.list_title(), ("Top level".to_string(), String::new()));
    }

    #[test]
    fn title_when_zoomed_shows_breadcrumb_trail() {
        let mut vm = vm("- A\n  - B\n    - C\n      - D");
        let c = node_by_text(&vm, "C");
        vm.set_as_root(Some(c));
        let (title, breadcrumbs) = vm.list_title();
        assert_eq!(title, "C");
        assert_eq!(breadcrumbs, "A > B > ");
    }

    // -----------------------------------------------------------------------
    // Selection movement
    // -----------------------------------------------------------------------

    #[test]
    fn select_next_walks_preorder_and_wraps() {
        let mut vm = vm(BASIC);
        let mut seen = vec![selected_text(&vm)];
        for _ in 0..6 {
            vm.select_next();
            seen.push(selected_text(&vm));
        }
        assert_eq!(seen, vec!["A", "B", "C", "D", "E", "F", "A"]);
    }

    #[test]
    fn select_previous_wraps_to_end() {
        let mut vm = vm(BASIC);
        vm.select_previous();
        assert_eq!(selected_text(&vm), "F");
    }

    #[test]
    fn select_next_with_no_selection_picks_first_visible() {
        let mut vm = vm(BASIC);
        vm.selected = None;
        vm.select_next();
        assert_eq!(selected_text(&vm), "A");
    }

    #[test]
    fn select_first_skips_a_hidden_first_item() {
        let mut vm = vm_hiding("- [COMPLETE] done\n- open");
        vm.selected = None;
        vm.select_first();
        assert_eq!(selected_text(&vm), "open");
        assert!(!vm.tree.is_visible(node_by_text(&vm, "done")));
    }

    #[test]
    fn select_top_bottom_middle_index_into_window() {
        let mut vm = vm(BASIC);
        vm.set_window_size(80, 4);
        vm.list_items();
        vm.select_bottom();
        assert_eq!(selected_text(&vm), "D");
        vm.select_top();
        assert_eq!(selected_text(&vm), "A");
        vm.select_middle();
        assert_eq!(selected_text(&vm), "C");
    }

    // -----------------------------------------------------------------------
    // Collapse and hide-completed filtering
    // -----------------------------------------------------------------------

    #[test]
    fn collapse_hides_children_and_uncollapse_restores_them() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "A");
        vm.toggle_collapse_node();
        assert_eq!(row_texts(&mut vm), vec!["A", "D", "E", "F"]);
        vm.toggle_collapse_node();
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn completing_a_parent_hides_its_whole_subtree_when_filtering() {
        let mut vm = tall(vm_hiding(BASIC));
        select(&mut vm, "A");
        vm.toggle_complete();
        // B and C follow A out of the list even though they were
        // incomplete before the cascade marked them
        assert_eq!(row_texts(&mut vm), vec!["D", "E", "F"]);
    }

    #[test]
    fn toggle_complete_cascades_down_but_uncomplete_does_not() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "A");
        vm.toggle_complete();
        assert!(vm.tree.data(node_by_text(&vm, "B")).complete);
        assert!(vm.tree.data(node_by_text(&vm, "C")).complete);

        select(&mut vm, "A");
        vm.toggle_complete();
        assert!(!vm.tree.data(node_by_text(&vm, "A")).complete);
        assert!(vm.tree.data(node_by_text(&vm, "B")).complete);
        assert!(vm.tree.data(node_by_text(&vm, "C")).complete);
    }

    #[test]
    fn toggle_complete_moves_selection_before_the_row_vanishes() {
        let mut vm = tall(vm_hiding(BASIC));
        select(&mut vm, "D");
        vm.toggle_complete();
        assert_eq!(selected_text(&vm), "C");
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C", "E", "F"]);
    }

    #[test]
    fn toggle_hide_complete_restores_hidden_rows() {
        let mut vm = tall(vm_hiding("- A\n- [COMPLETE] B\n- C"));
        assert_eq!(row_texts(&mut vm), vec!["A", "C"]);
        vm.toggle_hide_complete_items();
        assert!(!vm.config.hide_complete_items());
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C"]);
    }

    #[test]
    fn hiding_completed_moves_selection_off_a_completed_row() {
        let mut vm = tall(vm("- A\n- [COMPLETE] B\n- C"));
        select(&mut vm, "B");
        vm.toggle_hide_complete_items();
        assert!(vm.config.hide_complete_items());
        assert_eq!(selected_text(&vm), "C");
    }

    // -----------------------------------------------------------------------
    // Insert
    // -----------------------------------------------------------------------

    #[test]
    fn insert_after_leaf_becomes_next_sibling_at_same_level() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "B");
        vm.start_insert_after();
        vm.insert_item("new");
        assert_eq!(selected_text(&vm), "new");
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "new", "C", "D", "E", "F"]);
        let new = node_by_text(&vm, "new");
        assert_eq!(vm.tree.level(new), vm.tree.level(node_by_text(&vm, "B")));
        assert!(!vm.is_inserting());
    }

    #[test]
    fn insert_before_leaf_becomes_previous_sibling() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "D");
        vm.start_insert_before();
        vm.insert_item("new");
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C", "new", "D", "E", "F"]);
    }

    #[test]
    fn insert_on_expanded_parent_prepends_a_child() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "A");
        vm.start_insert_after();
        vm.insert_item("new");
        let new = node_by_text(&vm, "new");
        let a = node_by_text(&vm, "A");
        assert_eq!(vm.tree.parent(new), Some(a));
        assert_eq!(vm.tree.children(a)[0], new);
        assert_eq!(vm.tree.level(new), vm.tree.level(a) + 1);
    }

    #[test]
    fn insert_on_collapsed_parent_stays_a_sibling() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "A");
        vm.toggle_collapse_node();
        vm.start_insert_after();
        vm.insert_item("new");
        assert_eq!(row_texts(&mut vm), vec!["A", "new", "D", "E", "F"]);
    }

    #[test]
    fn insert_with_no_selection_appends_under_view_root() {
        let mut vm = tall(vm(""));
        vm.start_insert_after();
        vm.insert_item("first");
        assert_eq!(row_texts(&mut vm), vec!["first"]);
        assert_eq!(selected_text(&vm), "first");
    }

    #[test]
    fn insertion_indent_follows_placement() {
        let mut vm = vm(BASIC);
        select(&mut vm, "B");
        assert_eq!(vm.insertion_indent(), 1);
        select(&mut vm, "A");
        assert_eq!(vm.insertion_indent(), 1); // prepends as child
        vm.toggle_collapse_node();
        assert_eq!(vm.insertion_indent(), 0); // collapsed: sibling
    }

    // -----------------------------------------------------------------------
    // Edit
    // -----------------------------------------------------------------------

    #[test]
    fn edit_commit_replaces_text() {
        let mut vm = vm(BASIC);
        select(&mut vm, "C");
        vm.start_edit();
        assert!(vm.is_editing());
        assert_eq!(vm.editing_snapshot().unwrap().text, "C");
        vm.finish_edit("C, revised");
        assert!(!vm.is_editing());
        assert_eq!(selected_text(&vm), "C, revised");
    }

    #[test]
    fn edit_cancel_leaves_item_untouched() {
        let mut vm = vm(BASIC);
        select(&mut vm, "C");
        vm.start_edit();
        vm.cancel_edit();
        assert!(!vm.is_editing());
        assert_eq!(selected_text(&vm), "C");
    }

    #[test]
    #[should_panic(expected = "without an active edit session")]
    fn finish_edit_outside_a_session_is_a_caller_bug() {
        let mut vm = vm(BASIC);
        vm.finish_edit("oops");
    }

    // -----------------------------------------------------------------------
    // Delete, paste, undo
    // -----------------------------------------------------------------------

    #[test]
    fn delete_lands_selection_on_a_neighbor() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "D");
        vm.delete_item();
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C", "E", "F"]);
        assert_eq!(selected_text(&vm), "E");
    }

    #[test]
    fn deleting_the_last_item_clears_selection() {
        let mut vm = tall(vm("- only"));
        vm.delete_item();
        assert!(vm.selected.is_none());
        assert!(vm.list_items().is_empty());
    }

    #[test]
    fn delete_with_no_selection_is_a_no_op() {
        let mut vm = tall(vm(""));
        vm.delete_item();
        vm.undo();
        assert!(vm.list_items().is_empty());
    }

    #[test]
    fn paste_after_reattaches_the_cut_subtree() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "A");
        vm.delete_item();
        select(&mut vm, "D");
        vm.paste_item(false);
        assert_eq!(row_texts(&mut vm), vec!["D", "A", "B", "C", "E", "F"]);
        assert_eq!(selected_text(&vm), "D");
        // A second paste has nothing to do
        vm.paste_item(false);
        assert_eq!(row_texts(&mut vm), vec!["D", "A", "B", "C", "E", "F"]);
    }

    #[test]
    fn paste_before_places_ahead_of_selection() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "D");
        vm.delete_item();
        select(&mut vm, "A");
        vm.paste_item(true);
        assert_eq!(row_texts(&mut vm), vec!["D", "A", "B", "C", "E", "F"]);
    }

    #[test]
    fn paste_repairs_levels_at_the_new_depth() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "E");
        vm.delete_item();
        select(&mut vm, "B");
        vm.paste_item(false);
        let e = node_by_text(&vm, "E");
        let f = node_by_text(&vm, "F");
        assert_eq!(vm.tree.level(e), vm.tree.level(node_by_text(&vm, "B")));
        assert_eq!(vm.tree.level(f), vm.tree.level(e) + 1);
    }

    #[test]
    fn paste_into_empty_view_appends_under_root() {
        let mut vm = tall(vm("- only"));
        vm.delete_item();
        vm.paste_item(false);
        assert_eq!(row_texts(&mut vm), vec!["only"]);
    }

    #[test]
    fn paste_after_undo_with_the_selection_on_the_cut_node_is_safe() {
        let mut vm = tall(vm(BASIC));
        vm.delete_item(); // cuts A; the undo reattaches it
        vm.undo();
        // The restored selection resolves by index onto A itself, which
        // cannot serve as its own paste anchor
        vm.paste_item(false);
        assert_eq!(row_texts(&mut vm), vec!["D", "E", "F", "A", "B", "C"]);
    }

    #[test]
    fn paste_with_the_selection_inside_the_cut_subtree_falls_back_to_the_root() {
        let mut vm = tall(vm(BASIC));
        vm.delete_item(); // cuts A with B and C
        vm.undo();
        select(&mut vm, "B");
        vm.paste_item(false);
        assert_eq!(row_texts(&mut vm), vec!["D", "E", "F", "A", "B", "C"]);
        assert_eq!(selected_text(&vm), "B");
    }

    #[test]
    fn paste_is_dropped_when_the_view_is_zoomed_inside_the_cut_subtree() {
        let mut vm = tall(vm(BASIC));
        vm.delete_item(); // cuts A with B and C
        vm.undo();
        let b = node_by_text(&vm, "B");
        vm.set_as_root(Some(b));
        vm.paste_item(false);
        vm.move_root_upwards();
        vm.move_root_upwards();
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C", "D", "E", "F"]);
        // The buffer survives the dropped paste
        select(&mut vm, "D");
        vm.paste_item(false);
        assert_eq!(row_texts(&mut vm), vec!["D", "A", "B", "C", "E", "F"]);
    }

    #[test]
    fn delete_then_undo_restores_an_equivalent_tree() {
        let mut vm = tall(vm(BASIC));
        let before = vm.tree.clone();
        select(&mut vm, "A");
        vm.delete_item();
        vm.undo();
        assert!(vm
            .tree
            .equivalent(vm.tree.root(), &before, before.root()));
        assert_eq!(serialize_outline(&vm.tree), serialize_outline(&before));
    }

    #[test]
    fn undo_restores_selection_by_preorder_index() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "D");
        vm.delete_item();
        vm.undo();
        assert_eq!(selected_text(&vm), "D");
    }

    #[test]
    fn undo_keeps_the_zoomed_root_position() {
        let mut vm = tall(vm(BASIC));
        let e = node_by_text(&vm, "E");
        vm.set_as_root(Some(e));
        select(&mut vm, "F");
        vm.delete_item();
        vm.undo();
        assert_eq!(vm.tree.data(vm.view_root).text, "E");
    }

    #[test]
    fn undo_with_empty_stack_is_a_no_op() {
        let mut vm = tall(vm(BASIC));
        vm.undo();
        assert_eq!(selected_text(&vm), "A");
    }

    #[test]
    fn undo_discards_a_cut_buffer_minted_after_the_snapshot() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "D");
        vm.start_insert_after();
        vm.insert_item("new");
        vm.delete_item(); // cuts "new"
        vm.undo(); // back to post-insert tree
        vm.undo(); // back to pre-insert tree; "new" never existed here
        vm.paste_item(false);
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn undo_after_insert_removes_the_new_item() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "B");
        vm.start_insert_after();
        vm.insert_item("new");
        vm.undo();
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C", "D", "E", "F"]);
    }

    // -----------------------------------------------------------------------
    // Zoom
    // -----------------------------------------------------------------------

    #[test]
    fn set_as_root_zooms_selects_first_child_and_persists_index() {
        let mut vm = tall(vm(BASIC));
        let e = node_by_text(&vm, "E");
        vm.set_as_root(Some(e));
        assert_eq!(selected_text(&vm), "F");
        assert_eq!(row_texts(&mut vm), vec!["F"]);
        // E is at pre-order index 4 of [A, B, C, D, E, F]
        assert_eq!(vm.config.root_node_index(), Some(4));
    }

    #[test]
    fn set_as_root_reveals_a_collapsed_node() {
        let mut vm = tall(vm("- [COLLAPSED] A\n  - B"));
        let a = node_by_text(&vm, "A");
        vm.set_as_root(Some(a));
        assert_eq!(row_texts(&mut vm), vec!["B"]);
        assert!(!vm.tree.data(a).collapsed);
    }

    #[test]
    fn zoom_position_survives_a_rebuild_from_config() {
        let mut vm = tall(vm(BASIC));
        let e = node_by_text(&vm, "E");
        vm.set_as_root(Some(e));
        let config = vm.config.clone();

        let rebuilt = ViewModel::new(parse_outline(BASIC), config);
        assert_eq!(rebuilt.tree.data(rebuilt.view_root).text, "E");
    }

    #[test]
    fn move_root_upwards_selects_previous_root() {
        let mut vm = tall(vm(BASIC));
        let e = node_by_text(&vm, "E");
        vm.set_as_root(Some(e));
        vm.move_root_upwards();
        assert_eq!(selected_text(&vm), "E");
        assert_eq!(vm.list_title().0, "Top level");
        assert_eq!(vm.config.root_node_index(), None);
    }

    #[test]
    fn move_root_upwards_at_true_root_is_a_no_op() {
        let mut vm = tall(vm(BASIC));
        select(&mut vm, "C");
        vm.move_root_upwards();
        assert_eq!(selected_text(&vm), "C");
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    const NESTED: &str =
        "- projects\n  - [COLLAPSED] kitchen\n    - [COLLAPSED] paint\n      - pick color\n- errands";

    #[test]
    fn search_uncollapses_the_ancestor_chain_of_a_match() {
        let mut vm = tall(vm(NESTED));
        vm.update_search("color");
        assert_eq!(selected_text(&vm), "pick color");
        assert!(!vm.tree.data(node_by_text(&vm, "kitchen")).collapsed);
        assert!(!vm.tree.data(node_by_text(&vm, "paint")).collapsed);
        assert!(row_texts(&mut vm).contains(&"pick color".to_string()));
    }

    #[test]
    fn cancel_search_recollapses_exactly_the_forced_nodes_and_restores_selection() {
        let mut vm = tall(vm(NESTED));
        select(&mut vm, "errands");
        vm.update_search("");
        vm.update_search("color");
        vm.cancel_search();
        assert_eq!(selected_text(&vm), "errands");
        assert!(vm.tree.data(node_by_text(&vm, "kitchen")).collapsed);
        assert!(vm.tree.data(node_by_text(&vm, "paint")).collapsed);
        assert!(!vm.is_searching());
    }

    #[test]
    fn cancel_search_leaves_manually_expanded_nodes_alone() {
        let mut vm = tall(vm(NESTED));
        select(&mut vm, "kitchen");
        vm.toggle_collapse_node(); // user expands kitchen by hand
        vm.update_search("color"); // search only forces "paint"
        vm.cancel_search();
        assert!(!vm.tree.data(node_by_text(&vm, "kitchen")).collapsed);
        assert!(vm.tree.data(node_by_text(&vm, "paint")).collapsed);
    }

    #[test]
    fn finish_search_keeps_selection_and_uncollapses() {
        let mut vm = tall(vm(NESTED));
        vm.update_search("color");
        vm.finish_search();
        assert_eq!(selected_text(&vm), "pick color");
        assert!(!vm.tree.data(node_by_text(&vm, "kitchen")).collapsed);
        assert!(!vm.is_searching());
    }

    #[test]
    fn search_query_reflects_the_active_mode() {
        let mut vm = tall(vm(NESTED));
        assert_eq!(vm.search_query(), None);
        vm.update_search("col");
        assert_eq!(vm.search_query(), Some("col"));
        vm.finish_search();
        assert_eq!(vm.search_query(), None);
    }

    #[test]
    fn short_queries_produce_no_matches() {
        let mut vm = tall(vm(NESTED));
        select(&mut vm, "errands");
        vm.update_search("c");
        assert!(vm.search_results.is_empty());
        assert_eq!(selected_text(&vm), "errands");
    }

    #[test]
    fn search_matching_is_case_insensitive() {
        let mut vm = tall(vm("- Buy MILK\n- other"));
        vm.update_search("milk");
        assert_eq!(selected_text(&vm), "Buy MILK");
    }

    #[test]
    fn search_results_cycle_in_both_directions() {
        let mut vm = tall(vm("- red apple\n- apple pie\n- pear"));
        vm.update_search("apple");
        assert_eq!(selected_text(&vm), "red apple");
        vm.select_next_search_result();
        assert_eq!(selected_text(&vm), "apple pie");
        vm.select_next_search_result();
        assert_eq!(selected_text(&vm), "red apple");
        vm.select_previous_search_result();
        assert_eq!(selected_text(&vm), "apple pie");
    }

    #[test]
    fn rows_flag_search_results() {
        let mut vm = tall(vm("- apple\n- pear"));
        vm.update_search("apple");
        let rows = vm.list_items();
        assert!(rows[0].is_search_result);
        assert!(!rows[1].is_search_result);
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    #[test]
    fn window_shorter_than_list_follows_the_selection_down() {
        let mut vm = vm(BASIC);
        vm.set_window_size(80, 3);
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C"]);
        select(&mut vm, "E");
        assert_eq!(row_texts(&mut vm), vec!["C", "D", "E"]);
        select(&mut vm, "A");
        assert_eq!(row_texts(&mut vm), vec!["A", "B", "C"]);
    }

    #[test]
    fn window_taller_than_list_starts_at_zero() {
        let mut vm = vm(BASIC);
        vm.set_window_size(80, 50);
        select(&mut vm, "F");
        assert_eq!(
            row_texts(&mut vm),
            vec!["A", "B", "C", "D", "E", "F"]
        );
    }
}
