//! Generic ordered tree backed by an arena of nodes.
//!
//! Nodes are identified by [`NodeId`] handles into the arena. Slots are
//! never reused: removing a node only detaches it from its parent, so a
//! `NodeId` stays valid for the lifetime of the tree, including across
//! whole-tree clones taken for undo snapshots. Identity is the handle;
//! structural comparison goes through [`Tree::equivalent`].

/// Stable handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    data: T,
    level: i32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: bool,
}

/// Where to attach a child relative to its new siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPosition {
    First,
    Last,
    /// Immediately before an existing child. Panics on attach if the
    /// named node is not currently a child of the target parent.
    Before(NodeId),
    /// Immediately after an existing child. Same precondition as `Before`.
    After(NodeId),
}

/// An ordered n-ary tree with parent back-links and level tracking.
///
/// Levels count depth from the root (the root itself may sit at -1 when
/// it acts as a synthetic super-root for parsed outlines). A node's
/// level is set to `parent.level + 1` on attach; descendants are *not*
/// repaired implicitly. Callers use [`Tree::update_level_to_parent`]
/// or [`Tree::change_level`] after moving a subtree.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
}

impl<T> Tree<T> {
    pub fn new(root_data: T) -> Self {
        Tree {
            nodes: vec![Node {
                data: root_data,
                level: 0,
                parent: None,
                children: Vec::new(),
                visible: true,
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocate a detached node at level 0. Attach it with
    /// [`Tree::attach_child`] or one of the sibling methods.
    pub fn alloc(&mut self, data: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            level: 0,
            parent: None,
            children: Vec::new(),
            visible: true,
        });
        id
    }

    /// Whether `node` was allocated by this tree. Handles minted by a
    /// larger arena may index past the end of a restored snapshot.
    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub fn data(&self, node: NodeId) -> &T {
        &self.nodes[node.0].data
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut T {
        &mut self.nodes[node.0].data
    }

    pub fn level(&self, node: NodeId) -> i32 {
        self.nodes[node.0].level
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn has_children(&self, node: NodeId) -> bool {
        !self.nodes[node.0].children.is_empty()
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.nodes[node.0].visible
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.nodes[node.0].visible = visible;
    }

    /// Walk parent links to the top. A detached node is its own root.
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            current = parent;
        }
        current
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes[parent.0].children.iter().position(|&c| c == child)
    }

    /// Attach a detached node as a child of `parent`. Sets the child's
    /// parent link and level (`parent.level + 1`, not recursive).
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId, pos: ChildPosition) {
        debug_assert!(
            self.nodes[child.0].parent.is_none(),
            "attach_child: node is already attached"
        );
        let index = match pos {
            ChildPosition::First => 0,
            ChildPosition::Last => self.nodes[parent.0].children.len(),
            ChildPosition::Before(sibling) => self
                .child_index(parent, sibling)
                .expect("attach_child: `before` node is not a child of this parent"),
            ChildPosition::After(sibling) => {
                self.child_index(parent, sibling)
                    .expect("attach_child: `after` node is not a child of this parent")
                    + 1
            }
        };
        self.nodes[parent.0].children.insert(index, child);
        let level = self.nodes[parent.0].level + 1;
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.level = level;
    }

    /// Attach `new` immediately before `node` in its parent's child list.
    /// Panics if `node` has no parent (only meaningful below the root).
    pub fn attach_sibling_before(&mut self, node: NodeId, new: NodeId) {
        let parent = self.nodes[node.0]
            .parent
            .expect("attach_sibling_before: node has no parent");
        self.attach_child(parent, new, ChildPosition::Before(node));
    }

    /// Attach `new` immediately after `node` in its parent's child list.
    /// Panics if `node` has no parent.
    pub fn attach_sibling_after(&mut self, node: NodeId, new: NodeId) {
        let parent = self.nodes[node.0]
            .parent
            .expect("attach_sibling_after: node has no parent");
        self.attach_child(parent, new, ChildPosition::After(node));
    }

    /// Sever `node` from its parent, leaving it (and its subtree) owned
    /// by the arena but unreachable from the root. No-op when detached.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent {
            self.nodes[parent.0].children.retain(|&c| c != node);
            self.nodes[node.0].parent = None;
        }
    }

    /// Remove `target` if it lives in `scope`'s subtree (strictly below
    /// `scope`). No-op when `target` is `scope` itself, an ancestor of
    /// it, or unrelated.
    pub fn remove_node(&mut self, scope: NodeId, target: NodeId) {
        if target == scope {
            return;
        }
        let mut current = target;
        while let Some(parent) = self.nodes[current.0].parent {
            if parent == scope {
                self.detach(target);
                return;
            }
            current = parent;
        }
    }

    pub fn first_child(&self, node: NodeId, only_visible: bool) -> Option<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .find(|&c| !only_visible || self.nodes[c.0].visible)
    }

    pub fn last_child(&self, node: NodeId, only_visible: bool) -> Option<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .rev()
            .find(|&c| !only_visible || self.nodes[c.0].visible)
    }

    fn collect_subtree(&self, scope: NodeId, only_visible: bool) -> Vec<NodeId> {
        if only_visible {
            self.visible_descendants(scope).collect()
        } else {
            self.descendants(scope).collect()
        }
    }

    /// Pre-order successor of `node` within `scope`'s subtree, wrapping
    /// from the last element back to the first. Returns `scope` itself
    /// when `node` is not in the traversal (callers treat that as
    /// "selection unchanged").
    pub fn node_after(&self, scope: NodeId, node: NodeId, only_visible: bool) -> NodeId {
        let items = self.collect_subtree(scope, only_visible);
        if items.is_empty() {
            return scope;
        }
        match items.iter().position(|&n| n == node) {
            Some(i) => items[(i + 1) % items.len()],
            None => scope,
        }
    }

    /// Pre-order predecessor of `node` within `scope`'s subtree,
    /// wrapping from the first element to the last. Returns `scope` on
    /// a miss, like [`Tree::node_after`].
    pub fn node_before(&self, scope: NodeId, node: NodeId, only_visible: bool) -> NodeId {
        let items = self.collect_subtree(scope, only_visible);
        if items.is_empty() {
            return scope;
        }
        match items.iter().position(|&n| n == node) {
            Some(i) => items[(i + items.len() - 1) % items.len()],
            None => scope,
        }
    }

    /// Add `delta` to the level of `node` and every descendant.
    pub fn change_level(&mut self, node: NodeId, delta: i32) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            self.nodes[id.0].level += delta;
            stack.extend(self.nodes[id.0].children.iter().copied());
        }
    }

    /// Recompute `level = parent.level + 1` for `node` and every
    /// descendant. Used after a detached subtree is reattached somewhere
    /// with a different depth. Panics if `node` has no parent.
    pub fn update_level_to_parent(&mut self, node: NodeId) {
        let parent = self.nodes[node.0]
            .parent
            .expect("update_level_to_parent: node has no parent");
        let mut stack = vec![(node, self.nodes[parent.0].level + 1)];
        while let Some((id, level)) = stack.pop() {
            self.nodes[id.0].level = level;
            stack.extend(self.nodes[id.0].children.iter().map(|&c| (c, level + 1)));
        }
    }

    /// Apply `f` to `node`'s payload and every descendant's, pre-order.
    pub fn for_each_subtree(&mut self, node: NodeId, mut f: impl FnMut(&mut T)) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            f(&mut self.nodes[id.0].data);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
    }

    /// Lazy pre-order traversal of `node`'s subtree, excluding `node`
    /// itself (children before following siblings).
    pub fn descendants(&self, node: NodeId) -> Descendants<'_, T> {
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.clone();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Like [`Tree::descendants`] but skips invisible nodes, and with
    /// them their entire subtrees (an invisible node's children are
    /// never yielded).
    pub fn visible_descendants(&self, node: NodeId) -> VisibleDescendants<'_, T> {
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.clone();
        stack.reverse();
        VisibleDescendants { tree: self, stack }
    }

    /// Node at a 0-based pre-order position within `scope`'s subtree
    /// (full traversal, not the visible-only variant).
    pub fn node_at_index(&self, scope: NodeId, index: usize) -> Option<NodeId> {
        self.descendants(scope).nth(index)
    }

    /// Pre-order position of `target` within `scope`'s subtree.
    pub fn index_for_node(&self, scope: NodeId, target: NodeId) -> Option<usize> {
        self.descendants(scope).position(|n| n == target)
    }

    /// Deep structural comparison: same payload, same level, same number
    /// of children, children pairwise equivalent in order. Distinct from
    /// handle identity; used by undo tests, never for lookups.
    pub fn equivalent(&self, node: NodeId, other: &Tree<T>, other_node: NodeId) -> bool
    where
        T: PartialEq,
    {
        let a = &self.nodes[node.0];
        let b = &other.nodes[other_node.0];
        if a.data != b.data || a.level != b.level || a.children.len() != b.children.len() {
            return false;
        }
        a.children
            .iter()
            .zip(b.children.iter())
            .all(|(&c, &d)| self.equivalent(c, other, d))
    }

    /// Build a tree from newline-delimited text.
    ///
    /// `parse_line` is called with each line and mutable access to the
    /// most recently produced payload. It returns `Ok(None)` for a
    /// continuation line merged into that payload, `Ok(Some((data,
    /// level)))` for a new node, or `Err` for a malformed line, which is
    /// skipped. Nodes attach under a moving insert point: a level
    /// increase descends to the insert point's last child, a decrease
    /// ascends one parent hop per level. Jumps larger than +1 are
    /// clamped to a single descent, and ascents stop at the root, so
    /// malformed indentation flattens instead of failing. Levels are
    /// shifted by -1 afterwards, leaving the synthetic root at -1 and
    /// top-level items at 0.
    pub fn from_text<F, E>(root_data: T, text: &str, mut parse_line: F) -> Tree<T>
    where
        F: FnMut(&str, Option<&mut T>) -> Result<Option<(T, i32)>, E>,
    {
        let mut tree = Tree::new(root_data);
        let mut insert_point = tree.root;
        let mut current_level = 0i32;
        let mut last: Option<NodeId> = None;

        for line in text.lines() {
            let parsed = match last {
                Some(id) => parse_line(line, Some(tree.data_mut(id))),
                None => parse_line(line, None),
            };
            let Ok(Some((data, level))) = parsed else {
                continue;
            };
            if level > current_level {
                if let Some(last_child) = tree.last_child(insert_point, false) {
                    insert_point = last_child;
                }
            } else if level < current_level {
                for _ in 0..(current_level - level) {
                    if let Some(parent) = tree.parent(insert_point) {
                        insert_point = parent;
                    }
                }
            }
            current_level = level;
            let id = tree.alloc(data);
            tree.attach_child(insert_point, id, ChildPosition::Last);
            last = Some(id);
        }

        tree.change_level(tree.root, -1);
        tree
    }
}

pub struct Descendants<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for Descendants<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev().copied());
        Some(id)
    }
}

pub struct VisibleDescendants<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for VisibleDescendants<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let id = self.stack.pop()?;
            if !self.tree.nodes[id.0].visible {
                continue;
            }
            self.stack
                .extend(self.tree.nodes[id.0].children.iter().rev().copied());
            return Some(id);
        }
    }
}
