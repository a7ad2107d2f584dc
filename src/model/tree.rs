//! Tree module for phylogenetic tree representation.
//!
//! This module provides the core data structures for representing phylogenetic trees:
//! - `Tree`: The main tree structure using the arena pattern for efficient memory layout.
//! - `NodeIndex` is used to index nodes.
//! - `StateIndex` is used to index states of a distance matrix.

use std::collections::HashMap;
use std::fmt;

use crate::model::node::{BranchLength, Node};

/// Index of a node in a tree (arena).
pub type NodeIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: NodeIndex = usize::MAX;

/// Index of a state in a distance-matrix header.
pub type StateIndex = usize;

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A phylogenetic tree represented using the arena pattern on [Node].
///
/// Nodes are stored in a contiguous vector and referenced by [NodeIndex].
/// Aim is to avoid referencing troubles as well as to provide efficient memory
/// layout and cache locality for traversal operations. The parent reference of
/// each node is a plain index back into the same arena, never a second owning
/// reference.
///
/// # Structure
/// - All nodes (root, internal, and leaves) are stored in the arena
/// - Index of the root is maintained
/// - Children are ordered left-to-right as parsed or assembled
/// - Branch lengths are optional, but if provided must be non-negative
/// - Subtrees detached via [Tree::prune_child] stay in the arena as their own
///   roots and can still be traversed or copied out via [Tree::subtree]
///
/// # Construction
/// Trees are usually produced by the [Newick parser](crate::newick), but can
/// be assembled directly: create a root with [Tree::add_root], then grow it
/// with [Tree::add_child]. Test validity with [Tree::is_valid].
///
/// # Example
/// ```
/// use phylogeo::model::Tree;
///
/// // Build the tree ((5,6)4,2,3)1 by hand
/// let mut tree = Tree::new();
/// let root = tree.add_root(Some("1"));
/// let inner = tree.add_child(root, Some("4"), None);
/// tree.add_child(inner, Some("5"), None);
/// tree.add_child(inner, Some("6"), None);
/// tree.add_child(root, Some("2"), None);
/// tree.add_child(root, Some("3"), None);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.num_leaves(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    /// Nodes of this tree (arena pattern)
    nodes: Vec<Node>,

    /// Index of the root of this tree
    root_index: NodeIndex,
}

impl Tree {
    /// Creates a new, empty tree.
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Creates a new, empty tree with capacity for `num_nodes` nodes.
    pub fn with_capacity(num_nodes: usize) -> Self {
        Tree {
            nodes: Vec::with_capacity(num_nodes),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Adds a detached node to the arena, assigning a unique index, which gets
    /// returned. The node is not reachable from the root until attached via
    /// [Tree::attach_child] or declared the root via [Tree::set_root].
    pub fn add_node(&mut self, label: Option<&str>, branch_length: Option<BranchLength>) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new(index, label.map(str::to_string), branch_length));
        index
    }

    /// Adds a labeled root node to the tree and returns its index.
    ///
    /// # Panics
    /// Panics if a root has already been set.
    pub fn add_root(&mut self, label: Option<&str>) -> NodeIndex {
        assert!(!self.is_root_set(), "Tree already has a root");
        let index = self.add_node(label, None);
        self.root_index = index;
        index
    }

    /// Declares an existing, parentless node the root of this tree.
    ///
    /// # Panics
    /// Panics if the node has a parent.
    pub fn set_root(&mut self, index: NodeIndex) {
        assert!(self[index].is_root(), "Root node must not have a parent");
        self.root_index = index;
    }

    /// Creates a new node and appends it to `parent`'s children; returns the
    /// index of the created node.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        label: Option<&str>,
        branch_length: Option<BranchLength>,
    ) -> NodeIndex {
        let child = self.add_node(label, branch_length);
        self.attach_child(parent, child);
        child
    }

    /// Appends an existing node to `parent`'s children, setting its parent
    /// reference if unset. Used for tree assembly and for grafting back a
    /// subtree detached by [Tree::prune_child].
    ///
    /// # Panics
    /// Panics if `child` already has a different parent.
    pub fn attach_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        match self[child].parent() {
            None => self[child].set_parent(parent),
            Some(p) => assert!(p == parent, "Node {} is already attached to parent {}", child, p),
        }
        self[parent].push_child(child);
    }

    /// Removes `child` (and the whole subtree rooted at it) from `parent`'s
    /// children. The excised subtree's internal structure is untouched: it
    /// remains in the arena with `child` as its own root and stays
    /// independently traversable.
    ///
    /// Returns `true` if `child` was a child of `parent`.
    pub fn prune_child(&mut self, parent: NodeIndex, child: NodeIndex) -> bool {
        if !self[parent].remove_child(child) {
            return false;
        }
        self[child].clear_parent();
        true
    }

    /// Returns whether the root of the tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root node.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus the tree hasn't been fully
    /// constructed yet.
    pub fn root(&self) -> &Node {
        &self[self.root_index]
    }

    /// Returns the index of the root node.
    ///
    /// # Panics
    /// Panics if the root hasn't been set.
    pub fn root_index(&self) -> NodeIndex {
        assert!(self.is_root_set(), "Tree has no root set");
        self.root_index
    }

    /// Returns a reference to the node at the given index.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self[index]
    }

    /// Walks parent references upwards from `from` and returns the index of
    /// the topmost ancestor. O(depth).
    pub fn find_root(&self, from: NodeIndex) -> NodeIndex {
        let mut current = from;
        while let Some(parent) = self[current].parent() {
            current = parent;
        }
        current
    }

    /// Returns the number of nodes in the arena, including detached subtrees.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaves reachable from the root.
    pub fn num_leaves(&self) -> usize {
        self.leaves(self.root_index()).len()
    }

    /// Returns the number of non-leaf nodes reachable from the root.
    pub fn num_internal(&self) -> usize {
        self.pre_order_iter().filter(|&v| !self[v].is_leaf()).count()
    }

    /// Returns the ordered list of all leaf descendants of `from`
    /// (depth-first, left-to-right). A leaf node yields itself.
    pub fn leaves(&self, from: NodeIndex) -> Vec<NodeIndex> {
        let mut result = Vec::new();
        let mut stack = vec![from];
        while let Some(index) = stack.pop() {
            let node = &self[index];
            if node.is_leaf() {
                result.push(index);
            } else {
                // Push children right-to-left so the leftmost is visited first
                stack.extend(node.children().iter().rev());
            }
        }
        result
    }

    /// Produces a fully independent deep copy of the subtree rooted at `from`,
    /// reindexed into a fresh arena. Mutating the copy never affects this
    /// tree, and vice versa.
    pub fn subtree(&self, from: NodeIndex) -> Tree {
        let order: Vec<NodeIndex> = PreOrderIter::starting_at(self, from).collect();
        let mut remap = HashMap::with_capacity(order.len());
        for (new_index, &old_index) in order.iter().enumerate() {
            remap.insert(old_index, new_index);
        }

        let mut nodes = Vec::with_capacity(order.len());
        for &old_index in &order {
            let mut node = self[old_index].clone();
            if old_index == from {
                node.clear_parent();
            }
            node.reindex(|i| remap[&i]);
            nodes.push(node);
        }

        Tree { nodes, root_index: 0 }
    }

    /// Validates the structure reachable from the root.
    ///
    /// Checks:
    /// - Root index is set, in bounds, and the root has no parent
    /// - All node indices match their position in the arena
    /// - All child indices are in bounds and point back to their parent
    /// - No node is reached twice (no sharing, no cycles)
    ///
    /// Nodes detached by pruning are ignored apart from the index check.
    pub fn is_valid(&self) -> bool {
        if !self.is_root_set() || self.root_index >= self.nodes.len() {
            return false;
        }
        if self.root().parent().is_some() {
            return false;
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if node.index() != index {
                return false;
            }
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root_index];
        while let Some(index) = stack.pop() {
            if seen[index] {
                return false;
            }
            seen[index] = true;

            for &child in self[index].children() {
                if child >= self.nodes.len() {
                    return false;
                }
                if self[child].parent() != Some(index) {
                    return false;
                }
                stack.push(child);
            }
        }

        true
    }

    /// Returns an iterator over reachable node indices in post-order
    /// (children before parents).
    ///
    /// Post-order traversal visits each node's children before the node
    /// itself; this is the visitation contract of the reconstruction forward
    /// pass. The iterator is stack-based and tolerates depth proportional to
    /// tree size.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over reachable node indices in pre-order
    /// (parents before children), the visitation contract of the
    /// reconstruction backward pass. Stack-based like [Tree::post_order_iter].
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl std::ops::IndexMut<NodeIndex> for Tree {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

// ============================================================================
// Analytics (pub)
// ============================================================================
impl Tree {
    /// Counts, for every labeled non-leaf node, the number of its immediate
    /// children whose label differs from its own; counts accumulate per label
    /// across the whole tree.
    ///
    /// On a reconstructed tree this is the number of state transitions leaving
    /// each state, e.g. outgoing flights leaving each location. Children with
    /// no label count as differing; unlabeled parents contribute nothing.
    pub fn compute_hotspots(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for index in self.pre_order_iter() {
            let node = &self[index];
            if node.is_leaf() {
                continue;
            }
            let Some(label) = node.label() else {
                continue;
            };
            let outgoing = node
                .children()
                .iter()
                .filter(|&&child| self[child].label() != Some(label))
                .count();
            *counts.entry(label.to_string()).or_insert(0) += outgoing;
        }
        counts
    }

    /// Formats [Tree::compute_hotspots] as a two-column text table with header
    /// `location,no. of outgoing flights`, sorted by descending count
    /// (ties broken by label, ascending, for stable output).
    pub fn hotspots_table(&self) -> String {
        let mut rows: Vec<(String, usize)> = self.compute_hotspots().into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut table = String::from("location,no. of outgoing flights\n");
        for (label, count) in rows {
            table.push_str(&label);
            table.push(',');
            table.push_str(&count.to_string());
            table.push('\n');
        }
        table
    }

    /// Formats a two-column annotation table with header `label\tlocation`,
    /// one row per reachable node in pre-order.
    ///
    /// Intended for reconstructed trees: the first column is the parsed label
    /// (empty for unlabeled internal nodes), the second the inferred state
    /// label. On a tree that has not been reconstructed the parsed label
    /// appears in the first column and the second stays empty.
    pub fn annotation_table(&self) -> String {
        let mut table = String::from("label\tlocation\n");
        for index in self.pre_order_iter() {
            let node = &self[index];
            let (parsed, location) = if node.state().is_some() {
                (node.taxon(), node.label())
            } else {
                (node.label(), None)
            };
            table.push_str(parsed.unwrap_or(""));
            table.push('\t');
            table.push_str(location.unwrap_or(""));
            table.push('\n');
        }
        table
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
impl fmt::Display for Tree {
    /// Draws the tree with box characters, one node per line:
    /// ```text
    /// └─ root
    ///    ├─ A
    ///    └─ inner
    ///       ├─ B
    ///       └─ C
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_root_set() {
            return writeln!(f, "(empty tree)");
        }
        self.fmt_node(f, self.root_index, "", true)
    }
}

impl Tree {
    fn fmt_node(&self, f: &mut fmt::Formatter, index: NodeIndex, prefix: &str, is_last: bool) -> fmt::Result {
        let node = &self[index];
        let connector = if is_last { "└─ " } else { "├─ " };
        writeln!(f, "{}{}{}", prefix, connector, node.label().unwrap_or("·"))?;

        let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
        let children = node.children();
        for (i, &child) in children.iter().enumerate() {
            self.fmt_node(f, child, &child_prefix, i + 1 == children.len())?;
        }
        Ok(())
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without
/// recursion. Each node is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push((tree.root_index, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree[index];

            if children_visited || node.is_leaf() {
                // Either we've already scheduled the children, or this is a leaf
                return Some(index);
            }

            // Revisit this node once its children are done
            self.stack.push((index, true));

            // Push children right-to-left, so the leftmost is processed first
            for &child in node.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without
/// recursion. Each node is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }

    /// Pre-order traversal starting at an arbitrary node, e.g. the root of a
    /// detached subtree.
    pub(crate) fn starting_at(tree: &'a Tree, start: NodeIndex) -> Self {
        PreOrderIter { tree, stack: vec![start] }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;

        // Push children right-to-left, so the leftmost is processed first
        for &child in self.tree[index].children().iter().rev() {
            self.stack.push(child);
        }

        Some(index)
    }
}
