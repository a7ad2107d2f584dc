//! Node module for phylogenetic tree representation.

use std::ops::Deref;

use crate::model::tree::{NodeIndex, StateIndex};

/// During construction, and after pruning, a node might have no parent set.
const NO_PARENT_SET: NodeIndex = usize::MAX;

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// A vertex of a phylogenetic [Tree](crate::model::tree::Tree).
///
/// Unlike a strictly binary model, a node holds an ordered list of children of
/// arbitrary arity, so multifurcating trees parse and serialize unchanged.
///
/// # Invariants
/// - `index` is the node's position in the tree arena
/// - `parent` is the [NodeIndex] of the parent; `NO_PARENT_SET` for the root
///   and for nodes detached by pruning
/// - `children` are [NodeIndex] values into the same arena, in left-to-right
///   parse/assembly order
/// - `branch_length` is non-negative and finite if present
/// - `label` holds the parsed label; after ancestral reconstruction it holds
///   the inferred state label and the parsed label moves to `taxon`
/// - `state` is the chosen state's index in the distance-matrix header,
///   set only by the reconstruction backward pass
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    index: NodeIndex,
    parent: NodeIndex,
    children: Vec<NodeIndex>,
    label: Option<String>,
    taxon: Option<String>,
    branch_length: Option<BranchLength>,
    state: Option<StateIndex>,
}

impl Node {
    /// Creates a new detached node.
    ///
    /// # Arguments
    /// * `index` - The unique index of this node in the tree arena
    /// * `label` - Parsed label, or `None` for an unlabeled internal node
    /// * `branch_length` - Distance to the parent node (non-negative)
    pub fn new(index: NodeIndex, label: Option<String>, branch_length: Option<BranchLength>) -> Self {
        Node {
            index,
            parent: NO_PARENT_SET,
            children: Vec::new(),
            label,
            taxon: None,
            branch_length,
            state: None,
        }
    }

    /// Returns the index of this node in the arena.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns the current label of this node, if any.
    ///
    /// Before reconstruction this is the parsed label; afterwards it is the
    /// inferred state label (see [Node::taxon] for the parsed one).
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the parsed label that was displaced by reconstruction, if any.
    pub fn taxon(&self) -> Option<&str> {
        self.taxon.as_deref()
    }

    /// Returns the branch length to the parent, if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        self.branch_length
    }

    /// Returns whether this node has a branch length set.
    pub fn has_branch_length(&self) -> bool {
        self.branch_length.is_some()
    }

    /// Returns the ordered child indices of this node.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this node has no parent set.
    ///
    /// This also holds for subtree roots detached via
    /// [Tree::prune_child](crate::model::tree::Tree::prune_child).
    pub fn is_root(&self) -> bool {
        self.parent == NO_PARENT_SET
    }

    /// Returns the index of the parent, or `None` for a root.
    pub fn parent(&self) -> Option<NodeIndex> {
        if self.parent == NO_PARENT_SET {
            None
        } else {
            Some(self.parent)
        }
    }

    /// Returns the chosen state index set by the reconstruction backward pass.
    pub fn state(&self) -> Option<StateIndex> {
        self.state
    }

    /// Records the reconstruction result on this node: the chosen state index
    /// and its label. The parsed label is preserved in `taxon`.
    pub(crate) fn assign_state(&mut self, state: StateIndex, state_label: &str) {
        if self.taxon.is_none() {
            self.taxon = self.label.take();
        }
        self.label = Some(state_label.to_string());
        self.state = Some(state);
    }

    pub(crate) fn set_parent(&mut self, parent: NodeIndex) {
        self.parent = parent;
    }

    pub(crate) fn clear_parent(&mut self) {
        self.parent = NO_PARENT_SET;
    }

    pub(crate) fn push_child(&mut self, child: NodeIndex) {
        self.children.push(child);
    }

    /// Removes `child` from this node's child list; returns whether it was present.
    pub(crate) fn remove_child(&mut self, child: NodeIndex) -> bool {
        match self.children.iter().position(|&c| c == child) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Rewrites this node's internal indices via `remap`; used when a subtree
    /// is copied into a fresh arena.
    pub(crate) fn reindex(&mut self, remap: impl Fn(NodeIndex) -> NodeIndex) {
        self.index = remap(self.index);
        if self.parent != NO_PARENT_SET {
            self.parent = remap(self.parent);
        }
        for child in &mut self.children {
            *child = remap(*child);
        }
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative and finite.
///
/// Represents the evolutionary distance between a node and its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite. Use
    /// [BranchLength::try_new] when the value comes from untrusted input.
    pub fn new(length: f64) -> Self {
        Self::try_new(length)
            .unwrap_or_else(|| panic!("Branch length must be non-negative and finite, got {}", length))
    }

    /// Creates a new branch length, returning `None` if `length` is negative
    /// or not finite.
    pub fn try_new(length: f64) -> Option<Self> {
        if length >= 0.0 && length.is_finite() {
            Some(BranchLength(length))
        } else {
            None
        }
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}
