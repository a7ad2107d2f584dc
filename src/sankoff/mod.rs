//! Sankoff's algorithm: minimum-cost ancestral state reconstruction.
//!
//! Given a parsed [Tree], a [DistanceMatrix] of pairwise state-transition
//! costs, and a [TipMapping] of observed leaf states, the [Sankoff] engine
//! computes for every node the state assignment minimizing the total
//! transition cost over the tree, in two linear passes:
//!
//! * **Forward pass** (post-order): computes, per node and candidate state,
//!   the minimal cost of the subtree below when the node takes that state.
//! * **Backward pass** (pre-order): fixes the actual state per node given its
//!   parent's already fixed choice, and relabels the node with it.
//!
//! Costs are always charged from the parent's (candidate) state to the
//! child's candidate state, so asymmetric matrices are handled correctly.
//!
//! # Example
//! ```
//! use phylogeo::model::{DistanceMatrix, TipMapping};
//! use phylogeo::newick::parse_str;
//! use phylogeo::sankoff::Sankoff;
//!
//! let tree = parse_str("(((A,C),G),(C,G));").unwrap();
//! let matrix = DistanceMatrix::from_parts(
//!     vec!["A".into(), "C".into(), "G".into(), "T".into()],
//!     vec![
//!         vec![0.0, 2.0, 1.0, 2.0],
//!         vec![2.0, 0.0, 2.0, 1.0],
//!         vec![1.0, 2.0, 0.0, 2.0],
//!         vec![2.0, 1.0, 2.0, 0.0],
//!     ],
//! ).unwrap();
//! let tips: TipMapping = ["A", "C", "G", "T"].iter().map(|s| (*s, *s)).collect();
//!
//! let mut sankoff = Sankoff::new(tree, &matrix, &tips).unwrap();
//! sankoff.run();
//! assert_eq!(sankoff.tree().root().label(), Some("G"));
//! ```

use log::{debug, info};
use thiserror::Error;

use crate::model::distance_matrix::DistanceMatrix;
use crate::model::tip_mapping::TipMapping;
use crate::model::tree::{NodeIndex, StateIndex, Tree};

/// Errors raised while setting up a [Sankoff] reconstruction.
///
/// All of these are configuration errors detected before any dynamic
/// programming begins; a partially labeled tree is never produced.
#[derive(Debug, Error)]
pub enum SankoffError {
    #[error("tree has no root, nothing to reconstruct")]
    EmptyTree,

    #[error("leaf node {index} has no label and cannot be mapped to a state")]
    UnlabeledLeaf { index: NodeIndex },

    #[error("leaf {label:?} has no entry in the tip mapping")]
    UnmappedLeaf { label: String },

    #[error("leaf {leaf:?} is mapped to state {state:?}, which is not in the distance matrix header")]
    UnknownState { leaf: String, state: String },
}

// =#========================================================================#=
// SANKOFF ENGINE
// =#========================================================================#=
/// Two-pass dynamic-programming engine for ancestral state reconstruction.
///
/// The engine owns the tree while working on it; per-node state cost vectors
/// are kept in one flat `num_nodes × num_states` table indexed by [NodeIndex],
/// so the inner min-plus loop of the forward pass runs over contiguous slices.
/// Retrieve the annotated tree with [Sankoff::tree] or [Sankoff::into_tree].
///
/// Construction performs the initialization pass: every leaf label is resolved
/// through the tip mapping and the matrix header up front, and leaf cost
/// vectors are built (0 for the observed state, +∞ elsewhere). Any unresolved
/// leaf fails construction with a [SankoffError].
#[derive(Debug)]
pub struct Sankoff<'m> {
    tree: Tree,
    matrix: &'m DistanceMatrix,
    /// Row-major per-node state cost vectors, `num_nodes × num_states`
    costs: Vec<f64>,
}

impl<'m> Sankoff<'m> {
    /// Creates an engine for `tree`, resolving all leaves against `tips` and
    /// `matrix` and building the initial cost vectors.
    pub fn new(tree: Tree, matrix: &'m DistanceMatrix, tips: &TipMapping) -> Result<Self, SankoffError> {
        if !tree.is_root_set() {
            return Err(SankoffError::EmptyTree);
        }
        let num_states = matrix.size();

        // Resolve every leaf before touching any cost vector, so a bad
        // mapping can never leave a half-initialized engine behind.
        let leaves = tree.leaves(tree.root_index());
        let mut observed = Vec::with_capacity(leaves.len());
        for &leaf in &leaves {
            let label = tree[leaf]
                .label()
                .ok_or(SankoffError::UnlabeledLeaf { index: leaf })?;
            let state_label = tips
                .get(label)
                .ok_or_else(|| SankoffError::UnmappedLeaf { label: label.to_string() })?;
            let state = matrix.index_of(state_label).ok_or_else(|| SankoffError::UnknownState {
                leaf: label.to_string(),
                state: state_label.to_string(),
            })?;
            observed.push((leaf, state));
        }

        // Leaf vectors: 0 at the observed state, +∞ elsewhere. Internal
        // vectors are placeholders until the forward pass fills them.
        let mut costs = vec![0.0; tree.num_nodes() * num_states];
        for (leaf, state) in observed {
            let vector = &mut costs[leaf * num_states..(leaf + 1) * num_states];
            vector.fill(f64::INFINITY);
            vector[state] = 0.0;
        }

        info!(
            "sankoff: {} nodes, {} leaves, {} states",
            tree.num_nodes(),
            leaves.len(),
            num_states
        );
        Ok(Sankoff { tree, matrix, costs })
    }

    /// Performs the full reconstruction: forward pass, then backward pass.
    pub fn run(&mut self) {
        self.forward_pass();
        self.backward_pass();
    }

    /// Post-order pass computing, per node and candidate state `s`, the
    /// minimal subtree cost
    /// `cost[s] = Σ over children c of min over t of (cost_c[t] + D[s][t])`.
    ///
    /// Each child's contribution is its own independent minimization over its
    /// state vector; every `(node, state)` entry is computed exactly once.
    /// The inner minimization runs along the contiguous state axis of both
    /// the child vector and the matrix row, O(children × N²) per node.
    pub fn forward_pass(&mut self) {
        let n = self.matrix.size();
        let order: Vec<NodeIndex> = self.tree.post_order_iter().collect();
        let mut acc = vec![0.0; n];

        for index in order {
            if self.tree[index].is_leaf() {
                continue;
            }
            acc.fill(0.0);
            for &child in self.tree[index].children() {
                let child_costs = &self.costs[child * n..(child + 1) * n];
                for (s, total) in acc.iter_mut().enumerate() {
                    let mut best = f64::INFINITY;
                    for (cost, dist) in child_costs.iter().zip(self.matrix.row(s)) {
                        let candidate = cost + dist;
                        if candidate < best {
                            best = candidate;
                        }
                    }
                    *total += best;
                }
            }
            self.costs[index * n..(index + 1) * n].copy_from_slice(&acc);
        }
        debug!("sankoff forward pass done, root min cost {}", self.min_cost());
    }

    /// Pre-order pass choosing each node's state and relabeling the node.
    ///
    /// The root takes the state minimizing its own cost vector; every other
    /// node, with its parent already assigned state `p`, takes the state `s`
    /// minimizing `cost[s] + D[p][s]`. Exact ties go to the lowest header
    /// index, so the choice is deterministic.
    pub fn backward_pass(&mut self) {
        let root = self.tree.root_index();
        let root_state = lowest_index_minimum(self.cost_vector(root).iter().copied());
        self.assign(root, root_state);

        let mut stack: Vec<NodeIndex> = Vec::new();
        stack.extend(self.tree[root].children().iter().rev());

        while let Some(index) = stack.pop() {
            let parent = self.tree[index].parent().expect("non-root node has a parent");
            let parent_state = self.tree[parent].state().expect("parent is assigned before child");

            let costs = self.cost_vector(index);
            let penalties = self.matrix.row(parent_state);
            let state =
                lowest_index_minimum(costs.iter().zip(penalties).map(|(cost, dist)| cost + dist));
            self.assign(index, state);

            stack.extend(self.tree[index].children().iter().rev());
        }
        debug!("sankoff backward pass done");
    }

    /// Records the chosen state on the node and relabels it with the state's
    /// label; the parsed label remains available as the node's taxon.
    fn assign(&mut self, index: NodeIndex, state: StateIndex) {
        let state_label = self.matrix.label(state);
        self.tree[index].assign_state(state, state_label);
    }

    /// Returns the state cost vector of a node, of length = number of states.
    ///
    /// Leaf vectors are valid from construction; internal vectors only after
    /// [Sankoff::forward_pass].
    pub fn cost_vector(&self, index: NodeIndex) -> &[f64] {
        let n = self.matrix.size();
        &self.costs[index * n..(index + 1) * n]
    }

    /// Returns the minimal total parsimony cost of the tree, i.e. the minimum
    /// of the root's cost vector. Meaningful after [Sankoff::forward_pass].
    pub fn min_cost(&self) -> f64 {
        self.cost_vector(self.tree.root_index())
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Returns the tree in its current state of reconstruction.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Consumes the engine and returns the (annotated) tree.
    pub fn into_tree(self) -> Tree {
        self.tree
    }
}

/// Returns the index of the minimum of `values`; on exact ties the lowest
/// index wins (first-encountered-minimum policy).
fn lowest_index_minimum(values: impl Iterator<Item = f64>) -> usize {
    let mut best_index = 0;
    let mut best = f64::INFINITY;
    for (index, value) in values.enumerate() {
        if value < best {
            best = value;
            best_index = index;
        }
    }
    best_index
}
