//! Data model: the arena [Tree] of [Node]s, the [DistanceMatrix] of pairwise
//! state costs, and the [TipMapping] of observed leaf states.

pub mod distance_matrix;
pub mod node;
pub mod tip_mapping;
pub mod tree;

pub use distance_matrix::{DistanceMatrix, MatrixError};
pub use node::{BranchLength, Node};
pub use tip_mapping::{TipMapping, TipMappingError};
pub use tree::{NodeIndex, StateIndex, Tree};
