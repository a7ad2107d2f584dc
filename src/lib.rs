//! Phylogeo reconstructs the most-parsimonious ancestral states (e.g.
//! geographic locations) at the internal nodes of a phylogenetic tree.
//!
//! Core functionality provided:
//! - Newick: parse and write trees in Newick bracket notation, including
//!   multifurcating nodes and labeled internal nodes.
//! - Tree model: arena-based [Tree](model::Tree) with structural mutation
//!   (attach, prune, subtree extraction), stack-based traversal iterators,
//!   and analytics (hotspot counts, annotation tables).
//! - Distance matrix: labeled, not necessarily symmetric
//!   [cost table](model::DistanceMatrix) between discrete states, loadable
//!   from delimited files.
//! - Sankoff: the two-pass dynamic-programming
//!   [reconstruction engine](sankoff::Sankoff) assigning a minimal-cost state
//!   to every node, with deterministic lowest-index tie-breaking.
//!
//! # Usage
//! Parse a tree, reconstruct states, and write the results:
//! ```
//! use phylogeo::model::{DistanceMatrix, TipMapping};
//! use phylogeo::newick::{parse_str, to_newick};
//! use phylogeo::sankoff::Sankoff;
//!
//! let tree = parse_str("((sample_1,sample_2),sample_3);").unwrap();
//!
//! let matrix = DistanceMatrix::from_parts(
//!     vec!["FRA".into(), "JFK".into()],
//!     vec![vec![0.0, 1.0], vec![1.0, 0.0]],
//! ).unwrap();
//!
//! let mut tips = TipMapping::new();
//! tips.insert("sample_1", "FRA");
//! tips.insert("sample_2", "FRA");
//! tips.insert("sample_3", "JFK");
//!
//! let mut sankoff = Sankoff::new(tree, &matrix, &tips).unwrap();
//! sankoff.run();
//!
//! let tree = sankoff.into_tree();
//! assert_eq!(to_newick(&tree), "((FRA,FRA)FRA,JFK)FRA;");
//! println!("{}", tree.hotspots_table());
//! ```
//!
//! Inputs are typically files: [newick::parse_file],
//! [DistanceMatrix::from_path](model::DistanceMatrix::from_path), and
//! [TipMapping::from_path](model::TipMapping::from_path) cover the flat-file
//! formats of the pipeline. The library logs through the [log] facade and
//! never initializes a logger itself.

pub mod model;
pub mod newick;
pub mod parser;
pub mod sankoff;

pub use crate::model::{DistanceMatrix, TipMapping, Tree};
pub use crate::newick::{parse_file as parse_newick_file, parse_str as parse_newick_str, to_newick};
pub use crate::sankoff::Sankoff;
