//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick format strings into
//! [Tree]s and [`NewickWriter`] to serialize them back.
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_str`] - parses a single Newick string
//! * [`parse_file`] - parses a file holding a single Newick tree
//! * [`to_newick`] - serializes a tree with branch lengths and terminator
//!
//! # Full API
//! For more control, configure a [`NewickParser`] and provide a [`ByteParser`],
//! or configure a [`NewickWriter`]:
//! ```
//! use phylogeo::newick::{NewickParser, NewickWriter};
//! use phylogeo::parser::ByteParser;
//!
//! let mut bytes = ByteParser::from_str("(a:3.2,b,c:2.1)d;");
//! let tree = NewickParser::new().with_node_capacity(4).parse(&mut bytes).unwrap();
//!
//! let topology = NewickWriter::new().without_branch_lengths().write(&tree);
//! assert_eq!(topology, "(a,b,c)d;");
//! ```

mod parser;
pub mod writer;

pub use self::parser::NewickParser;
pub use self::writer::{NewickWriter, to_newick, write_newick_file};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::model::tree::Tree;
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::{ByteSource, InMemoryByteSource};
use crate::parser::parse_error::ParseError;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string into a [Tree] using default settings.
///
/// The string must contain exactly one `;`-terminated tree; anything but
/// whitespace or comments after the terminator is an error.
///
/// # Example
/// ```
/// use phylogeo::newick::parse_str;
///
/// let tree = parse_str("((A:0.1,B:0.2):0.3,C:0.4);").unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// ```
pub fn parse_str<T: AsRef<str>>(newick: T) -> Result<Tree, ParseError> {
    let mut parser = ByteParser::from_str(newick.as_ref());
    parse_single_tree(&mut parser)
}

/// Parses a file holding a single Newick tree (one tree per text blob),
/// using default settings.
///
/// # Example
/// ```no_run
/// use phylogeo::newick::parse_file;
///
/// let tree = parse_file("reconstructed.phy").unwrap();
/// println!("loaded tree with {} leaves", tree.num_leaves());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Tree, ParseError> {
    let mut contents = Vec::new();
    File::open(path)?.read_to_end(&mut contents)?;
    let source = InMemoryByteSource::from_vec(contents);
    let mut parser = ByteParser::new(source);
    parse_single_tree(&mut parser)
}

/// Parses one tree and requires that nothing but whitespace and comments
/// remains.
fn parse_single_tree<S: ByteSource>(parser: &mut ByteParser<S>) -> Result<Tree, ParseError> {
    let tree = NewickParser::new().parse(parser)?;
    parser.skip_comment_and_whitespace()?;
    if !parser.is_eof() {
        return Err(ParseError::trailing_content(parser));
    }
    Ok(tree)
}
