//! Newick format serialization of [Tree]s.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::model::node::BranchLength;
use crate::model::tree::{NodeIndex, Tree};

/// Estimated characters per branch length (e.g. ":0.009529961339106089")
const BRANCH_LENGTH_CHARS: usize = 21;

/// Serializer (configuration) for writing [Tree]s as Newick strings.
///
/// The produced text mirrors the parser's grammar exactly — comma-separated
/// children in parentheses, label, optional `:length`, optional `;` — so that
/// parsing a serialized tree reproduces an isomorphic tree. Labels are written
/// back verbatim; labels containing structural characters are single-quoted
/// with internal quotes doubled, matching what the parser unescapes.
///
/// Branch lengths use the shortest `f64` representation that round-trips, so
/// values survive a serialize/parse cycle exactly.
///
/// # Example
/// ```
/// use phylogeo::newick::{parse_str, NewickWriter};
///
/// let tree = parse_str("((A:1.0,B:2.0)ab:0.5,C:4.0);").unwrap();
/// let newick = NewickWriter::new().write(&tree);
/// assert_eq!(newick, "((A:1,B:2)ab:0.5,C:4);");
///
/// let topology_only = NewickWriter::new().without_branch_lengths().write(&tree);
/// assert_eq!(topology_only, "((A,B)ab,C);");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NewickWriter {
    with_branch_lengths: bool,
    with_terminator: bool,
}

impl NewickWriter {
    /// Creates a writer emitting branch lengths and the `;` terminator.
    pub fn new() -> Self {
        NewickWriter { with_branch_lengths: true, with_terminator: true }
    }

    /// Omits `:length` suffixes from the output.
    pub fn without_branch_lengths(mut self) -> Self {
        self.with_branch_lengths = false;
        self
    }

    /// Omits the trailing `;` terminator.
    pub fn without_terminator(mut self) -> Self {
        self.with_terminator = false;
        self
    }

    /// Serializes the tree (from its root) into a Newick string.
    pub fn write(&self, tree: &Tree) -> String {
        let mut newick = String::with_capacity(self.estimate_len(tree));
        self.build(tree, tree.root_index(), &mut newick);
        if self.with_terminator {
            newick.push(';');
        }
        newick
    }

    fn build(&self, tree: &Tree, index: NodeIndex, newick: &mut String) {
        let node = &tree[index];

        if !node.is_leaf() {
            newick.push('(');
            for (i, &child) in node.children().iter().enumerate() {
                if i > 0 {
                    newick.push(',');
                }
                self.build(tree, child, newick);
            }
            newick.push(')');
        }

        if let Some(label) = node.label() {
            newick.push_str(&escape_label(label));
        }
        if self.with_branch_lengths {
            build_branch_length(newick, node.branch_length());
        }
    }

    /// Estimates the serialized length to pre-allocate the output string:
    /// structural characters, label bytes, and branch lengths.
    fn estimate_len(&self, tree: &Tree) -> usize {
        let mut estimate = if self.with_terminator { 1 } else { 0 };
        for index in tree.pre_order_iter() {
            let node = &tree[index];
            estimate += 3; // '(', ')' or ',' share per node
            estimate += node.label().map_or(0, str::len);
            if self.with_branch_lengths && node.has_branch_length() {
                estimate += BRANCH_LENGTH_CHARS;
            }
        }
        estimate
    }
}

impl Default for NewickWriter {
    fn default() -> Self {
        NewickWriter::new()
    }
}

/// Helper for adding branch lengths
fn build_branch_length(newick: &mut String, branch_length: Option<BranchLength>) {
    if let Some(branch_length) = branch_length {
        newick.push(':');
        newick.push_str(&branch_length.to_string());
    }
}

/// Returns the Newick representation of a tree with branch lengths and
/// closing semicolon; shorthand for the default [NewickWriter].
pub fn to_newick(tree: &Tree) -> String {
    NewickWriter::new().write(tree)
}

/// Writes the given tree to a file in Newick format, followed by a newline.
///
/// # Errors
/// Returns an I/O error if writing fails.
pub fn write_newick_file(file: File, tree: &Tree) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    writer.write_all(to_newick(tree).as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Escapes a label for safe use in Newick text.
///
/// Labels containing structural characters (delimiters, whitespace, quotes)
/// are wrapped in single quotes with internal quotes doubled; all other labels
/// are passed through untouched, so parsed labels round-trip byte-for-byte.
fn escape_label(label: &str) -> Cow<'_, str> {
    let needs_quoting = label.is_empty()
        || label.chars().any(|c| {
            matches!(c, '(' | ')' | ',' | ':' | ';' | '[' | ']' | '\'' | ' ' | '\t' | '\n' | '\r')
        });

    if needs_quoting {
        Cow::Owned(format!("'{}'", label.replace('\'', "''")))
    } else {
        Cow::Borrowed(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_labels_pass_through() {
        assert_eq!(escape_label("taxon_1"), "taxon_1");
    }

    #[test]
    fn structural_characters_are_quoted() {
        assert_eq!(escape_label("Storm petrel"), "'Storm petrel'");
        assert_eq!(escape_label("a:b"), "'a:b'");
        assert_eq!(escape_label("Wilson's"), "'Wilson''s'");
    }
}
