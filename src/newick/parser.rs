//! Newick string parser producing [Tree]s.

use log::debug;

use crate::model::node::BranchLength;
use crate::model::tree::{NodeIndex, Tree};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parse_error::ParseError;

/// Default guess for number of nodes, when unknown
const DEFAULT_NUM_NODES_GUESS: usize = 16;

/// Parser (configuration) for Newick format phylogenetic [Tree]s.
///
/// # Format
/// The Newick format has the following simple structure:
/// * tree ::= node ';'
/// * node ::= '(' node (',' node)* ')' \[label\] \[branch_length\] | label \[branch_length\]
/// * branch_length ::= ':' number
///
/// Multifurcating nodes (more than two children) and labels on internal nodes
/// are part of the grammar; a bare label is a one-node tree; labels may be
/// empty, yielding an unlabeled node. Furthermore:
/// * Whitespace can occur between elements, just not within an unquoted label
///   or a branch_length
/// * Labels can be quoted with single quotes, internal quotes doubled
/// * Comments are square brackets and can occur wherever whitespace can
///
/// Children are appended in left-to-right input order; this order is preserved
/// by serialization and order-dependent diagnostics.
///
/// # Failure
/// Parsing fails fast with a [ParseError] on unbalanced parentheses, a missing
/// `;` terminator, or an invalid (negative, non-finite, malformed) branch
/// length. No partially built tree is returned.
///
/// # Implementation
/// The parser is a single left-to-right scan driven by an explicit stack of
/// open children groups, one frame per unmatched `(`. Sibling boundaries are
/// therefore only ever recognized at the top nesting level of the node under
/// construction, and recursion depth is independent of tree shape — a
/// maximally unbalanced tree costs heap, not call stack.
///
/// # Example
/// ```
/// use phylogeo::newick::NewickParser;
/// use phylogeo::parser::ByteParser;
///
/// let mut bytes = ByteParser::from_str("((A:1.0,B:1.0):0.5,C:1.5)root;");
/// let tree = NewickParser::new().parse(&mut bytes).unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// assert_eq!(tree.root().label(), Some("root"));
/// ```
pub struct NewickParser {
    node_capacity: usize,
}

impl NewickParser {
    /// Creates a new `NewickParser` with default settings.
    pub fn new() -> Self {
        Self { node_capacity: DEFAULT_NUM_NODES_GUESS }
    }

    /// Sets the expected number of nodes in the tree, allowing the arena to be
    /// pre-allocated.
    pub fn with_node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }

    /// Parses a single Newick tree from the given [ByteParser], consuming the
    /// input up to and including the `;` terminator.
    ///
    /// # Returns
    /// * `Ok(Tree)` - The parsed phylogenetic tree
    /// * `Err(ParseError)` - If the Newick text is invalid
    pub fn parse<S: ByteSource>(&self, parser: &mut ByteParser<S>) -> Result<Tree, ParseError> {
        let mut tree = Tree::with_capacity(self.node_capacity);

        // One frame of collected children per currently open '('
        let mut frames: Vec<Vec<NodeIndex>> = Vec::new();

        loop {
            parser.skip_comment_and_whitespace()?;

            // Open groups until the next element starts
            while parser.consume_if(b'(') {
                frames.push(Vec::new());
                parser.skip_comment_and_whitespace()?;
            }

            // The element at this position has no children of its own
            let mut node = self.parse_node_description(parser, &mut tree, Vec::new())?;

            // Close groups and hand completed nodes to their parent frame
            loop {
                parser.skip_comment_and_whitespace()?;
                match parser.peek() {
                    Some(b',') => {
                        // A comma outside any '(' group has no frame to add to
                        let Some(frame) = frames.last_mut() else {
                            return Err(ParseError::unexpected_character(parser, b','));
                        };
                        parser.next();
                        frame.push(node);
                        break;
                    }
                    Some(b')') => {
                        parser.next();
                        let mut frame = frames.pop().ok_or_else(|| ParseError::unbalanced(parser))?;
                        frame.push(node);
                        node = self.parse_node_description(parser, &mut tree, frame)?;
                    }
                    Some(b';') => {
                        parser.next();
                        if !frames.is_empty() {
                            return Err(ParseError::unbalanced(parser));
                        }
                        tree.set_root(node);
                        debug!("parsed newick tree with {} nodes", tree.num_nodes());
                        return Ok(tree);
                    }
                    Some(found) => return Err(ParseError::unexpected_character(parser, found)),
                    None => {
                        return Err(if frames.is_empty() {
                            ParseError::missing_terminator(parser)
                        } else {
                            ParseError::unbalanced(parser)
                        });
                    }
                }
            }
        }
    }

    /// Parses the trailing parts of a node description — `[label][:length]` —
    /// and creates the node with the given, already parsed children.
    fn parse_node_description<S: ByteSource>(
        &self,
        parser: &mut ByteParser<S>,
        tree: &mut Tree,
        children: Vec<NodeIndex>,
    ) -> Result<NodeIndex, ParseError> {
        let label = parser.parse_label()?;
        let label = if label.is_empty() { None } else { Some(label) };
        let branch_length = self.parse_branch_length(parser)?;

        let node = tree.add_node(label.as_deref(), branch_length);
        for child in children {
            tree.attach_child(node, child);
        }
        Ok(node)
    }

    /// Parses an optional branch length `[:number]`, supporting scientific
    /// notation (e.g. `1.5e-10`).
    ///
    /// # Returns
    /// - `Some(BranchLength)` if a branch length was found and parsed
    /// - `None` if no `:` follows the node
    /// - [ParseError] on a malformed, negative, or non-finite value
    fn parse_branch_length<S: ByteSource>(
        &self,
        parser: &mut ByteParser<S>,
    ) -> Result<Option<BranchLength>, ParseError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let mut text = String::new();
        while let Some(b) = parser.peek() {
            // Valid characters for a float: digits, '.', '-', '+', 'e', 'E'
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                text.push(b as char);
                parser.next();
            } else {
                break;
            }
        }

        match text.parse::<f64>().ok().and_then(BranchLength::try_new) {
            Some(branch_length) => Ok(Some(branch_length)),
            None => Err(ParseError::invalid_branch_length(parser, text)),
        }
    }
}

impl Default for NewickParser {
    fn default() -> Self {
        NewickParser::new()
    }
}
