use std::io::Write;

use phylogeo::model::Tree;
use phylogeo::newick::{NewickParser, NewickWriter, parse_file, parse_str, to_newick};
use phylogeo::parser::ByteParser;

// --- TESTS NEWICK STRING PARSING ---
#[test]
fn test_basic_tree() {
    let newick = "((A:1.0,B:2.0):3.0,C:4.0):0.5;";
    let tree = parse_str(newick).unwrap();

    // Test counts
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 2);
    assert_eq!(tree.num_nodes(), 5);
    assert!(tree.is_valid());

    // Test relationships
    // - Root has children (internal, C)
    let root = tree.root();
    assert!(root.is_root());
    assert_eq!(root.children().len(), 2);
    let internal = &tree[root.children()[0]];
    let leaf_c = &tree[root.children()[1]];
    assert!(!internal.is_leaf());
    assert!(leaf_c.is_leaf());
    assert_eq!(leaf_c.label(), Some("C"));

    // - Internal node has children (A, B), in input order
    let leaf_a = &tree[internal.children()[0]];
    let leaf_b = &tree[internal.children()[1]];
    assert_eq!(leaf_a.label(), Some("A"));
    assert_eq!(leaf_b.label(), Some("B"));

    // - Parent relationships
    assert_eq!(internal.parent(), Some(root.index()));
    assert_eq!(leaf_a.parent(), Some(internal.index()));
    assert_eq!(leaf_b.parent(), Some(internal.index()));
    assert_eq!(leaf_c.parent(), Some(root.index()));

    // - Branch lengths, root's included
    assert_eq!(leaf_a.branch_length().map(|bl| *bl), Some(1.0));
    assert_eq!(internal.branch_length().map(|bl| *bl), Some(3.0));
    assert_eq!(root.branch_length().map(|bl| *bl), Some(0.5));
}

#[test]
fn test_single_leaf_tree() {
    let tree = parse_str("a:3.2;").unwrap();
    let root = tree.root();
    assert_eq!(root.label(), Some("a"));
    assert!(root.is_leaf());
    assert!(root.is_root());
    assert_eq!(root.branch_length().map(|bl| *bl), Some(3.2));
}

#[test]
fn test_multifurcation_with_root_label() {
    let tree = parse_str("(a:3.2, b, c:2.1)d;").unwrap();
    let root = tree.root();
    assert_eq!(root.label(), Some("d"));
    assert!(!root.is_leaf());
    assert_eq!(root.children().len(), 3);
    assert_eq!(tree[root.children()[0]].label(), Some("a"));
    assert_eq!(tree[root.children()[1]].label(), Some("b"));
    assert_eq!(tree[root.children()[2]].label(), Some("c"));
    assert!(tree[root.children()[1]].branch_length().is_none());
}

#[test]
fn test_empty_label_with_edge_length() {
    let tree = parse_str("(:0.5,A:1.0);").unwrap();
    let root = tree.root();
    let unlabeled = &tree[root.children()[0]];
    assert_eq!(unlabeled.label(), None);
    assert_eq!(unlabeled.branch_length().map(|bl| *bl), Some(0.5));
    assert_eq!(tree[root.children()[1]].label(), Some("A"));
}

#[test]
fn test_tree_without_root_branch() {
    let tree = parse_str("((A:1.0,B:2.0):3.0,C:4.0);").unwrap();
    assert_eq!(tree.num_leaves(), 3);
    assert!(tree.root().branch_length().is_none());
}

#[test]
fn test_tree_with_quoted_labels() {
    let newick = "(('Taxon one':1.5,'Second''s taxon':2.5):3.0,'3rd: Taxon':4.0);";
    let tree = parse_str(newick).unwrap();

    let labels: Vec<_> = tree
        .leaves(tree.root_index())
        .into_iter()
        .map(|leaf| tree[leaf].label().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["Taxon one", "Second's taxon", "3rd: Taxon"]);
}

#[test]
fn test_tree_with_scientific_notation() {
    let tree = parse_str("((A:1e-5,B:2.5E+3):1.0e2,C:3.14E-10);").unwrap();
    let leaf_a = tree.leaves(tree.root_index())[0];
    assert_eq!(tree[leaf_a].branch_length().map(|bl| *bl), Some(1e-5));
}

#[test]
fn test_newick_with_comments() {
    let newick = "[A tree of] (([Shags!]A[Great Commentoran]:0.33,B[Pied Commentoran]:0.33):1.87,C:[King Commentoran]2.2);";
    let tree = parse_str(newick).unwrap();
    assert_eq!(tree.num_leaves(), 3);
}

#[test]
fn test_whitespace_tolerance() {
    let tree = parse_str("( A : 1.0 ,\n ( B , C ) inner : 2.0 ) ;").unwrap();
    assert_eq!(tree.num_leaves(), 3);
    let inner = &tree[tree.root().children()[1]];
    assert_eq!(inner.label(), Some("inner"));
}

#[test]
fn test_parser_configuration() {
    let mut bytes = ByteParser::from_str("(A,B);");
    let tree = NewickParser::new().with_node_capacity(3).parse(&mut bytes).unwrap();
    assert_eq!(tree.num_nodes(), 3);
}

// --- TESTS DEALING WITH CORRUPT NEWICK STRINGS ---

#[test]
fn test_missing_semicolon() {
    assert!(parse_str("((A:1.0,B:2.0):3.0,C:4.0):0.5").is_err());
}

#[test]
fn test_missing_comma() {
    assert!(parse_str("((A:1.0 B:2.0):3.0,C:4.0):0.5;").is_err());
}

#[test]
fn test_unmatched_open_parenthesis() {
    assert!(parse_str("((A:1.0,B:2.0):3.0;").is_err());
    assert!(parse_str("((A,B),C").is_err());
}

#[test]
fn test_unmatched_close_parenthesis() {
    assert!(parse_str("(A:1.0,B:2.0));").is_err());
}

#[test]
fn test_invalid_branch_length() {
    assert!(parse_str("((A:1.0,B:abc):3.0,C:4.0):0.5;").is_err());
    assert!(parse_str("(A:-1.0,B:2.0);").is_err());
}

#[test]
fn test_trailing_content() {
    assert!(parse_str("(A,B); junk").is_err());
    // Whitespace and comments after the terminator are fine
    assert!(parse_str("(A,B); [all done]\n").is_ok());
}

#[test]
fn test_unclosed_quote() {
    assert!(parse_str("('Taxon one,B);").is_err());
}

#[test]
fn test_error_reports_position() {
    let error = parse_str("(A:1.0 B:2.0);").unwrap_err();
    let message = error.to_string();
    assert!(message.contains("position"), "unhelpful message: {message}");
}

// --- TESTS SERIALIZATION ---

#[test]
fn test_serialize_canonical_string() {
    let newick = "((A:1,B:2)ab:0.5,C:4);";
    let tree = parse_str(newick).unwrap();
    assert_eq!(to_newick(&tree), newick);
}

#[test]
fn test_serialize_without_branch_lengths() {
    let tree = parse_str("((A:1,B:2):0.5,C:4);").unwrap();
    let out = NewickWriter::new().without_branch_lengths().write(&tree);
    assert_eq!(out, "((A,B),C);");
}

#[test]
fn test_serialize_without_terminator() {
    let tree = parse_str("(A,B);").unwrap();
    let out = NewickWriter::new().without_terminator().write(&tree);
    assert_eq!(out, "(A,B)");
}

#[test]
fn test_serialize_quotes_special_labels() {
    let tree = parse_str("('Taxon one','Second''s taxon');").unwrap();
    assert_eq!(to_newick(&tree), "('Taxon one','Second''s taxon');");
}

fn assert_isomorphic(a: &Tree, b: &Tree) {
    fn assert_nodes_equal(a: &Tree, ai: usize, b: &Tree, bi: usize) {
        let left = &a[ai];
        let right = &b[bi];
        assert_eq!(left.label(), right.label());
        match (left.branch_length(), right.branch_length()) {
            (Some(x), Some(y)) => assert!((*x - *y).abs() < 1e-12),
            (None, None) => {}
            _ => panic!("branch length mismatch at {:?}", left.label()),
        }
        assert_eq!(left.children().len(), right.children().len());
        for (&ac, &bc) in left.children().iter().zip(right.children()) {
            assert_nodes_equal(a, ac, b, bc);
        }
    }
    assert_nodes_equal(a, a.root_index(), b, b.root_index());
}

#[test]
fn test_round_trip_is_isomorphic() {
    let inputs = [
        "a;",
        "(a:3.2, b, c:2.1)d;",
        "((A:1.0,B:2.0):3.0,C:4.0):0.5;",
        "((A:1e-5,B:2.5E+3):1.0e2,C:3.14E-10);",
        "(('Taxon one':1.5,'Second''s taxon':2.5):3.0,C:4.0);",
        "(,A);",
        "(((((deep,deeper),d3),d4),d5),shallow);",
    ];
    for input in inputs {
        let tree = parse_str(input).unwrap();
        let reparsed = parse_str(to_newick(&tree)).unwrap();
        assert_isomorphic(&tree, &reparsed);
    }
}

// --- TESTS PARSING WHOLE FILE ---
#[test]
fn test_parse_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.nwk");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "((A:1,B:2):0.5,C:4);").unwrap();
    drop(file);

    let tree = parse_file(&path).unwrap();
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(to_newick(&tree), "((A:1,B:2):0.5,C:4);");
}

#[test]
fn test_parse_file_missing() {
    assert!(parse_file("does/not/exist.nwk").is_err());
}
