use std::io::Write;

use phylogeo::model::{DistanceMatrix, MatrixError};

fn matrix_2x2() -> DistanceMatrix {
    DistanceMatrix::from_parts(
        vec!["a".into(), "b".into()],
        vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    )
    .unwrap()
}

// --- TESTS CONSTRUCTION FROM PARTS ---

#[test]
fn test_get_distance() {
    let m = matrix_2x2();
    assert_eq!(m.distance("a", "b").unwrap(), 2.0);
}

#[test]
fn test_matrix_is_directional() {
    let m = matrix_2x2();
    assert_eq!(m.distance("a", "b").unwrap(), 2.0);
    assert_eq!(m.distance("b", "a").unwrap(), 3.0);
}

#[test]
fn test_get_distance_by_index() {
    let m = matrix_2x2();
    assert_eq!(m.distance_by_index(0, 0), 1.0);
    assert_eq!(m.distance_by_index(0, 1), 2.0);
    assert_eq!(m.distance_by_index(1, 0), 3.0);
    assert_eq!(m.distance_by_index(1, 1), 4.0);
}

#[test]
fn test_label_and_index_queries_agree() {
    let m = matrix_2x2();
    let a = m.index_of("a").unwrap();
    let b = m.index_of("b").unwrap();
    assert_eq!(m.distance("a", "b").unwrap(), m.distance_by_index(a, b));
    assert_eq!(m.label(a), "a");
    assert_eq!(m.header(), &["a".to_string(), "b".to_string()]);
    assert_eq!(m.size(), 2);
}

#[test]
fn test_unknown_label_is_an_error() {
    let m = matrix_2x2();
    let error = m.distance("a", "nope").unwrap_err();
    assert!(matches!(error, MatrixError::UnknownLabel { ref label } if label == "nope"));
    assert!(m.index_of("nope").is_none());
}

#[test]
fn test_not_square_is_an_error() {
    let result = DistanceMatrix::from_parts(
        vec!["a".into(), "b".into()],
        vec![vec![1.0, 2.0]],
    );
    assert!(matches!(result, Err(MatrixError::NotSquare { rows: 1, states: 2 })));
}

#[test]
fn test_row_width_mismatch_is_an_error() {
    let result = DistanceMatrix::from_parts(
        vec!["a".into(), "b".into()],
        vec![vec![1.0, 2.0], vec![3.0]],
    );
    assert!(matches!(result, Err(MatrixError::RowWidth { row: 2, expected: 2, found: 1 })));
}

#[test]
fn test_duplicate_header_label_is_an_error() {
    let result = DistanceMatrix::from_parts(
        vec!["a".into(), "a".into()],
        vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    );
    assert!(matches!(result, Err(MatrixError::DuplicateLabel { .. })));
}

#[test]
fn test_empty_matrix_is_an_error() {
    assert!(matches!(
        DistanceMatrix::from_parts(vec![], vec![]),
        Err(MatrixError::Empty)
    ));
}

#[test]
fn test_rename_label() {
    let mut m = matrix_2x2();
    m.rename_label("b", "c").unwrap();
    assert_eq!(m.distance("a", "c").unwrap(), 2.0);
    assert!(m.distance("a", "b").is_err());
    // Renaming onto an existing label must be rejected
    assert!(matches!(
        m.rename_label("a", "c"),
        Err(MatrixError::RenameCollision { .. })
    ));
}

// --- TESTS CONSTRUCTION FROM FILE ---

fn write_temp(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{contents}").unwrap();
    (dir, path)
}

#[test]
fn test_read_matrix_from_csv() {
    let (_dir, path) = write_temp(",FRA,JFK,LHR\nFRA,0,1.5,2\nJFK,1.5,0,3\nLHR,2,3,0\n");
    let m = DistanceMatrix::from_path(&path).unwrap();
    assert_eq!(m.size(), 3);
    assert_eq!(m.header(), &["FRA".to_string(), "JFK".to_string(), "LHR".to_string()]);
    assert_eq!(m.distance("FRA", "JFK").unwrap(), 1.5);
    assert_eq!(m.distance("LHR", "FRA").unwrap(), 2.0);
}

#[test]
fn test_file_and_literal_construction_agree() {
    let (_dir, path) = write_temp(",a,b\na,1,2\nb,3,4\n");
    let from_file = DistanceMatrix::from_path(&path).unwrap();
    let from_parts = matrix_2x2();
    for from in ["a", "b"] {
        for to in ["a", "b"] {
            assert_eq!(
                from_file.distance(from, to).unwrap(),
                from_parts.distance(from, to).unwrap()
            );
        }
    }
}

#[test]
fn test_read_matrix_with_quoted_header() {
    let (_dir, path) = write_temp("\"\",\"FRA\",\"JFK\"\nFRA,0,1\nJFK,1,0\n");
    let m = DistanceMatrix::from_path(&path).unwrap();
    assert_eq!(m.header(), &["FRA".to_string(), "JFK".to_string()]);
}

#[test]
fn test_read_matrix_with_custom_delimiter() {
    let (_dir, path) = write_temp("\tFRA\tJFK\nFRA\t0\t1\nJFK\t1\t0\n");
    let m = DistanceMatrix::from_path_with_delimiter(&path, b'\t').unwrap();
    assert_eq!(m.distance("FRA", "JFK").unwrap(), 1.0);
}

#[test]
fn test_read_matrix_rejects_bad_number() {
    let (_dir, path) = write_temp(",a,b\na,1,oops\nb,3,4\n");
    let error = DistanceMatrix::from_path(&path).unwrap_err();
    assert!(matches!(error, MatrixError::InvalidNumber { ref text, .. } if text == "oops"));
}

#[test]
fn test_read_matrix_rejects_missing_row() {
    let (_dir, path) = write_temp(",a,b\na,1,2\n");
    assert!(matches!(
        DistanceMatrix::from_path(&path),
        Err(MatrixError::NotSquare { rows: 1, states: 2 })
    ));
}

#[test]
fn test_read_matrix_missing_file() {
    assert!(DistanceMatrix::from_path("does/not/exist.csv").is_err());
}
