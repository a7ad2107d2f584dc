//! Labeled square cost table between discrete states.
//!
//! The matrix answers point-to-point cost queries by state label or, on the
//! reconstruction hot path, by integer index. Costs are directional: a value
//! is always read as the cost from a parent's (candidate) state to a child's
//! candidate state, and the matrix is not assumed symmetric — effective
//! distance variants are directional by construction.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use thiserror::Error;

/// Errors raised while building or querying a [DistanceMatrix].
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("distance matrix has no states")]
    Empty,

    #[error("distance matrix is not square: {rows} rows for {states} states")]
    NotSquare { rows: usize, states: usize },

    #[error("row {row} of distance matrix has {found} values, expected {expected}")]
    RowWidth { row: usize, expected: usize, found: usize },

    #[error("duplicate state label {label:?} in distance matrix header")]
    DuplicateLabel { label: String },

    #[error("unknown state label {label:?}")]
    UnknownLabel { label: String },

    #[error("state label {label:?} already present, cannot rename {old:?} to it")]
    RenameCollision { old: String, label: String },

    #[error("invalid number {text:?} in distance matrix row {row}, column {column}")]
    InvalidNumber { row: usize, column: usize, text: String },

    #[error("failed to read distance matrix: {0}")]
    Csv(#[from] csv::Error),
}

// =#========================================================================#=
// DISTANCE MATRIX
// =#========================================================================#=
/// A labeled N×N cost table over discrete states.
///
/// Values are stored in one flat row-major vector so that a full cost row —
/// all costs out of one state — is a contiguous slice. The reconstruction
/// forward pass runs its min-plus inner loop along such rows.
///
/// The matrix is immutable after construction, except for
/// [DistanceMatrix::rename_label], which preserves all invariants.
///
/// # Example
/// ```
/// use phylogeo::model::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_parts(
///     vec!["a".into(), "b".into()],
///     vec![vec![0.0, 2.0], vec![3.0, 0.0]],
/// ).unwrap();
///
/// assert_eq!(matrix.distance("a", "b").unwrap(), 2.0);
/// assert_eq!(matrix.distance_by_index(1, 0), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    /// Ordered state labels; defines the index space of the matrix
    header: Vec<String>,
    /// Row-major N×N cost values
    values: Vec<f64>,
    /// Label → index, built once at construction
    index: HashMap<String, usize>,
}

impl DistanceMatrix {
    /// Builds a matrix from an ordered header and per-row cost values.
    ///
    /// Fails if the header is empty, contains duplicates, or the value rows do
    /// not form a square of matching dimension.
    pub fn from_parts(header: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let n = header.len();
        if n == 0 {
            return Err(MatrixError::Empty);
        }
        if rows.len() != n {
            return Err(MatrixError::NotSquare { rows: rows.len(), states: n });
        }

        let mut index = HashMap::with_capacity(n);
        for (i, label) in header.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(MatrixError::DuplicateLabel { label: label.clone() });
            }
        }

        let mut values = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(MatrixError::RowWidth { row: i + 1, expected: n, found: row.len() });
            }
            values.extend_from_slice(row);
        }

        Ok(DistanceMatrix { header, values, index })
    }

    /// Reads a comma-delimited matrix file, see
    /// [DistanceMatrix::from_path_with_delimiter].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        Self::from_path_with_delimiter(path, b',')
    }

    /// Reads a delimited matrix file.
    ///
    /// Row 1 supplies the state labels, with the first field ignored (it marks
    /// the row-label column). Each following row supplies one row of costs,
    /// again with the first field ignored. Quoted fields and surrounding
    /// whitespace are handled by the reader.
    pub fn from_path_with_delimiter<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, MatrixError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let header: Vec<String> = reader.headers()?.iter().skip(1).map(str::to_string).collect();

        let mut rows = Vec::with_capacity(header.len());
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let mut row = Vec::with_capacity(header.len());
            for (j, field) in record.iter().skip(1).enumerate() {
                let value: f64 = field.parse().map_err(|_| MatrixError::InvalidNumber {
                    row: i + 1,
                    column: j + 1,
                    text: field.to_string(),
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        let matrix = Self::from_parts(header, rows)?;
        info!(
            "loaded {}x{} distance matrix from {}",
            matrix.size(),
            matrix.size(),
            path.as_ref().display()
        );
        Ok(matrix)
    }

    /// Returns the number of states N.
    pub fn size(&self) -> usize {
        self.header.len()
    }

    /// Returns the ordered state labels.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Returns the label of the state at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn label(&self, index: usize) -> &str {
        &self.header[index]
    }

    /// Returns the index of `label` in the header, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Returns the cost from state `from` to state `to`, O(1) via the header
    /// index. Fails if either label is absent.
    pub fn distance(&self, from: &str, to: &str) -> Result<f64, MatrixError> {
        let from_index = self
            .index_of(from)
            .ok_or_else(|| MatrixError::UnknownLabel { label: from.to_string() })?;
        let to_index = self
            .index_of(to)
            .ok_or_else(|| MatrixError::UnknownLabel { label: to.to_string() })?;
        Ok(self.distance_by_index(from_index, to_index))
    }

    /// Returns the cost from state index `from` to state index `to` by direct
    /// array access; used on the reconstruction hot path to avoid repeated
    /// label lookups.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn distance_by_index(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.header.len() + to]
    }

    /// Returns the contiguous cost row out of state index `from`.
    ///
    /// # Panics
    /// Panics if `from` is out of bounds.
    #[inline]
    pub fn row(&self, from: usize) -> &[f64] {
        let n = self.header.len();
        &self.values[from * n..(from + 1) * n]
    }

    /// Renames the state `old` to `new`, preserving header order, uniqueness,
    /// and all cost values.
    pub fn rename_label(&mut self, old: &str, new: &str) -> Result<(), MatrixError> {
        if old == new {
            return Ok(());
        }
        let position = self
            .index_of(old)
            .ok_or_else(|| MatrixError::UnknownLabel { label: old.to_string() })?;
        if self.index.contains_key(new) {
            return Err(MatrixError::RenameCollision { old: old.to_string(), label: new.to_string() });
        }

        self.index.remove(old);
        self.index.insert(new.to_string(), position);
        self.header[position] = new.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> DistanceMatrix {
        DistanceMatrix::from_parts(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_get_distance() {
        let m = two_by_two();
        assert_eq!(m.distance("a", "b").unwrap(), 2.0);
        assert_eq!(m.distance("b", "a").unwrap(), 3.0);
    }

    #[test]
    fn test_row_is_contiguous() {
        let m = two_by_two();
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_rename_label() {
        let mut m = two_by_two();
        m.rename_label("a", "c").unwrap();
        assert_eq!(m.header(), &["c".to_string(), "b".to_string()]);
        assert_eq!(m.distance("c", "b").unwrap(), 2.0);
        assert!(m.distance("a", "b").is_err());
        assert!(m.rename_label("c", "b").is_err());
    }
}
