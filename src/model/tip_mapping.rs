//! Mapping from leaf labels to observed state labels.
//!
//! A tip mapping associates each tip (leaf) of a tree, e.g. a sample ID, with
//! its observed state, e.g. the airport it was collected at. It is supplied to
//! the reconstruction engine and never mutated by it.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use thiserror::Error;

/// Errors raised while loading a [TipMapping] file.
#[derive(Debug, Error)]
pub enum TipMappingError {
    #[error("tip mapping row {row} has no state column")]
    MissingState { row: usize },

    #[error("failed to read tip mapping: {0}")]
    Csv(#[from] csv::Error),
}

// =#========================================================================#=
// TIP MAPPING
// =#========================================================================#=
/// Observed state per leaf label.
///
/// # Example
/// ```
/// use phylogeo::model::TipMapping;
///
/// let mut tips = TipMapping::new();
/// tips.insert("sample_1", "FRA");
/// assert_eq!(tips.get("sample_1"), Some("FRA"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TipMapping {
    map: HashMap<String, String>,
}

impl TipMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        TipMapping { map: HashMap::new() }
    }

    /// Reads a tab-delimited mapping file, see
    /// [TipMapping::from_path_with_delimiter].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TipMappingError> {
        Self::from_path_with_delimiter(path, b'\t')
    }

    /// Reads a delimited mapping file: the header row is skipped, each
    /// following row is `<leaf label><delimiter><state label>`; surrounding
    /// whitespace is trimmed. Extra columns are ignored.
    pub fn from_path_with_delimiter<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, TipMappingError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path.as_ref())?;

        let mut mapping = TipMapping::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let leaf = match record.get(0) {
                Some(field) if !field.is_empty() => field,
                _ => continue,
            };
            let state = record
                .get(1)
                .filter(|field| !field.is_empty())
                .ok_or(TipMappingError::MissingState { row: i + 2 })?;
            mapping.insert(leaf, state);
        }

        info!(
            "loaded tip mapping for {} leaves from {}",
            mapping.len(),
            path.as_ref().display()
        );
        Ok(mapping)
    }

    /// Associates `leaf` with `state`, replacing any previous association.
    pub fn insert(&mut self, leaf: &str, state: &str) {
        self.map.insert(leaf.to_string(), state.to_string());
    }

    /// Returns the observed state for `leaf`, if mapped.
    pub fn get(&self, leaf: &str) -> Option<&str> {
        self.map.get(leaf).map(String::as_str)
    }

    /// Returns whether `leaf` is mapped.
    pub fn contains(&self, leaf: &str) -> bool {
        self.map.contains_key(leaf)
    }

    /// Returns the number of mapped leaves.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for TipMapping {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        TipMapping {
            map: iter.into_iter().map(|(leaf, state)| (leaf.into(), state.into())).collect(),
        }
    }
}
