//! Feature context supplied to strategies, one row per bar.
//!
//! Feature names are sorted and deduplicated at construction so nothing
//! downstream can depend on insertion order. Warmup rows carry NaN; strategies
//! are expected to treat NaN as "not ready".

use crate::domain::Bar;

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("feature column `{name}` has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        got: usize,
        expected: usize,
    },

    #[error("duplicate feature name: {0}")]
    DuplicateName(String),

    #[error("feature `{0}` failed to compute: {1}")]
    Compute(String, String),
}

/// Computes a feature matrix from validated bars. Implementations live with
/// the runner; the engine only consumes the resulting matrix.
pub trait FeatureProvider {
    fn names(&self) -> Vec<String>;
    fn compute(&self, bars: &[Bar]) -> Result<FeatureMatrix, FeatureError>;
}

/// Dense per-bar feature values with alphabetically sorted unique names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build from named columns of equal length. Names are sorted; a
    /// duplicate name is an error rather than a silent overwrite.
    pub fn from_columns(
        n_rows: usize,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, FeatureError> {
        let mut columns = columns;
        columns.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in columns.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(FeatureError::DuplicateName(pair[0].0.clone()));
            }
        }
        for (name, values) in &columns {
            if values.len() != n_rows {
                return Err(FeatureError::LengthMismatch {
                    name: name.clone(),
                    got: values.len(),
                    expected: n_rows,
                });
            }
        }

        let names: Vec<String> = columns.iter().map(|(n, _)| n.clone()).collect();
        let rows = (0..n_rows)
            .map(|i| columns.iter().map(|(_, v)| v[i]).collect())
            .collect();
        Ok(Self { names, rows })
    }

    /// A matrix with no features, one (empty) row per bar.
    pub fn empty(n_rows: usize) -> Self {
        Self {
            names: Vec::new(),
            rows: vec![Vec::new(); n_rows],
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> FeatureRow<'_> {
        FeatureRow {
            names: &self.names,
            values: &self.rows[index],
        }
    }
}

/// One bar's feature values, borrowed from the matrix.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    names: &'a [String],
    values: &'a [f64],
}

impl<'a> FeatureRow<'a> {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .binary_search_by(|n| n.as_str().cmp(name))
            .ok()
            .map(|i| self.values[i])
    }

    pub fn names(&self) -> &'a [String] {
        self.names
    }
}
