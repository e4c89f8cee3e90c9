use crate::dataset::TabularDataset;
use crate::error::{InventoryError, Result};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Accepted values per column for one interaction.
///
/// A column absent from the selection is unconstrained. Empty value sets
/// are never stored, so every stored constraint accepts at least one value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSelection {
    constraints: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from `(column, value)` pairs, grouping values by
    /// column.
    pub fn from_pairs<I, C, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, V)>,
        C: Into<String>,
        V: Into<String>,
    {
        let mut selection = Self::new();
        for (column, value) in pairs {
            selection
                .constraints
                .entry(column.into())
                .or_default()
                .insert(value.into());
        }
        selection
    }

    /// Replaces the accepted values of `column`. An empty set removes the
    /// constraint.
    pub fn insert<I, V>(&mut self, column: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let column = column.into();
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.constraints.remove(&column);
        } else {
            self.constraints.insert(column, values);
        }
    }

    pub fn with<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.insert(column, values);
        self
    }

    pub fn accepted(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.constraints.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.constraints.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }
}

/// The choices offered for one filterable column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub column: String,
    pub values: Vec<String>,
}

/// Lists the filterable columns of `dataset` with their sorted distinct
/// values, the empty value included when some cell is blank.
///
/// Columns that are empty in every row are left out here but stay in the
/// dataset.
pub fn filter_options(dataset: &TabularDataset) -> Vec<FilterOption> {
    dataset
        .columns()
        .iter()
        .filter(|c| c.is_filterable())
        .map(|c| FilterOption {
            column: c.name().to_string(),
            values: c.distinct_values(),
        })
        .collect()
}

/// Keeps the rows of `dataset` whose value in every constrained column is
/// one of that column's accepted values.
///
/// The result is always a new dataset, even for an empty selection.
///
/// # Errors
/// * `InvalidColumn` if the selection names a column the dataset lacks
///
/// # Examples
/// ```
/// use inventario::dataset::TabularDataset;
/// use inventario::filter::{apply, FilterSelection};
///
/// let raw = vec![
///     vec!["Tipo".to_string(), "Fabricante".to_string()],
///     vec!["Bomba".to_string(), "ACME".to_string()],
///     vec!["Motor".to_string(), "ACME".to_string()],
/// ];
/// let dataset = TabularDataset::from_raw_rows(raw).unwrap();
/// let selection = FilterSelection::new().with("Tipo", ["Bomba"]);
/// let filtered = apply(&dataset, &selection).unwrap();
/// assert_eq!(filtered.row_count(), 1);
/// ```
pub fn apply(dataset: &TabularDataset, selection: &FilterSelection) -> Result<TabularDataset> {
    let mut constraints = Vec::with_capacity(selection.len());
    for (column, accepted) in &selection.constraints {
        let column = dataset
            .column(column)
            .ok_or_else(|| InventoryError::invalid_column(column.as_str()))?;
        constraints.push((column.values(), accepted));
    }

    if constraints.is_empty() {
        return Ok(dataset.clone());
    }

    let kept: Vec<usize> = (0..dataset.row_count())
        .filter(|&r| {
            constraints
                .iter()
                .all(|(values, accepted)| accepted.contains(&values[r]))
        })
        .collect();

    debug!(
        "filter kept {} of {} rows over {} column(s)",
        kept.len(),
        dataset.row_count(),
        constraints.len()
    );

    Ok(dataset.select_rows(&kept))
}
