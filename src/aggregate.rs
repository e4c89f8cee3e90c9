use crate::dataset::TabularDataset;
use crate::error::{InventoryError, Result};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// One bar of a distribution: a distinct value and how many rows hold it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Value frequencies for one column, most frequent first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionResult {
    pub column: String,
    pub entries: Vec<ValueCount>,
}

impl DistributionResult {
    /// Sum of all counts; equals the row count of the aggregated dataset.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|e| e.count).max().unwrap_or(0)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|e| (e.value.as_str(), e.count))
    }
}

/// Columns offered for charting.
///
/// Every cell is text, so every column is categorical; the caller picks one.
pub fn chartable_columns(dataset: &TabularDataset) -> Vec<&str> {
    dataset.column_names()
}

/// Counts the occurrences of each distinct value of `column`.
///
/// Empty cells form their own group. Entries are sorted by count
/// descending; equal counts keep the order in which the values first
/// appear.
///
/// # Errors
/// * `InvalidColumn` if `column` is not a column of `dataset`
///
/// # Examples
/// ```
/// use inventario::aggregate::aggregate;
/// use inventario::dataset::TabularDataset;
///
/// let raw = vec![
///     vec!["Fabricante".to_string()],
///     vec!["Zeta".to_string()],
///     vec!["ACME".to_string()],
///     vec!["ACME".to_string()],
/// ];
/// let dataset = TabularDataset::from_raw_rows(raw).unwrap();
/// let dist = aggregate(&dataset, "Fabricante").unwrap();
/// assert_eq!(dist.pairs().collect::<Vec<_>>(), vec![("ACME", 2), ("Zeta", 1)]);
/// ```
pub fn aggregate(dataset: &TabularDataset, column: &str) -> Result<DistributionResult> {
    let values = dataset
        .column(column)
        .ok_or_else(|| InventoryError::invalid_column(column))?
        .values();

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<ValueCount> = Vec::new();
    for value in values {
        match positions.get(value.as_str()) {
            Some(&i) => entries[i].count += 1,
            None => {
                positions.insert(value.as_str(), entries.len());
                entries.push(ValueCount {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so ties stay in first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    debug!(
        "distribution of '{}': {} distinct values over {} rows",
        column,
        entries.len(),
        values.len()
    );

    Ok(DistributionResult {
        column: column.to_string(),
        entries,
    })
}
