use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A named column of text cells.
///
/// Every cell is kept as the text the source delivered, even when it looks
/// numeric.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Column {
    name: String,
    values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sorted distinct values. An empty cell is a value of its own, listed
    /// first, so blank cells can be selected like any other value.
    pub fn distinct_values(&self) -> Vec<String> {
        self.values
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// A column is offered as a filter dimension only if it holds at least
    /// one non-empty value.
    pub fn is_filterable(&self) -> bool {
        self.values.iter().any(|v| !v.is_empty())
    }
}

/// An in-memory table of text columns sharing one row count.
///
/// Column order is significant (export and record field order follow it);
/// row order only matters for display. A dataset is never mutated after
/// construction: filtering and the other operations build new values.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct TabularDataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl TabularDataset {
    /// The dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a dataset from columns, checking that names are unique and
    /// lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(InventoryError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
            if column.len() != row_count {
                return Err(InventoryError::ColumnLength {
                    column: column.name.clone(),
                    len: column.len(),
                    expected: row_count,
                });
            }
        }

        Ok(TabularDataset { columns, row_count })
    }

    /// Builds a dataset from raw rows where row 0 holds the headers.
    ///
    /// Headers are trimmed; cell values are kept verbatim. Short data rows
    /// are padded with empty strings. An empty input gives an empty dataset.
    ///
    /// # Errors
    /// * `DuplicateColumn` if two headers collide after trimming
    /// * `RowTooLong` if a data row has more cells than the header row
    ///
    /// # Examples
    /// ```
    /// use inventario::dataset::TabularDataset;
    ///
    /// let raw = vec![
    ///     vec![" Tipo ".to_string(), "Fabricante".to_string()],
    ///     vec!["Bomba".to_string(), "ACME".to_string()],
    /// ];
    /// let dataset = TabularDataset::from_raw_rows(raw).unwrap();
    /// assert_eq!(dataset.column_names(), vec!["Tipo", "Fabricante"]);
    /// assert_eq!(dataset.row_count(), 1);
    /// ```
    pub fn from_raw_rows(raw: Vec<Vec<String>>) -> Result<Self> {
        let mut rows = raw.into_iter();
        let headers = match rows.next() {
            Some(headers) => headers,
            None => return Ok(Self::empty()),
        };

        let width = headers.len();
        let mut values: Vec<Vec<String>> = vec![Vec::new(); width];

        // Source row numbers are 1-based with the header on row 1.
        for (index, row) in rows.enumerate() {
            if row.len() > width {
                return Err(InventoryError::RowTooLong {
                    row: index + 2,
                    len: row.len(),
                    expected: width,
                });
            }
            let filled = row.len();
            for (c, cell) in row.into_iter().enumerate() {
                values[c].push(cell);
            }
            for column in values.iter_mut().skip(filled) {
                column.push(String::new());
            }
        }

        let columns = headers
            .iter()
            .zip(values)
            .map(|(header, values)| Column::new(header.trim(), values))
            .collect();

        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when the dataset has no rows (it may still have columns).
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// The cells of row `index` in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.row_count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| c.values[index].as_str())
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.row_count).map(move |r| {
            self.columns
                .iter()
                .map(|c| c.values[r].as_str())
                .collect()
        })
    }

    /// The dataset as raw rows, header first. Inverse of `from_raw_rows`.
    pub fn to_raw_rows(&self) -> Vec<Vec<String>> {
        if self.columns.is_empty() {
            return Vec::new();
        }
        let mut raw = Vec::with_capacity(self.row_count + 1);
        raw.push(self.columns.iter().map(|c| c.name.clone()).collect());
        raw.extend(
            self.rows()
                .map(|row| row.into_iter().map(str::to_string).collect()),
        );
        raw
    }

    /// A new dataset holding the given rows, in the given order.
    pub(crate) fn select_rows(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    indices.iter().map(|&i| c.values[i].clone()).collect(),
                )
            })
            .collect();

        TabularDataset {
            columns,
            row_count: indices.len(),
        }
    }
}
