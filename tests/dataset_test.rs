mod common;

use common::{dataset, raw};
use inventario::dataset::{Column, TabularDataset};
use inventario::error::InventoryError;

#[test]
fn test_headers_are_trimmed_and_cells_kept_verbatim() {
    let ds = TabularDataset::from_raw_rows(raw(&[
        &["  Nome ", "\tCódigo"],
        &[" Bomba ", "007"],
    ]))
    .unwrap();

    assert_eq!(ds.column_names(), vec!["Nome", "Código"]);
    assert_eq!(ds.row(0), Some(vec![" Bomba ", "007"]));
}

#[test]
fn test_empty_source_gives_empty_dataset() {
    let ds = TabularDataset::from_raw_rows(Vec::new()).unwrap();
    assert_eq!(ds, TabularDataset::empty());
    assert_eq!(ds.column_count(), 0);
    assert_eq!(ds.row_count(), 0);
    assert!(ds.is_empty());
}

#[test]
fn test_header_only_source_has_columns_but_no_rows() {
    let ds = dataset(&[&["Nome", "Tipo"]]);
    assert_eq!(ds.column_count(), 2);
    assert_eq!(ds.row_count(), 0);
    assert_eq!(ds.row(0), None);
}

#[test]
fn test_duplicate_headers_after_trimming_are_rejected() {
    let err = TabularDataset::from_raw_rows(raw(&[&["Tipo", " Tipo "], &["a", "b"]])).unwrap_err();
    assert!(matches!(err, InventoryError::DuplicateColumn { ref column } if column == "Tipo"));
}

#[test]
fn test_two_empty_headers_are_duplicates() {
    let err = TabularDataset::from_raw_rows(raw(&[&["Nome", "", " "]])).unwrap_err();
    assert!(matches!(err, InventoryError::DuplicateColumn { ref column } if column.is_empty()));

    // A single empty header is a regular column.
    let ds = dataset(&[&["Nome", ""], &["x", "y"]]);
    assert_eq!(ds.column(""), ds.columns().get(1));
}

#[test]
fn test_long_rows_are_rejected_with_their_row_number() {
    let err = TabularDataset::from_raw_rows(raw(&[
        &["A", "B"],
        &["1", "2"],
        &["1", "2", "3"],
    ]))
    .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::RowTooLong {
            row: 3,
            len: 3,
            expected: 2
        }
    ));
}

#[test]
fn test_row_access_and_lookup() {
    let ds = common::pumps_and_motors();
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.column_index("Fabricante"), Some(1));
    assert_eq!(ds.column_index("Modelo"), None);
    assert_eq!(ds.row(2), Some(vec!["Bomba", "Zeta"]));

    let rows: Vec<Vec<&str>> = ds.rows().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1], vec!["Motor", "ACME"]);
}

#[test]
fn test_raw_rows_round_trip() {
    let ds = common::inventory();
    let again = TabularDataset::from_raw_rows(ds.to_raw_rows()).unwrap();
    assert_eq!(again, ds);
    assert!(TabularDataset::empty().to_raw_rows().is_empty());
}

#[test]
fn test_new_checks_column_lengths() {
    let err = TabularDataset::new(vec![
        Column::new("A", vec!["1".into(), "2".into()]),
        Column::new("B", vec!["1".into()]),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::ColumnLength {
            len: 1,
            expected: 2,
            ..
        }
    ));
}
