mod common;

use common::{dataset, inventory, pumps_and_motors};
use inventario::dataset::TabularDataset;
use inventario::downloader::{to_csv, to_xlsx};
use inventario::error::InventoryError;
use inventario::filter::{FilterSelection, apply};
use inventario::loader::{parse_csv, read_xlsx};

fn reparse(bytes: &[u8], sheet: &str) -> TabularDataset {
    TabularDataset::from_raw_rows(read_xlsx(bytes, Some(sheet)).unwrap()).unwrap()
}

#[test]
fn test_xlsx_round_trip() {
    let ds = inventory();
    let bytes = to_xlsx(&ds, "Equipamentos").unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(reparse(&bytes, "Equipamentos"), ds);
}

#[test]
fn test_xlsx_round_trip_with_blank_first_column() {
    let ds = dataset(&[&["", "Tipo"], &["", "Bomba"], &["", "Motor"]]);
    let bytes = to_xlsx(&ds, "Equipamentos").unwrap();

    let raw = read_xlsx(&bytes, Some("Equipamentos")).unwrap();
    assert_eq!(raw[0], vec!["", "Tipo"]);
    assert_eq!(reparse(&bytes, "Equipamentos"), ds);
}

#[test]
fn test_xlsx_keeps_blank_leading_and_interior_rows() {
    let ds = dataset(&[
        &["Tipo", "Fabricante"],
        &["", ""],
        &["Bomba", ""],
        &["", ""],
        &["", "ACME"],
    ]);
    let bytes = to_xlsx(&ds, "Equipamentos").unwrap();
    assert_eq!(reparse(&bytes, "Equipamentos"), ds);
}

#[test]
fn test_xlsx_drops_trailing_blank_rows() {
    let ds = dataset(&[&["Tipo", "Fabricante"], &["Bomba", "ACME"], &["", ""]]);
    let bytes = to_xlsx(&ds, "Equipamentos").unwrap();
    let again = reparse(&bytes, "Equipamentos");
    assert_eq!(again.row_count(), 1);
    assert_eq!(again.row(0), ds.row(0));
}

#[test]
fn test_xlsx_keeps_numeric_looking_text() {
    let ds = dataset(&[&["Código", "Peso"], &["0001", "12.50"], &["1e3", "-0"]]);
    let bytes = to_xlsx(&ds, "Equipamentos").unwrap();
    let again = reparse(&bytes, "Equipamentos");
    assert_eq!(again.row(0), Some(vec!["0001", "12.50"]));
    assert_eq!(again.row(1), Some(vec!["1e3", "-0"]));
}

#[test]
fn test_xlsx_of_filtered_view() {
    let filtered = apply(&pumps_and_motors(), &FilterSelection::new().with("Tipo", ["Bomba"])).unwrap();
    let bytes = to_xlsx(&filtered, "Equipamentos").unwrap();
    assert_eq!(reparse(&bytes, "Equipamentos"), filtered);
}

#[test]
fn test_xlsx_of_header_only_dataset() {
    let ds = dataset(&[&["Nome", "Tipo"]]);
    let bytes = to_xlsx(&ds, "Equipamentos").unwrap();
    assert_eq!(reparse(&bytes, "Equipamentos"), ds);
}

#[test]
fn test_xlsx_export_is_repeatable() {
    let ds = inventory();
    let first = reparse(&to_xlsx(&ds, "Equipamentos").unwrap(), "Equipamentos");
    let second = reparse(&to_xlsx(&ds, "Equipamentos").unwrap(), "Equipamentos");
    assert_eq!(first, second);
}

#[test]
fn test_xlsx_sheet_is_named() {
    let bytes = to_xlsx(&pumps_and_motors(), "Inventário").unwrap();
    assert!(read_xlsx(&bytes, Some("Inventário")).is_ok());
    assert!(read_xlsx(&bytes, Some("Equipamentos")).is_err());
    // Without a name the first (only) sheet is read.
    assert_eq!(read_xlsx(&bytes, None).unwrap().len(), 4);
}

#[test]
fn test_invalid_sheet_name_is_an_export_failure() {
    let err = to_xlsx(&pumps_and_motors(), "a/b").unwrap_err();
    assert!(matches!(err, InventoryError::ExportFailure { .. }));
}

#[test]
fn test_csv_export_quotes_special_fields() {
    let ds = dataset(&[&["Nome", "Obs"], &["Bomba, 1", "diz \"olá\""]]);
    let text = to_csv(&ds).unwrap();
    assert_eq!(text, "Nome,Obs\n\"Bomba, 1\",\"diz \"\"olá\"\"\"\n");

    let again = TabularDataset::from_raw_rows(parse_csv(text.as_bytes()).unwrap()).unwrap();
    assert_eq!(again, ds);
}
