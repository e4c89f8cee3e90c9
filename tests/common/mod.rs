#![allow(dead_code)]

use inventario::dataset::TabularDataset;

pub fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

pub fn dataset(rows: &[&[&str]]) -> TabularDataset {
    TabularDataset::from_raw_rows(raw(rows)).expect("fixture rows must form a dataset")
}

/// The [Tipo, Fabricante] example table.
pub fn pumps_and_motors() -> TabularDataset {
    dataset(&[
        &["Tipo", "Fabricante"],
        &["Bomba", "ACME"],
        &["Motor", "ACME"],
        &["Bomba", "Zeta"],
    ])
}

/// A wider inventory sample with empty cells and numeric-looking text.
pub fn inventory() -> TabularDataset {
    dataset(&[
        &["Nome", "Código", "Fabricante", "Tipo", "Peso", "CRITICIDADE", "Outro 2"],
        &["Bomba P-01", "0001", "ACME", "Bomba", "12.50", "A", ""],
        &["Motor M-01", "0002", "WEG", "Motor", "80", "B", ""],
        &["Bomba P-02", "0003", "Zeta", "Bomba", "", "A", ""],
        &["Válvula V-01", "0004", "", "Válvula", "3", "C", ""],
        &["Motor M-02", "0005", "WEG", "Motor", "75", "A", ""],
    ])
}
