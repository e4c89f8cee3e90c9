mod common;

use common::raw;
use inventario::error::{InventoryError, Result};
use inventario::filter::FilterSelection;
use inventario::loader::{CsvFileSource, MemorySource, SourceLoader, read_xlsx};
use inventario::record::{NewRecordRequest, RecordLayout};
use inventario::session::Session;
use inventario::sink::{CsvFileSink, MemorySink, RecordSink};
use std::fs;
use tempfile::TempDir;

struct BrokenSource;

impl SourceLoader for BrokenSource {
    fn load(&self) -> Result<Vec<Vec<String>>> {
        Err(InventoryError::SourceUnavailable {
            origin: self.describe(),
            message: "connection refused".to_string(),
        })
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

struct RejectingSink;

impl RecordSink for RejectingSink {
    fn append(&self, _row: &[String]) -> Result<()> {
        Err(InventoryError::SinkUnavailable {
            message: "quota exceeded".to_string(),
        })
    }
}

fn layout() -> RecordLayout {
    RecordLayout {
        name: "teste".to_string(),
        version: 1,
        fields: vec!["Tipo".to_string(), "Fabricante".to_string()],
    }
}

fn source() -> MemorySource {
    MemorySource::new(raw(&[
        &["Tipo", "Fabricante"],
        &["Bomba", "ACME"],
        &["Motor", "ACME"],
        &["Bomba", "Zeta"],
    ]))
}

#[test]
fn test_view_distribution_and_export_use_the_selection() {
    let session = Session::open(&source(), layout(), "Equipamentos").unwrap();
    let selection = FilterSelection::new().with("Tipo", ["Bomba"]);

    assert_eq!(session.view(&selection).unwrap().row_count(), 2);

    let dist = session.distribution(&selection, "Fabricante").unwrap();
    assert_eq!(dist.pairs().collect::<Vec<_>>(), vec![("ACME", 1), ("Zeta", 1)]);

    let bytes = session.export(&selection).unwrap();
    let rows = read_xlsx(&bytes, Some(session.export_sheet())).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], vec!["Bomba", "Zeta"]);
}

#[test]
fn test_distribution_of_unknown_column_fails() {
    let session = Session::open(&source(), layout(), "Equipamentos").unwrap();
    let err = session.distribution(&FilterSelection::new(), "Modelo").unwrap_err();
    assert!(matches!(err, InventoryError::InvalidColumn { .. }));
}

#[test]
fn test_failed_reload_keeps_previous_snapshot() {
    let mut session = Session::open(&source(), layout(), "Equipamentos").unwrap();
    let before = session.snapshot();

    let err = session.reload(&BrokenSource).unwrap_err();
    assert!(matches!(err, InventoryError::SourceUnavailable { .. }));
    assert_eq!(session.dataset(), before.as_ref());
    assert_eq!(session.dataset().row_count(), 3);
}

#[test]
fn test_open_on_broken_source_fails() {
    assert!(Session::open(&BrokenSource, layout(), "Equipamentos").is_err());
}

#[test]
fn test_submit_hands_the_shaped_row_to_the_sink() {
    let session = Session::open(&source(), layout(), "Equipamentos").unwrap();
    let sink = MemorySink::new();
    let request = NewRecordRequest::new().with("Fabricante", "WEG");

    let row = session.submit(&request, &sink).unwrap();
    assert_eq!(row, vec!["", "WEG"]);
    assert_eq!(sink.rows(), vec![row]);
    // The snapshot only changes on reload.
    assert_eq!(session.dataset().row_count(), 3);
}

#[test]
fn test_rejected_submit_is_surfaced() {
    let session = Session::open(&source(), layout(), "Equipamentos").unwrap();
    let err = session.submit(&NewRecordRequest::new(), &RejectingSink).unwrap_err();
    assert!(matches!(err, InventoryError::SinkUnavailable { .. }));
}

#[test]
fn test_submit_then_reload_shows_the_new_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("equipamentos.csv");
    fs::write(&path, "Tipo,Fabricante\nBomba,ACME\n").unwrap();

    let source = CsvFileSource::new(&path);
    let sink = CsvFileSink::new(&path);
    let mut session = Session::open(&source, layout(), "Equipamentos").unwrap();

    let request = NewRecordRequest::new().with("Tipo", "Motor").with("Fabricante", "WEG");
    session.submit(&request, &sink).unwrap();
    session.reload(&source).unwrap();

    assert_eq!(session.dataset().row_count(), 2);
    assert_eq!(session.dataset().row(1), Some(vec!["Motor", "WEG"]));
}

#[test]
fn test_sessions_own_independent_snapshots() {
    let mut first = Session::open(&source(), layout(), "Equipamentos").unwrap();
    let second = first.clone();

    let smaller = MemorySource::new(raw(&[&["Tipo", "Fabricante"], &["Motor", "WEG"]]));
    first.reload(&smaller).unwrap();

    assert_eq!(first.dataset().row_count(), 1);
    assert_eq!(second.dataset().row_count(), 3);
}
