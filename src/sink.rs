use crate::error::{InventoryError, Result};
use log::info;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// The authoritative store new records are appended to.
///
/// An `Ok` is the only acknowledgement the core relies on. Failures are not
/// retried here.
pub trait RecordSink: Send + Sync {
    fn append(&self, row: &[String]) -> Result<()>;
}

/// Appends records as CSV lines to an existing file.
///
/// The file must already exist (with its header row); a missing file means
/// the store cannot be reached.
#[derive(Clone, Debug)]
pub struct CsvFileSink {
    pub path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvFileSink { path: path.into() }
    }

    fn unavailable(&self, err: impl std::fmt::Display) -> InventoryError {
        InventoryError::SinkUnavailable {
            message: format!("{}: {}", self.path.display(), err),
        }
    }
}

impl RecordSink for CsvFileSink {
    fn append(&self, row: &[String]) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.unavailable(e))?;

        // Keep the new record on its own line when the file lacks a
        // trailing newline.
        let len = file.metadata().map_err(|e| self.unavailable(e))?.len();
        let mut needs_newline = false;
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))
                .and_then(|_| file.read_exact(&mut last))
                .map_err(|e| self.unavailable(e))?;
            needs_newline = last[0] != b'\n';
        }

        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(row).map_err(|e| self.unavailable(e))?;
        let mut line = writer
            .into_inner()
            .map_err(|e| self.unavailable(e.error()))?;
        if needs_newline {
            line.insert(0, b'\n');
        }

        file.write_all(&line)
            .and_then(|_| file.flush())
            .map_err(|e| self.unavailable(e))?;

        info!("appended record with {} fields to {}", row.len(), self.path.display());
        Ok(())
    }
}

/// Keeps appended rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        match self.rows.lock() {
            Ok(rows) => rows.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RecordSink for MemorySink {
    fn append(&self, row: &[String]) -> Result<()> {
        let mut rows = self.rows.lock().map_err(|e| InventoryError::SinkUnavailable {
            message: e.to_string(),
        })?;
        rows.push(row.to_vec());
        Ok(())
    }
}
