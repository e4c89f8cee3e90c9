#![cfg(not(tarpaulin_include))]

use crate::dataset::TabularDataset;
use crate::error::{InventoryError, Result};
use calamine::{Reader, Xlsx, open_workbook_from_rs};
use log::{debug, info};
use std::fs::File;
use std::io::{Cursor, Read};
use std::iter;
use std::path::{Path, PathBuf};

/// Supplies the raw rows of a dataset: row 0 holds the headers, the rest
/// are data rows that may be shorter than the header.
///
/// Implementations own all I/O; the core never reads from disk or network
/// itself.
pub trait SourceLoader: Send + Sync {
    fn load(&self) -> Result<Vec<Vec<String>>>;

    /// Human-readable origin, used in logs and errors.
    fn describe(&self) -> String;
}

/// Loads the raw rows of `source` and builds a dataset from them.
///
/// A source with no rows gives an empty dataset.
pub fn load_dataset(source: &dyn SourceLoader) -> Result<TabularDataset> {
    let raw = source.load()?;
    if raw.is_empty() {
        info!("source {} returned no rows, using an empty dataset", source.describe());
        return Ok(TabularDataset::empty());
    }
    let dataset = TabularDataset::from_raw_rows(raw)?;
    info!(
        "loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        source.describe()
    );
    Ok(dataset)
}

/// A CSV file on disk.
#[derive(Clone, Debug)]
pub struct CsvFileSource {
    pub path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvFileSource { path: path.into() }
    }
}

impl SourceLoader for CsvFileSource {
    fn load(&self) -> Result<Vec<Vec<String>>> {
        let file = File::open(&self.path).map_err(|e| self.unavailable(e))?;
        parse_csv(file).map_err(|e| self.unavailable(e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl CsvFileSource {
    fn unavailable(&self, err: impl std::fmt::Display) -> InventoryError {
        InventoryError::SourceUnavailable {
            origin: self.describe(),
            message: err.to_string(),
        }
    }
}

/// One worksheet of an XLSX workbook on disk. Without a worksheet name the
/// first sheet is read.
#[derive(Clone, Debug)]
pub struct XlsxFileSource {
    pub path: PathBuf,
    pub worksheet: Option<String>,
}

impl XlsxFileSource {
    pub fn new(path: impl Into<PathBuf>, worksheet: Option<String>) -> Self {
        XlsxFileSource {
            path: path.into(),
            worksheet,
        }
    }
}

impl SourceLoader for XlsxFileSource {
    fn load(&self) -> Result<Vec<Vec<String>>> {
        let mut bytes = Vec::new();
        File::open(&self.path)
            .and_then(|mut f| f.read_to_end(&mut bytes))
            .map_err(|e| InventoryError::SourceUnavailable {
                origin: self.describe(),
                message: e.to_string(),
            })?;
        read_xlsx(&bytes, self.worksheet.as_deref()).map_err(|e| match e {
            InventoryError::SourceUnavailable { message, .. } => {
                InventoryError::SourceUnavailable {
                    origin: self.describe(),
                    message,
                }
            }
            other => other,
        })
    }

    fn describe(&self) -> String {
        match &self.worksheet {
            Some(sheet) => format!("{} [{}]", self.path.display(), sheet),
            None => self.path.display().to_string(),
        }
    }
}

/// Raw rows held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    pub rows: Vec<Vec<String>>,
}

impl MemorySource {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        MemorySource { rows }
    }
}

impl SourceLoader for MemorySource {
    fn load(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Parses CSV text into raw rows. Rows may have different lengths; every
/// field is kept as text.
pub fn parse_csv(reader: impl Read) -> std::result::Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!("parsed {} csv rows", rows.len());
    Ok(rows)
}

/// Reads one worksheet of an XLSX workbook held in memory into raw rows.
///
/// Cells are rendered as text: strings verbatim, numbers through their
/// display form, empty cells as empty strings. Row and column positions
/// follow the sheet from `A1`, even when the first rows or columns are
/// blank.
pub fn read_xlsx(bytes: &[u8], worksheet: Option<&str>) -> Result<Vec<Vec<String>>> {
    let unavailable = |message: String| InventoryError::SourceUnavailable {
        origin: "xlsx".to_string(),
        message,
    };

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| unavailable(e.to_string()))?;

    let sheet_name = match worksheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| unavailable("No sheets found in Excel file".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e: calamine::XlsxError| {
            unavailable(format!("worksheet '{}': {}", sheet_name, e))
        })?;
    if range.is_empty() {
        debug!("worksheet '{}' is empty", sheet_name);
        return Ok(Vec::new());
    }

    // The range starts at the first used cell; blank leading rows and
    // columns are restored so positions match the sheet.
    let (top, left) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));
    let width = left + range.width();

    let mut rows: Vec<Vec<String>> = vec![vec![String::new(); width]; top];
    rows.extend(range.rows().map(|row| {
        iter::repeat_n(String::new(), left)
            .chain(row.iter().map(|cell| cell.to_string()))
            .collect()
    }));
    debug!("read {} rows from worksheet '{}'", rows.len(), sheet_name);
    Ok(rows)
}

/// Picks a source for a file by its extension
///
/// `.csv` files are read as CSV; `.xlsx`/`.xlsm` files through the given
/// worksheet (or the first one).
pub fn source_for_path(
    path: impl AsRef<Path>,
    worksheet: Option<String>,
) -> Result<Box<dyn SourceLoader>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvFileSource::new(path))),
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxFileSource::new(path, worksheet))),
        Some(ext) => Err(InventoryError::SourceUnavailable {
            origin: path.display().to_string(),
            message: format!("Unsupported file extension: {}", ext),
        }),
        None => Err(InventoryError::SourceUnavailable {
            origin: path.display().to_string(),
            message: "File has no extension".to_string(),
        }),
    }
}
