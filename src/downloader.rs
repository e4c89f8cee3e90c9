#![cfg(not(tarpaulin_include))]

use crate::dataset::TabularDataset;
use crate::error::{InventoryError, Result};
use log::{debug, info};
use rust_xlsxwriter::{Workbook, Worksheet};

/// MIME type of the XLSX download.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Convert a dataset to XLSX format
///
/// Writes a single worksheet named `sheet_name`: the header row first, then
/// every data row, in the dataset's column and row order. Every cell is
/// written as a string so numeric-looking text stays text.
///
/// Empty strings leave no cell behind, so trailing rows or columns that are
/// blank throughout do not survive a re-read of the file. Blank leading and
/// interior cells keep their positions.
///
/// # Arguments
/// * `dataset` - The (usually filtered) dataset to export
/// * `sheet_name` - Worksheet name, at most 31 characters
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or `ExportFailure`
///
/// # Examples
/// ```
/// use inventario::dataset::TabularDataset;
/// use inventario::downloader::to_xlsx;
///
/// let dataset = TabularDataset::from_raw_rows(vec![vec!["Nome".to_string()]]).unwrap();
/// let xlsx = to_xlsx(&dataset, "Equipamentos").unwrap();
/// assert!(xlsx.starts_with(b"PK"));
/// ```
pub fn to_xlsx(dataset: &TabularDataset, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet_name)?;

    for (c, column) in dataset.columns().iter().enumerate() {
        let col = column_number(c)?;
        worksheet.write_string(0, col, column.name())?;
        for (r, value) in column.values().iter().enumerate() {
            worksheet.write_string(row_number(r + 1)?, col, value)?;
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    info!(
        "exported {} rows x {} columns to xlsx ({} bytes)",
        dataset.row_count(),
        dataset.column_count(),
        buffer.len()
    );
    Ok(buffer)
}

/// Convert a dataset to CSV format
///
/// Header row first; fields containing commas, quotes or newlines are
/// quoted by the csv writer.
pub fn to_csv(dataset: &TabularDataset) -> Result<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for row in dataset.to_raw_rows() {
        writer.write_record(&row).map_err(export_failure)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| export_failure(e.error()))?;

    debug!("exported {} rows to csv", dataset.row_count());
    String::from_utf8(bytes).map_err(export_failure)
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| InventoryError::ExportFailure {
        message: format!("column {} is beyond the worksheet limit", index + 1),
    })
}

fn row_number(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| InventoryError::ExportFailure {
        message: format!("row {} is beyond the worksheet limit", index + 1),
    })
}

fn export_failure(err: impl std::fmt::Display) -> InventoryError {
    InventoryError::ExportFailure {
        message: err.to_string(),
    }
}
