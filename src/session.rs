//! Per-session state: the dataset snapshot a user is browsing and the
//! operations run against it.

use crate::aggregate::{DistributionResult, aggregate};
use crate::dataset::TabularDataset;
use crate::downloader::to_xlsx;
use crate::error::Result;
use crate::filter::{FilterSelection, apply};
use crate::loader::{SourceLoader, load_dataset};
use crate::record::{NewRecordRequest, RecordLayout};
use crate::sink::RecordSink;
use log::{error, info, warn};
use std::sync::Arc;

/// The state one user session owns.
///
/// The snapshot is shared read-only through an `Arc`; every operation
/// builds a new value instead of mutating it. A failed reload leaves the
/// previous snapshot in place.
#[derive(Clone, Debug)]
pub struct Session {
    dataset: Arc<TabularDataset>,
    layout: RecordLayout,
    export_sheet: String,
}

impl Session {
    pub fn new(dataset: TabularDataset, layout: RecordLayout, export_sheet: impl Into<String>) -> Self {
        let session = Session {
            dataset: Arc::new(dataset),
            layout,
            export_sheet: export_sheet.into(),
        };
        session.check_layout();
        session
    }

    /// Opens a session on the current contents of `source`.
    pub fn open(
        source: &dyn SourceLoader,
        layout: RecordLayout,
        export_sheet: impl Into<String>,
    ) -> Result<Self> {
        let dataset = load_dataset(source)?;
        Ok(Self::new(dataset, layout, export_sheet))
    }

    pub fn dataset(&self) -> &TabularDataset {
        &self.dataset
    }

    pub fn snapshot(&self) -> Arc<TabularDataset> {
        Arc::clone(&self.dataset)
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn export_sheet(&self) -> &str {
        &self.export_sheet
    }

    /// Replaces the snapshot with a fresh load of `source`.
    ///
    /// On failure the error is returned and the previous snapshot is kept.
    pub fn reload(&mut self, source: &dyn SourceLoader) -> Result<()> {
        match load_dataset(source) {
            Ok(dataset) => {
                self.dataset = Arc::new(dataset);
                self.check_layout();
                Ok(())
            }
            Err(e) => {
                error!(
                    "reload of {} failed, keeping {} rows from the previous load: {}",
                    source.describe(),
                    self.dataset.row_count(),
                    e
                );
                Err(e)
            }
        }
    }

    /// The rows matching `selection`.
    pub fn view(&self, selection: &FilterSelection) -> Result<TabularDataset> {
        apply(&self.dataset, selection)
    }

    /// Distribution of `column` over the rows matching `selection`.
    pub fn distribution(
        &self,
        selection: &FilterSelection,
        column: &str,
    ) -> Result<DistributionResult> {
        let view = self.view(selection)?;
        aggregate(&view, column)
    }

    /// XLSX bytes of the rows matching `selection`.
    pub fn export(&self, selection: &FilterSelection) -> Result<Vec<u8>> {
        let view = self.view(selection)?;
        to_xlsx(&view, &self.export_sheet)
    }

    /// Shapes `request` with the session layout and appends it to `sink`.
    ///
    /// Returns the row handed to the sink. The snapshot is not touched;
    /// callers reload to see the new record.
    pub fn submit(&self, request: &NewRecordRequest, sink: &dyn RecordSink) -> Result<Vec<String>> {
        let row = self.layout.build_row(request);
        sink.append(&row)?;
        info!(
            "submitted record for layout {} v{}",
            self.layout.name, self.layout.version
        );
        Ok(row)
    }

    fn check_layout(&self) {
        if self.dataset.column_count() == 0 {
            return;
        }
        let columns = self.dataset.column_names();
        let missing = self.layout.missing_from(&columns);
        if !missing.is_empty() {
            warn!(
                "layout {} v{} has fields absent from the dataset: {}",
                self.layout.name,
                self.layout.version,
                missing.join(", ")
            );
        }
        let prefix_matches = columns
            .iter()
            .zip(&self.layout.fields)
            .all(|(column, field)| *column == field.as_str());
        if missing.is_empty() && !prefix_matches {
            warn!(
                "layout {} v{} field order differs from the dataset column order",
                self.layout.name, self.layout.version
            );
        }
    }
}
