/*!
# Inventário

A single-page equipment inventory browser, built in Rust.

## Overview

The application loads a table of inventory records from a spreadsheet,
lets the user narrow it down with per-column filters, charts the value
distribution of a chosen column, appends new records through a form and
downloads the filtered table as an Excel file.

## Architecture

### Core (pure, no I/O)
- **dataset**: `TabularDataset`, an immutable table of text columns built from
  raw rows whose first row holds the headers
- **filter**: equality filters over several columns (AND across columns, any of
  the accepted values within one column)
- **aggregate**: value counts of one column, most frequent first
- **record**: shapes a new-record form submission into a row following an
  explicit, versioned field layout
- **downloader**: XLSX and CSV serialization of a dataset

### Boundaries
- **loader**: `SourceLoader` trait with CSV, XLSX and in-memory sources
- **sink**: `RecordSink` trait with CSV file and in-memory sinks
- **session**: the per-session snapshot every operation runs against
- **config**: JSON configuration with defaults for every field

### Web layer (feature `web`)
- **graph**: PNG bar chart of a distribution
- **app**: axum routes serving the page and its JSON API

## REST API Endpoints

- `GET /api/dataset?filter=<column>:<value>` - Filtered table
- `GET /api/filters` - Filterable columns and their values
- `GET /api/columns` - Columns offered for charting
- `GET /api/distribution?column=<column>` - Value counts of the filtered table
- `GET /api/chart.png?column=<column>` - Bar chart of the same counts
- `GET /api/export` - Filtered table as XLSX
- `POST /api/records` - Append a new record
- `POST /api/reload` - Reload the dataset from the source
*/

pub mod aggregate;
#[cfg(feature = "web")]
pub mod app;
pub mod config;
pub mod dataset;
pub mod downloader;
pub mod error;
pub mod filter;
#[cfg(feature = "web")]
pub mod graph;
pub mod loader;
pub mod record;
pub mod session;
pub mod sink;

pub use aggregate::{DistributionResult, ValueCount, aggregate};
pub use config::AppConfig;
pub use dataset::{Column, TabularDataset};
pub use error::{InventoryError, Result};
pub use filter::{FilterSelection, apply};
pub use record::{NewRecordRequest, RecordLayout, build_row};
pub use session::Session;
