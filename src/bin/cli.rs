#![cfg(not(tarpaulin_include))]

use clap::{Parser, Subcommand};
use inventario::aggregate::chartable_columns;
use inventario::config::AppConfig;
use inventario::dataset::TabularDataset;
use inventario::downloader::to_csv;
use inventario::filter::{FilterSelection, filter_options};
use inventario::loader::source_for_path;
use inventario::record::NewRecordRequest;
use inventario::session::Session;
use inventario::sink::CsvFileSink;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

const MAX_CELL_WIDTH: usize = 24;

#[derive(Parser)]
#[command(
    name = "inventory-cli",
    version,
    about = "Browse, chart, export and extend the equipment inventory"
)]
struct Cli {
    /// JSON configuration file (defaults apply when omitted).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Source file to read instead of the configured one (.csv or .xlsx).
    #[arg(long, value_name = "PATH", global = true)]
    source: Option<PathBuf>,

    /// Worksheet to read from an .xlsx source.
    #[arg(long, value_name = "NAME", global = true)]
    worksheet: Option<String>,

    /// Keep rows whose COLUMN equals VALUE; repeat to accept more values
    /// or constrain more columns.
    #[arg(short, long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_pair, global = true)]
    filters: Vec<(String, String)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the filtered table.
    Show {
        /// Print CSV instead of aligned columns.
        #[arg(long)]
        csv: bool,
    },

    /// List the filterable columns and their values.
    Filters,

    /// Print the value counts of a column over the filtered table.
    Chart {
        /// Column to count; lists the chartable columns when omitted.
        column: Option<String>,
    },

    /// Write the filtered table to an .xlsx file.
    Export {
        /// Output file (defaults to the configured export file name).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Append a new record to the configured sink.
    Append {
        /// Record field, as FIELD=VALUE; repeat for each field.
        #[arg(long = "field", value_name = "FIELD=VALUE", value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },
}

fn parse_pair(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(source) = cli.source {
        config.source.path = source;
    }
    if cli.worksheet.is_some() {
        config.source.worksheet = cli.worksheet;
    }

    let source = source_for_path(&config.source.path, config.source.worksheet.clone())?;
    let session = Session::open(
        source.as_ref(),
        config.record_layout.clone(),
        config.export.sheet_name.clone(),
    )?;
    let selection = FilterSelection::from_pairs(cli.filters);

    match cli.command {
        Command::Show { csv } => {
            let view = session.view(&selection)?;
            if csv {
                print!("{}", to_csv(&view)?);
            } else {
                print_table(&view);
                println!(
                    "{} of {} rows",
                    view.row_count(),
                    session.dataset().row_count()
                );
            }
        }
        Command::Filters => {
            for option in filter_options(session.dataset()) {
                let values: Vec<&str> = option
                    .values
                    .iter()
                    .map(|v| if v.is_empty() { "(vazio)" } else { v.as_str() })
                    .collect();
                println!("{}: {}", option.column, values.join(" | "));
            }
        }
        Command::Chart { column: None } => {
            for column in chartable_columns(session.dataset()) {
                println!("{}", column);
            }
        }
        Command::Chart {
            column: Some(column),
        } => {
            let dist = session.distribution(&selection, &column)?;
            let width = dist.pairs().map(|(v, _)| v.chars().count()).max().unwrap_or(0);
            for (value, count) in dist.pairs() {
                let bar = "#".repeat(count.min(60));
                println!("{:<width$}  {:>5}  {}", value, count, bar, width = width);
            }
            println!("{:<width$}  {:>5}", "Quantidade", dist.total(), width = width);
        }
        Command::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            let bytes = session.export(&selection)?;
            fs::write(&path, &bytes)?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        Command::Append { fields } => {
            let request: NewRecordRequest = fields.into_iter().collect();
            let sink = CsvFileSink::new(&config.sink.path);
            let row = session.submit(&request, &sink)?;
            println!("Appended to {}: {}", config.sink.path.display(), row.join(", "));
        }
    }

    Ok(())
}

fn print_table(dataset: &TabularDataset) {
    let clip = |s: &str| -> String {
        if s.chars().count() > MAX_CELL_WIDTH {
            let mut clipped: String = s.chars().take(MAX_CELL_WIDTH - 1).collect();
            clipped.push('…');
            clipped
        } else {
            s.to_string()
        }
    };

    let widths: Vec<usize> = dataset
        .columns()
        .iter()
        .map(|c| {
            c.values()
                .iter()
                .map(|v| clip(v.as_str()).chars().count())
                .chain(std::iter::once(clip(c.name()).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let print_row = |cells: Vec<&str>| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<w$}", clip(*cell), w = w))
            .collect();
        println!("{}", line.join(" | ").trim_end());
    };

    print_row(dataset.column_names());
    for row in dataset.rows() {
        print_row(row);
    }
}
