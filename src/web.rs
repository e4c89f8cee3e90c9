#![cfg(not(tarpaulin_include))]

use inventario::app;
use inventario::config::AppConfig;
use std::env;
use std::path::PathBuf;

/// Main entry point for the inventory web application
///
/// The config file path comes from the first argument or the
/// `INVENTORY_CONFIG` environment variable; without either the defaults are
/// used.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("INVENTORY_CONFIG").ok())
        .map(PathBuf::from);

    let config = AppConfig::load(config_path.as_deref())?;
    log::info!(
        "Starting {} with source {}",
        config.title,
        config.source.path.display()
    );
    app::run(config).await
}
