use anyhow::Context;
use clap::Parser;
use emissions_classifier::cli::parse_args;
use emissions_classifier::logging::init_tracing;
use emissions_classifier::prelude::*;
use std::path::PathBuf;

/// Clean the raw emissions CSV and store it in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "process_data", version, about, long_about = None)]
struct Cli {
    /// Raw emissions CSV file
    #[arg(value_name = "CSV_PATH")]
    csv_path: PathBuf,

    /// SQLite database to write; an existing emissions table is replaced
    #[arg(value_name = "DB_PATH")]
    db_path: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

const EXAMPLE: &str = "process_data data/emissions.csv data/emissions.db";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let Some(cli) = parse_args::<Cli, _, _>(std::env::args_os(), EXAMPLE) else {
        return Ok(());
    };
    init_tracing();

    let config =
        PipelineConfig::load_or_default(cli.config.as_ref()).context("loading configuration")?;

    tracing::info!(csv = %cli.csv_path.display(), "loading data");
    let mut table = read_csv(&cli.csv_path)
        .with_context(|| format!("reading {}", cli.csv_path.display()))?;

    tracing::info!("cleaning data");
    Cleaner::new(config.etl.clone()).clean(&mut table)?;

    tracing::info!(db = %cli.db_path.display(), "saving data");
    let store = SqliteStore::open(&cli.db_path)
        .await
        .with_context(|| format!("opening {}", cli.db_path.display()))?;
    store
        .write_table(&config.data.table, &table)
        .await
        .context("writing cleaned table")?;
    store.close().await;

    tracing::info!("cleaned data saved to database");
    Ok(())
}
