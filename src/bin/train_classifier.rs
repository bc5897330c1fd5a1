use anyhow::Context;
use clap::Parser;
use emissions_classifier::cli::parse_args;
use emissions_classifier::logging::init_tracing;
use emissions_classifier::model::ForestParams;
use emissions_classifier::model_selection::GridSearchResult;
use emissions_classifier::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Train the tax-band classifier on the stored emissions table.
#[derive(Parser, Debug)]
#[command(name = "train_classifier", version, about, long_about = None)]
struct Cli {
    /// SQLite database written by process_data
    #[arg(value_name = "DB_PATH")]
    db_path: PathBuf,

    /// Where to write the trained model
    #[arg(value_name = "MODEL_PATH")]
    model_path: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write the evaluation as JSON
    #[arg(long, value_name = "FILE")]
    report_json: Option<PathBuf>,
}

const EXAMPLE: &str = "train_classifier data/emissions.db models/classifier.bin";

#[derive(Serialize)]
struct Evaluation<'a> {
    report: &'a ClassificationReport,
    best_params: &'a ForestParams,
    search: &'a GridSearchResult,
    train_rows: usize,
    test_rows: usize,
    unlabelled_rows: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let Some(cli) = parse_args::<Cli, _, _>(std::env::args_os(), EXAMPLE) else {
        return Ok(());
    };
    init_tracing();

    let config =
        PipelineConfig::load_or_default(cli.config.as_ref()).context("loading configuration")?;

    tracing::info!(db = %cli.db_path.display(), "loading data");
    let store = SqliteStore::open(&cli.db_path)
        .await
        .with_context(|| format!("opening {}", cli.db_path.display()))?;
    let table = store
        .read_table(&config.data.table)
        .await
        .context("reading emissions table")?;
    store.close().await;

    tracing::info!("building and training model");
    let outcome = Trainer::from_config(config)?
        .fit(&table)
        .context("training classifier")?;

    tracing::info!("evaluating model");
    println!("{}", outcome.report);
    println!("Best parameters: {}", outcome.model.best_params());

    if let Some(path) = &cli.report_json {
        let evaluation = Evaluation {
            report: &outcome.report,
            best_params: outcome.model.best_params(),
            search: outcome.model.search(),
            train_rows: outcome.train_rows,
            test_rows: outcome.test_rows,
            unlabelled_rows: outcome.unlabelled.n_rows(),
        };
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &evaluation)?;
        tracing::info!(path = %path.display(), "evaluation written");
    }

    tracing::info!(model = %cli.model_path.display(), "saving model");
    outcome
        .model
        .save_to_file(&cli.model_path)
        .context("saving model")?;

    tracing::info!("trained model saved");
    Ok(())
}
