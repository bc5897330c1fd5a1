use anyhow::Context;
use clap::Parser;
use emissions_classifier::cli::parse_args;
use emissions_classifier::logging::init_tracing;
use emissions_classifier::prelude::*;
use emissions_classifier::split::split_by_label;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Predict tax bands for stored vehicles that have none.
#[derive(Parser, Debug)]
#[command(name = "predict_tax_band", version, about, long_about = None)]
struct Cli {
    /// SQLite database written by process_data
    #[arg(value_name = "DB_PATH")]
    db_path: PathBuf,

    /// Model written by train_classifier
    #[arg(value_name = "MODEL_PATH")]
    model_path: PathBuf,

    /// CSV output file; stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

const EXAMPLE: &str = "predict_tax_band data/emissions.db models/classifier.bin -o predictions.csv";

/// Column holding the predictions in the output CSV.
const PREDICTION_COLUMN: &str = "predicted_tax_band";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let Some(cli) = parse_args::<Cli, _, _>(std::env::args_os(), EXAMPLE) else {
        return Ok(());
    };
    init_tracing();

    let config =
        PipelineConfig::load_or_default(cli.config.as_ref()).context("loading configuration")?;

    let store = SqliteStore::open(&cli.db_path)
        .await
        .with_context(|| format!("opening {}", cli.db_path.display()))?;
    let table = store
        .read_table(&config.data.table)
        .await
        .context("reading emissions table")?;
    store.close().await;

    let model = TrainedModel::load_from_file(&cli.model_path)
        .with_context(|| format!("loading {}", cli.model_path.display()))?;

    let (_, mut unlabelled) = split_by_label(&table, &config.data.label)?;
    let predictions = model.predict(&unlabelled).context("predicting tax bands")?;
    unlabelled.push_column(Column::categorical(
        PREDICTION_COLUMN,
        predictions.into_iter().map(Some).collect(),
    ))?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_csv(&unlabelled, BufWriter::new(file))?;
        }
        None => write_csv(&unlabelled, std::io::stdout().lock())?,
    }

    tracing::info!(rows = unlabelled.n_rows(), "predictions written");
    Ok(())
}
