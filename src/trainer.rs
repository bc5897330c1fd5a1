//! End-to-end training: partition, grid search, evaluation.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::metrics::ClassificationReport;
use crate::model::{ForestParams, InferenceModel};
use crate::model_selection::{GridSearch, GridSearchResult, ParamGrid};
use crate::pipeline::{ClassifierPipelineParams, FittedClassifierPipeline};
use crate::serialization::SerializableParams;
use crate::split::{label_values, split_by_label, train_test_split};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Orchestrates a training run over a cleaned emissions table.
///
/// Rows without a label are set aside, the rest is split into train and test
/// partitions, the grid search picks and refits the best forest on train, and
/// the test partition is scored.
///
/// Once built via [`TrainerBuilder`] it is immutable and can be reused.
#[derive(Clone, Debug)]
pub struct Trainer {
    config: PipelineConfig,
}

/// Fluent builder for a [`Trainer`].
///
/// Starts from [`PipelineConfig::default`]:
/// - `test_fraction`: 0.25
/// - `seed`: 42
/// - `cv_folds`: 5
#[derive(Clone, Debug, Default)]
pub struct TrainerBuilder {
    config: PipelineConfig,
}

impl TrainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.config.split.test_fraction = fraction;
        self
    }

    /// Seed of the train/test shuffle; `None` draws one from the OS.
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.config.split.seed = seed;
        self
    }

    pub fn cv_folds(mut self, folds: usize) -> Self {
        self.config.search.cv_folds = folds;
        self
    }

    /// Validate the configuration and build the trainer.
    pub fn build(self) -> Result<Trainer> {
        self.config.validate()?;
        Ok(Trainer {
            config: self.config,
        })
    }
}

/// What a training run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    /// Scores on the held-out test partition.
    pub report: ClassificationReport,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Rows whose label was missing; never used for training or scoring.
    pub unlabelled: Table,
}

impl Trainer {
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::new()
    }

    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        TrainerBuilder::from_config(config).build()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full training procedure on `table`.
    pub fn fit(&self, table: &Table) -> Result<TrainingOutcome> {
        let label = &self.config.data.label;
        let (labelled, unlabelled) = split_by_label(table, label)?;
        if labelled.is_empty() {
            return Err(PipelineError::EmptyData(format!(
                "no rows with a '{}' label",
                label
            )));
        }

        let (train, test) = train_test_split(
            &labelled,
            self.config.split.test_fraction,
            self.config.split.seed,
        )?;

        let search = &self.config.search;
        let (result, pipeline) = GridSearch::new(
            self.config.encoder.clone(),
            label.as_str(),
            ParamGrid::from_config(search),
        )
        .cv_folds(search.cv_folds)
        .seed(search.seed)
        .fit(&train)?;

        let predicted = pipeline.predict(&test)?;
        let truth = label_values(&test, label)?;
        let report = ClassificationReport::new(&truth, &predicted)?;

        tracing::info!(
            accuracy = report.accuracy,
            test_rows = test.n_rows(),
            "test partition scored"
        );

        Ok(TrainingOutcome {
            model: TrainedModel {
                pipeline,
                search: result,
            },
            report,
            train_rows: train.n_rows(),
            test_rows: test.n_rows(),
            unlabelled,
        })
    }
}

/// Serializable form of a [`TrainedModel`].
#[derive(Clone, Serialize, Deserialize)]
pub struct TrainedModelParams {
    pub pipeline: ClassifierPipelineParams,
    pub search: GridSearchResult,
}

/// The selected fitted pipeline together with the search that chose it.
#[derive(Debug)]
pub struct TrainedModel {
    pipeline: FittedClassifierPipeline,
    search: GridSearchResult,
}

impl TrainedModel {
    pub fn pipeline(&self) -> &FittedClassifierPipeline {
        &self.pipeline
    }

    pub fn search(&self) -> &GridSearchResult {
        &self.search
    }

    pub fn best_params(&self) -> &ForestParams {
        self.search.best_params()
    }

    /// Predict tax bands for every row of `table`.
    pub fn predict(&self, table: &Table) -> Result<Vec<String>> {
        self.pipeline.predict_batch(table)
    }

    pub fn extract_params(&self) -> Result<TrainedModelParams> {
        Ok(TrainedModelParams {
            pipeline: self.pipeline.extract_params()?,
            search: self.search.clone(),
        })
    }

    pub fn from_params(params: TrainedModelParams) -> Result<Self> {
        Ok(Self {
            pipeline: FittedClassifierPipeline::from_params(params.pipeline)?,
            search: params.search,
        })
    }

    /// Write the model as a bincode blob.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self
            .extract_params()?
            .to_bytes()
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::info!(path = %path.as_ref().display(), "model saved");
        Ok(())
    }

    /// Load a model written by [`save_to_file`](Self::save_to_file).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let params = TrainedModelParams::from_bytes(&bytes)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        Self::from_params(params)
    }
}
