//! Hyper-parameter search with k-fold cross validation.
//!
//! [`GridSearch`] scores every [`ParamGrid`] candidate by mean validation
//! accuracy over shuffled folds, keeps the best one (earliest candidate on a
//! tie) and refits it on the whole training table.

use crate::config::{EncoderConfig, SearchConfig};
use crate::error::{PipelineError, Result};
use crate::metrics::accuracy;
use crate::model::{Criterion, ForestParams};
use crate::pipeline::{ClassifierPipeline, FittedClassifierPipeline};
use crate::split::{label_values, shuffled_indices};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Axes of the search grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub criterion: Vec<Criterion>,
    pub n_trees: Vec<u16>,
    /// `None` means unlimited depth.
    pub max_depth: Vec<Option<u16>>,
    /// Seed handed to every forest.
    pub seed: u64,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl ParamGrid {
    /// Build the grid from configuration; a depth of 0 means unlimited.
    pub fn from_config(config: &SearchConfig) -> Self {
        let max_depth = if config.max_depth.is_empty() {
            vec![None]
        } else {
            config
                .max_depth
                .iter()
                .map(|&d| if d == 0 { None } else { Some(d) })
                .collect()
        };
        Self {
            criterion: config.criterion.clone(),
            n_trees: config.n_trees.clone(),
            max_depth,
            seed: config.seed,
        }
    }

    /// Every combination, criterion outermost and tree count innermost.
    pub fn candidates(&self) -> Vec<ForestParams> {
        let mut out = Vec::with_capacity(self.len());
        for &criterion in &self.criterion {
            for &max_depth in &self.max_depth {
                for &n_trees in &self.n_trees {
                    out.push(ForestParams {
                        criterion,
                        n_trees,
                        max_depth,
                        seed: self.seed,
                        ..ForestParams::default()
                    });
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.criterion.len() * self.n_trees.len() * self.max_depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shuffled k-fold split of `0..n` into `(train, validation)` index pairs.
///
/// The first `n % k` folds hold one extra row.
pub fn kfold_indices(n: usize, k: usize, seed: u64) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    if k < 2 {
        return Err(PipelineError::InvalidParameter(format!(
            "cross validation needs at least 2 folds, got {}",
            k
        )));
    }
    if n < k {
        return Err(PipelineError::InvalidParameter(format!(
            "cannot make {} folds from {} rows",
            k, n
        )));
    }

    let indices = shuffled_indices(n, Some(seed));
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = n / k + usize::from(fold < n % k);
        let validation = indices[start..start + size].to_vec();
        let train = indices[..start]
            .iter()
            .chain(&indices[start + size..])
            .copied()
            .collect();
        folds.push((train, validation));
        start += size;
    }
    Ok(folds)
}

/// The only label in `labels`, if they all agree.
fn single_class(labels: &[String]) -> Option<&str> {
    let first = labels.first()?;
    labels
        .iter()
        .all(|label| label == first)
        .then_some(first.as_str())
}

/// Cross-validation outcome of one candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

impl CandidateScore {
    fn new(params: ForestParams, fold_scores: Vec<f64>) -> Self {
        let n = fold_scores.len() as f64;
        let mean_score = fold_scores.iter().sum::<f64>() / n;
        let variance = fold_scores
            .iter()
            .map(|s| (s - mean_score).powi(2))
            .sum::<f64>()
            / n;
        Self {
            params,
            fold_scores,
            mean_score,
            std_score: variance.sqrt(),
        }
    }
}

/// Highest mean score; the earliest candidate wins a tie.
fn best_index(candidates: &[CandidateScore]) -> usize {
    let mut best = 0;
    for (i, candidate) in candidates.iter().enumerate() {
        if candidate.mean_score > candidates[best].mean_score {
            best = i;
        }
    }
    best
}

/// Scores of every candidate plus the winner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub candidates: Vec<CandidateScore>,
    pub best_index: usize,
}

impl GridSearchResult {
    pub fn best(&self) -> &CandidateScore {
        &self.candidates[self.best_index]
    }

    pub fn best_params(&self) -> &ForestParams {
        &self.best().params
    }
}

/// Exhaustive grid search over [`ClassifierPipeline`]s.
#[derive(Clone, Debug)]
pub struct GridSearch {
    encoder: EncoderConfig,
    label: String,
    grid: ParamGrid,
    cv_folds: usize,
    seed: u64,
}

impl GridSearch {
    pub fn new(encoder: EncoderConfig, label: impl Into<String>, grid: ParamGrid) -> Self {
        Self {
            encoder,
            label: label.into(),
            seed: grid.seed,
            grid,
            cv_folds: 5,
        }
    }

    pub fn cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Seed of the fold shuffle.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Score every candidate, then refit the best on all of `train`.
    pub fn fit(&self, train: &Table) -> Result<(GridSearchResult, FittedClassifierPipeline)> {
        if self.grid.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "parameter grid is empty".to_string(),
            ));
        }

        let folds = kfold_indices(train.n_rows(), self.cv_folds, self.seed)?;
        let fold_tables: Vec<(Table, Table)> = folds
            .iter()
            .map(|(t, v)| (train.take(t), train.take(v)))
            .collect();

        if let Some(class) = single_class(&label_values(train, &self.label)?) {
            return Err(PipelineError::InvalidParameter(format!(
                "every training row has the class '{}', need at least two classes",
                class
            )));
        }
        for (fold, (fold_train, _)) in fold_tables.iter().enumerate() {
            if let Some(class) = single_class(&label_values(fold_train, &self.label)?) {
                return Err(PipelineError::InvalidParameter(format!(
                    "cross validation fold {} of {} trains on the single class '{}'; \
                     use fewer folds or more rows per class",
                    fold + 1,
                    self.cv_folds,
                    class
                )));
            }
        }

        let mut candidates = Vec::with_capacity(self.grid.len());
        for params in self.grid.candidates() {
            let pipeline = ClassifierPipeline::new(self.encoder.clone(), params, &self.label);

            let mut fold_scores = Vec::with_capacity(fold_tables.len());
            for (fold_train, fold_valid) in &fold_tables {
                let fitted = pipeline.fit(fold_train)?;
                let predicted = fitted.predict(fold_valid)?;
                let truth = label_values(fold_valid, &self.label)?;
                fold_scores.push(accuracy(&truth, &predicted));
            }

            let score = CandidateScore::new(params, fold_scores);
            tracing::debug!(
                params = %score.params,
                mean = score.mean_score,
                std = score.std_score,
                "candidate scored"
            );
            candidates.push(score);
        }

        let result = GridSearchResult {
            best_index: best_index(&candidates),
            candidates,
        };

        tracing::info!(
            candidates = result.candidates.len(),
            folds = self.cv_folds,
            best = %result.best_params(),
            score = result.best().mean_score,
            "grid search finished"
        );

        let refit = ClassifierPipeline::new(self.encoder.clone(), *result.best_params(), &self.label)
            .fit(train)?;
        Ok((result, refit))
    }
}
