//! Random forest classifier backed by smartcore.

use crate::error::{PipelineError, Result};
use crate::model::InferenceModel;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::SplitCriterion;
use std::fmt;

type Forest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Split quality measure of the trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Gini,
    Entropy,
    ClassificationError,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Gini => "gini",
            Criterion::Entropy => "entropy",
            Criterion::ClassificationError => "classification_error",
        }
    }

    fn split_criterion(self) -> SplitCriterion {
        match self {
            Criterion::Gini => SplitCriterion::Gini,
            Criterion::Entropy => SplitCriterion::Entropy,
            Criterion::ClassificationError => SplitCriterion::ClassificationError,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forest hyper-parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub criterion: Criterion,
    pub n_trees: u16,
    /// `None` grows trees until leaves are pure.
    pub max_depth: Option<u16>,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    /// Bootstrap and feature sampling seed.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            criterion: Criterion::Gini,
            n_trees: 10,
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn to_smartcore(self) -> RandomForestClassifierParameters {
        let params = RandomForestClassifierParameters::default()
            .with_criterion(self.criterion.split_criterion())
            .with_n_trees(self.n_trees)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_min_samples_split(self.min_samples_split)
            .with_seed(self.seed);
        match self.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "criterion={}, n_trees={}, ", self.criterion, self.n_trees)?;
        match self.max_depth {
            Some(depth) => write!(f, "max_depth={}", depth),
            None => write!(f, "max_depth=None"),
        }
    }
}

/// Convert a row-major ndarray matrix into smartcore's dense matrix.
pub(crate) fn to_dense_matrix(x: &Array2<f64>) -> DenseMatrix<f64> {
    let (rows, cols) = x.dim();
    let data: Vec<f64> = x.iter().copied().collect();
    DenseMatrix::new(rows, cols, data, false)
}

/// Unfitted random forest.
#[derive(Clone, Debug, Default)]
pub struct RandomForest {
    params: ForestParams,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Fit on a feature matrix and encoded class labels.
    pub fn fit(&self, x: &Array2<f64>, y: &[i32]) -> Result<FittedRandomForest> {
        let (rows, cols) = x.dim();
        if rows == 0 {
            return Err(PipelineError::EmptyData(
                "Cannot fit RandomForest on empty data".to_string(),
            ));
        }
        if rows != y.len() {
            return Err(PipelineError::InvalidShape {
                expected: format!("{} labels", rows),
                got: format!("{} labels", y.len()),
            });
        }
        if y.iter().all(|&label| label == y[0]) {
            return Err(PipelineError::InvalidParameter(format!(
                "random forest needs at least two classes, every label is {}",
                y[0]
            )));
        }
        if self.params.n_trees == 0 {
            return Err(PipelineError::InvalidParameter(
                "n_trees must be > 0".to_string(),
            ));
        }

        let model = Forest::fit(&to_dense_matrix(x), &y.to_vec(), self.params.to_smartcore())?;
        tracing::debug!(rows, cols, params = %self.params, "random forest fitted");

        Ok(FittedRandomForest {
            params: self.params,
            n_features: cols,
            model,
        })
    }
}

/// Fitted random forest ready for inference.
#[derive(Debug, Serialize, Deserialize)]
pub struct FittedRandomForest {
    params: ForestParams,
    n_features: usize,
    model: Forest,
}

impl FittedRandomForest {
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Number of features seen during fit.
    pub fn n_features_in(&self) -> usize {
        self.n_features
    }
}

impl InferenceModel for FittedRandomForest {
    type Input = Array2<f64>;
    type Output = Vec<i32>;

    fn predict_batch(&self, x: &Array2<f64>) -> Result<Vec<i32>> {
        if x.ncols() != self.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: x.ncols(),
            });
        }
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }
        Ok(self.model.predict(&to_dense_matrix(x))?)
    }
}
