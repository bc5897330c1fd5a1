//! Classifiers.

pub mod forest;

pub use forest::{Criterion, FittedRandomForest, ForestParams, RandomForest};

use crate::error::Result;

/// A fitted model that can predict a whole batch.
pub trait InferenceModel {
    type Input;
    type Output;

    fn predict_batch(&self, input: &Self::Input) -> Result<Self::Output>;
}
