//! Core traits for table transformers.
//!
//! - [`Transformer`]: unfitted, holds hyper-parameters and learns from data.
//! - [`FittedTransformer`]: learned state, ready for inference and persistence.

use crate::error::{PipelineError, Result};
use crate::serialization::SerializableParams;
use crate::table::Table;

/// Unfitted transformer over [`Table`]s.
///
/// # Example
/// ```ignore
/// use emissions_classifier::preprocessing::{SimpleImputer, Transformer, FittedTransformer};
///
/// let imputer = SimpleImputer::new(vec!["co2".into()]);
/// let fitted = imputer.fit(&train)?;
/// let filled = fitted.transform(&test)?;
/// ```
pub trait Transformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params>;

    /// Learn parameters from the training table.
    ///
    /// # Errors
    /// Returns [`PipelineError`] if the table is empty or lacks a column the
    /// transformer was configured with.
    fn fit(&self, table: &Table) -> Result<Self::Fitted>;

    /// Fit on `table` and transform it in one step.
    fn fit_transform(&self, table: &Table) -> Result<Table> {
        let fitted = self.fit(table)?;
        fitted.transform(table)
    }
}

/// Fitted transformer ready for inference.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `save_to_file` / `load_from_file` use the bincode encoding of `Params`.
pub trait FittedTransformer: Sized {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform a table using the learned parameters.
    fn transform(&self, table: &Table) -> Result<Table>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self>;

    /// Save the learned parameters to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a fitted transformer from a file written by [`save_to_file`](Self::save_to_file).
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let params = Self::Params::from_bytes(&bytes)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        Self::from_params(params)
    }
}
