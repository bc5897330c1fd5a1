//! Label encoding for the target column.
//!
//! Maps string class labels (tax bands) to the integer indices the classifier
//! is trained on, and back.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Label encoder for string targets.
///
/// # Example
/// ```rust
/// use emissions_classifier::preprocessing::LabelEncoder;
///
/// let labels = vec!["F".to_string(), "B".to_string(), "F".to_string()];
/// let fitted = LabelEncoder::new().fit(&labels).unwrap();
///
/// assert_eq!(fitted.classes(), &["B".to_string(), "F".to_string()]);
/// assert_eq!(fitted.transform(&labels).unwrap(), vec![1, 0, 1]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LabelEncoder;

impl LabelEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Learn the sorted set of classes.
    pub fn fit(&self, labels: &[String]) -> Result<FittedLabelEncoder> {
        if labels.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit LabelEncoder on empty data".to_string(),
            ));
        }

        let classes: BTreeSet<&String> = labels.iter().collect();
        FittedLabelEncoder::from_params(LabelEncoderParams {
            classes: classes.into_iter().cloned().collect(),
        })
    }

    pub fn fit_transform(&self, labels: &[String]) -> Result<(FittedLabelEncoder, Vec<i32>)> {
        let fitted = self.fit(labels)?;
        let encoded = fitted.transform(labels)?;
        Ok((fitted, encoded))
    }
}

/// Serializable parameters for a fitted LabelEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoderParams {
    /// Unique classes in sorted order.
    pub classes: Vec<String>,
}

/// Fitted LabelEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedLabelEncoder {
    classes: Vec<String>,
    class_to_idx: HashMap<String, i32>,
}

impl FittedLabelEncoder {
    /// Classes in sorted order; a class's index is its encoded value.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Encode labels; an unseen label is an error.
    pub fn transform(&self, labels: &[String]) -> Result<Vec<i32>> {
        labels
            .iter()
            .map(|label| {
                self.class_to_idx
                    .get(label)
                    .copied()
                    .ok_or_else(|| PipelineError::UnknownCategory {
                        column: "label".to_string(),
                        value: label.clone(),
                    })
            })
            .collect()
    }

    /// Decode class indices back to labels.
    pub fn inverse_transform(&self, encoded: &[i32]) -> Result<Vec<String>> {
        encoded
            .iter()
            .map(|&idx| {
                usize::try_from(idx)
                    .ok()
                    .and_then(|i| self.classes.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        PipelineError::InvalidParameter(format!(
                            "class index {} out of range for {} classes",
                            idx,
                            self.classes.len()
                        ))
                    })
            })
            .collect()
    }

    pub fn extract_params(&self) -> LabelEncoderParams {
        LabelEncoderParams {
            classes: self.classes.clone(),
        }
    }

    pub fn from_params(params: LabelEncoderParams) -> Result<Self> {
        let mut class_to_idx = HashMap::with_capacity(params.classes.len());
        for (idx, class) in params.classes.iter().enumerate() {
            if class_to_idx.insert(class.clone(), idx as i32).is_some() {
                return Err(PipelineError::InvalidParameter(format!(
                    "duplicate class '{}'",
                    class
                )));
            }
        }
        Ok(Self {
            classes: params.classes,
            class_to_idx,
        })
    }
}
