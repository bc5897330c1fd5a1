//! One-hot encoding for categorical columns.
//!
//! Each encoded column is removed and replaced by indicator columns named
//! `{column}_{value}`, appended after the remaining columns. Categories are
//! sorted, so the output schema depends only on the set of values seen at fit.

use crate::error::{PipelineError, Result};
use crate::preprocessing::encoding::HandleUnknown;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One-hot encoder for categorical columns.
///
/// Missing cells are encoded as the `other_label` category.
///
/// # Example
/// ```rust
/// use emissions_classifier::preprocessing::{FittedTransformer, OneHotEncoder, Transformer};
/// use emissions_classifier::table::{Column, Table};
///
/// let table = Table::from_columns(vec![Column::categorical(
///     "fuel_type",
///     vec![Some("Petrol".into()), Some("Diesel".into())],
/// )])
/// .unwrap();
///
/// let fitted = OneHotEncoder::new(vec!["fuel_type".into()]).fit(&table).unwrap();
/// let encoded = fitted.transform(&table).unwrap();
/// assert_eq!(encoded.column_names(), vec!["fuel_type_Diesel", "fuel_type_Petrol"]);
/// ```
#[derive(Clone, Debug)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    other_label: String,
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    /// Encode the given columns with default settings.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            other_label: "Other".to_string(),
            handle_unknown: HandleUnknown::default(),
        }
    }

    /// Set the label used for missing and unknown values.
    pub fn with_other_label(mut self, label: impl Into<String>) -> Self {
        self.other_label = label.into();
        self
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Encoded column names, in encoding order.
    pub columns: Vec<String>,
    /// Sorted categories for each encoded column.
    pub categories: Vec<Vec<String>>,
    pub other_label: String,
    pub handle_unknown: HandleUnknown,
}

impl Transformer for OneHotEncoder {
    type Params = OneHotEncoderParams;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, table: &Table) -> Result<Self::Fitted> {
        if table.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let mut categories = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let values = table.categorical(column)?;
            let seen: BTreeSet<&str> = values
                .iter()
                .map(|v| v.as_deref().unwrap_or(&self.other_label))
                .collect();
            categories.push(seen.into_iter().map(str::to_string).collect());
        }

        FittedOneHotEncoder::from_params(OneHotEncoderParams {
            columns: self.columns.clone(),
            categories,
            other_label: self.other_label.clone(),
            handle_unknown: self.handle_unknown,
        })
    }
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedOneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    /// Category to position, per column.
    lookup: Vec<HashMap<String, usize>>,
    other_label: String,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    /// Encoded source columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Categories learned for each encoded column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Number of indicator columns produced.
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Indicator column names in output order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, cats)| cats.iter().map(move |c| indicator_name(column, c)))
            .collect()
    }

    /// Position of the hot indicator for one cell, `None` for all zeros.
    fn hot_index(&self, col: usize, value: Option<&str>) -> Result<Option<usize>> {
        let lookup = &self.lookup[col];
        let value = value.unwrap_or(&self.other_label);
        if let Some(&idx) = lookup.get(value) {
            return Ok(Some(idx));
        }
        match self.handle_unknown {
            HandleUnknown::Other => Ok(lookup.get(&self.other_label).copied()),
            HandleUnknown::Ignore => Ok(None),
            HandleUnknown::Error => Err(PipelineError::UnknownCategory {
                column: self.columns[col].clone(),
                value: value.to_string(),
            }),
        }
    }
}

fn indicator_name(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}

impl FittedTransformer for FittedOneHotEncoder {
    type Params = OneHotEncoderParams;

    fn transform(&self, table: &Table) -> Result<Table> {
        let mut output = table.clone();
        let n_rows = table.n_rows();
        let mut indicators = Vec::with_capacity(self.n_features_out());

        for (col, column) in self.columns.iter().enumerate() {
            let values = match output.remove_column(column)?.into_data() {
                crate::table::ColumnData::Categorical(v) => v,
                other => {
                    return Err(PipelineError::ColumnType {
                        column: column.clone(),
                        expected: "categorical",
                        got: other.kind(),
                    })
                }
            };

            let cats = &self.categories[col];
            let mut dense = vec![vec![Some(0.0); n_rows]; cats.len()];
            for (row, value) in values.iter().enumerate() {
                if let Some(idx) = self.hot_index(col, value.as_deref())? {
                    dense[idx][row] = Some(1.0);
                }
            }

            for (category, cells) in cats.iter().zip(dense) {
                indicators.push(Column::numeric(indicator_name(column, category), cells));
            }
        }

        for column in indicators {
            output.push_column(column)?;
        }
        Ok(output)
    }

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            columns: self.columns.clone(),
            categories: self.categories.clone(),
            other_label: self.other_label.clone(),
            handle_unknown: self.handle_unknown,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.columns.len() != params.categories.len() {
            return Err(PipelineError::FeatureMismatch {
                expected_features: params.columns.len(),
                got_features: params.categories.len(),
            });
        }
        let lookup = params
            .categories
            .iter()
            .map(|cats| {
                cats.iter()
                    .enumerate()
                    .map(|(i, c)| (c.clone(), i))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns: params.columns,
            categories: params.categories,
            lookup,
            other_label: params.other_label,
            handle_unknown: params.handle_unknown,
        })
    }
}
