//! Emissions feature encoder.
//!
//! Turns a cleaned emissions table into an all-numeric feature table. Steps run
//! in a fixed order:
//!
//! 1. drop the configured irrelevant columns (all must exist),
//! 2. impute the configured numeric columns,
//! 3. fold rare category values into `Other`,
//! 4. one-hot encode the categorical columns.
//!
//! The fitted encoder remembers the output schema, so tables transformed at
//! inference time line up column for column with the training matrix.

use crate::config::EncoderConfig;
use crate::error::{PipelineError, Result};
use crate::preprocessing::encoding::{
    FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams, RareCategoryGrouper,
};
use crate::preprocessing::imputation::{FittedSimpleImputer, SimpleImputer, SimpleImputerParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::Table;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Unfitted feature encoder.
#[derive(Clone, Debug)]
pub struct FeatureEncoder {
    config: EncoderConfig,
}

impl FeatureEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn imputer(&self) -> SimpleImputer {
        SimpleImputer::new(self.config.numeric_columns.clone())
            .with_strategy(self.config.imputation.strategy)
            .with_statistics(self.config.imputation.statistics)
    }

    fn one_hot(&self) -> OneHotEncoder {
        OneHotEncoder::new(self.config.categorical_columns.clone())
            .with_other_label(self.config.other_label.clone())
            .with_handle_unknown(self.config.handle_unknown)
    }

    fn grouper(&self) -> RareCategoryGrouper {
        RareCategoryGrouper::new(
            self.config.rare_categories.clone(),
            self.config.other_label.clone(),
        )
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

/// Serializable parameters for a fitted FeatureEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoderParams {
    pub drop_columns: Vec<String>,
    pub imputer: SimpleImputerParams,
    pub grouper: RareCategoryGrouper,
    pub one_hot: OneHotEncoderParams,
    /// Output columns, in matrix order.
    pub feature_names: Vec<String>,
}

impl Transformer for FeatureEncoder {
    type Params = FeatureEncoderParams;
    type Fitted = FittedFeatureEncoder;

    fn fit(&self, table: &Table) -> Result<Self::Fitted> {
        if table.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit FeatureEncoder on empty data".to_string(),
            ));
        }

        let mut work = table.clone();
        work.drop_columns(&self.config.drop_columns)?;
        align_empty_columns(
            &mut work,
            &self.config.numeric_columns,
            &self.config.categorical_columns,
        )?;

        let imputer = self.imputer().fit(&work)?;
        let mut work = imputer.transform(&work)?;

        let grouper = self.grouper();
        grouper.apply(&mut work)?;

        let one_hot = self.one_hot().fit(&work)?;
        let encoded = one_hot.transform(&work)?;

        if let Some(column) = encoded.categorical_columns().first() {
            return Err(PipelineError::ColumnType {
                column: column.to_string(),
                expected: "numeric",
                got: "categorical",
            });
        }

        let feature_names: Vec<String> =
            encoded.column_names().into_iter().map(str::to_string).collect();

        tracing::info!(
            features = feature_names.len(),
            indicators = one_hot.n_features_out(),
            "feature encoder fitted"
        );

        Ok(FittedFeatureEncoder {
            drop_columns: self.config.drop_columns.clone(),
            imputer,
            grouper,
            one_hot,
            feature_names,
        })
    }
}

/// A column with no value at all loads without a usable type (CSV inference
/// makes it numeric). Give such columns the type their step expects.
fn align_empty_columns(table: &mut Table, numeric: &[String], categorical: &[String]) -> Result<()> {
    for name in numeric {
        table.numeric_if_all_missing(name)?;
    }
    for name in categorical {
        table.categorical_if_all_missing(name)?;
    }
    Ok(())
}

/// Fitted feature encoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedFeatureEncoder {
    drop_columns: Vec<String>,
    imputer: FittedSimpleImputer,
    grouper: RareCategoryGrouper,
    one_hot: FittedOneHotEncoder,
    feature_names: Vec<String>,
}

impl FittedFeatureEncoder {
    /// Output column names learned at fit, in matrix order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features_out(&self) -> usize {
        self.feature_names.len()
    }

    pub fn imputer(&self) -> &FittedSimpleImputer {
        &self.imputer
    }

    pub fn one_hot(&self) -> &FittedOneHotEncoder {
        &self.one_hot
    }

    /// Encode `table` and lay it out as a dense matrix in fit-time column
    /// order. Columns not seen at fit are ignored.
    pub fn transform_to_matrix(&self, table: &Table) -> Result<Array2<f64>> {
        let encoded = self.transform(table)?;
        encoded.select(&self.feature_names)?.to_matrix()
    }
}

impl FittedTransformer for FittedFeatureEncoder {
    type Params = FeatureEncoderParams;

    fn transform(&self, table: &Table) -> Result<Table> {
        let mut work = table.clone();
        work.drop_columns(&self.drop_columns)?;
        align_empty_columns(&mut work, self.imputer.columns(), self.one_hot.columns())?;
        let mut work = self.imputer.transform(&work)?;
        self.grouper.apply(&mut work)?;
        self.one_hot.transform(&work)
    }

    fn extract_params(&self) -> Self::Params {
        FeatureEncoderParams {
            drop_columns: self.drop_columns.clone(),
            imputer: self.imputer.extract_params(),
            grouper: self.grouper.clone(),
            one_hot: self.one_hot.extract_params(),
            feature_names: self.feature_names.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(Self {
            drop_columns: params.drop_columns,
            imputer: FittedSimpleImputer::from_params(params.imputer)?,
            grouper: params.grouper,
            one_hot: FittedOneHotEncoder::from_params(params.one_hot)?,
            feature_names: params.feature_names,
        })
    }
}
