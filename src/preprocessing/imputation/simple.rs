//! Simple Imputer.
//!
//! Fills missing cells of numeric columns with a per-column statistic.
//!
//! # Example
//! ```ignore
//! use emissions_classifier::preprocessing::{SimpleImputer, ImputeStrategy, Transformer};
//!
//! let imputer = SimpleImputer::new(vec!["co2".into(), "noise_level".into()])
//!     .with_strategy(ImputeStrategy::Median);
//! let fitted = imputer.fit(&train)?;
//! let imputed = fitted.transform(&test)?;
//! ```

use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Statistic used to fill missing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Column mean.
    #[default]
    Mean,
    /// Column median.
    Median,
    /// Leave missing cells as they are.
    None,
}

/// Where the fill values come from at transform time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsSource {
    /// Learned once on the training table and reused.
    #[default]
    Fitted,
    /// Recomputed on every table being transformed.
    PerBatch,
}

/// Serializable parameters for a fitted SimpleImputer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputerParams {
    pub columns: Vec<String>,
    pub strategy: ImputeStrategy,
    pub source: StatisticsSource,
    /// Fill value per column, in `columns` order.
    pub statistics: Vec<f64>,
}

/// SimpleImputer transformer (unfitted).
#[derive(Clone, Debug)]
pub struct SimpleImputer {
    columns: Vec<String>,
    strategy: ImputeStrategy,
    source: StatisticsSource,
}

impl SimpleImputer {
    /// Impute the given numeric columns with the column mean.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            strategy: ImputeStrategy::default(),
            source: StatisticsSource::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_statistics(mut self, source: StatisticsSource) -> Self {
        self.source = source;
        self
    }
}

/// A cell needing a fill value.
fn is_missing(cell: &Option<f64>) -> bool {
    cell.map_or(true, f64::is_nan)
}

/// Fill value for one column, ignoring non-finite cells. A column without any
/// observed value yields 0.
fn compute_statistic(column: &str, values: &[Option<f64>], strategy: ImputeStrategy) -> f64 {
    let mut observed: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    if observed.is_empty() {
        if strategy != ImputeStrategy::None {
            tracing::warn!(column, "no observed values, filling with 0");
        }
        return 0.0;
    }

    match strategy {
        ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
        ImputeStrategy::Median => {
            observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let n = observed.len();
            if n % 2 == 0 {
                (observed[n / 2 - 1] + observed[n / 2]) / 2.0
            } else {
                observed[n / 2]
            }
        }
        ImputeStrategy::None => f64::NAN,
    }
}

fn compute_statistics(
    table: &Table,
    columns: &[String],
    strategy: ImputeStrategy,
) -> Result<Vec<f64>> {
    columns
        .iter()
        .map(|name| Ok(compute_statistic(name, table.numeric(name)?, strategy)))
        .collect()
}

impl Transformer for SimpleImputer {
    type Params = SimpleImputerParams;
    type Fitted = FittedSimpleImputer;

    fn fit(&self, table: &Table) -> Result<Self::Fitted> {
        if table.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit SimpleImputer on empty data".to_string(),
            ));
        }

        let statistics = compute_statistics(table, &self.columns, self.strategy)?;

        Ok(FittedSimpleImputer {
            columns: self.columns.clone(),
            strategy: self.strategy,
            source: self.source,
            statistics,
        })
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedSimpleImputer {
    columns: Vec<String>,
    strategy: ImputeStrategy,
    source: StatisticsSource,
    statistics: Vec<f64>,
}

impl FittedSimpleImputer {
    /// Fill values learned at fit time, in column order.
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl FittedTransformer for FittedSimpleImputer {
    type Params = SimpleImputerParams;

    fn transform(&self, table: &Table) -> Result<Table> {
        let mut output = table.clone();
        if self.strategy == ImputeStrategy::None {
            // Still surface missing or mistyped columns.
            for name in &self.columns {
                output.numeric(name)?;
            }
            return Ok(output);
        }

        let statistics = match self.source {
            StatisticsSource::Fitted => self.statistics.clone(),
            StatisticsSource::PerBatch => compute_statistics(table, &self.columns, self.strategy)?,
        };

        for (name, fill) in self.columns.iter().zip(statistics) {
            for cell in output.numeric_mut(name)?.iter_mut() {
                if is_missing(cell) {
                    *cell = Some(fill);
                }
            }
        }

        Ok(output)
    }

    fn extract_params(&self) -> Self::Params {
        SimpleImputerParams {
            columns: self.columns.clone(),
            strategy: self.strategy,
            source: self.source,
            statistics: self.statistics.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.columns.len() != params.statistics.len() {
            return Err(PipelineError::FeatureMismatch {
                expected_features: params.columns.len(),
                got_features: params.statistics.len(),
            });
        }
        Ok(Self {
            columns: params.columns,
            strategy: params.strategy,
            source: params.source,
            statistics: params.statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn create_test_data_with_missing() -> Table {
        Table::from_columns(vec![
            Column::numeric("co2", vec![Some(1.0), Some(3.0), Some(5.0)]),
            Column::numeric("noise_level", vec![None, Some(4.0), Some(6.0)]),
            Column::categorical(
                "fuel_type",
                vec![Some("Petrol".into()), None, Some("Diesel".into())],
            ),
        ])
        .unwrap()
    }

    fn columns() -> Vec<String> {
        vec!["co2".to_string(), "noise_level".to_string()]
    }

    #[test]
    fn test_simple_imputer_mean() {
        let data = create_test_data_with_missing();
        let fitted = SimpleImputer::new(columns()).fit(&data).unwrap();

        let stats = fitted.statistics();
        assert!((stats[0] - 3.0).abs() < 1e-12);
        assert!((stats[1] - 5.0).abs() < 1e-12);

        let imputed = fitted.transform(&data).unwrap();
        assert_eq!(
            imputed.numeric("noise_level").unwrap(),
            &[Some(5.0), Some(4.0), Some(6.0)]
        );
        // Categorical columns are left alone.
        assert_eq!(imputed.categorical("fuel_type").unwrap()[1], None);
    }

    #[test]
    fn test_simple_imputer_median() {
        let data = Table::from_columns(vec![Column::numeric(
            "co2",
            vec![Some(1.0), None, Some(10.0), Some(2.0)],
        )])
        .unwrap();
        let fitted = SimpleImputer::new(vec!["co2".into()])
            .with_strategy(ImputeStrategy::Median)
            .fit(&data)
            .unwrap();
        assert_eq!(fitted.statistics(), &[2.0]);
    }

    #[test]
    fn test_simple_imputer_none_leaves_gaps() {
        let data = create_test_data_with_missing();
        let imputed = SimpleImputer::new(columns())
            .with_strategy(ImputeStrategy::None)
            .fit_transform(&data)
            .unwrap();
        assert_eq!(imputed.numeric("noise_level").unwrap()[0], None);
    }

    #[test]
    fn test_all_missing_column_filled_with_zero() {
        let data = Table::from_columns(vec![Column::numeric("co2", vec![None, None])]).unwrap();
        let imputed = SimpleImputer::new(vec!["co2".into()])
            .fit_transform(&data)
            .unwrap();
        assert_eq!(imputed.numeric("co2").unwrap(), &[Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_non_finite_cells_do_not_poison_statistics() {
        let data = Table::from_columns(vec![Column::numeric(
            "co2",
            vec![Some(100.0), Some(f64::NAN), Some(f64::INFINITY), Some(300.0), None],
        )])
        .unwrap();
        let fitted = SimpleImputer::new(vec!["co2".into()]).fit(&data).unwrap();
        assert_eq!(fitted.statistics(), &[200.0]);

        let imputed = fitted.transform(&data).unwrap();
        let co2 = imputed.numeric("co2").unwrap();
        assert_eq!(co2[1], Some(200.0));
        assert_eq!(co2[4], Some(200.0));
    }

    #[test]
    fn test_fitted_statistics_reused_on_new_batch() {
        let train = create_test_data_with_missing();
        let fitted = SimpleImputer::new(columns()).fit(&train).unwrap();

        let batch = Table::from_columns(vec![
            Column::numeric("co2", vec![None, Some(100.0)]),
            Column::numeric("noise_level", vec![Some(1.0), None]),
        ])
        .unwrap();
        let imputed = fitted.transform(&batch).unwrap();
        assert_eq!(imputed.numeric("co2").unwrap()[0], Some(3.0));
        assert_eq!(imputed.numeric("noise_level").unwrap()[1], Some(5.0));
    }

    #[test]
    fn test_per_batch_statistics_recomputed() {
        let train = create_test_data_with_missing();
        let fitted = SimpleImputer::new(columns())
            .with_statistics(StatisticsSource::PerBatch)
            .fit(&train)
            .unwrap();

        let batch = Table::from_columns(vec![
            Column::numeric("co2", vec![None, Some(100.0)]),
            Column::numeric("noise_level", vec![Some(1.0), None]),
        ])
        .unwrap();
        let imputed = fitted.transform(&batch).unwrap();
        assert_eq!(imputed.numeric("co2").unwrap()[0], Some(100.0));
        assert_eq!(imputed.numeric("noise_level").unwrap()[1], Some(1.0));
    }

    #[test]
    fn test_simple_imputer_missing_column() {
        let data = create_test_data_with_missing();
        let result = SimpleImputer::new(vec!["engine_capacity".into()]).fit(&data);
        assert!(matches!(result, Err(PipelineError::MissingColumn(_))));
    }

    #[test]
    fn test_simple_imputer_rejects_categorical_column() {
        let data = create_test_data_with_missing();
        let result = SimpleImputer::new(vec!["fuel_type".into()]).fit(&data);
        assert!(matches!(result, Err(PipelineError::ColumnType { .. })));
    }

    #[test]
    fn test_simple_imputer_serialization() {
        let data = create_test_data_with_missing();
        let fitted = SimpleImputer::new(columns()).fit(&data).unwrap();

        let restored = FittedSimpleImputer::from_params(fitted.extract_params()).unwrap();
        assert_eq!(
            fitted.transform(&data).unwrap(),
            restored.transform(&data).unwrap()
        );
    }

    #[test]
    fn test_simple_imputer_save_load() {
        let data = create_test_data_with_missing();
        let fitted = SimpleImputer::new(columns()).fit(&data).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imputer.bin");
        fitted.save_to_file(&path).unwrap();
        let loaded = FittedSimpleImputer::load_from_file(&path).unwrap();
        assert_eq!(loaded.statistics(), fitted.statistics());
    }

    #[test]
    fn test_simple_imputer_empty_data() {
        let data = Table::from_columns(vec![Column::numeric("co2", vec![])]).unwrap();
        let result = SimpleImputer::new(vec!["co2".into()]).fit(&data);
        assert!(matches!(result, Err(PipelineError::EmptyData(_))));
    }
}
