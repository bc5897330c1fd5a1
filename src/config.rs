//! Pipeline configuration.
//!
//! Every knob the pipeline exposes lives in [`PipelineConfig`]. All sections
//! carry `#[serde(default)]`, so a TOML file only needs to name the values it
//! overrides:
//!
//! ```toml
//! [split]
//! test_fraction = 0.2
//! seed = 7
//!
//! [encoder.imputation]
//! strategy = "median"
//! statistics = "per_batch"
//!
//! [search]
//! criterion = ["gini", "entropy"]
//! n_trees = [10, 50]
//! cv_folds = 3
//! ```

use crate::error::{PipelineError, Result};
use crate::model::Criterion;
use crate::preprocessing::{HandleUnknown, ImputeStrategy, StatisticsSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration shared by all binaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub etl: EtlConfig,
    pub encoder: EncoderConfig,
    pub split: SplitConfig,
    pub search: SearchConfig,
}

impl PipelineConfig {
    /// Load a TOML configuration file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Parse TOML text and validate it.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Reject values no pipeline stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.data.table.is_empty() {
            return Err(PipelineError::Config("data.table must not be empty".into()));
        }
        if self.data.label.is_empty() {
            return Err(PipelineError::Config("data.label must not be empty".into()));
        }
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            return Err(PipelineError::Config(format!(
                "split.test_fraction must be in (0, 1), got {}",
                self.split.test_fraction
            )));
        }
        if self.search.cv_folds < 2 {
            return Err(PipelineError::Config(format!(
                "search.cv_folds must be at least 2, got {}",
                self.search.cv_folds
            )));
        }
        if self.search.criterion.is_empty() || self.search.n_trees.is_empty() {
            return Err(PipelineError::Config(
                "search.criterion and search.n_trees need at least one value".into(),
            ));
        }
        if self.search.n_trees.contains(&0) {
            return Err(PipelineError::Config("search.n_trees values must be > 0".into()));
        }
        if self.encoder.other_label.is_empty() {
            return Err(PipelineError::Config("encoder.other_label must not be empty".into()));
        }
        for column in self.encoder.rare_categories.keys() {
            if !self.encoder.categorical_columns.contains(column) {
                return Err(PipelineError::Config(format!(
                    "encoder.rare_categories.{} is not one of encoder.categorical_columns",
                    column
                )));
            }
        }
        Ok(())
    }
}

/// Where the cleaned data lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Table written by the ETL stage and read by training.
    pub table: String,
    /// Target column.
    pub label: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            table: crate::store::EMISSIONS_TABLE.to_string(),
            label: "tax_band".to_string(),
        }
    }
}

/// One literal value substitution in a categorical column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueReplacement {
    pub column: String,
    pub from: String,
    pub to: String,
}

/// Raw CSV cleanup applied before the data is stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Columns removed when present.
    pub drop_columns: Vec<String>,
    /// Value substitutions, applied in order.
    pub replacements: Vec<ValueReplacement>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            drop_columns: strings(&["file", "date_of_change"]),
            replacements: vec![ValueReplacement {
                column: "transmission".to_string(),
                from: "ASM  ".to_string(),
                to: "ASM".to_string(),
            }],
        }
    }
}

/// Imputation settings for the numeric features.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputationConfig {
    pub strategy: ImputeStrategy,
    pub statistics: StatisticsSource,
}

/// Feature encoding applied before the classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Columns that must be present and are removed.
    pub drop_columns: Vec<String>,
    /// Numeric columns whose missing values are imputed.
    pub numeric_columns: Vec<String>,
    /// Categorical columns replaced by indicator columns.
    pub categorical_columns: Vec<String>,
    /// Per column, values folded into `other_label` before encoding.
    pub rare_categories: BTreeMap<String, Vec<String>>,
    /// Bucket for rare and missing category values.
    pub other_label: String,
    /// Policy for categories first seen at transform time.
    pub handle_unknown: HandleUnknown,
    pub imputation: ImputationConfig,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let mut rare_categories = BTreeMap::new();
        rare_categories.insert(
            "manufacturer".to_string(),
            strings(&[
                "Aston Martin Lagonda",
                "Bentley Motors",
                "Ferrari",
                "Infiniti",
                "Lamborghini",
                "Lotus",
                "Maserati",
                "Morgan Motor Company",
                "Perodua",
                "Proton",
                "Rolls-Royce",
                "Ssangyong",
            ]),
        );
        rare_categories.insert(
            "transmission".to_string(),
            strings(&[
                "A5AWD", "AM5", "AM6", "AMT5", "AV", "ET", "QA", "QD", "QM", "SAT5",
            ]),
        );
        rare_categories.insert(
            "fuel_type".to_string(),
            strings(&[
                "CNG",
                "Diesel Electric",
                "Electricity",
                "Electricity/Diesel",
                "Electricity/Petrol",
                "LPG",
                "LPG / Petrol",
                "Petrol / E85",
                "Petrol / E85 (Flex Fuel)",
                "Petrol Electric",
                "Petrol Hybrid",
            ]),
        );

        Self {
            drop_columns: strings(&[
                "urban_metric",
                "extra_urban_metric",
                "urban_imperial",
                "extra_urban_imperial",
                "combined_imperial",
                "thc_nox_emissions",
                "fuel_cost_6000_miles",
                "standard_12_months",
                "standard_6_months",
                "first_year_12_months",
                "first_year_6_months",
                "model",
                "description",
            ]),
            numeric_columns: strings(&[
                "year",
                "euro_standard",
                "noise_level",
                "engine_capacity",
                "combined_metric",
                "fuel_cost_12000_miles",
                "co2",
                "thc_emissions",
                "co_emissions",
                "nox_emissions",
                "particulates_emissions",
            ]),
            categorical_columns: strings(&[
                "manufacturer",
                "transmission",
                "transmission_type",
                "fuel_type",
            ]),
            rare_categories,
            other_label: "Other".to_string(),
            handle_unknown: HandleUnknown::default(),
            imputation: ImputationConfig::default(),
        }
    }
}

/// Train/test partitioning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of labelled rows held out for evaluation.
    pub test_fraction: f64,
    /// Shuffle seed; `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.25,
            seed: Some(42),
        }
    }
}

/// Hyper-parameter grid and cross validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub criterion: Vec<Criterion>,
    pub n_trees: Vec<u16>,
    /// Tree depth limits; `0` means unlimited.
    pub max_depth: Vec<u16>,
    pub cv_folds: usize,
    /// Seed for fold assignment and forest bootstrapping.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            criterion: vec![Criterion::Gini, Criterion::Entropy],
            n_trees: vec![10],
            max_depth: vec![0],
            cv_folds: 5,
            seed: 42,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
