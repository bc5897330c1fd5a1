//! Imputation transformers for handling missing values.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`SimpleImputer`] | Fill numeric columns with their mean or median |
//!
//! Fill values are either learned at fit time ([`StatisticsSource::Fitted`])
//! or recomputed for every transformed table ([`StatisticsSource::PerBatch`]).

pub mod simple;

pub use simple::{
    FittedSimpleImputer, ImputeStrategy, SimpleImputer, SimpleImputerParams, StatisticsSource,
};
