//! Vehicle emissions ETL and tax-band classification.
//!
//! The crate covers two stages:
//!
//! 1. **ETL**: load the raw emissions CSV into a [`table::Table`], clean it with
//!    [`etl::Cleaner`] and store it in SQLite through [`store::SqliteStore`].
//! 2. **Training**: read the stored table back, set unlabelled rows aside,
//!    split train/test, grid-search a [`pipeline::ClassifierPipeline`]
//!    (feature encoding + random forest) with cross validation, report test
//!    metrics and persist the [`trainer::TrainedModel`].
//!
//! # Example
//!
//! ```ignore
//! use emissions_classifier::prelude::*;
//!
//! let mut table = read_csv("emissions.csv")?;
//! Cleaner::default().clean(&mut table)?;
//!
//! let outcome = Trainer::builder().build()?.fit(&table)?;
//! println!("{}", outcome.report);
//! outcome.model.save_to_file("model.bin")?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod etl;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod model_selection;
pub mod pipeline;
pub mod preprocessing;
pub mod serialization;
pub mod split;
pub mod store;
pub mod table;
pub mod trainer;

pub use error::{PipelineError, Result};

/// Commonly used types.
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{PipelineError, Result};
    pub use crate::etl::Cleaner;
    pub use crate::metrics::ClassificationReport;
    pub use crate::preprocessing::{FeatureEncoder, FittedTransformer, Transformer};
    pub use crate::store::{SqliteStore, EMISSIONS_TABLE};
    pub use crate::table::csv::{read_csv, write_csv};
    pub use crate::table::{Column, ColumnData, Table};
    pub use crate::trainer::{TrainedModel, Trainer, TrainerBuilder};
}
