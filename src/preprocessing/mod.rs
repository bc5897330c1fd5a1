//! Table preprocessing transformers.
//!
//! Every transformer follows the same fit/transform split:
//!
//! - [`Transformer`]: unfitted, carries hyper-parameters
//! - [`FittedTransformer`]: learned state, can transform new tables and be
//!   saved with `save_to_file` / `load_from_file`
//!
//! # Available Transformers
//!
//! ## Imputation
//! - [`SimpleImputer`]: fill numeric columns with their mean or median
//!
//! ## Encoding
//! - [`RareCategoryGrouper`]: fold rare values into `Other`
//! - [`OneHotEncoder`]: one indicator column per category
//! - [`LabelEncoder`]: string targets to class indices
//!
//! ## Composite
//! - [`FeatureEncoder`]: the full emissions feature preparation
//!
//! # Example
//!
//! ```ignore
//! use emissions_classifier::preprocessing::{FeatureEncoder, FittedTransformer, Transformer};
//!
//! let fitted = FeatureEncoder::default().fit(&train)?;
//! let x_train = fitted.transform_to_matrix(&train)?;
//!
//! fitted.save_to_file("encoder.bin")?;
//! let loaded = FittedFeatureEncoder::load_from_file("encoder.bin")?;
//! let x_test = loaded.transform_to_matrix(&test)?;
//! ```

pub mod encoder;
pub mod encoding;
pub mod imputation;
pub mod traits;

pub use encoder::{FeatureEncoder, FeatureEncoderParams, FittedFeatureEncoder};
pub use encoding::{
    FittedLabelEncoder, FittedOneHotEncoder, HandleUnknown, LabelEncoder, LabelEncoderParams,
    OneHotEncoder, OneHotEncoderParams, RareCategoryGrouper,
};
pub use imputation::{
    FittedSimpleImputer, ImputeStrategy, SimpleImputer, SimpleImputerParams, StatisticsSource,
};
pub use traits::{FittedTransformer, Transformer};
