//! Categorical feature encoding.
//!
//! ## RareCategoryGrouper
//! Folds configured rare values of a column into a shared `Other` bucket.
//!
//! ## OneHotEncoder
//! Replaces each categorical column with one 0/1 indicator column per
//! category seen during fit.
//!
//! ```ignore
//! // fuel_type: ["Petrol", "Diesel", "Petrol"]
//! // fuel_type_Diesel: [0, 1, 0]
//! // fuel_type_Petrol: [1, 0, 1]
//! ```
//!
//! ## LabelEncoder
//! Encodes string target labels to integer class indices.

mod grouping;
mod label;
mod one_hot;

pub use grouping::RareCategoryGrouper;
pub use label::{FittedLabelEncoder, LabelEncoder, LabelEncoderParams};
pub use one_hot::{FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};

/// Strategy for categories first seen during transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Count the value as the `Other` category; all zeros if no `Other`
    /// indicator was learned.
    #[default]
    Other,
    /// Output all zeros for the column.
    Ignore,
    /// Fail the transform.
    Error,
}
