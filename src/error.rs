//! Error types for pipeline operations.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error type for every stage of the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A column the step expects is not present in the table.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A database table the step expects does not exist.
    #[error("Missing table: {0}")]
    MissingTable(String),

    /// A column exists but holds the wrong kind of data.
    #[error("Column '{column}' has type {got}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        got: &'static str,
    },

    /// Column lengths or names are inconsistent.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },

    /// Data contains missing values where none are allowed.
    #[error("Missing values: {0}")]
    MissingValues(String),

    /// Invalid hyperparameter or configuration value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Feature dimension mismatch between fit and transform.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },

    /// A category value was not seen during fit.
    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// Configuration file could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The classifier failed to fit or predict.
    #[error("Model error: {0}")]
    Model(String),

    /// CSV parse or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

impl From<smartcore::error::Failed> for PipelineError {
    fn from(err: smartcore::error::Failed) -> Self {
        PipelineError::Model(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_column() {
        let err = PipelineError::MissingColumn("co2".to_string());
        assert_eq!(err.to_string(), "Missing column: co2");
    }

    #[test]
    fn test_error_display_column_type() {
        let err = PipelineError::ColumnType {
            column: "manufacturer".to_string(),
            expected: "numeric",
            got: "categorical",
        };
        assert!(err.to_string().contains("manufacturer"));
        assert!(err.to_string().contains("expected numeric"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = PipelineError::FeatureMismatch {
            expected_features: 5,
            got_features: 3,
        };
        assert!(err.to_string().contains("Feature mismatch"));
    }

    #[test]
    fn test_error_display_unknown_category() {
        let err = PipelineError::UnknownCategory {
            column: "fuel_type".to_string(),
            value: "Hydrogen".to_string(),
        };
        assert!(err.to_string().contains("Hydrogen"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_error_from_bincode_error() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let bincode_result: std::result::Result<String, bincode::Error> =
            bincode::deserialize(bad_bytes);
        if let Err(e) = bincode_result {
            let err: PipelineError = e.into();
            assert!(matches!(err, PipelineError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_from_toml_error() {
        let toml_result: std::result::Result<toml::Value, toml::de::Error> =
            toml::from_str("not = = valid");
        let err: PipelineError = toml_result.unwrap_err().into();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_error_is_std_error() {
        let err = PipelineError::InvalidParameter("test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
