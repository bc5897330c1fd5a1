//! Serialization of fitted pipeline parameters.
//!
//! Fitted transformers and trained models are persisted as plain parameter
//! structs. Anything that is `Serialize + Deserialize` gets a bincode encoding
//! through the blanket impl below.

use std::error::Error;

/// A trait for parameter representations that can be serialized to and from bytes.
///
/// Implementors should contain only plain data (e.g., `Vec<f64>`, category
/// lists, fitted trees), not open handles.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stats {
        columns: Vec<String>,
        values: Vec<f64>,
    }

    #[test]
    fn test_params_bytes_roundtrip() {
        let stats = Stats {
            columns: vec!["co2".to_string(), "noise_level".to_string()],
            values: vec![151.5, 71.25],
        };
        let bytes = stats.to_bytes().unwrap();
        let restored = Stats::from_bytes(&bytes).unwrap();
        assert_eq!(stats, restored);
    }

    #[test]
    fn test_truncated_bytes_fail() {
        let stats = Stats {
            columns: vec!["co2".to_string()],
            values: vec![1.0],
        };
        let bytes = stats.to_bytes().unwrap();
        assert!(Stats::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}
