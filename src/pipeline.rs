//! Classifier pipeline: feature encoding followed by a random forest.
//!
//! The fitted pipeline owns everything needed at inference time: the fitted
//! encoder (imputation statistics, categories, output schema), the label
//! classes and the forest. It is persisted as one bincode blob whose parts are
//! themselves bincode-encoded parameter structs.

use crate::config::EncoderConfig;
use crate::error::{PipelineError, Result};
use crate::model::{FittedRandomForest, ForestParams, InferenceModel, RandomForest};
use crate::preprocessing::{
    FeatureEncoder, FeatureEncoderParams, FittedFeatureEncoder, FittedLabelEncoder,
    FittedTransformer, LabelEncoder, LabelEncoderParams, Transformer,
};
use crate::serialization::SerializableParams;
use crate::split::label_values;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Unfitted pipeline.
#[derive(Clone, Debug)]
pub struct ClassifierPipeline {
    encoder: FeatureEncoder,
    forest: RandomForest,
    label: String,
}

impl ClassifierPipeline {
    pub fn new(encoder: EncoderConfig, params: ForestParams, label: impl Into<String>) -> Self {
        Self {
            encoder: FeatureEncoder::new(encoder),
            forest: RandomForest::new(params),
            label: label.into(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        self.forest.params()
    }

    /// Fit on a fully labelled table that still contains the label column.
    pub fn fit(&self, table: &Table) -> Result<FittedClassifierPipeline> {
        let y = label_values(table, &self.label)?;
        let (labels, y_encoded) = LabelEncoder::new().fit_transform(&y)?;

        let features = without_label(table, &self.label);
        let encoder = self.encoder.fit(&features)?;
        let x = encoder.transform_to_matrix(&features)?;
        let forest = self.forest.fit(&x, &y_encoded)?;

        Ok(FittedClassifierPipeline {
            encoder,
            labels,
            forest,
            label: self.label.clone(),
        })
    }
}

fn without_label(table: &Table, label: &str) -> Table {
    let mut features = table.clone();
    features.drop_columns_if_present(&[label]);
    features
}

/// Serializable parameters for a fitted pipeline.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClassifierPipelineParams {
    /// Name of the target column.
    pub label: String,
    /// Encoded [`FeatureEncoderParams`].
    pub encoder: Vec<u8>,
    pub classes: LabelEncoderParams,
    /// Encoded [`FittedRandomForest`].
    pub model: Vec<u8>,
}

/// Fitted pipeline ready for inference.
#[derive(Debug)]
pub struct FittedClassifierPipeline {
    encoder: FittedFeatureEncoder,
    labels: FittedLabelEncoder,
    forest: FittedRandomForest,
    label: String,
}

impl FittedClassifierPipeline {
    pub fn encoder(&self) -> &FittedFeatureEncoder {
        &self.encoder
    }

    pub fn forest(&self) -> &FittedRandomForest {
        &self.forest
    }

    /// Known class labels in sorted order.
    pub fn classes(&self) -> &[String] {
        self.labels.classes()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Predict a label for every row of `table`. A label column, if present,
    /// is ignored.
    pub fn predict(&self, table: &Table) -> Result<Vec<String>> {
        let features = without_label(table, &self.label);
        let x = self.encoder.transform_to_matrix(&features)?;
        let encoded = self.forest.predict_batch(&x)?;
        self.labels.inverse_transform(&encoded)
    }

    pub fn extract_params(&self) -> Result<ClassifierPipelineParams> {
        let encoder = self
            .encoder
            .extract_params()
            .to_bytes()
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        let model = bincode::serialize(&self.forest)?;

        Ok(ClassifierPipelineParams {
            label: self.label.clone(),
            encoder,
            classes: self.labels.extract_params(),
            model,
        })
    }

    pub fn from_params(params: ClassifierPipelineParams) -> Result<Self> {
        let encoder_params = FeatureEncoderParams::from_bytes(&params.encoder)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        let encoder = FittedFeatureEncoder::from_params(encoder_params)?;
        let forest: FittedRandomForest = bincode::deserialize(&params.model)?;

        if forest.n_features_in() != encoder.n_features_out() {
            return Err(PipelineError::FeatureMismatch {
                expected_features: encoder.n_features_out(),
                got_features: forest.n_features_in(),
            });
        }

        Ok(Self {
            encoder,
            labels: FittedLabelEncoder::from_params(params.classes)?,
            forest,
            label: params.label,
        })
    }
}

impl InferenceModel for FittedClassifierPipeline {
    type Input = Table;
    type Output = Vec<String>;

    fn predict_batch(&self, input: &Table) -> Result<Vec<String>> {
        self.predict(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use std::collections::BTreeMap;

    fn config() -> EncoderConfig {
        EncoderConfig {
            drop_columns: vec![],
            numeric_columns: vec!["co2".to_string()],
            categorical_columns: vec!["fuel_type".to_string()],
            rare_categories: BTreeMap::new(),
            ..EncoderConfig::default()
        }
    }

    fn labelled() -> Table {
        let co2 = vec![90.0, 95.0, 100.0, 105.0, 250.0, 260.0, 270.0, 280.0];
        let fuel = ["Petrol", "Petrol", "Diesel", "Petrol", "Diesel", "Diesel", "Petrol", "Diesel"];
        let band = ["A", "A", "A", "A", "K", "K", "K", "K"];
        Table::from_columns(vec![
            Column::numeric("co2", co2.into_iter().map(Some).collect()),
            Column::categorical(
                "fuel_type",
                fuel.iter().map(|s| Some(s.to_string())).collect(),
            ),
            Column::categorical("tax_band", band.iter().map(|s| Some(s.to_string())).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn test_pipeline_fit_predict() {
        let data = labelled();
        let fitted = ClassifierPipeline::new(config(), ForestParams::default(), "tax_band")
            .fit(&data)
            .unwrap();

        assert_eq!(fitted.classes(), &["A".to_string(), "K".to_string()]);
        let predictions = fitted.predict(&data).unwrap();
        assert_eq!(predictions, label_values(&data, "tax_band").unwrap());
    }

    #[test]
    fn test_pipeline_predicts_without_label_column() {
        let data = labelled();
        let fitted = ClassifierPipeline::new(config(), ForestParams::default(), "tax_band")
            .fit(&data)
            .unwrap();

        let mut unlabelled = data.clone();
        unlabelled.remove_column("tax_band").unwrap();
        assert_eq!(fitted.predict(&unlabelled).unwrap().len(), data.n_rows());
    }

    #[test]
    fn test_pipeline_requires_complete_labels() {
        let mut data = labelled();
        data.categorical_mut("tax_band").unwrap()[0] = None;
        let result =
            ClassifierPipeline::new(config(), ForestParams::default(), "tax_band").fit(&data);
        assert!(matches!(result, Err(PipelineError::MissingValues(_))));
    }

    #[test]
    fn test_pipeline_params_roundtrip() {
        let data = labelled();
        let fitted = ClassifierPipeline::new(config(), ForestParams::default(), "tax_band")
            .fit(&data)
            .unwrap();

        let bytes = fitted.extract_params().unwrap().to_bytes().unwrap();
        let params = ClassifierPipelineParams::from_bytes(&bytes).unwrap();
        let restored = FittedClassifierPipeline::from_params(params).unwrap();

        assert_eq!(restored.label(), "tax_band");
        assert_eq!(
            restored.predict(&data).unwrap(),
            fitted.predict(&data).unwrap()
        );
    }
}
