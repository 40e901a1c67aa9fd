use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::*;

/// Result of `POST /predict`.
///
/// The service has renamed its fields over time, so the verdict and the
/// probability are resolved from whichever known key is present. The untouched
/// body is kept in `raw`.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(try_from = "Value")]
pub struct PredictionResponse {
    pub verdict: String,
    pub ensemble_probability: Probability,
    pub transaction_id: Option<String>,
    pub xgboost_probability: Option<Probability>,
    pub random_forest_probability: Option<Probability>,
    pub drift_warnings: Vec<String>,
    #[serde(skip_serializing)]
    pub raw: Value,
}
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ModelInfoResponse {
    pub category_classes: Vec<String>,
    /// model name -> metric name -> value, in the order the service sent them
    pub metrics: Map<String, Value>,
    pub training_samples: u64,
    pub test_samples: u64,
    pub feature_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
}
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LogSummaryResponse {
    pub total_predictions: u64,
    pub fraud_predictions: u64,
    /// Percent, not a fraction.
    pub fraud_rate: f64,
    pub predictions_with_drift: u64,
}
