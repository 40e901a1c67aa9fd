use std::{
    fmt::{Display, Formatter},
    ops::RangeInclusive,
};

use serde_json::Value;

use super::*;
use crate::error::ValidationError;

impl TryFrom<Value> for PredictionResponse {
    type Error = String;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let Some(body) = raw.as_object() else {
            return Err(format!("Expected a JSON object, got {}", raw));
        };
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        let number = |key: &str| body.get(key).and_then(Value::as_f64);

        let verdict = text("verdict")
            .or_else(|| text("ensemble_verdict"))
            .or_else(|| text("label"))
            .unwrap_or_else(|| "Unknown".to_string());
        let ensemble_probability = number("ensemble_probability")
            .or_else(|| number("score"))
            .ok_or("Response has neither ensemble_probability nor score")?;
        let transaction_id = body.get("transaction_id").and_then(|id| match id {
            Value::String(id) => Some(id.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        });
        let drift_warnings = body
            .get("drift_warnings")
            .and_then(Value::as_array)
            .map(|warnings| {
                warnings
                    .iter()
                    .map(|w| w.as_str().map(str::to_string).unwrap_or_else(|| w.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        let xgboost_probability = number("xgboost_probability");
        let random_forest_probability = number("random_forest_probability");
        Ok(Self {
            verdict,
            ensemble_probability,
            transaction_id,
            xgboost_probability,
            random_forest_probability,
            drift_warnings,
            raw,
        })
    }
}

impl PredictionResponse {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.ensemble_probability)
    }
    /// Per model probabilities in display order. Models the service didn't
    /// report are left out.
    pub fn model_probabilities(&self) -> Vec<(Model, Probability)> {
        [
            (Model::XGBoost, self.xgboost_probability),
            (Model::RandomForest, self.random_forest_probability),
            (Model::Ensemble, Some(self.ensemble_probability)),
        ]
        .into_iter()
        .filter_map(|(model, probability)| probability.map(|p| (model, p)))
        .collect()
    }
}

impl ModelInfoResponse {
    /// Metric table rows as (model, [accuracy, f1, precision, recall, roc auc]).
    /// The service names its metrics freely, so values are taken by position
    /// and only models reporting exactly five numbers get a row.
    pub fn metric_rows(&self) -> Vec<(String, [f64; 5])> {
        self.metrics
            .iter()
            .filter_map(|(model, metrics)| {
                let values: Vec<f64> = metrics
                    .as_object()?
                    .values()
                    .filter_map(Value::as_f64)
                    .collect();
                let row: [f64; 5] = values.try_into().ok()?;
                Some((display_model_name(model), row))
            })
            .collect()
    }
}

pub const METRIC_NAMES: [&str; 5] = ["Accuracy", "F1 Score", "Precision", "Recall", "ROC AUC"];

fn display_model_name(key: &str) -> String {
    match key {
        "xgboost" => Model::XGBoost.to_string(),
        "random_forest" => Model::RandomForest.to_string(),
        "ensemble" => Model::Ensemble.to_string(),
        other => other.to_string(),
    }
}

impl RiskLevel {
    pub fn from_probability(probability: Probability) -> Self {
        if probability >= 0.7 {
            Self::Critical
        } else if probability >= 0.5 {
            Self::High
        } else if probability >= 0.3 {
            Self::Elevated
        } else {
            Self::Low
        }
    }
}
impl ModelCall {
    pub fn from_probability(probability: Probability) -> Self {
        if probability >= FRAUD_THRESHOLD {
            Self::Fraud
        } else {
            Self::Legit
        }
    }
}

impl TransactionForm {
    pub fn validate(&self) -> Result<PredictionRequest, ValidationError> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        check_range("amount", self.amount, 0.01..=50000.0)?;
        check_range("age", self.age.into(), 18.0..=90.0)?;
        check_range("days_until_expiry", self.days_until_expiry.into(), 0.0..=3650.0)?;
        check_range("loc_delta", self.loc_delta, 0.0..=1.0)?;
        check_range("loc_delta_mavg", self.loc_delta_mavg, 0.0..=1.0)?;
        check_range("trans_volume_mavg", self.trans_volume_mavg, 0.0..=10000.0)?;
        check_range("trans_volume_mstd", self.trans_volume_mstd, 0.0..=5000.0)?;
        check_range("trans_freq", self.trans_freq.into(), 1.0..=50.0)?;
        Ok(PredictionRequest {
            category: category.to_string(),
            amount: self.amount,
            age_at_transaction: self.age.into(),
            days_until_card_expires: self.days_until_expiry.into(),
            loc_delta: self.loc_delta,
            trans_volume_mavg: self.trans_volume_mavg,
            trans_volume_mstd: self.trans_volume_mstd,
            trans_freq: self.trans_freq.into(),
            loc_delta_mavg: self.loc_delta_mavg,
        })
    }
}
fn check_range(
    field: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
impl Default for TransactionForm {
    fn default() -> Self {
        Self {
            category: FALLBACK_CATEGORIES[0].to_string(),
            amount: default_amount(),
            age: default_age(),
            days_until_expiry: default_days_until_expiry(),
            loc_delta: default_loc_delta(),
            loc_delta_mavg: default_loc_delta_mavg(),
            trans_volume_mavg: default_trans_volume_mavg(),
            trans_volume_mstd: default_trans_volume_mstd(),
            trans_freq: default_trans_freq(),
        }
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            Self::Low => "Low",
            Self::Elevated => "Elevated",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        write!(f, "{}", output)
    }
}
impl Display for ModelCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            Self::Fraud => "FRAUD",
            Self::Legit => "LEGIT",
        };
        write!(f, "{}", output)
    }
}
impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            Self::XGBoost => "XGBoost",
            Self::RandomForest => "Random Forest",
            Self::Ensemble => "Ensemble",
        };
        write!(f, "{}", output)
    }
}
