use serde::{Deserialize, Serialize};

// Requests
/// Body of `POST /predict`. Field names follow the prediction service's contract.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PredictionRequest {
    pub category: String,
    pub amount: f64,
    pub age_at_transaction: f64,
    pub days_until_card_expires: f64,
    pub loc_delta: f64,
    pub trans_volume_mavg: f64,
    pub trans_volume_mstd: f64,
    pub trans_freq: f64,
    pub loc_delta_mavg: f64,
}

/// Raw form input as submitted by the UI. Presence and types are enforced by
/// deserialization, ranges by [`TransactionForm::validate`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TransactionForm {
    pub category: String,
    #[serde(default = "default_amount")]
    pub amount: f64,
    #[serde(default = "default_age")]
    pub age: u32,
    #[serde(default = "default_days_until_expiry")]
    pub days_until_expiry: u32,
    #[serde(default = "default_loc_delta")]
    pub loc_delta: f64,
    #[serde(default = "default_loc_delta_mavg")]
    pub loc_delta_mavg: f64,
    #[serde(default = "default_trans_volume_mavg")]
    pub trans_volume_mavg: f64,
    #[serde(default = "default_trans_volume_mstd")]
    pub trans_volume_mstd: f64,
    #[serde(default = "default_trans_freq")]
    pub trans_freq: u32,
}

pub fn default_amount() -> f64 {
    150.50
}
pub fn default_age() -> u32 {
    35
}
pub fn default_days_until_expiry() -> u32 {
    365
}
pub fn default_loc_delta() -> f64 {
    0.05
}
pub fn default_loc_delta_mavg() -> f64 {
    0.03
}
pub fn default_trans_volume_mavg() -> f64 {
    120.0
}
pub fn default_trans_volume_mstd() -> f64 {
    45.0
}
pub fn default_trans_freq() -> u32 {
    3
}
