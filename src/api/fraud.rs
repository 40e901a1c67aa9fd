pub type Probability = f64;

/// Probability at which a single model's score is called fraud.
pub const FRAUD_THRESHOLD: Probability = 0.5;

pub const FALLBACK_CATEGORIES: [&str; 10] = [
    "Grocery",
    "Electronics",
    "Clothing",
    "Restaurant/Cafeteria",
    "Cash Withdrawal",
    "Health/Beauty",
    "Domestic Transport",
    "Sports/Outdoors",
    "Holliday/Travel",
    "Jewelery",
];

/// How alarming an ensemble probability is, used to pick the verdict banner.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum RiskLevel {
    Low,
    Elevated,
    High,
    Critical,
}
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ModelCall {
    Fraud,
    Legit,
}
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Model {
    XGBoost,
    RandomForest,
    Ensemble,
}
