//! Core data models for the price predictor

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fruit description submitted for price prediction.
///
/// The four form flags are independent: any combination, including none or
/// all of them, is accepted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FruitRequest {
    pub fruit: String,
    #[serde(rename = "form_Dried")]
    pub form_dried: bool,
    #[serde(rename = "form_Fresh")]
    pub form_fresh: bool,
    #[serde(rename = "form_Frozen")]
    pub form_frozen: bool,
    #[serde(rename = "form_Juice")]
    pub form_juice: bool,
    pub yield_factor: f64,
    pub cup_eq_size: f64,
    pub cup_eq_price: f64,
}

impl FruitRequest {
    /// Form flags in model order: Dried, Fresh, Frozen, Juice
    pub fn form_flags(&self) -> [bool; 4] {
        [
            self.form_dried,
            self.form_fresh,
            self.form_frozen,
            self.form_juice,
        ]
    }
}

/// Ordered model input, in the column order the regressors were fit with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The three regressors served side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    RandomForest,
    LinearRegression,
    DecisionTree,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::RandomForest,
        ModelKind::LinearRegression,
        ModelKind::DecisionTree,
    ];

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "Random Forest",
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::DecisionTree => "Decision Tree",
        }
    }

    /// Key used in prediction payloads and metric labels
    pub fn key(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "RandomForest",
            ModelKind::LinearRegression => "LinearRegression",
            ModelKind::DecisionTree => "DecisionTree",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Per-model price predictions, rounded to 2 decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    #[serde(rename = "RandomForest")]
    pub random_forest: f64,
    #[serde(rename = "LinearRegression")]
    pub linear_regression: f64,
    #[serde(rename = "DecisionTree")]
    pub decision_tree: f64,
}

/// Successful prediction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub matched_fruit: String,
    pub predictions: Predictions,
}

/// Round to 2 decimal places.
///
/// Rounds the exact binary value with ties to even, so `2.675` (stored just
/// below the midpoint) becomes `2.67` and `0.125` becomes `0.12`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_wire_field_names() {
        let json = r#"{
            "fruit": "appl",
            "form_Dried": false,
            "form_Fresh": true,
            "form_Frozen": false,
            "form_Juice": true,
            "yield_factor": 0.9,
            "cup_eq_size": 1.0,
            "cup_eq_price": 0.5
        }"#;
        let request: FruitRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.fruit, "appl");
        assert_eq!(request.form_flags(), [false, true, false, true]);
        assert_eq!(request.yield_factor, 0.9);
    }

    #[test]
    fn test_request_missing_field_rejected() {
        let json = r#"{"fruit": "apple", "form_Dried": false}"#;
        assert!(serde_json::from_str::<FruitRequest>(json).is_err());
    }

    #[test]
    fn test_predictions_serialize_with_model_keys() {
        let result = PredictionResult {
            matched_fruit: "Apple".to_string(),
            predictions: Predictions {
                random_forest: 1.25,
                linear_regression: 0.5,
                decision_tree: 2.0,
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["matched_fruit"], "Apple");
        assert_eq!(value["predictions"]["RandomForest"], 1.25);
        assert_eq!(value["predictions"]["LinearRegression"], 0.5);
        assert_eq!(value["predictions"]["DecisionTree"], 2.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
        assert_eq!(round2(-0.004), -0.0);
        assert_eq!(round2(3.0), 3.0);
    }

    #[test]
    fn test_round2_uses_exact_value_with_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(1.125), 1.12);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(0.135), 0.14);
        assert_eq!(round2(1.375), 1.38);
    }

    #[test]
    fn test_model_kind_names() {
        assert_eq!(ModelKind::RandomForest.key(), "RandomForest");
        assert_eq!(ModelKind::LinearRegression.to_string(), "Linear Regression");
        assert_eq!(ModelKind::ALL.len(), 3);
    }
}
