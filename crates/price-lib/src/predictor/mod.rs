//! Fitted estimators behind small capability traits
//!
//! Regressors and scalers are persisted by the training pipeline. JSON
//! artifacts are evaluated natively; `.onnx` regressors run through tract.

mod encoder;
mod linear;
mod onnx;
mod scaler;
mod tree;

pub use encoder::LabelEncoder;
pub use linear::LinearModel;
pub use onnx::OnnxRegressor;
pub use scaler::StandardScaler;
pub use tree::{ForestModel, TreeModel};

use crate::error::ModelError;

/// A fitted regression model producing one value per feature vector
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// A fitted transform applied to the continuous features
pub trait Scaler: Send + Sync {
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Number of values the scaler was fit on
    fn width(&self) -> usize;
}
