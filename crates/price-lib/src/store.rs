//! Model store: every fitted artifact the service needs, loaded once
//!
//! Loading is all-or-nothing. A missing, unreadable or inconsistent artifact
//! aborts startup; there is no degraded mode with fewer models.

use crate::error::{ModelError, StartupError};
use crate::features::NUM_SCALED_FEATURES;
use crate::models::ModelKind;
use crate::predictor::{
    ForestModel, LabelEncoder, LinearModel, OnnxRegressor, Regressor, Scaler, StandardScaler,
    TreeModel,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File names of the artifacts inside the model directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFiles {
    pub random_forest: String,
    pub linear_regression: String,
    pub decision_tree: String,
    pub scaler: String,
    pub label_encoder: String,
    pub feature_columns: String,
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            random_forest: "random_forest_model.json".to_string(),
            linear_regression: "linear_regression_model.json".to_string(),
            decision_tree: "decision_tree_model.json".to_string(),
            scaler: "scaler.json".to_string(),
            label_encoder: "label_encoder_fruit.json".to_string(),
            feature_columns: "feature_columns.json".to_string(),
        }
    }
}

impl ArtifactFiles {
    fn regressor(&self, kind: ModelKind) -> &str {
        match kind {
            ModelKind::RandomForest => &self.random_forest,
            ModelKind::LinearRegression => &self.linear_regression,
            ModelKind::DecisionTree => &self.decision_tree,
        }
    }
}

/// Fingerprint of a loaded artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    pub file: String,
    pub sha256: String,
}

/// The three regressors, one per [`ModelKind`]
pub struct Regressors {
    pub random_forest: Box<dyn Regressor>,
    pub linear_regression: Box<dyn Regressor>,
    pub decision_tree: Box<dyn Regressor>,
}

impl Regressors {
    pub fn get(&self, kind: ModelKind) -> &dyn Regressor {
        match kind {
            ModelKind::RandomForest => self.random_forest.as_ref(),
            ModelKind::LinearRegression => self.linear_regression.as_ref(),
            ModelKind::DecisionTree => self.decision_tree.as_ref(),
        }
    }
}

/// Read-only holder of the fitted models and encoding metadata
pub struct ModelStore {
    regressors: Regressors,
    scaler: Box<dyn Scaler>,
    encoder: LabelEncoder,
    feature_columns: Vec<String>,
    artifacts: Vec<ArtifactInfo>,
    loaded_at: DateTime<Utc>,
}

impl ModelStore {
    /// Load every artifact from `dir`
    pub fn load(dir: &Path, files: &ArtifactFiles) -> Result<Self, StartupError> {
        let mut artifacts = Vec::with_capacity(6);

        let (path, bytes) = read_artifact(dir, &files.feature_columns, &mut artifacts)?;
        let feature_columns: Vec<String> = parse_json(&path, &bytes)?;

        let (path, bytes) = read_artifact(dir, &files.label_encoder, &mut artifacts)?;
        let encoder: LabelEncoder = parse_json(&path, &bytes)?;

        let (path, bytes) = read_artifact(dir, &files.scaler, &mut artifacts)?;
        let scaler: StandardScaler = parse_json(&path, &bytes)?;
        scaler
            .validate()
            .map_err(|source| StartupError::InvalidModel { path, source })?;

        let mut load = |kind: ModelKind| -> Result<Box<dyn Regressor>, StartupError> {
            let (path, bytes) = read_artifact(dir, files.regressor(kind), &mut artifacts)?;
            let regressor = load_regressor(kind, &path, &bytes, feature_columns.len())?;
            debug!(model = %kind, path = %path.display(), "Loaded regressor");
            Ok(regressor)
        };
        let regressors = Regressors {
            random_forest: load(ModelKind::RandomForest)?,
            linear_regression: load(ModelKind::LinearRegression)?,
            decision_tree: load(ModelKind::DecisionTree)?,
        };

        let mut store = Self::from_parts(regressors, Box::new(scaler), encoder, feature_columns)?;
        store.artifacts = artifacts;

        info!(
            event = "models_loaded",
            model_dir = %dir.display(),
            fruit_count = store.fruits().len(),
            available_fruits = ?store.fruits(),
            "Loaded models successfully"
        );

        Ok(store)
    }

    /// Assemble a store from already constructed parts, checking that they fit
    /// together.
    pub fn from_parts(
        regressors: Regressors,
        scaler: Box<dyn Scaler>,
        encoder: LabelEncoder,
        feature_columns: Vec<String>,
    ) -> Result<Self, StartupError> {
        if encoder.classes().is_empty() {
            return Err(StartupError::Inconsistent(
                "label encoder has no classes".to_string(),
            ));
        }
        if let Some(dup) = encoder.duplicate() {
            return Err(StartupError::Inconsistent(format!(
                "label encoder lists '{}' more than once",
                dup
            )));
        }
        if scaler.width() != NUM_SCALED_FEATURES {
            return Err(StartupError::Inconsistent(format!(
                "scaler was fit on {} features, expected {}",
                scaler.width(),
                NUM_SCALED_FEATURES
            )));
        }
        if feature_columns.is_empty() {
            return Err(StartupError::Inconsistent(
                "feature column list is empty".to_string(),
            ));
        }

        Ok(Self {
            regressors,
            scaler,
            encoder,
            feature_columns,
            artifacts: Vec::new(),
            loaded_at: Utc::now(),
        })
    }

    /// Known fruit labels in encoder order
    pub fn fruits(&self) -> &[String] {
        self.encoder.classes()
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.encoder.encode(label)
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    pub fn regressor(&self, kind: ModelKind) -> &dyn Regressor {
        self.regressors.get(kind)
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Length of the vector the regressors were fit on
    pub fn expected_features(&self) -> usize {
        self.feature_columns.len()
    }

    pub fn artifacts(&self) -> &[ArtifactInfo] {
        &self.artifacts
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn read_artifact(
    dir: &Path,
    file: &str,
    artifacts: &mut Vec<ArtifactInfo>,
) -> Result<(PathBuf, Vec<u8>), StartupError> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(StartupError::MissingArtifact(path));
    }

    let bytes = fs::read(&path).map_err(|source| StartupError::Io {
        path: path.clone(),
        source,
    })?;

    artifacts.push(ArtifactInfo {
        file: file.to_string(),
        sha256: hex::encode(Sha256::digest(&bytes)),
    });

    Ok((path, bytes))
}

fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, StartupError> {
    serde_json::from_slice(bytes).map_err(|source| StartupError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_regressor(
    kind: ModelKind,
    path: &Path,
    bytes: &[u8],
    num_features: usize,
) -> Result<Box<dyn Regressor>, StartupError> {
    let is_onnx = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("onnx"))
        .unwrap_or(false);

    if is_onnx {
        let model = OnnxRegressor::new(bytes, num_features).map_err(|e| StartupError::Onnx {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;
        return Ok(Box::new(model));
    }

    let invalid = |source: ModelError| StartupError::InvalidModel {
        path: path.to_path_buf(),
        source,
    };

    match kind {
        ModelKind::RandomForest => {
            let model: ForestModel = parse_json(path, bytes)?;
            model.validate().map_err(invalid)?;
            model.check_inputs(num_features).map_err(invalid)?;
            Ok(Box::new(model))
        }
        ModelKind::LinearRegression => {
            let model: LinearModel = parse_json(path, bytes)?;
            model.validate().map_err(invalid)?;
            model.check_inputs(num_features).map_err(invalid)?;
            Ok(Box::new(model))
        }
        ModelKind::DecisionTree => {
            let model: TreeModel = parse_json(path, bytes)?;
            model.validate().map_err(invalid)?;
            model.check_inputs(num_features).map_err(invalid)?;
            Ok(Box::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, value: serde_json::Value) {
        fs::write(dir.join(file), serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn fixture_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let p = dir.path();
        write(
            p,
            "feature_columns.json",
            json!([
                "yield_factor", "cup_eq_size", "cup_eq_price", "fruit_encoded",
                "form_Dried", "form_Fresh", "form_Frozen", "form_Juice"
            ]),
        );
        write(p, "label_encoder_fruit.json", json!({"classes": ["Apple", "Banana", "Mango"]}));
        write(
            p,
            "scaler.json",
            json!({"mean": [0.0, 0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0, 1.0]}),
        );
        write(
            p,
            "linear_regression_model.json",
            json!({"coef": [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], "intercept": 0.0}),
        );
        let tree = json!({
            "children_left": [-1], "children_right": [-1], "feature": [-2],
            "threshold": [-2.0], "value": [3.0]
        });
        write(p, "decision_tree_model.json", tree.clone());
        write(p, "random_forest_model.json", json!({"trees": [tree]}));
        dir
    }

    #[test]
    fn test_load_complete_directory() {
        let dir = fixture_dir();
        let store = ModelStore::load(dir.path(), &ArtifactFiles::default()).unwrap();

        assert_eq!(store.fruits(), ["Apple", "Banana", "Mango"]);
        assert_eq!(store.encode("Banana"), Some(1));
        assert_eq!(store.expected_features(), 8);
        assert_eq!(store.scaler().width(), 4);
        assert_eq!(store.artifacts().len(), 6);
        assert!(store.artifacts().iter().all(|a| a.sha256.len() == 64));

        let x = [0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(store.regressor(ModelKind::LinearRegression).predict(&x).unwrap(), 0.5);
        assert_eq!(store.regressor(ModelKind::DecisionTree).predict(&x).unwrap(), 3.0);
        assert_eq!(store.regressor(ModelKind::RandomForest).predict(&x).unwrap(), 3.0);
    }

    #[test]
    fn test_missing_artifact_fails() {
        let dir = fixture_dir();
        fs::remove_file(dir.path().join("decision_tree_model.json")).unwrap();

        let err = ModelStore::load(dir.path(), &ArtifactFiles::default())
            .err()
            .unwrap();
        match err {
            StartupError::MissingArtifact(path) => {
                assert!(path.ends_with("decision_tree_model.json"))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_corrupt_artifact_fails() {
        let dir = fixture_dir();
        fs::write(dir.path().join("scaler.json"), b"{not json").unwrap();

        let err = ModelStore::load(dir.path(), &ArtifactFiles::default())
            .err()
            .unwrap();
        assert!(matches!(err, StartupError::Parse { .. }));
    }

    #[test]
    fn test_malformed_tree_fails() {
        let dir = fixture_dir();
        write(
            dir.path(),
            "decision_tree_model.json",
            json!({
                "children_left": [5], "children_right": [6], "feature": [0],
                "threshold": [0.0], "value": [1.0]
            }),
        );

        let err = ModelStore::load(dir.path(), &ArtifactFiles::default())
            .err()
            .unwrap();
        assert!(matches!(err, StartupError::InvalidModel { .. }));
    }

    #[test]
    fn test_linear_width_must_match_feature_columns() {
        let dir = fixture_dir();
        write(
            dir.path(),
            "linear_regression_model.json",
            json!({"coef": [1.0, 2.0], "intercept": 0.0}),
        );

        let err = ModelStore::load(dir.path(), &ArtifactFiles::default())
            .err()
            .unwrap();
        match err {
            StartupError::InvalidModel { path, source } => {
                assert!(path.ends_with("linear_regression_model.json"));
                assert_eq!(
                    source,
                    ModelError::DimensionMismatch {
                        expected: 2,
                        actual: 8
                    }
                );
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_tree_split_feature_must_exist() {
        let dir = fixture_dir();
        let split_on_nine = json!({
            "children_left": [1, -1, -1], "children_right": [2, -1, -1],
            "feature": [9, -2, -2], "threshold": [0.5, -2.0, -2.0],
            "value": [1.0, 1.0, 2.0]
        });
        write(
            dir.path(),
            "random_forest_model.json",
            json!({"trees": [split_on_nine]}),
        );

        let err = ModelStore::load(dir.path(), &ArtifactFiles::default())
            .err()
            .unwrap();
        match err {
            StartupError::InvalidModel { path, .. } => {
                assert!(path.ends_with("random_forest_model.json"))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_scaler_width_must_match_numeric_features() {
        let dir = fixture_dir();
        write(dir.path(), "scaler.json", json!({"mean": [0.0, 0.0], "scale": [1.0, 1.0]}));

        let err = ModelStore::load(dir.path(), &ArtifactFiles::default())
            .err()
            .unwrap();
        assert!(matches!(err, StartupError::Inconsistent(_)));
    }

    #[test]
    fn test_empty_encoder_fails() {
        let dir = fixture_dir();
        write(dir.path(), "label_encoder_fruit.json", json!({"classes": []}));

        let err = ModelStore::load(dir.path(), &ArtifactFiles::default())
            .err()
            .unwrap();
        assert!(matches!(err, StartupError::Inconsistent(_)));
    }

    #[test]
    fn test_corrupt_onnx_regressor_fails() {
        let dir = fixture_dir();
        fs::write(dir.path().join("linear_regression_model.onnx"), b"not a model").unwrap();
        let files = ArtifactFiles {
            linear_regression: "linear_regression_model.onnx".to_string(),
            ..ArtifactFiles::default()
        };

        let err = ModelStore::load(dir.path(), &files).err().unwrap();
        assert!(matches!(err, StartupError::Onnx { .. }));
    }
}
