//! Regression trees and random forests in flattened array form
//!
//! A tree is stored as parallel arrays indexed by node id, the same layout a
//! fitted tree exposes after training. Node 0 is the root. Leaves have
//! `children_left == -1`; an internal node sends a sample left when
//! `x[feature] <= threshold`.

use super::Regressor;
use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Child index marking a leaf
pub const LEAF: i64 = -1;

/// A single fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeModel {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl TreeModel {
    /// A tree consisting of one leaf
    pub fn constant(value: f64) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    pub fn node_count(&self) -> usize {
        self.value.len()
    }

    /// Check the arrays describe a well formed tree
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ModelError::MalformedTree("tree has no nodes".to_string()));
        }
        if self.children_left.len() != n
            || self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
        {
            return Err(ModelError::MalformedTree(format!(
                "array lengths differ (value has {} nodes)",
                n
            )));
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == LEAF && right == LEAF {
                continue;
            }
            // children are always stored after their parent
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ModelError::MalformedTree(format!(
                        "node {} has invalid child {}",
                        node, child
                    )));
                }
            }
            if self.feature[node] < 0 {
                return Err(ModelError::MalformedTree(format!(
                    "split node {} has no feature",
                    node
                )));
            }
        }

        Ok(())
    }

    /// Check every split reads a feature below `num_features`
    pub fn check_inputs(&self, num_features: usize) -> Result<(), ModelError> {
        let widest = self
            .children_left
            .iter()
            .zip(&self.feature)
            .filter(|&(&left, _)| left != LEAF)
            .map(|(_, &feature)| feature.max(0) as usize + 1)
            .max();
        match widest {
            Some(needed) if needed > num_features => Err(ModelError::DimensionMismatch {
                expected: needed,
                actual: num_features,
            }),
            _ => Ok(()),
        }
    }

    fn leaf_value(&self, features: &[f64]) -> Result<f64, ModelError> {
        let mut node = 0usize;

        // Each step moves to a strictly larger node id, so this terminates
        // within node_count steps on a validated tree.
        for _ in 0..self.node_count() {
            let left = self.children_left[node];
            if left == LEAF {
                return Ok(self.value[node]);
            }

            let feature = self.feature[node] as usize;
            let x = *features
                .get(feature)
                .ok_or(ModelError::DimensionMismatch {
                    expected: feature + 1,
                    actual: features.len(),
                })?;

            node = if x <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }

        Err(ModelError::MalformedTree(
            "walk did not reach a leaf".to_string(),
        ))
    }
}

impl Regressor for TreeModel {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.leaf_value(features)
    }
}

/// Bagged ensemble of trees; the prediction is the mean of the tree outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<TreeModel>,
}

impl ForestModel {
    pub fn new(trees: Vec<TreeModel>) -> Self {
        Self { trees }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::MalformedTree("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| match e {
                ModelError::MalformedTree(msg) => {
                    ModelError::MalformedTree(format!("tree {}: {}", i, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn check_inputs(&self, num_features: usize) -> Result<(), ModelError> {
        self.trees
            .iter()
            .try_for_each(|tree| tree.check_inputs(num_features))
    }
}

impl Regressor for ForestModel {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.leaf_value(features)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on feature 1 at 0.5: left leaf 1.0, right leaf 2.0
    fn stump() -> TreeModel {
        TreeModel {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![1, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![1.5, 1.0, 2.0],
        }
    }

    #[test]
    fn test_stump_routes_by_threshold() {
        let tree = stump();
        tree.validate().unwrap();
        assert_eq!(tree.predict(&[9.0, 0.0]).unwrap(), 1.0);
        assert_eq!(tree.predict(&[9.0, 0.5]).unwrap(), 1.0);
        assert_eq!(tree.predict(&[9.0, 0.6]).unwrap(), 2.0);
    }

    #[test]
    fn test_constant_tree() {
        let tree = TreeModel::constant(4.2);
        tree.validate().unwrap();
        assert_eq!(tree.predict(&[]).unwrap(), 4.2);
    }

    #[test]
    fn test_missing_feature_is_dimension_error() {
        let tree = stump();
        assert_eq!(
            tree.predict(&[1.0]),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_check_inputs_against_feature_count() {
        let tree = stump();
        assert!(tree.check_inputs(2).is_ok());
        assert!(tree.check_inputs(8).is_ok());
        assert_eq!(
            tree.check_inputs(1),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
        // leaves carry no real feature index
        assert!(TreeModel::constant(1.0).check_inputs(0).is_ok());

        let forest = ForestModel::new(vec![TreeModel::constant(1.0), stump()]);
        assert!(forest.check_inputs(1).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_child() {
        let mut tree = stump();
        tree.children_right[0] = 7;
        assert!(matches!(tree.validate(), Err(ModelError::MalformedTree(_))));
    }

    #[test]
    fn test_validate_rejects_cycle() {
        let mut tree = stump();
        tree.children_left[0] = 0;
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_ragged_arrays() {
        let mut tree = stump();
        tree.threshold.pop();
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = ForestModel::new(vec![stump(), TreeModel::constant(3.0)]);
        forest.validate().unwrap();
        let y = forest.predict(&[0.0, 1.0]).unwrap();
        assert!((y - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_forest_invalid() {
        assert!(ForestModel::new(vec![]).validate().is_err());
    }

    #[test]
    fn test_parse_artifact() {
        let json = r#"{
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [0.0, -2.0, -2.0],
            "value": [0.5, 0.0, 1.0]
        }"#;
        let tree: TreeModel = serde_json::from_str(json).unwrap();
        tree.validate().unwrap();
        assert_eq!(tree.predict(&[-1.0]).unwrap(), 0.0);
        assert_eq!(tree.predict(&[1.0]).unwrap(), 1.0);
    }
}
