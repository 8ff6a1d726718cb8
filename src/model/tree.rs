//! Gradient-boosted tree ensemble for binary classification.
//!
//! The artifact stores each tree as a flat node array (the usual export shape
//! for tree learners): internal nodes carry a split feature, threshold, and
//! child indices; leaves carry an additive margin value. Predictions sum leaf
//! values across trees on top of a base margin, and the class-1 probability is
//! the logistic transform of that margin.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One node in a tree's flat array.
///
/// `feature < 0` marks a leaf; internal nodes route `x[feature] < threshold`
/// to `left`, otherwise to `right`. `cover` is the number of training rows
/// (hessian-weighted) that reached this node, which the explainer uses to
/// weight unseen paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature: i32,
    pub threshold: f64,
    pub left: i32,
    pub right: i32,
    pub value: f64,
    pub cover: f64,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.feature < 0
    }
}

/// A single regression tree in the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Index of the leaf the vector routes to.
    pub fn leaf_for(&self, x: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return idx;
            }
            idx = if x[node.feature as usize] < node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    /// This tree's additive margin contribution for the vector.
    pub fn margin(&self, x: &[f64]) -> f64 {
        self.nodes[self.leaf_for(x)].value
    }

    /// Cover-weighted expected leaf value (the tree's output over the
    /// training distribution).
    pub fn expected_value(&self) -> f64 {
        self.expected_value_at(0)
    }

    fn expected_value_at(&self, idx: usize) -> f64 {
        let node = &self.nodes[idx];
        if node.is_leaf() {
            return node.value;
        }
        let left = &self.nodes[node.left as usize];
        let right = &self.nodes[node.right as usize];
        let total = left.cover + right.cover;
        (left.cover * self.expected_value_at(node.left as usize)
            + right.cover * self.expected_value_at(node.right as usize))
            / total
    }

    /// Structural validation for a freshly deserialized tree.
    fn validate(&self, n_features: usize) -> Result<(), AppError> {
        if self.nodes.is_empty() {
            return Err(AppError::new(2, "Model artifact contains an empty tree."));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if !(node.cover.is_finite() && node.cover > 0.0) {
                return Err(AppError::new(
                    2,
                    format!("Tree node {idx} has non-positive cover {}.", node.cover),
                ));
            }
            if node.is_leaf() {
                if !node.value.is_finite() {
                    return Err(AppError::new(2, format!("Tree leaf {idx} has a non-finite value.")));
                }
                continue;
            }
            if node.feature as usize >= n_features {
                return Err(AppError::new(
                    2,
                    format!(
                        "Tree node {idx} splits on feature {} but the schema has {n_features} columns.",
                        node.feature
                    ),
                ));
            }
            if !node.threshold.is_finite() {
                return Err(AppError::new(2, format!("Tree node {idx} has a non-finite threshold.")));
            }
            // Children must point forward in the array; that rules out cycles.
            let (l, r) = (node.left, node.right);
            let in_range = |c: i32| c > idx as i32 && (c as usize) < self.nodes.len();
            if !(in_range(l) && in_range(r)) {
                return Err(AppError::new(
                    2,
                    format!("Tree node {idx} has out-of-range children ({l}, {r})."),
                ));
            }
        }
        Ok(())
    }
}

/// The deserialized binary classifier.
///
/// `base_margin` is the ensemble's bias in log-odds space. `class_labels`
/// names the two outcomes, and `default_class` records which index carries the
/// default/bad outcome; the loader validates both instead of assuming the
/// convention silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub class_labels: [String; 2],
    pub default_class: usize,
    pub base_margin: f64,
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Raw log-odds output for an aligned vector.
    pub fn margin(&self, x: &[f64]) -> Result<f64, AppError> {
        self.check_shape(x, "margin")?;
        Ok(self.base_margin + self.trees.iter().map(|t| t.margin(x)).sum::<f64>())
    }

    /// Raw class output: 1 (default) when the margin crosses zero.
    pub fn predict_class(&self, x: &[f64]) -> Result<usize, AppError> {
        Ok(usize::from(self.margin(x)? > 0.0))
    }

    /// Class probabilities `[p_class0, p_class1]` via the logistic transform.
    pub fn predict_probability(&self, x: &[f64]) -> Result<[f64; 2], AppError> {
        let p1 = sigmoid(self.margin(x)?);
        Ok([1.0 - p1, p1])
    }

    fn check_shape(&self, x: &[f64], context: &str) -> Result<(), AppError> {
        if x.len() != self.n_features {
            return Err(AppError::shape_mismatch(context, self.n_features, x.len()));
        }
        Ok(())
    }

    /// Validate the artifact contract after deserialization.
    pub fn validate(&self, schema_len: usize) -> Result<(), AppError> {
        if self.n_features != schema_len {
            return Err(AppError::new(
                2,
                format!(
                    "Model expects {} features but the schema lists {schema_len} columns.",
                    self.n_features
                ),
            ));
        }
        if self.default_class != 1 {
            return Err(AppError::new(
                2,
                format!(
                    "Model declares default_class={} ('{}'); this pipeline requires the default \
                     outcome at class index 1.",
                    self.default_class,
                    self.class_labels
                        .get(self.default_class)
                        .map(String::as_str)
                        .unwrap_or("?")
                ),
            ));
        }
        if !self.base_margin.is_finite() {
            return Err(AppError::new(2, "Model base margin is not finite."));
        }
        if self.trees.is_empty() {
            return Err(AppError::new(2, "Model artifact contains no trees."));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        Ok(())
    }
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(value: f64, cover: f64) -> TreeNode {
        TreeNode { feature: -1, threshold: 0.0, left: -1, right: -1, value, cover }
    }

    fn split(feature: i32, threshold: f64, left: i32, right: i32, cover: f64) -> TreeNode {
        TreeNode { feature, threshold, left, right, value: 0.0, cover }
    }

    fn stump() -> TreeEnsemble {
        // One split on feature 0 at 0.5: left leaf -1.0 (cover 60), right +2.0 (cover 40).
        TreeEnsemble {
            class_labels: ["repaid".to_string(), "default".to_string()],
            default_class: 1,
            base_margin: 0.0,
            n_features: 2,
            trees: vec![Tree {
                nodes: vec![split(0, 0.5, 1, 2, 100.0), leaf(-1.0, 60.0), leaf(2.0, 40.0)],
            }],
        }
    }

    #[test]
    fn routing_and_margin() {
        let model = stump();
        assert_eq!(model.margin(&[0.0, 9.9]).unwrap(), -1.0);
        assert_eq!(model.margin(&[1.0, 9.9]).unwrap(), 2.0);
    }

    #[test]
    fn class_and_probability_are_consistent() {
        let model = stump();
        let x = [1.0, 0.0];
        assert_eq!(model.predict_class(&x).unwrap(), 1);
        let p = model.predict_probability(&x).unwrap();
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        assert!(p[1] > 0.5);
    }

    #[test]
    fn expected_value_is_cover_weighted() {
        let model = stump();
        let expected = (60.0 * -1.0 + 40.0 * 2.0) / 100.0;
        assert!((model.trees[0].expected_value() - expected).abs() < 1e-12);
    }

    #[test]
    fn shape_mismatch_is_loud() {
        let model = stump();
        assert!(model.margin(&[1.0]).is_err());
        assert!(model.predict_probability(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn validate_rejects_wrong_default_class() {
        let mut model = stump();
        model.default_class = 0;
        assert!(model.validate(2).is_err());
    }

    #[test]
    fn validate_rejects_backward_children() {
        let mut model = stump();
        model.trees[0].nodes[0].left = 0;
        assert!(model.validate(2).is_err());
    }
}
