//! Fitted scikit-learn estimators evaluated in-process
//!
//! ONNX exports of `SVC` and of tree ensembles use the `ai.onnx.ml`
//! `SVMClassifier` and `TreeEnsembleRegressor` operators, which tract does
//! not run. These artifacts instead carry the fitted attributes as JSON and
//! replay the prediction arithmetic directly.
//!
//! Classifier document (binary `SVC`):
//!
//! ```json
//! {"kernel": "rbf", "gamma": 0.2, "coef0": 0.0, "degree": 3,
//!  "support_vectors": [[..5 values..], ..], "dual_coef": [[..]],
//!  "intercept": [-0.4], "classes": [0, 1]}
//! ```
//!
//! `gamma` is the resolved `_gamma` value, the other keys are the fitted
//! attributes without their trailing underscore.
//!
//! Regressor document (`RandomForestRegressor`, `ExtraTreesRegressor` or a
//! single `DecisionTreeRegressor` as a one-tree forest):
//!
//! ```json
//! {"n_features": 3, "trees": [{"children_left": [..], "children_right": [..],
//!  "feature": [..], "threshold": [..], "value": [..]}]}
//! ```
//!
//! Each tree holds the `tree_` arrays, with `value` flattened to one number
//! per node.

use super::{Classifier, Regressor};
use crate::error::PredictError;
use crate::models::{
    RegressionFeatures, ScaledClassificationFeatures, CLASSIFICATION_FEATURES,
    REGRESSION_FEATURES,
};
use serde::Deserialize;

/// Marker for leaves in the child arrays
const TREE_LEAF: i64 = -1;

/// Kernel of a fitted support vector machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Poly,
    Rbf,
    Sigmoid,
}

#[derive(Debug, Deserialize)]
struct SvmArtifact {
    kernel: Kernel,
    #[serde(default)]
    gamma: f64,
    #[serde(default)]
    coef0: f64,
    #[serde(default = "default_degree")]
    degree: i32,
    support_vectors: Vec<Vec<f64>>,
    dual_coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    classes: Vec<i64>,
}

fn default_degree() -> i32 {
    3
}

/// Binary kernel SVM over the scaled five-feature layout
#[derive(Debug, Clone)]
pub struct SvmClassifier {
    kernel: Kernel,
    gamma: f64,
    coef0: f64,
    degree: i32,
    support_vectors: Vec<[f64; CLASSIFICATION_FEATURES]>,
    dual_coef: Vec<f64>,
    intercept: f64,
    classes: [i64; 2],
}

impl SvmClassifier {
    /// Parse and validate a fitted binary SVM document
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let artifact: SvmArtifact =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid SVM JSON: {e}"))?;

        let classes: [i64; 2] = artifact.classes.try_into().map_err(|classes: Vec<i64>| {
            format!("expected a binary classifier, got {} classes", classes.len())
        })?;
        let [dual_coef]: [Vec<f64>; 1] = artifact
            .dual_coef
            .try_into()
            .map_err(|rows: Vec<Vec<f64>>| {
                format!("expected one dual_coef row, got {}", rows.len())
            })?;
        let [intercept]: [f64; 1] = artifact
            .intercept
            .try_into()
            .map_err(|v: Vec<f64>| format!("expected one intercept, got {}", v.len()))?;

        if artifact.support_vectors.is_empty() {
            return Err("no support vectors".to_string());
        }
        if dual_coef.len() != artifact.support_vectors.len() {
            return Err(format!(
                "{} dual coefficients for {} support vectors",
                dual_coef.len(),
                artifact.support_vectors.len()
            ));
        }
        let gamma_valid = artifact.gamma.is_finite() && artifact.gamma > 0.0;
        if artifact.kernel != Kernel::Linear && !gamma_valid {
            return Err(format!("gamma must be positive, got {}", artifact.gamma));
        }
        if artifact.kernel == Kernel::Poly && artifact.degree < 0 {
            return Err(format!("degree must be non-negative, got {}", artifact.degree));
        }

        let support_vectors = artifact
            .support_vectors
            .into_iter()
            .enumerate()
            .map(|(i, sv)| {
                let len = sv.len();
                <[f64; CLASSIFICATION_FEATURES]>::try_from(sv).map_err(|_| {
                    format!(
                        "support vector {i} has {len} features, expected {}",
                        CLASSIFICATION_FEATURES
                    )
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        let finite = support_vectors.iter().flatten().chain(&dual_coef).all(|v| v.is_finite())
            && intercept.is_finite()
            && artifact.coef0.is_finite();
        if !finite {
            return Err("non-finite SVM parameter".to_string());
        }

        Ok(Self {
            kernel: artifact.kernel,
            gamma: artifact.gamma,
            coef0: artifact.coef0,
            degree: artifact.degree,
            support_vectors,
            dual_coef,
            intercept,
            classes,
        })
    }

    fn kernel_value(&self, sv: &[f64], x: &[f64]) -> f64 {
        match self.kernel {
            Kernel::Linear => dot(sv, x),
            Kernel::Poly => (self.gamma * dot(sv, x) + self.coef0).powi(self.degree),
            Kernel::Rbf => {
                let distance: f64 = sv.iter().zip(x).map(|(a, b)| (a - b) * (a - b)).sum();
                (-self.gamma * distance).exp()
            }
            Kernel::Sigmoid => (self.gamma * dot(sv, x) + self.coef0).tanh(),
        }
    }

    /// Signed distance to the separating surface; positive favours `classes[1]`
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(sv, coef)| coef * self.kernel_value(sv, x))
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for SvmClassifier {
    fn classify(&self, features: &ScaledClassificationFeatures) -> Result<i64, PredictError> {
        let decision = self.decision_function(features.as_slice());
        if !decision.is_finite() {
            return Err(PredictError::Inference(format!("decision value {decision}")));
        }
        // libsvm assigns ties to the second class.
        Ok(if decision >= 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    n_features: usize,
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// One regression tree in array form
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_artifact(tree: TreeArtifact, n_features: usize) -> Result<Self, String> {
        let n = tree.children_left.len();
        if n == 0 {
            return Err("empty tree".to_string());
        }
        if [
            tree.children_right.len(),
            tree.feature.len(),
            tree.threshold.len(),
            tree.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("tree arrays differ in length".to_string());
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (tree.children_left[i], tree.children_right[i]);
            if left == TREE_LEAF && right == TREE_LEAF {
                let value = tree.value[i];
                if !value.is_finite() {
                    return Err(format!("leaf {i} has non-finite value"));
                }
                nodes.push(Node::Leaf(value));
                continue;
            }

            // Children always come after their parent, so traversal terminates.
            let child = |c: i64| {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| format!("node {i} has invalid child {c}"))
            };
            let feature = usize::try_from(tree.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| format!("node {i} splits on invalid feature {}", tree.feature[i]))?;
            let threshold = tree.threshold[i];
            if threshold.is_nan() {
                return Err(format!("node {i} has NaN threshold"));
            }
            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }
        Ok(Self { nodes })
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // Trees compare on float32 inputs.
                    let v = f64::from(x[feature] as f32);
                    index = if v <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Averaging tree ensemble over the unscaled three-feature layout
#[derive(Debug, Clone)]
pub struct ForestRegressor {
    trees: Vec<Tree>,
}

impl ForestRegressor {
    /// Parse and validate a fitted tree ensemble document
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let artifact: ForestArtifact =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid forest JSON: {e}"))?;

        if artifact.n_features != REGRESSION_FEATURES {
            return Err(format!(
                "forest expects {} features, expected {}",
                artifact.n_features, REGRESSION_FEATURES
            ));
        }
        if artifact.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| {
                Tree::from_artifact(tree, artifact.n_features).map_err(|e| format!("tree {i}: {e}"))
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Self { trees })
    }
}

impl Regressor for ForestRegressor {
    fn regress(&self, features: &RegressionFeatures) -> Result<f64, PredictError> {
        let x = features.as_slice();
        let total: f64 = self.trees.iter().map(|tree| tree.predict(x)).sum();
        Ok(total / self.trees.len() as f64)
    }
}
