//! Canonical model parameters.
//!
//! This is the contract with the model-introspection step: one normalized,
//! library-independent shape per model family. Values arrive already
//! extracted; this module only defines the shapes and validates them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PortError, Result};

mod validate;


/// The family of prediction algorithm a parameter set belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    DecisionTree,
    TreeEnsemble,
    Svm,
    KNearestNeighbors,
    NaiveBayes,
    Mlp,
}

impl Family {
    pub const ALL: [Family; 6] = [
        Family::DecisionTree,
        Family::TreeEnsemble,
        Family::Svm,
        Family::KNearestNeighbors,
        Family::NaiveBayes,
        Family::Mlp,
    ];

    /// The serialized `family` tag.
    pub fn tag(self) -> &'static str {
        match self {
            Family::DecisionTree => "decision_tree",
            Family::TreeEnsemble => "tree_ensemble",
            Family::Svm => "svm",
            Family::KNearestNeighbors => "k_nearest_neighbors",
            Family::NaiveBayes => "naive_bayes",
            Family::Mlp => "mlp",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        Family::ALL
            .into_iter()
            .find(|f| f.tag() == tag)
            .ok_or_else(|| PortError::UnknownFamily {
                family: tag.to_string(),
            })
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::DecisionTree => "decision tree",
            Family::TreeEnsemble => "tree ensemble",
            Family::Svm => "support vector machine",
            Family::KNearestNeighbors => "k-nearest-neighbors",
            Family::NaiveBayes => "naive Bayes",
            Family::Mlp => "multilayer perceptron",
        };
        f.write_str(name)
    }
}

/// What the model predicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    /// Class indices `0..n_classes`.
    Classification { n_classes: usize },
    /// A single real value.
    Regression,
}

impl Task {
    pub fn n_classes(self) -> Option<usize> {
        match self {
            Task::Classification { n_classes } => Some(n_classes),
            Task::Regression => None,
        }
    }
}

/// A fitted binary tree stored as parallel per-node arrays (pre-order ids).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Left child per node, `-1` at leaves.
    pub left: Vec<i64>,
    /// Right child per node, `-1` at leaves.
    pub right: Vec<i64>,
    /// Split feature per node (ignored at leaves).
    pub feature: Vec<i64>,
    /// Split threshold per node; samples with `x[feature] <= threshold` go left.
    pub threshold: Vec<f64>,
    /// Per-node class distribution (classification) or `[value]` (regression).
    pub value: Vec<Vec<f64>>,
}

impl Tree {
    pub const LEAF: i64 = -1;

    pub fn n_nodes(&self) -> usize {
        self.left.len()
    }

    pub fn is_leaf(&self, node: usize) -> bool {
        self.left[node] == Self::LEAF
    }

    /// Winning class at a node: lowest index among the maximum counts.
    pub fn leaf_class(&self, node: usize) -> usize {
        argmax(&self.value[node])
    }

    /// Class distribution at a node, normalized to sum to one.
    pub fn leaf_distribution(&self, node: usize) -> Vec<f64> {
        let row = &self.value[node];
        let total: f64 = row.iter().sum();
        row.iter().map(|v| v / total).collect()
    }
}

/// Index of the first maximum; ties resolve to the lowest index.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeParameters {
    pub n_features: usize,
    pub task: Task,
    pub tree: Tree,
}

/// How member tree outputs are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    /// Each tree votes for its leaf class; ties go to the lowest class index.
    MajorityVote,
    /// Leaf distributions are averaged, then the argmax is taken.
    ProbabilityAverage,
    /// Regression outputs are averaged.
    Mean,
    /// Each tree adds its weight to its leaf class (boosting, discrete SAMME).
    WeightedVote,
    /// Leaf distributions are summed, scaled by the tree weights.
    WeightedProbability,
}

impl Combination {
    pub fn is_weighted(self) -> bool {
        matches!(self, Combination::WeightedVote | Combination::WeightedProbability)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnsembleParameters {
    pub n_features: usize,
    pub task: Task,
    pub combination: Combination,
    pub trees: Vec<Tree>,
    /// One weight per tree; only weighted combinations use them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
}

impl EnsembleParameters {
    /// Weight of tree `i`, `1.0` for unweighted combinations.
    pub fn weight(&self, i: usize) -> f64 {
        match &self.weights {
            Some(weights) if self.combination.is_weighted() => weights[i],
            _ => 1.0,
        }
    }

    /// What the accumulated votes or distributions are divided by to give
    /// probabilities: the tree count, or the weight total.
    pub fn divisor(&self) -> f64 {
        (0..self.trees.len()).map(|i| self.weight(i)).sum()
    }
}

/// Kernel function and its hyperparameters (libsvm conventions).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Poly { gamma: f64, coef0: f64, degree: f64 },
    Rbf { gamma: f64 },
    Sigmoid { gamma: f64, coef0: f64 },
}

/// The two SVM layouts. The multiclass strategy is fixed by the layout:
/// linear models are one-vs-rest, kernel models are libsvm one-vs-one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SvmModel {
    /// One row per class (or a single row for binary problems).
    Linear {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    /// Support vectors grouped by class, libsvm sign orientation: a positive
    /// decision for pair `(i, j)` votes for class `i`.
    Kernel {
        support_vectors: Vec<Vec<f64>>,
        dual_coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
        n_support: Vec<usize>,
        kernel: Kernel,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SvmParameters {
    pub n_features: usize,
    pub model: SvmModel,
}

impl SvmParameters {
    pub fn n_classes(&self) -> usize {
        match &self.model {
            SvmModel::Linear { coefficients, .. } if coefficients.len() == 1 => 2,
            SvmModel::Linear { coefficients, .. } => coefficients.len(),
            SvmModel::Kernel { n_support, .. } => n_support.len(),
        }
    }
}

/// Distance between an input and a stored training row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Metric {
    Euclidean,
    Manhattan,
    Minkowski { p: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnnParameters {
    pub n_features: usize,
    pub task: Task,
    pub k: usize,
    pub metric: Metric,
    /// Training rows.
    pub samples: Vec<Vec<f64>>,
    /// Class index (classification) or target value (regression) per row.
    pub targets: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NaiveBayesModel {
    Gaussian {
        /// Per-class feature means.
        theta: Vec<Vec<f64>>,
        /// Per-class feature variances.
        variance: Vec<Vec<f64>>,
        priors: Vec<f64>,
    },
    Bernoulli {
        /// Per-class probability of each feature being set.
        feature_probabilities: Vec<Vec<f64>>,
        priors: Vec<f64>,
        /// Inputs strictly above this threshold count as set. Without a
        /// threshold, inputs are expected to already be 0 or 1.
        #[serde(default)]
        binarize: Option<f64>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesParameters {
    pub n_features: usize,
    pub model: NaiveBayesModel,
}

impl NaiveBayesParameters {
    pub fn priors(&self) -> &[f64] {
        match &self.model {
            NaiveBayesModel::Gaussian { priors, .. } => priors,
            NaiveBayesModel::Bernoulli { priors, .. } => priors,
        }
    }

    pub fn n_classes(&self) -> usize {
        self.priors().len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Relu,
    Logistic,
    Tanh,
    Softmax,
}

/// One dense layer: `out = activation(input · weights + bias)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// `weights[i][j]` connects input unit `i` to output unit `j`.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl Layer {
    pub fn n_inputs(&self) -> usize {
        self.weights.len()
    }

    pub fn n_outputs(&self) -> usize {
        self.bias.len()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MlpParameters {
    pub n_features: usize,
    pub task: Task,
    pub layers: Vec<Layer>,
}

/// A fitted model of exactly one recognized family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum CanonicalModelParameters {
    DecisionTree(DecisionTreeParameters),
    TreeEnsemble(EnsembleParameters),
    Svm(SvmParameters),
    KNearestNeighbors(KnnParameters),
    NaiveBayes(NaiveBayesParameters),
    Mlp(MlpParameters),
}

impl CanonicalModelParameters {
    pub fn family(&self) -> Family {
        match self {
            CanonicalModelParameters::DecisionTree(_) => Family::DecisionTree,
            CanonicalModelParameters::TreeEnsemble(_) => Family::TreeEnsemble,
            CanonicalModelParameters::Svm(_) => Family::Svm,
            CanonicalModelParameters::KNearestNeighbors(_) => Family::KNearestNeighbors,
            CanonicalModelParameters::NaiveBayes(_) => Family::NaiveBayes,
            CanonicalModelParameters::Mlp(_) => Family::Mlp,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            CanonicalModelParameters::DecisionTree(p) => p.n_features,
            CanonicalModelParameters::TreeEnsemble(p) => p.n_features,
            CanonicalModelParameters::Svm(p) => p.n_features,
            CanonicalModelParameters::KNearestNeighbors(p) => p.n_features,
            CanonicalModelParameters::NaiveBayes(p) => p.n_features,
            CanonicalModelParameters::Mlp(p) => p.n_features,
        }
    }

    /// Whether predictions are class indices.
    pub fn is_classifier(&self) -> bool {
        match self {
            CanonicalModelParameters::DecisionTree(p) => p.task.n_classes().is_some(),
            CanonicalModelParameters::TreeEnsemble(p) => p.task.n_classes().is_some(),
            CanonicalModelParameters::Svm(_) => true,
            CanonicalModelParameters::KNearestNeighbors(p) => p.task.n_classes().is_some(),
            CanonicalModelParameters::NaiveBayes(_) => true,
            CanonicalModelParameters::Mlp(p) => p.task.n_classes().is_some(),
        }
    }

    /// Check that the parameters describe a fitted, finite, well-shaped model.
    pub fn validate(&self) -> Result<()> {
        match self {
            CanonicalModelParameters::DecisionTree(p) => p.validate(),
            CanonicalModelParameters::TreeEnsemble(p) => p.validate(),
            CanonicalModelParameters::Svm(p) => p.validate(),
            CanonicalModelParameters::KNearestNeighbors(p) => p.validate(),
            CanonicalModelParameters::NaiveBayes(p) => p.validate(),
            CanonicalModelParameters::Mlp(p) => p.validate(),
        }
    }

    /// Decode parameters from a JSON value, distinguishing an unknown
    /// `family` tag from a malformed body.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let tag = value
            .get("family")
            .and_then(|f| f.as_str())
            .ok_or_else(|| PortError::malformed("family", "missing 'family' tag"))?
            .to_string();
        Family::from_tag(&tag)?;
        serde_json::from_value(value).map_err(move |e| PortError::malformed(tag, e.to_string()))
    }

    /// Decode parameters from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| PortError::malformed("$", e.to_string()))?;
        Self::from_value(value)
    }
}
