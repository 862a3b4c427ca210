//! Native evaluation of canonical parameters.
//!
//! This is the prediction the generated programs must reproduce. It follows
//! the same procedures the generators emit (same comparison operators, same
//! tie-breaks), computed in `f64`.

use std::fmt;

use statrs::distribution::{Continuous, Normal};

use crate::error::{PortError, Result};
use crate::pack::Method;
use crate::model::{
    argmax, Activation, CanonicalModelParameters, Combination, DecisionTreeParameters,
    EnsembleParameters, Kernel, KnnParameters, Layer, Metric, MlpParameters, NaiveBayesModel,
    NaiveBayesParameters, SvmModel, SvmParameters, Task, Tree,
};


/// A model output: a class index or a real value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Prediction {
    Class(usize),
    Value(f64),
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Class(c) => write!(f, "{}", c),
            Prediction::Value(v) => write!(f, "{}", v),
        }
    }
}

fn check(params: &CanonicalModelParameters, features: &[f64]) -> Result<()> {
    params.validate()?;
    if features.len() != params.n_features() {
        return Err(PortError::malformed(
            "features",
            format!(
                "expected {} values, found {}",
                params.n_features(),
                features.len()
            ),
        ));
    }
    Ok(())
}

/// Predict one input vector. Parameters are validated first.
pub fn predict(params: &CanonicalModelParameters, features: &[f64]) -> Result<Prediction> {
    check(params, features)?;
    Ok(match params {
        CanonicalModelParameters::DecisionTree(p) => decision_tree(p, features),
        CanonicalModelParameters::TreeEnsemble(p) => ensemble(p, features),
        CanonicalModelParameters::Svm(p) => Prediction::Class(svm(p, features)),
        CanonicalModelParameters::KNearestNeighbors(p) => knn(p, features),
        CanonicalModelParameters::NaiveBayes(p) => Prediction::Class(naive_bayes(p, features)),
        CanonicalModelParameters::Mlp(p) => mlp(p, features),
    })
}

/// Class probabilities for one input vector, in class-index order.
///
/// Support vector machines and regressors have none and fail with
/// `UnsupportedMethod`.
pub fn predict_proba(params: &CanonicalModelParameters, features: &[f64]) -> Result<Vec<f64>> {
    check(params, features)?;
    let x = features;
    let proba = match params {
        CanonicalModelParameters::DecisionTree(p) if p.task != Task::Regression => {
            Some(p.tree.leaf_distribution(leaf(&p.tree, x)))
        }
        CanonicalModelParameters::TreeEnsemble(p) if p.combination != Combination::Mean => {
            let divisor = p.divisor();
            Some(ensemble_scores(p, x).into_iter().map(|s| s / divisor).collect())
        }
        CanonicalModelParameters::KNearestNeighbors(p) => match p.task {
            Task::Classification { n_classes } => {
                let votes = knn_votes(p, &neighbors(p, x), n_classes);
                Some(votes.into_iter().map(|v| v / p.k as f64).collect())
            }
            Task::Regression => None,
        },
        CanonicalModelParameters::NaiveBayes(p) => Some(softmax(likelihoods(p, x))),
        CanonicalModelParameters::Mlp(p) if p.task != Task::Regression => {
            let output = mlp_output(p, x);
            if output.len() == 1 {
                Some(vec![1.0 - output[0], output[0]])
            } else {
                Some(output)
            }
        }
        _ => None,
    };
    proba.ok_or_else(|| PortError::UnsupportedMethod {
        family: params.family().to_string(),
        method: Method::PredictProba.name().to_string(),
    })
}

/// Shift by the maximum, exponentiate, normalize.
fn softmax(mut values: Vec<f64>) -> Vec<f64> {
    let mut top = values[0];
    for v in &values[1..] {
        if *v > top {
            top = *v;
        }
    }
    let mut norm = 0.0;
    for v in values.iter_mut() {
        *v = (*v - top).exp();
        norm += *v;
    }
    for v in values.iter_mut() {
        *v /= norm;
    }
    values
}

// ─── Trees ─────────────────────────────────────────────────────────

fn leaf(tree: &Tree, x: &[f64]) -> usize {
    let mut node = 0;
    while !tree.is_leaf(node) {
        node = if x[tree.feature[node] as usize] <= tree.threshold[node] {
            tree.left[node] as usize
        } else {
            tree.right[node] as usize
        };
    }
    node
}

fn decision_tree(p: &DecisionTreeParameters, x: &[f64]) -> Prediction {
    let node = leaf(&p.tree, x);
    match p.task {
        Task::Classification { .. } => Prediction::Class(p.tree.leaf_class(node)),
        Task::Regression => Prediction::Value(p.tree.value[node][0]),
    }
}

/// Per-class votes or summed distributions, each tree scaled by its weight.
fn ensemble_scores(p: &EnsembleParameters, x: &[f64]) -> Vec<f64> {
    let mut scores = vec![0.0; p.task.n_classes().unwrap_or(0)];
    for (i, tree) in p.trees.iter().enumerate() {
        let w = p.weight(i);
        let node = leaf(tree, x);
        match p.combination {
            Combination::MajorityVote | Combination::WeightedVote => {
                scores[tree.leaf_class(node)] += w;
            }
            Combination::ProbabilityAverage | Combination::WeightedProbability => {
                for (c, v) in tree.leaf_distribution(node).iter().enumerate() {
                    scores[c] += v * w;
                }
            }
            Combination::Mean => {}
        }
    }
    scores
}

fn ensemble(p: &EnsembleParameters, x: &[f64]) -> Prediction {
    match p.combination {
        Combination::Mean => {
            let total: f64 = p.trees.iter().map(|t| t.value[leaf(t, x)][0]).sum();
            Prediction::Value(total / p.trees.len() as f64)
        }
        _ => Prediction::Class(argmax(&ensemble_scores(p, x))),
    }
}

// ─── SVM ───────────────────────────────────────────────────────────

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn kernel(k: Kernel, v: &[f64], x: &[f64]) -> f64 {
    match k {
        Kernel::Linear => dot(v, x),
        Kernel::Poly {
            gamma,
            coef0,
            degree,
        } => (gamma * dot(v, x) + coef0).powf(degree),
        Kernel::Rbf { gamma } => {
            let d: f64 = v.iter().zip(x).map(|(a, b)| (a - b) * (a - b)).sum();
            (-gamma * d).exp()
        }
        Kernel::Sigmoid { gamma, coef0 } => (gamma * dot(v, x) + coef0).tanh(),
    }
}

fn svm(p: &SvmParameters, x: &[f64]) -> usize {
    match &p.model {
        SvmModel::Linear {
            coefficients,
            intercepts,
        } => {
            let scores: Vec<f64> = coefficients
                .iter()
                .zip(intercepts)
                .map(|(w, b)| b + dot(w, x))
                .collect();
            if scores.len() == 1 {
                usize::from(scores[0] > 0.0)
            } else {
                argmax(&scores)
            }
        }
        SvmModel::Kernel {
            support_vectors,
            dual_coefficients,
            intercepts,
            n_support,
            kernel: k,
        } => {
            let kernels: Vec<f64> = support_vectors.iter().map(|v| kernel(*k, v, x)).collect();
            let starts: Vec<usize> = n_support
                .iter()
                .scan(0, |offset, n| {
                    let start = *offset;
                    *offset += n;
                    Some(start)
                })
                .collect();
            let n_classes = n_support.len();
            let mut votes = vec![0.0; n_classes];
            let mut d = 0;
            for i in 0..n_classes {
                for j in i + 1..n_classes {
                    let mut decision = intercepts[d];
                    for s in starts[i]..starts[i] + n_support[i] {
                        decision += dual_coefficients[j - 1][s] * kernels[s];
                    }
                    for s in starts[j]..starts[j] + n_support[j] {
                        decision += dual_coefficients[i][s] * kernels[s];
                    }
                    if decision > 0.0 {
                        votes[i] += 1.0;
                    } else {
                        votes[j] += 1.0;
                    }
                    d += 1;
                }
            }
            argmax(&votes)
        }
    }
}

// ─── KNN ───────────────────────────────────────────────────────────

/// Indices of the `k` nearest training rows, nearest first.
fn neighbors(p: &KnnParameters, x: &[f64]) -> Vec<usize> {
    let mut dists: Vec<f64> = p
        .samples
        .iter()
        .map(|row| {
            row.iter()
                .zip(x)
                .map(|(a, b)| {
                    let diff = a - b;
                    match p.metric {
                        Metric::Euclidean => diff * diff,
                        Metric::Manhattan => diff.abs(),
                        Metric::Minkowski { p } => diff.abs().powf(p),
                    }
                })
                .sum()
        })
        .collect();
    let mut chosen = Vec::with_capacity(p.k);
    for _ in 0..p.k {
        let mut nearest: Option<usize> = None;
        for (i, d) in dists.iter().enumerate() {
            if *d >= 0.0 && nearest.map_or(true, |n| *d < dists[n]) {
                nearest = Some(i);
            }
        }
        if let Some(n) = nearest {
            chosen.push(n);
            dists[n] = -1.0;
        }
    }
    chosen
}

fn knn_votes(p: &KnnParameters, chosen: &[usize], n_classes: usize) -> Vec<f64> {
    let mut votes = vec![0.0; n_classes];
    for n in chosen {
        votes[p.targets[*n] as usize] += 1.0;
    }
    votes
}

fn knn(p: &KnnParameters, x: &[f64]) -> Prediction {
    let chosen = neighbors(p, x);
    match p.task {
        Task::Classification { n_classes } => {
            Prediction::Class(argmax(&knn_votes(p, &chosen, n_classes)))
        }
        Task::Regression => {
            let total: f64 = chosen.iter().map(|n| p.targets[*n]).sum();
            Prediction::Value(total / p.k as f64)
        }
    }
}

// ─── Naive Bayes ───────────────────────────────────────────────────

fn naive_bayes(p: &NaiveBayesParameters, x: &[f64]) -> usize {
    argmax(&likelihoods(p, x))
}

/// Joint log-likelihood per class.
fn likelihoods(p: &NaiveBayesParameters, x: &[f64]) -> Vec<f64> {
    match &p.model {
        NaiveBayesModel::Gaussian {
            theta,
            variance,
            priors,
        } => theta
            .iter()
            .zip(variance)
            .zip(priors)
            .map(|((means, vars), prior)| {
                let log_density: f64 = means
                    .iter()
                    .zip(vars)
                    .zip(x)
                    .map(|((mean, var), xi)| match Normal::new(*mean, var.sqrt()) {
                        Ok(normal) => normal.ln_pdf(*xi),
                        Err(_) => f64::NEG_INFINITY,
                    })
                    .sum();
                prior.ln() + log_density
            })
            .collect(),
        NaiveBayesModel::Bernoulli {
            feature_probabilities,
            priors,
            binarize,
        } => feature_probabilities
            .iter()
            .zip(priors)
            .map(|(probs, prior)| {
                let sum: f64 = probs
                    .iter()
                    .zip(x)
                    .map(|(p, xi)| match binarize {
                        Some(t) if *xi > *t => p.ln(),
                        Some(_) => (1.0 - p).ln(),
                        None => xi * p.ln() + (1.0 - xi) * (1.0 - p).ln(),
                    })
                    .sum();
                prior.ln() + sum
            })
            .collect(),
    }
}

// ─── MLP ───────────────────────────────────────────────────────────

fn forward(layer: &Layer, input: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = (0..layer.n_outputs())
        .map(|j| {
            let acc = layer.bias[j]
                + input
                    .iter()
                    .zip(&layer.weights)
                    .map(|(xi, row)| xi * row[j])
                    .sum::<f64>();
            match layer.activation {
                Activation::Relu => acc.max(0.0),
                Activation::Logistic => 1.0 / (1.0 + (-acc).exp()),
                Activation::Tanh => acc.tanh(),
                Activation::Identity | Activation::Softmax => acc,
            }
        })
        .collect();
    if layer.activation == Activation::Softmax {
        out = softmax(out);
    }
    out
}

fn mlp_output(p: &MlpParameters, x: &[f64]) -> Vec<f64> {
    p.layers
        .iter()
        .fold(x.to_vec(), |input, layer| forward(layer, &input))
}

fn mlp(p: &MlpParameters, x: &[f64]) -> Prediction {
    let output = mlp_output(p, x);
    match p.task {
        Task::Regression => Prediction::Value(output[0]),
        Task::Classification { .. } if output.len() == 1 => {
            Prediction::Class(usize::from(output[0] > 0.5))
        }
        Task::Classification { .. } => Prediction::Class(argmax(&output)),
    }
}
