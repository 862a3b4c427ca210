//! Fitted parameter sets shared by the unit tests. The same files back the
//! integration tests under `tests/`.

use crate::model::CanonicalModelParameters;

pub(crate) const ALL: &[(&str, &str)] = &[
    ("decision_tree_classifier", include_str!("../tests/fixtures/decision_tree_classifier.json")),
    ("decision_tree_regressor", include_str!("../tests/fixtures/decision_tree_regressor.json")),
    ("forest_classifier", include_str!("../tests/fixtures/forest_classifier.json")),
    ("forest_majority_vote", include_str!("../tests/fixtures/forest_majority_vote.json")),
    ("forest_regressor", include_str!("../tests/fixtures/forest_regressor.json")),
    ("adaboost_classifier", include_str!("../tests/fixtures/adaboost_classifier.json")),
    ("boosted_probability", include_str!("../tests/fixtures/boosted_probability.json")),
    ("svm_linear_binary", include_str!("../tests/fixtures/svm_linear_binary.json")),
    ("svm_linear_multiclass", include_str!("../tests/fixtures/svm_linear_multiclass.json")),
    ("svm_rbf", include_str!("../tests/fixtures/svm_rbf.json")),
    ("svm_poly", include_str!("../tests/fixtures/svm_poly.json")),
    ("svm_sigmoid", include_str!("../tests/fixtures/svm_sigmoid.json")),
    ("knn_classifier", include_str!("../tests/fixtures/knn_classifier.json")),
    ("knn_minkowski", include_str!("../tests/fixtures/knn_minkowski.json")),
    ("knn_manhattan", include_str!("../tests/fixtures/knn_manhattan.json")),
    ("knn_regressor", include_str!("../tests/fixtures/knn_regressor.json")),
    ("gaussian_nb", include_str!("../tests/fixtures/gaussian_nb.json")),
    ("bernoulli_nb", include_str!("../tests/fixtures/bernoulli_nb.json")),
    ("mlp_classifier", include_str!("../tests/fixtures/mlp_classifier.json")),
    ("mlp_logistic", include_str!("../tests/fixtures/mlp_logistic.json")),
    ("mlp_regressor", include_str!("../tests/fixtures/mlp_regressor.json")),
];

pub(crate) fn load(name: &str) -> CanonicalModelParameters {
    let (_, text) = ALL
        .iter()
        .find(|(n, _)| *n == name)
        .unwrap_or_else(|| panic!("no fixture '{}'", name));
    CanonicalModelParameters::from_json(text).unwrap_or_else(|e| panic!("{}: {}", name, e))
}

pub(crate) fn all() -> Vec<(&'static str, CanonicalModelParameters)> {
    ALL.iter().map(|(name, _)| (*name, load(name))).collect()
}
