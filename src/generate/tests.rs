use super::*;
use crate::error::PortError;
use crate::fixtures;
use crate::language::registry;
use crate::model::{Kernel, Metric, SvmModel};
use crate::pack::Method;

fn generate(
    params: &CanonicalModelParameters,
    language: &str,
    mode: PackagingMode,
) -> Result<GeneratedArtifact> {
    let lang = registry().get(language).unwrap();
    generator_for(params).generate(lang, mode, &PortOptions::default())
}

fn code(params: &CanonicalModelParameters, language: &str, mode: PackagingMode) -> String {
    generate(params, language, mode)
        .unwrap_or_else(|e| panic!("{} {}: {}", language, mode, e))
        .logic
        .contents
}

#[test]
fn test_every_family_in_every_language_and_mode() {
    for (name, params) in fixtures::all() {
        for lang in registry().iter() {
            for mode in PackagingMode::ALL {
                let result = generate(&params, &lang.key, mode);
                if mode == PackagingMode::Externalized && !lang.supports_external_data() {
                    assert!(
                        matches!(result, Err(PortError::UnsupportedMode { .. })),
                        "{} {} {}",
                        name,
                        lang.key,
                        mode
                    );
                    continue;
                }
                let artifact =
                    result.unwrap_or_else(|e| panic!("{} {} {}: {}", name, lang.key, mode, e));
                let text = &artifact.logic.contents;
                assert!(text.ends_with('\n'), "{} {} {}", name, lang.key, mode);
                assert!(!text.contains("{{ "), "{} {} {}", name, lang.key, mode);
                assert!(!text.contains("\n\n\n"), "{} {} {}", name, lang.key, mode);
                assert_eq!(artifact.family, params.family());
                assert_eq!(artifact.data.is_empty(), mode != PackagingMode::Externalized);
            }
        }
    }
}

#[test]
fn test_embedded_regression_tree_in_js() {
    let params = fixtures::load("decision_tree_regressor");
    insta::assert_snapshot!(code(&params, "js", PackagingMode::Embedded), @r###"
    function predict(features) {
        let result = 0.0;
        if (features[0] <= 2.0) {
            result = 1.5;
        } else {
            result = -3.25;
        }
        return result;
    }

    if (require.main === module) {
        const features = process.argv.slice(2 + 0).map(Number);
        console.log(predict(features));
    }
    "###);
}

#[test]
fn test_embedded_tree_inlines_literals() {
    let params = fixtures::load("decision_tree_classifier");
    let java = code(&params, "java", PackagingMode::Embedded);
    assert!(java.starts_with("class Estimator {"));
    assert!(java.contains("    public static int predict(double[] features) {"));
    assert!(java.contains("if (features[0] <= 0.5) {"));
    assert!(java.contains("if (features[1] <= 1.5) {"));
    assert!(java.contains("result = 2;"));
    assert!(!java.contains("lefts"));
    assert!(java.trim_end().ends_with('}'));
}

#[test]
fn test_split_tree_hoists_node_arrays() {
    let params = fixtures::load("decision_tree_classifier");
    let java = code(&params, "java", PackagingMode::Split);
    assert!(java.contains("private static final int[] lefts = {1, -1, 3, -1, -1};"));
    assert!(java.contains("private static final double[] thresholds = {0.5, -2.0, 1.5, -2.0, -2.0};"));
    assert!(java.contains("private static final int[] classes = {0, 0, 2, 1, 2};"));
    assert!(java.contains("while (lefts[node] != -1) {"));

    let php = code(&params, "php", PackagingMode::Split);
    assert!(php.contains("global $lefts;"));
    assert!(php.contains("$lefts = [1, -1, 3, -1, -1];"));
}

#[test]
fn test_externalized_loads_data_at_startup() {
    let params = fixtures::load("svm_linear_multiclass");
    let artifact = generate(&params, "js", PackagingMode::Externalized).unwrap();
    let js = &artifact.logic.contents;
    assert!(js.contains("let coefficients;"));
    assert!(js.contains("function loadData(path) {"));
    assert!(js.contains("    coefficients = data['coefficients'];"));
    assert!(js.contains("    loadData(process.argv[2]);"));
    assert!(js.contains("process.argv.slice(2 + 1)"));
    assert!(!js.contains("[1.0, 0.0]"));

    let go = code(&params, "go", PackagingMode::Externalized);
    assert!(go.contains("\t\"encoding/json\""));
    assert!(go.contains("var coefficients [][]float64"));
    assert!(go.contains("\t\tF0 [][]float64 `json:\"coefficients\"`"));
    assert!(go.contains("\tintercepts = data.F1"));
}

#[test]
fn test_unsupported_mode_names_the_request() {
    let params = fixtures::load("knn_classifier");
    let err = generate(&params, "c", PackagingMode::Externalized).unwrap_err();
    assert_eq!(
        err,
        PortError::UnsupportedMode {
            family: "k-nearest-neighbors".to_string(),
            language: "c".to_string(),
            mode: "externalized".to_string(),
        }
    );
}

#[test]
fn test_missing_template_fails_before_output() {
    let params = fixtures::load("forest_classifier");
    let go = registry().get("go").unwrap().without_template("while");
    let err = generator_for(&params)
        .generate(&go, PackagingMode::Embedded, &PortOptions::default())
        .unwrap_err();
    assert_eq!(
        err,
        PortError::MissingTemplate {
            language: "go".to_string(),
            key: "while".to_string()
        }
    );

    // Loader keys are only needed when externalizing.
    let js = registry().get("js").unwrap().without_template("load_mid");
    assert!(generator_for(&params)
        .generate(&js, PackagingMode::Split, &PortOptions::default())
        .is_ok());
    let err = generator_for(&params)
        .generate(&js, PackagingMode::Externalized, &PortOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), "missing-template");
}

#[test]
fn test_unfitted_parameters_produce_nothing() {
    let mut params = fixtures::load("mlp_classifier");
    if let CanonicalModelParameters::Mlp(p) = &mut params {
        p.layers.clear();
    }
    let err = generate(&params, "ruby", PackagingMode::Embedded).unwrap_err();
    assert_eq!(err.kind(), "not-fitted");
}

#[test]
fn test_generation_is_deterministic() {
    for (name, params) in fixtures::all() {
        let a = generate(&params, "go", PackagingMode::Externalized).unwrap();
        let b = generate(&params, "go", PackagingMode::Externalized).unwrap();
        assert_eq!(a, b, "{}", name);
    }
}

#[test]
fn test_go_imports_math_only_when_used() {
    let tree = code(&fixtures::load("decision_tree_classifier"), "go", PackagingMode::Embedded);
    assert!(!tree.contains("\"math\""));
    assert!(tree.starts_with("package main\n"));

    let bayes = code(&fixtures::load("gaussian_nb"), "go", PackagingMode::Embedded);
    assert!(bayes.contains("\t\"math\""));
    assert!(bayes.contains("math.Log("));
}

#[test]
fn test_ensemble_members_are_prefixed() {
    let params = fixtures::load("forest_classifier");
    let js = code(&params, "js", PackagingMode::Split);
    assert!(js.contains("const t0_lefts = "));
    assert!(js.contains("const t1_lefts = "));
    assert!(js.contains("const t0_values = [[0.0, 0.0], [0.8, 0.2], [0.2, 0.8]];"));
    // `node` is declared once and reset for the second tree.
    assert_eq!(js.matches("let node = 0;").count(), 1);
    assert!(js.contains("    node = 0;"));
}

#[test]
fn test_ensemble_mean_divides_by_tree_count() {
    let params = fixtures::load("forest_regressor");
    let ruby = code(&params, "ruby", PackagingMode::Embedded);
    assert!(ruby.contains("total = total + 1.0"));
    assert!(ruby.contains("return total / 2.0"));
}

#[test]
fn test_majority_vote_counts_leaves() {
    let mut params = fixtures::load("forest_classifier");
    if let CanonicalModelParameters::TreeEnsemble(p) = &mut params {
        p.combination = crate::model::Combination::MajorityVote;
    }
    let c = code(&params, "c", PackagingMode::Embedded);
    assert!(c.contains("    int votes[2] = {0};"));
    assert!(c.contains("votes[1] = votes[1] + 1;"));
}

#[test]
fn test_svm_kernels() {
    let mut params = fixtures::load("svm_rbf");
    let rbf = code(&params, "js", PackagingMode::Embedded);
    assert!(rbf.contains("Math.exp((-1.0) * acc)"));
    assert!(rbf.contains("decision = intercepts[d];"));
    assert!(rbf.contains("for (let j = i + 1; j < 3; j++) {"));

    if let CanonicalModelParameters::Svm(p) = &mut params {
        if let SvmModel::Kernel { kernel, .. } = &mut p.model {
            *kernel = Kernel::Poly {
                gamma: 0.5,
                coef0: 1.0,
                degree: 3.0,
            };
        }
    }
    let poly = code(&params, "php", PackagingMode::Split);
    assert!(poly.contains("pow(0.5 * $acc + 1.0, 3.0)"));

    let linear = code(&fixtures::load("svm_linear_binary"), "go", PackagingMode::Embedded);
    assert!(linear.contains("if acc > 0.0 {"));
    assert!(!linear.contains("\"math\""));
}

#[test]
fn test_knn_metrics() {
    let mut params = fixtures::load("knn_regressor");
    let manhattan = code(&params, "java", PackagingMode::Embedded);
    assert!(manhattan.contains("Math.abs(diff)"));
    assert!(manhattan.contains("return total / 2.0;"));

    if let CanonicalModelParameters::KNearestNeighbors(p) = &mut params {
        p.metric = Metric::Minkowski { p: 3.0 };
    }
    let minkowski = code(&params, "java", PackagingMode::Embedded);
    assert!(minkowski.contains("Math.pow(Math.abs(diff), 3.0)"));

    let euclidean = code(&fixtures::load("knn_classifier"), "java", PackagingMode::Embedded);
    assert!(euclidean.contains("acc = acc + diff * diff;"));
    assert!(!euclidean.contains("Math.sqrt"));
}

#[test]
fn test_bernoulli_uses_precomputed_logs() {
    let params = fixtures::load("bernoulli_nb");
    let js = code(&params, "js", PackagingMode::Split);
    assert!(js.contains("const log_probabilities = "));
    assert!(js.contains("if (features[f] > 0.5) {"));
    assert!(!js.contains("Math.log"));
}

#[test]
fn test_mlp_activations() {
    let classifier = code(&fixtures::load("mlp_classifier"), "c", PackagingMode::Split);
    assert!(classifier.contains("    double hidden_0[2] = {0};"));
    assert!(classifier.contains("if (acc < 0.0) {"));
    assert!(classifier.contains("top_1"));
    assert!(classifier.contains("norm_1"));

    let logistic = code(&fixtures::load("mlp_logistic"), "ruby", PackagingMode::Embedded);
    assert!(logistic.contains("if hidden_0[0] > 0.5"));

    let regressor = code(&fixtures::load("mlp_regressor"), "go", PackagingMode::Embedded);
    assert!(regressor.contains("math.Tanh(acc)"));
    assert!(regressor.contains("return hidden_1[0]"));
}

#[test]
fn test_precision_rounds_parameters_only() {
    let mut params = fixtures::load("decision_tree_regressor");
    if let CanonicalModelParameters::DecisionTree(p) = &mut params {
        p.tree.threshold[0] = 2.123456789;
    }
    let lang = registry().get("js").unwrap();
    let options = PortOptions::default().with_precision(Some(3));
    let artifact = generator_for(&params)
        .generate(lang, PackagingMode::Embedded, &options)
        .unwrap();
    let js = &artifact.logic.contents;
    assert!(js.contains("features[0] <= 2.12e0"));
    // Structural constants stay exact.
    assert!(js.contains("let result = 0.0;"));
}

#[test]
fn test_custom_names() {
    let params = fixtures::load("gaussian_nb");
    let lang = registry().get("java").unwrap();
    let options = PortOptions::default()
        .with_class_name("Flowers")
        .with_method_name("classify");
    let artifact = generator_for(&params)
        .generate(lang, PackagingMode::Embedded, &options)
        .unwrap();
    assert_eq!(artifact.logic.filename, "Flowers.java");
    assert!(artifact.logic.contents.starts_with("class Flowers {"));
    assert!(artifact
        .logic
        .contents
        .contains("public static int classify(double[] features) {"));
    assert!(artifact
        .logic
        .contents
        .contains("System.out.println(classify(features));"));
}

fn proba_code(params: &CanonicalModelParameters, language: &str, mode: PackagingMode) -> String {
    let lang = registry().get(language).unwrap();
    let options = PortOptions::default().with_method(Method::PredictProba);
    generator_for(params)
        .generate(lang, mode, &options)
        .unwrap_or_else(|e| panic!("{} {}: {}", language, mode, e))
        .logic
        .contents
}

#[test]
fn test_predict_proba_in_every_language_and_mode() {
    let options = PortOptions::default().with_method(Method::PredictProba);
    for (name, params) in fixtures::all() {
        let generator = generator_for(&params);
        for lang in registry().iter() {
            for mode in PackagingMode::ALL {
                if mode == PackagingMode::Externalized && !lang.supports_external_data() {
                    continue;
                }
                let result = generator.generate(lang, mode, &options);
                if generator.probabilities().is_none() {
                    assert!(
                        matches!(result, Err(PortError::UnsupportedMethod { .. })),
                        "{} {} {}",
                        name,
                        lang.key,
                        mode
                    );
                    continue;
                }
                let artifact =
                    result.unwrap_or_else(|e| panic!("{} {} {}: {}", name, lang.key, mode, e));
                assert_eq!(artifact.method, Method::PredictProba);
                assert!(!artifact.logic.contents.contains("{{ "), "{} {} {}", name, lang.key, mode);
            }
        }
    }
}

#[test]
fn test_c_probabilities_return_static_array() {
    let c = proba_code(&fixtures::load("decision_tree_classifier"), "c", PackagingMode::Split);
    assert!(c.contains("double* predict(double features[]) {"));
    assert!(c.contains("    static double proba[3];"));
    assert!(c.contains("proba[c] = proba[c] + values[node][c];"));
    assert!(c.contains("    return proba;"));
    assert!(c.contains("double *probabilities = predict(features);"));
}

#[test]
fn test_weighted_vote_adds_tree_weights() {
    let params = fixtures::load("adaboost_classifier");
    let js = code(&params, "js", PackagingMode::Embedded);
    assert!(js.contains("let votes = new Array(2).fill(0.0);"));
    assert!(js.contains("votes[0] = votes[0] + 0.9;"));
    assert!(js.contains("votes[1] = votes[1] + 0.4;"));
    assert!(js.contains("votes[0] = votes[0] + 0.4;"));

    let proba = proba_code(&params, "js", PackagingMode::Split);
    assert!(proba.contains("votes[c] = votes[c] / 1.6;"));
    assert!(proba.contains("return votes;"));
    assert!(proba.contains("console.log(predict(features).join(' '));"));
}

#[test]
fn test_weighted_probability_scales_leaf_distributions() {
    let params = fixtures::load("boosted_probability");
    let js = code(&params, "js", PackagingMode::Split);
    assert!(js.contains("const t0_values = [[0.0, 0.0], [1.5, 0.5], [0.5, 1.5]];"));
    assert!(js.contains("const t1_values = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]];"));

    let proba = proba_code(&params, "ruby", PackagingMode::Embedded);
    assert!(proba.contains("proba = Array.new(2, 0.0)"));
    assert!(proba.contains("proba[c] = proba[c] / 3.0"));
}

#[test]
fn test_probability_outputs_by_family() {
    let knn = proba_code(&fixtures::load("knn_classifier"), "go", PackagingMode::Embedded);
    assert!(knn.contains("func predict(features []float64) []float64 {"));
    assert!(knn.contains("votes[c] = votes[c] / 3.0"));

    let bayes = proba_code(&fixtures::load("gaussian_nb"), "go", PackagingMode::Embedded);
    assert!(bayes.contains("top := likelihoods[0]"));
    assert!(bayes.contains("proba[j] = math.Exp(likelihoods[j] - top)"));
    assert!(bayes.contains("return proba"));

    let logistic = proba_code(&fixtures::load("mlp_logistic"), "php", PackagingMode::Embedded);
    assert!(logistic.contains("$proba[1] = $hidden_0[0];"));
    assert!(logistic.contains("$proba[0] = 1.0 - $hidden_0[0];"));

    let java = proba_code(&fixtures::load("mlp_classifier"), "java", PackagingMode::Embedded);
    assert!(java.contains("public static double[] predict(double[] features) {"));
    assert!(java.contains("double[] proba = new double[2];"));
}

#[test]
fn test_svm_has_no_probabilities() {
    let params = fixtures::load("svm_poly");
    let lang = registry().get("c").unwrap();
    let options = PortOptions::default().with_method(Method::PredictProba);
    let err = generator_for(&params)
        .generate(lang, PackagingMode::Embedded, &options)
        .unwrap_err();
    assert_eq!(err.kind(), "unsupported-method");
}

#[test]
fn test_new_kernels_and_metrics_generate() {
    let poly = code(&fixtures::load("svm_poly"), "c", PackagingMode::Embedded);
    assert!(poly.contains("pow(0.5 * acc + 1.0, 2.0)"));
    let sigmoid = code(&fixtures::load("svm_sigmoid"), "go", PackagingMode::Split);
    assert!(sigmoid.contains("math.Tanh(0.5 * acc + 0.0)"));
    let minkowski = code(&fixtures::load("knn_minkowski"), "ruby", PackagingMode::Split);
    assert!(minkowski.contains("** (3.0))"));
}
