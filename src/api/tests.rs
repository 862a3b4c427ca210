use super::*;
use crate::fixtures;

#[test]
fn test_port_resolves_language_and_mode() {
    let params = fixtures::load("svm_rbf");
    let artifact = port(&params, "go", "exported", &PortOptions::default()).unwrap();
    assert_eq!(artifact.language, "go");
    assert_eq!(artifact.mode, PackagingMode::Externalized);
    assert_eq!(artifact.suffix, "go");
    assert_eq!(artifact.logic.filename, "estimator.go");
}

#[test]
fn test_unknown_language() {
    let params = fixtures::load("gaussian_nb");
    let err = port(&params, "i_n_v_a_l_i_d", "embedded", &PortOptions::default()).unwrap_err();
    assert_eq!(
        err,
        PortError::UnknownLanguage {
            key: "i_n_v_a_l_i_d".to_string()
        }
    );
}

#[test]
fn test_unknown_mode() {
    let params = fixtures::load("gaussian_nb");
    let err = port(&params, "c", "inline", &PortOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "unknown-mode");
}

#[test]
fn test_port_all_keeps_request_order() {
    let params = fixtures::load("knn_regressor");
    let languages = ["ruby", "c", "nope", "js", "java"];
    let results = port_all(&params, &languages, "split", &PortOptions::default());
    assert_eq!(results.len(), languages.len());
    for (key, result) in languages.iter().zip(&results) {
        match result {
            Ok(artifact) => assert_eq!(artifact.language, *key),
            Err(e) => {
                assert_eq!(*key, "nope");
                assert_eq!(e.kind(), "unknown-language");
            }
        }
    }
}

#[test]
fn test_port_all_matches_sequential_calls() {
    let params = fixtures::load("mlp_classifier");
    let languages = ["c", "go", "java", "js", "php", "ruby"];
    let options = PortOptions::default();
    let parallel = port_all(&params, &languages, "embedded", &options);
    for (key, result) in languages.iter().zip(parallel) {
        assert_eq!(result, port(&params, key, "embedded", &options));
    }
}

#[test]
fn test_option_defaults() {
    let options = PortOptions::default();
    assert_eq!(options.class_name, "Estimator");
    assert_eq!(options.method_name, "predict");
    assert_eq!(options.precision, None);
    options.validate().unwrap();
}

#[test]
fn test_option_validation() {
    let bad = [
        PortOptions::default().with_class_name("2Fast"),
        PortOptions::default().with_class_name(""),
        PortOptions::default().with_method_name("predict-proba"),
        PortOptions::default().with_method_name("main"),
        PortOptions::default().with_precision(Some(0)),
        PortOptions::default().with_precision(Some(18)),
    ];
    for options in bad {
        let err = options.validate().unwrap_err();
        assert_eq!(err.kind(), "malformed-value", "{:?}", options);
    }
    PortOptions::default()
        .with_class_name("_Model2")
        .with_method_name("score_one")
        .with_precision(Some(17))
        .validate()
        .unwrap();
}

#[test]
fn test_invalid_options_fail_generation() {
    let params = fixtures::load("decision_tree_classifier");
    let options = PortOptions::default().with_method_name("load_data");
    let err = port(&params, "php", "embedded", &options).unwrap_err();
    assert!(
        matches!(err, PortError::MalformedValue { ref path, .. } if path == "options.method_name")
    );
}

#[test]
fn test_reserved_names_are_rejected_per_language() {
    let params = fixtures::load("gaussian_nb");
    let rejected = [
        ("c", PortOptions::default().with_method_name("log"), "options.method_name"),
        ("java", PortOptions::default().with_class_name("Math"), "options.class_name"),
        ("java", PortOptions::default().with_method_name("class"), "options.method_name"),
        ("js", PortOptions::default().with_method_name("function"), "options.method_name"),
        ("go", PortOptions::default().with_method_name("range"), "options.method_name"),
        ("ruby", PortOptions::default().with_method_name("puts"), "options.method_name"),
        // PHP function names ignore case.
        ("php", PortOptions::default().with_method_name("EXP"), "options.method_name"),
    ];
    for (language, options, expected) in rejected {
        let err = port(&params, language, "embedded", &options).unwrap_err();
        assert!(
            matches!(err, PortError::MalformedValue { ref path, .. } if path == expected),
            "{} {:?}: {}",
            language,
            options,
            err
        );
    }
}

#[test]
fn test_reserved_names_only_matter_where_they_appear() {
    let params = fixtures::load("gaussian_nb");
    // C has no class, so the class name is only a file stem.
    let options = PortOptions::default().with_class_name("int");
    assert_eq!(port(&params, "c", "embedded", &options).unwrap().stem, "int");
    // A C keyword is a fine Go function name.
    let options = PortOptions::default().with_method_name("static");
    port(&params, "go", "embedded", &options).unwrap();
}

#[test]
fn test_predict_proba_option() {
    let params = fixtures::load("knn_classifier");
    let options = PortOptions::default().with_method(Method::PredictProba);
    assert_eq!(options.method, Method::PredictProba);
    let artifact = port(&params, "ruby", "embedded", &options).unwrap();
    assert_eq!(artifact.method, Method::PredictProba);
    assert!(artifact.logic.contents.contains("puts predict(features).join(' ')"));

    let err = port(&fixtures::load("svm_rbf"), "ruby", "embedded", &options).unwrap_err();
    assert_eq!(
        err,
        PortError::UnsupportedMethod {
            family: "support vector machine".to_string(),
            method: "predict_proba".to_string()
        }
    );
}
