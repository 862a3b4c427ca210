//! End-to-end generation through the public API: every fixture, every
//! language, every packaging mode, written to disk.

use std::fs;
use std::path::Path;

use estimator_port::{
    port, port_all, predict, predict_proba, registry, CanonicalModelParameters, Method,
    PackagingMode, PortError, PortOptions, Prediction,
};

fn fixtures() -> Vec<(String, CanonicalModelParameters)> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut entries: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|x| x == "json"))
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path).unwrap();
            let name = path.file_stem().unwrap().to_string_lossy().to_string();
            let params = CanonicalModelParameters::from_json(&text)
                .unwrap_or_else(|e| panic!("{}: {}", name, e));
            (name, params)
        })
        .collect()
}

#[test]
fn test_fixtures_cover_every_family() {
    let fixtures = fixtures();
    for family in estimator_port::Family::ALL {
        assert!(
            fixtures.iter().any(|(_, p)| p.family() == family),
            "no fixture for {}",
            family
        );
    }
}

#[test]
fn test_write_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let options = PortOptions::default();
    for (name, params) in fixtures() {
        for lang in registry().iter() {
            for mode in PackagingMode::ALL {
                let result = port(&params, &lang.key, mode.name(), &options);
                let artifact = match result {
                    Ok(a) => a,
                    Err(PortError::UnsupportedMode { .. }) => {
                        assert!(!lang.supports_external_data());
                        continue;
                    }
                    Err(e) => panic!("{} {} {}: {}", name, lang.key, mode, e),
                };
                let out = dir.path().join(&name).join(&lang.key).join(mode.name());
                fs::create_dir_all(&out).unwrap();
                for blob in artifact.blobs() {
                    fs::write(out.join(&blob.filename), &blob.contents).unwrap();
                }
                let logic = fs::read_to_string(out.join(&artifact.logic.filename)).unwrap();
                assert_eq!(logic, artifact.logic.contents);
                if mode == PackagingMode::Externalized {
                    let data = fs::read_to_string(out.join(&artifact.data[0].filename)).unwrap();
                    let value: serde_json::Value = serde_json::from_str(&data).unwrap();
                    assert!(value.is_object());
                }
                let execute = artifact.execute_command(&out).unwrap();
                assert!(execute.contains(&out.display().to_string()));
            }
        }
    }
}

#[test]
fn test_parallel_generation_is_stable() {
    let options = PortOptions::default().with_precision(Some(12));
    let keys = registry().keys();
    for (name, params) in fixtures() {
        let first = port_all(&params, &keys, "split", &options);
        let second = port_all(&params, &keys, "split", &options);
        let digests = |results: &[estimator_port::Result<estimator_port::GeneratedArtifact>]| {
            results
                .iter()
                .map(|r| r.as_ref().unwrap().digest())
                .collect::<Vec<_>>()
        };
        assert_eq!(digests(&first), digests(&second), "{}", name);
    }
}

#[test]
fn test_reference_predictions_by_kind() {
    for (name, params) in fixtures() {
        let features = vec![0.25; params.n_features()];
        let prediction = predict(&params, &features).unwrap();
        match prediction {
            Prediction::Class(_) => assert!(params.is_classifier(), "{}", name),
            Prediction::Value(v) => {
                assert!(!params.is_classifier(), "{}", name);
                assert!(v.is_finite());
            }
        }
    }
}

#[test]
fn test_predict_proba_artifacts() {
    let options = PortOptions::default().with_method(Method::PredictProba);
    for (name, params) in fixtures() {
        let features = vec![0.25; params.n_features()];
        let reference = predict_proba(&params, &features);
        for lang in registry().iter() {
            match (port(&params, &lang.key, "split", &options), &reference) {
                (Ok(artifact), Ok(proba)) => {
                    assert_eq!(artifact.method, Method::PredictProba);
                    assert!(params.is_classifier(), "{}", name);
                    assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9, "{}", name);
                }
                (Err(PortError::UnsupportedMethod { .. }), Err(PortError::UnsupportedMethod { .. })) => {}
                (generated, reference) => panic!(
                    "{} {}: generation {:?} disagrees with reference {:?}",
                    name,
                    lang.key,
                    generated.map(|a| a.logic.filename),
                    reference
                ),
            }
        }
    }
}
