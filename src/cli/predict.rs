use std::path::PathBuf;

use estimator_port::diagnostic::Diagnostic;
use estimator_port::predict::{predict, predict_proba};
use estimator_port::Method;

use super::{fail, load_params};

pub fn cmd_predict(input: PathBuf, features: Vec<f64>, method: Option<String>) {
    let filename = input.display().to_string();
    let method = match method.as_deref().map(Method::parse).transpose() {
        Ok(method) => method.unwrap_or_default(),
        Err(e) => fail(Diagnostic::from(&e), &filename, ""),
    };
    let params = load_params(&input);
    let printed = match method {
        Method::Predict => predict(&params, &features).map(|p| p.to_string()),
        Method::PredictProba => predict_proba(&params, &features).map(|p| {
            p.iter().map(f64::to_string).collect::<Vec<_>>().join(" ")
        }),
    };
    match printed {
        Ok(line) => println!("{}", line),
        Err(e) => fail(Diagnostic::from(&e), &filename, ""),
    }
}
