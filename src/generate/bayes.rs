use std::f64::consts::PI;

use super::{emit_add, emit_argmax, emit_softmax, feature, Generator};
use crate::emit::Emitter;
use crate::error::Result;
use crate::model::{Family, NaiveBayesModel, NaiveBayesParameters};
use crate::pack::{DataArray, Method, NumberKind, PackagingMode};

/// Per-class joint log-likelihood, then argmax. Probabilities are the
/// softmax of the likelihoods.
///
/// Gaussian: `log(prior) - 0.5 * sum(log(2 pi var) + (x - mean)^2 / var)`.
/// Bernoulli: `log(prior) + sum(x log p + (1 - x) log(1 - p))`, with the
/// logarithms computed here so the generated code only multiplies and adds.
pub struct NaiveBayesGenerator<'p> {
    params: &'p NaiveBayesParameters,
}

impl<'p> NaiveBayesGenerator<'p> {
    pub fn new(params: &'p NaiveBayesParameters) -> Self {
        Self { params }
    }

    fn emit_decision(&self, e: &mut Emitter<'_>, likelihoods: &str, n_classes: usize) -> Result<()> {
        match e.method() {
            Method::Predict => emit_argmax(e, likelihoods, n_classes),
            Method::PredictProba => {
                e.result("proba", n_classes)?;
                let proba = e.var("proba")?;
                emit_softmax(e, likelihoods, &proba, n_classes, "")?;
                e.ret(&proba)
            }
        }
    }

    fn emit_gaussian(&self, e: &mut Emitter<'_>) -> Result<()> {
        let n_classes = self.params.n_classes();
        let theta = e.data("theta")?;
        let sigma = e.data("sigma")?;
        let priors = e.data("priors")?;
        let (i, f) = (e.var("i")?, e.var("f")?);

        e.zeros("likelihoods", NumberKind::Double, n_classes)?;
        let likelihoods = e.var("likelihoods")?;
        e.for_n("i", 0, n_classes)?;
        e.init_double("nll", 0.0)?;
        let nll = e.var("nll")?;
        e.for_n("f", 0, self.params.n_features)?;
        let diff = format!("{} - {}", feature(e, &f)?, e.at2(&theta, &i, &f)?);
        e.init("diff", NumberKind::Double, &diff)?;
        let diff = e.var("diff")?;
        let variance = e.at2(&sigma, &i, &f)?;
        let log_norm = e.call("log", &format!("{} * {}", e.exact(2.0 * PI)?, variance))?;
        let term = format!("{} + {} * {} / {}", log_norm, diff, diff, variance);
        emit_add(e, &nll, &term)?;
        e.end_for()?;
        let prior = e.call("log", &e.at(&priors, &i)?)?;
        let value = format!("{} - {} * {}", prior, e.exact(0.5)?, nll);
        e.set(&e.at(&likelihoods, &i)?, &value)?;
        e.end_for()?;
        self.emit_decision(e, &likelihoods, n_classes)
    }

    fn emit_bernoulli(&self, e: &mut Emitter<'_>, binarize: Option<f64>) -> Result<()> {
        let n_classes = self.params.n_classes();
        let log_p = e.data("log_probabilities")?;
        let log_q = e.data("log_complements")?;
        let log_priors = e.data("log_priors")?;
        let (i, f) = (e.var("i")?, e.var("f")?);

        e.zeros("likelihoods", NumberKind::Double, n_classes)?;
        let likelihoods = e.var("likelihoods")?;
        e.for_n("i", 0, n_classes)?;
        e.init("acc", NumberKind::Double, &e.at(&log_priors, &i)?)?;
        let acc = e.var("acc")?;
        e.for_n("f", 0, self.params.n_features)?;
        let x = feature(e, &f)?;
        let (p, q) = (e.at2(&log_p, &i, &f)?, e.at2(&log_q, &i, &f)?);
        match binarize {
            Some(threshold) => {
                e.if_(&x, ">", &e.double(threshold)?)?;
                emit_add(e, &acc, &p)?;
                e.else_()?;
                emit_add(e, &acc, &q)?;
                e.end_if()?;
            }
            None => {
                let term = format!("{} * {} + ({} - {}) * {}", x, p, e.exact(1.0)?, x, q);
                emit_add(e, &acc, &term)?;
            }
        }
        e.end_for()?;
        e.set(&e.at(&likelihoods, &i)?, &acc)?;
        e.end_for()?;
        self.emit_decision(e, &likelihoods, n_classes)
    }
}

impl Generator for NaiveBayesGenerator<'_> {
    fn family(&self) -> Family {
        Family::NaiveBayes
    }

    fn output(&self) -> NumberKind {
        NumberKind::Int
    }

    fn validate(&self) -> Result<()> {
        self.params.validate()
    }

    fn probabilities(&self) -> Option<usize> {
        Some(self.params.n_classes())
    }

    fn arrays(&self, _mode: PackagingMode, _method: Method) -> Vec<DataArray> {
        match &self.params.model {
            NaiveBayesModel::Gaussian {
                theta,
                variance,
                priors,
            } => vec![
                DataArray::matrix("theta", theta),
                DataArray::matrix("sigma", variance),
                DataArray::doubles("priors", priors.clone()),
            ],
            NaiveBayesModel::Bernoulli {
                feature_probabilities,
                priors,
                ..
            } => {
                let logs = |f: fn(f64) -> f64| -> Vec<Vec<f64>> {
                    feature_probabilities
                        .iter()
                        .map(|row| row.iter().map(|p| f(*p)).collect())
                        .collect()
                };
                vec![
                    DataArray::matrix("log_probabilities", &logs(f64::ln)),
                    DataArray::matrix("log_complements", &logs(|p| (1.0 - p).ln())),
                    DataArray::doubles("log_priors", priors.iter().map(|p| p.ln()).collect()),
                ]
            }
        }
    }

    fn emit_body(&self, e: &mut Emitter<'_>) -> Result<()> {
        match &self.params.model {
            NaiveBayesModel::Gaussian { .. } => self.emit_gaussian(e),
            NaiveBayesModel::Bernoulli { binarize, .. } => self.emit_bernoulli(e, *binarize),
        }
    }
}
