//! Per-family code generators.
//!
//! Each family has a small generator that knows the prediction procedure
//! and nothing about target syntax: it lists its parameter arrays and
//! writes the function body through an [`Emitter`]. The packaging assembler
//! does the rest. Generators are selected from the parameter variant by
//! [`generator_for`].

use crate::api::PortOptions;
use crate::emit::Emitter;
use crate::error::Result;
use crate::language::LanguageDefinition;
use crate::model::{CanonicalModelParameters, Family};
use crate::pack::{assemble, DataArray, GeneratedArtifact, Method, NumberKind, PackagingMode};

mod bayes;
mod ensemble;
mod knn;
mod mlp;
mod svm;
mod tree;

#[cfg(test)]
mod tests;

pub use bayes::NaiveBayesGenerator;
pub use ensemble::EnsembleGenerator;
pub use knn::KnnGenerator;
pub use mlp::MlpGenerator;
pub use svm::SvmGenerator;
pub use tree::DecisionTreeGenerator;

/// Name of the input vector parameter in every generated function.
pub const FEATURES: &str = "features";

/// The capability every family generator provides.
pub trait Generator {
    fn family(&self) -> Family;

    /// Kind of the predicted value: class index or real number.
    fn output(&self) -> NumberKind;

    /// Reject unfitted or malformed parameters before any text is emitted.
    fn validate(&self) -> Result<()>;

    /// Length of the vector `predict_proba` returns, `None` when the
    /// estimator has no probability output.
    fn probabilities(&self) -> Option<usize>;

    /// Parameter arrays the body reads, in declaration order. Embedded trees
    /// inline their literals and return none.
    fn arrays(&self, mode: PackagingMode, method: Method) -> Vec<DataArray>;

    /// Write the prediction function's body.
    fn emit_body(&self, e: &mut Emitter<'_>) -> Result<()>;

    fn generate(
        &self,
        lang: &LanguageDefinition,
        mode: PackagingMode,
        options: &PortOptions,
    ) -> Result<GeneratedArtifact> {
        assemble(self, lang, mode, options)
    }
}

/// Pick the generator for a parameter set.
pub fn generator_for(params: &CanonicalModelParameters) -> Box<dyn Generator + '_> {
    match params {
        CanonicalModelParameters::DecisionTree(p) => Box::new(DecisionTreeGenerator::new(p)),
        CanonicalModelParameters::TreeEnsemble(p) => Box::new(EnsembleGenerator::new(p)),
        CanonicalModelParameters::Svm(p) => Box::new(SvmGenerator::new(p)),
        CanonicalModelParameters::KNearestNeighbors(p) => Box::new(KnnGenerator::new(p)),
        CanonicalModelParameters::NaiveBayes(p) => Box::new(NaiveBayesGenerator::new(p)),
        CanonicalModelParameters::Mlp(p) => Box::new(MlpGenerator::new(p)),
    }
}

// ── Shared fragments ──────────────────────────────────────────────

/// `best` = index of the first maximum of `array[0..n]`, then return it.
pub(crate) fn emit_argmax(e: &mut Emitter<'_>, array: &str, n: usize) -> Result<()> {
    e.init_int("best", 0)?;
    let best = e.var("best")?;
    let c = e.var("c")?;
    e.for_n("c", 1, n)?;
    let candidate = e.at(array, &c)?;
    let leader = e.at(array, &best)?;
    e.if_(&candidate, ">", &leader)?;
    e.set(&best, &c)?;
    e.end_if()?;
    e.end_for()?;
    e.ret(&best)
}

/// Per-class accumulator: the returned array under `predict_proba`, a
/// local of `kind` otherwise.
pub(crate) fn emit_scores(e: &mut Emitter<'_>, name: &str, kind: NumberKind, n: usize) -> Result<()> {
    match e.method() {
        Method::PredictProba => e.result(name, n),
        Method::Predict => e.zeros(name, kind, n),
    }
}

/// Divide `array[0..n]` by `divisor` in place and return the array.
pub(crate) fn emit_scaled_return(e: &mut Emitter<'_>, array: &str, n: usize, divisor: f64) -> Result<()> {
    let c = e.var("c")?;
    let divisor = e.exact(divisor)?;
    e.for_n("c", 0, n)?;
    let slot = e.at(array, &c)?;
    e.set(&slot, &format!("{} / {}", slot, divisor))?;
    e.end_for()?;
    e.ret(array)
}

/// Softmax of `source[0..n]` into `target`, which may be `source` itself:
/// shift by the maximum, exponentiate, normalize. `tag` suffixes the helper
/// variable names.
pub(crate) fn emit_softmax(
    e: &mut Emitter<'_>,
    source: &str,
    target: &str,
    n: usize,
    tag: &str,
) -> Result<()> {
    let (top_name, norm_name) = (format!("top{}", tag), format!("norm{}", tag));
    let j = e.var("j")?;
    let from = e.at(source, &j)?;
    let to = e.at(target, &j)?;

    e.init(&top_name, NumberKind::Double, &e.at(source, "0")?)?;
    let top = e.var(&top_name)?;
    e.for_n("j", 1, n)?;
    e.if_(&from, ">", &top)?;
    e.set(&top, &from)?;
    e.end_if()?;
    e.end_for()?;

    e.init_double(&norm_name, 0.0)?;
    let norm = e.var(&norm_name)?;
    e.for_n("j", 0, n)?;
    e.set(&to, &e.call("exp", &format!("{} - {}", from, top))?)?;
    emit_add(e, &norm, &to)?;
    e.end_for()?;

    e.for_n("j", 0, n)?;
    e.set(&to, &format!("{} / {}", to, norm))?;
    e.end_for()
}

/// `target = target + value`.
pub(crate) fn emit_add(e: &mut Emitter<'_>, target: &str, value: &str) -> Result<()> {
    e.set(target, &format!("{} + {}", target, value))
}

/// `features[i]` for an index expression.
pub(crate) fn feature(e: &Emitter<'_>, i: &str) -> Result<String> {
    let features = e.var(FEATURES)?;
    e.at(&features, i)
}
