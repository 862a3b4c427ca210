use super::{emit_add, emit_argmax, feature, Generator};
use crate::emit::Emitter;
use crate::error::Result;
use crate::model::{Family, Kernel, SvmModel, SvmParameters};
use crate::pack::{DataArray, Method, NumberKind, PackagingMode};

/// Linear one-vs-rest scores, or kernel one-vs-one voting in libsvm layout.
pub struct SvmGenerator<'p> {
    params: &'p SvmParameters,
}

impl<'p> SvmGenerator<'p> {
    pub fn new(params: &'p SvmParameters) -> Self {
        Self { params }
    }

    fn emit_linear(&self, e: &mut Emitter<'_>, rows: usize) -> Result<()> {
        let n_features = self.params.n_features;
        let coefficients = e.data("coefficients")?;
        let intercepts = e.data("intercepts")?;
        let acc = e.var("acc")?;
        let f = e.var("f")?;

        if rows == 1 {
            e.init("acc", NumberKind::Double, &e.at(&intercepts, "0")?)?;
            e.for_n("f", 0, n_features)?;
            let w = e.at2(&coefficients, "0", &f)?;
            emit_add(e, &acc, &format!("{} * {}", w, feature(e, &f)?))?;
            e.end_for()?;
            e.init_int("label", 0)?;
            let label = e.var("label")?;
            e.if_(&acc, ">", &e.exact(0.0)?)?;
            e.set(&label, "1")?;
            e.end_if()?;
            return e.ret(&label);
        }

        e.zeros("scores", NumberKind::Double, rows)?;
        let scores = e.var("scores")?;
        let i = e.var("i")?;
        e.for_n("i", 0, rows)?;
        e.init("acc", NumberKind::Double, &e.at(&intercepts, &i)?)?;
        e.for_n("f", 0, n_features)?;
        let w = e.at2(&coefficients, &i, &f)?;
        emit_add(e, &acc, &format!("{} * {}", w, feature(e, &f)?))?;
        e.end_for()?;
        e.set(&e.at(&scores, &i)?, &acc)?;
        e.end_for()?;
        emit_argmax(e, &scores, rows)
    }

    fn emit_kernel(&self, e: &mut Emitter<'_>, n_vectors: usize, kernel: Kernel) -> Result<()> {
        let n_features = self.params.n_features;
        let n_classes = self.params.n_classes();
        let vectors = e.data("vectors")?;
        let coefficients = e.data("coefficients")?;
        let intercepts = e.data("intercepts")?;
        let starts = e.data("starts")?;
        let counts = e.data("counts")?;
        let (i, j, k, f) = (e.var("i")?, e.var("j")?, e.var("k")?, e.var("f")?);

        // Kernel value against every support vector.
        e.zeros("kernels", NumberKind::Double, n_vectors)?;
        let kernels = e.var("kernels")?;
        e.for_n("i", 0, n_vectors)?;
        e.init_double("acc", 0.0)?;
        let acc = e.var("acc")?;
        e.for_n("f", 0, n_features)?;
        let v = e.at2(&vectors, &i, &f)?;
        let x = feature(e, &f)?;
        if let Kernel::Rbf { .. } = kernel {
            e.init("diff", NumberKind::Double, &format!("{} - {}", v, x))?;
            let diff = e.var("diff")?;
            emit_add(e, &acc, &format!("{} * {}", diff, diff))?;
        } else {
            emit_add(e, &acc, &format!("{} * {}", v, x))?;
        }
        e.end_for()?;
        let value = match kernel {
            Kernel::Linear => acc.clone(),
            Kernel::Poly {
                gamma,
                coef0,
                degree,
            } => {
                let base = format!("{} * {} + {}", e.term(gamma)?, acc, e.term(coef0)?);
                e.pow(&base, &e.term(degree)?)?
            }
            Kernel::Rbf { gamma } => e.call("exp", &format!("{} * {}", e.term(-gamma)?, acc))?,
            Kernel::Sigmoid { gamma, coef0 } => e.call(
                "tanh",
                &format!("{} * {} + {}", e.term(gamma)?, acc, e.term(coef0)?),
            )?,
        };
        e.set(&e.at(&kernels, &i)?, &value)?;
        e.end_for()?;

        // One-vs-one: pair d = (i, j) with i < j, positive decision votes i.
        e.zeros("votes", NumberKind::Int, n_classes)?;
        let votes = e.var("votes")?;
        e.init_double("decision", 0.0)?;
        let decision = e.var("decision")?;
        e.init_int("d", 0)?;
        let d = e.var("d")?;
        e.for_n("i", 0, n_classes)?;
        e.for_("j", &format!("{} + 1", i), &e.count(n_classes)?)?;
        e.set(&decision, &e.at(&intercepts, &d)?)?;
        for (class, row) in [(&i, format!("{} - 1", j)), (&j, i.clone())] {
            let start = e.at(&starts, class)?;
            let end = format!("{} + {}", start, e.at(&counts, class)?);
            e.for_("k", &start, &end)?;
            let coef = e.at2(&coefficients, &row, &k)?;
            emit_add(e, &decision, &format!("{} * {}", coef, e.at(&kernels, &k)?))?;
            e.end_for()?;
        }
        e.if_(&decision, ">", &e.exact(0.0)?)?;
        emit_add(e, &e.at(&votes, &i)?, "1")?;
        e.else_()?;
        emit_add(e, &e.at(&votes, &j)?, "1")?;
        e.end_if()?;
        emit_add(e, &d, "1")?;
        e.end_for()?;
        e.end_for()?;
        emit_argmax(e, &votes, n_classes)
    }
}

impl Generator for SvmGenerator<'_> {
    fn family(&self) -> Family {
        Family::Svm
    }

    fn output(&self) -> NumberKind {
        NumberKind::Int
    }

    fn validate(&self) -> Result<()> {
        self.params.validate()
    }

    /// No probability calibration is carried over for support vector machines.
    fn probabilities(&self) -> Option<usize> {
        None
    }

    fn arrays(&self, _mode: PackagingMode, _method: Method) -> Vec<DataArray> {
        match &self.params.model {
            SvmModel::Linear {
                coefficients,
                intercepts,
            } => vec![
                DataArray::matrix("coefficients", coefficients),
                DataArray::doubles("intercepts", intercepts.clone()),
            ],
            SvmModel::Kernel {
                support_vectors,
                dual_coefficients,
                intercepts,
                n_support,
                ..
            } => {
                let starts = n_support
                    .iter()
                    .scan(0i64, |offset, n| {
                        let start = *offset;
                        *offset += *n as i64;
                        Some(start)
                    })
                    .collect();
                vec![
                    DataArray::matrix("vectors", support_vectors),
                    DataArray::matrix("coefficients", dual_coefficients),
                    DataArray::doubles("intercepts", intercepts.clone()),
                    DataArray::ints("starts", starts),
                    DataArray::ints("counts", n_support.iter().map(|n| *n as i64).collect()),
                ]
            }
        }
    }

    fn emit_body(&self, e: &mut Emitter<'_>) -> Result<()> {
        match &self.params.model {
            SvmModel::Linear { coefficients, .. } => self.emit_linear(e, coefficients.len()),
            SvmModel::Kernel {
                support_vectors,
                kernel,
                ..
            } => self.emit_kernel(e, support_vectors.len(), *kernel),
        }
    }
}
