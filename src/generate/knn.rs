use super::{emit_add, emit_argmax, emit_scaled_return, emit_scores, feature, Generator};
use crate::emit::Emitter;
use crate::error::Result;
use crate::model::{Family, KnnParameters, Metric, Task};
use crate::pack::{DataArray, Method, NumberKind, PackagingMode};

/// Brute-force neighbors: every distance, then `k` selection passes.
///
/// Distances skip the final root (euclidean, minkowski) since it does not
/// change their order. Each pass picks the smallest unused distance, the
/// lowest training index winning ties, and marks it used with `-1`.
pub struct KnnGenerator<'p> {
    params: &'p KnnParameters,
}

impl<'p> KnnGenerator<'p> {
    pub fn new(params: &'p KnnParameters) -> Self {
        Self { params }
    }

    fn label_array(&self) -> &'static str {
        match self.params.task {
            Task::Classification { .. } => "labels",
            Task::Regression => "targets",
        }
    }
}

impl Generator for KnnGenerator<'_> {
    fn family(&self) -> Family {
        Family::KNearestNeighbors
    }

    fn output(&self) -> NumberKind {
        match self.params.task {
            Task::Classification { .. } => NumberKind::Int,
            Task::Regression => NumberKind::Double,
        }
    }

    fn validate(&self) -> Result<()> {
        self.params.validate()
    }

    fn probabilities(&self) -> Option<usize> {
        self.params.task.n_classes()
    }

    fn arrays(&self, _mode: PackagingMode, _method: Method) -> Vec<DataArray> {
        let samples = DataArray::matrix("samples", &self.params.samples);
        let labels = match self.params.task {
            Task::Classification { .. } => DataArray::ints(
                "labels",
                self.params.targets.iter().map(|t| *t as i64).collect(),
            ),
            Task::Regression => DataArray::doubles("targets", self.params.targets.clone()),
        };
        vec![samples, labels]
    }

    fn emit_body(&self, e: &mut Emitter<'_>) -> Result<()> {
        let p = self.params;
        let n = p.samples.len();
        let samples = e.data("samples")?;
        let labels = e.data(self.label_array())?;
        let (i, f) = (e.var("i")?, e.var("f")?);

        e.zeros("dists", NumberKind::Double, n)?;
        let dists = e.var("dists")?;
        e.for_n("i", 0, n)?;
        e.init_double("acc", 0.0)?;
        let acc = e.var("acc")?;
        e.for_n("f", 0, p.n_features)?;
        let diff = format!("{} - {}", e.at2(&samples, &i, &f)?, feature(e, &f)?);
        e.init("diff", NumberKind::Double, &diff)?;
        let diff = e.var("diff")?;
        let term = match p.metric {
            Metric::Euclidean => format!("{} * {}", diff, diff),
            Metric::Manhattan => e.call("abs", &diff)?,
            Metric::Minkowski { p } => e.pow(&e.call("abs", &diff)?, &e.exact(p)?)?,
        };
        emit_add(e, &acc, &term)?;
        e.end_for()?;
        e.set(&e.at(&dists, &i)?, &acc)?;
        e.end_for()?;

        let (total, votes) = (e.var("total")?, e.var("votes")?);
        match p.task {
            Task::Classification { n_classes } => emit_scores(e, "votes", NumberKind::Int, n_classes)?,
            Task::Regression => e.init_double("total", 0.0)?,
        }
        e.init_int("nearest", -1)?;
        let nearest = e.var("nearest")?;
        let none = e.int(-1)?;
        let used = e.exact(-1.0)?;
        e.for_n("s", 0, p.k)?;
        e.set(&nearest, &none)?;
        e.for_n("i", 0, n)?;
        let candidate = e.at(&dists, &i)?;
        e.if_(&candidate, ">=", &e.exact(0.0)?)?;
        e.if_(&nearest, "<", "0")?;
        e.set(&nearest, &i)?;
        e.else_()?;
        e.if_(&candidate, "<", &e.at(&dists, &nearest)?)?;
        e.set(&nearest, &i)?;
        e.end_if()?;
        e.end_if()?;
        e.end_if()?;
        e.end_for()?;
        let label = e.at(&labels, &nearest)?;
        match p.task {
            Task::Classification { .. } => emit_add(e, &e.at(&votes, &label)?, "1")?,
            Task::Regression => emit_add(e, &total, &label)?,
        }
        e.set(&e.at(&dists, &nearest)?, &used)?;
        e.end_for()?;

        match p.task {
            Task::Classification { n_classes } => match e.method() {
                Method::PredictProba => emit_scaled_return(e, &votes, n_classes, p.k as f64),
                Method::Predict => emit_argmax(e, &votes, n_classes),
            },
            Task::Regression => e.ret(&format!("{} / {}", total, e.exact(p.k as f64)?)),
        }
    }
}
