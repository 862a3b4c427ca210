use super::tree::{Leaf, TreeFragment};
use super::{emit_argmax, emit_scaled_return, emit_scores, Generator};
use crate::emit::Emitter;
use crate::error::Result;
use crate::model::{Combination, EnsembleParameters, Family, Task};
use crate::pack::{DataArray, Method, NumberKind, PackagingMode};

/// Member trees emitted one after another, then combined.
///
/// Weighted combinations fold each tree's weight into its leaf action, so
/// the combined scores only need the same argmax (or one division for
/// probabilities) as their unweighted counterparts.
pub struct EnsembleGenerator<'p> {
    params: &'p EnsembleParameters,
}

impl<'p> EnsembleGenerator<'p> {
    pub fn new(params: &'p EnsembleParameters) -> Self {
        Self { params }
    }

    fn leaf(&self) -> Leaf {
        match self.params.combination {
            Combination::MajorityVote | Combination::WeightedVote => Leaf::Vote,
            Combination::ProbabilityAverage | Combination::WeightedProbability => Leaf::Accumulate,
            Combination::Mean => Leaf::Sum,
        }
    }

    /// Name of the per-class accumulator the leaves write to.
    fn scores(&self) -> &'static str {
        match self.leaf() {
            Leaf::Vote => "votes",
            Leaf::Assign | Leaf::Accumulate | Leaf::Sum => "proba",
        }
    }

    /// Plain votes are counted in integers; everything else is a double.
    fn score_kind(&self) -> NumberKind {
        match self.params.combination {
            Combination::MajorityVote => NumberKind::Int,
            _ => NumberKind::Double,
        }
    }

    fn fragments(&self) -> impl Iterator<Item = TreeFragment<'p>> {
        let leaf = self.leaf();
        let task = self.params.task;
        let params = self.params;
        let weighted = params.combination.is_weighted();
        params
            .trees
            .iter()
            .enumerate()
            .map(move |(i, tree)| TreeFragment {
                tree,
                task,
                prefix: format!("t{}_", i),
                leaf,
                weight: weighted.then(|| params.weight(i)),
            })
    }

    fn n_classes(&self) -> usize {
        self.params.task.n_classes().unwrap_or(0)
    }
}

impl Generator for EnsembleGenerator<'_> {
    fn family(&self) -> Family {
        Family::TreeEnsemble
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

    fn arrays(&self, mode: PackagingMode, _method: Method) -> Vec<DataArray> {
        self.fragments().flat_map(|f| f.arrays(mode)).collect()
    }

    fn emit_body(&self, e: &mut Emitter<'_>) -> Result<()> {
        match self.params.combination {
            Combination::Mean => e.init_double("total", 0.0)?,
            _ => emit_scores(e, self.scores(), self.score_kind(), self.n_classes())?,
        }
        let traverse = e.mode() != PackagingMode::Embedded;
        if traverse {
            e.init_int("node", 0)?;
        }
        let node = e.var("node")?;
        let zero = e.int(0)?;
        for (i, fragment) in self.fragments().enumerate() {
            if traverse && i > 0 {
                e.set(&node, &zero)?;
            }
            fragment.emit(e)?;
        }
        if self.params.combination == Combination::Mean {
            let total = e.var("total")?;
            let count = e.exact(self.params.trees.len() as f64)?;
            return e.ret(&format!("{} / {}", total, count));
        }
        let scores = e.var(self.scores())?;
        match e.method() {
            Method::PredictProba => {
                emit_scaled_return(e, &scores, self.n_classes(), self.params.divisor())
            }
            // Dividing by the tree count or weight total does not move the argmax.
            Method::Predict => emit_argmax(e, &scores, self.n_classes()),
        }
    }
}
