use super::{emit_add, emit_scores, feature, Generator};
use crate::emit::Emitter;
use crate::error::Result;
use crate::model::{DecisionTreeParameters, Family, Task, Tree};
use crate::pack::{DataArray, Method, NumberKind, PackagingMode};

/// What a tree does once it reaches a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Leaf {
    /// Store the leaf class or value in `result`.
    Assign,
    /// Add one vote (or the tree weight) for the leaf class to `votes`.
    Vote,
    /// Add the normalized leaf distribution, scaled by the tree weight, to
    /// `proba`.
    Accumulate,
    /// Add the leaf value to `total`.
    Sum,
}

/// One tree's contribution to a prediction body. Shared by the single-tree
/// and ensemble generators; `prefix` keeps member array names apart.
pub(crate) struct TreeFragment<'p> {
    pub tree: &'p Tree,
    pub task: Task,
    pub prefix: String,
    pub leaf: Leaf,
    pub weight: Option<f64>,
}

impl TreeFragment<'_> {
    fn name(&self, base: &str) -> String {
        format!("{}{}", self.prefix, base)
    }

    fn distribution(&self, node: usize) -> Vec<f64> {
        let distribution = self.tree.leaf_distribution(node);
        match self.weight {
            Some(w) => distribution.into_iter().map(|p| p * w).collect(),
            None => distribution,
        }
    }

    fn vote(&self, e: &Emitter<'_>) -> Result<String> {
        match self.weight {
            Some(w) => e.term(w),
            None => Ok("1".to_string()),
        }
    }

    /// Hoisted node arrays for the traversal loop.
    pub fn arrays(&self, mode: PackagingMode) -> Vec<DataArray> {
        if mode == PackagingMode::Embedded {
            return Vec::new();
        }
        let t = self.tree;
        let mut arrays = vec![
            DataArray::ints(&self.name("lefts"), t.left.clone()),
            DataArray::ints(&self.name("rights"), t.right.clone()),
            DataArray::ints(&self.name("indices"), t.feature.clone()),
            DataArray::doubles(&self.name("thresholds"), t.threshold.clone()),
        ];
        let nodes = 0..t.n_nodes();
        arrays.push(match (self.leaf, self.task) {
            (Leaf::Accumulate, _) => {
                let rows: Vec<Vec<f64>> = nodes
                    .map(|n| {
                        if t.is_leaf(n) {
                            self.distribution(n)
                        } else {
                            vec![0.0; t.value[n].len()]
                        }
                    })
                    .collect();
                DataArray::matrix(&self.name("values"), &rows)
            }
            (_, Task::Classification { .. }) => DataArray::ints(
                &self.name("classes"),
                nodes.map(|n| t.leaf_class(n) as i64).collect(),
            ),
            (_, Task::Regression) => {
                DataArray::doubles(&self.name("values"), nodes.map(|n| t.value[n][0]).collect())
            }
        });
        arrays
    }

    /// Emit the fragment. Traversal modes expect `node` to be declared and
    /// reset to zero by the caller.
    pub fn emit(&self, e: &mut Emitter<'_>) -> Result<()> {
        match e.mode() {
            PackagingMode::Embedded => self.emit_node(e, 0),
            PackagingMode::Split | PackagingMode::Externalized => self.emit_traversal(e),
        }
    }

    /// Pre-order nested conditionals with inline literals.
    fn emit_node(&self, e: &mut Emitter<'_>, node: usize) -> Result<()> {
        let t = self.tree;
        if t.is_leaf(node) {
            return self.emit_leaf(e, node);
        }
        let index = e.int(t.feature[node])?;
        let x = feature(e, &index)?;
        let threshold = e.double(t.threshold[node])?;
        e.if_(&x, "<=", &threshold)?;
        self.emit_node(e, t.left[node] as usize)?;
        e.else_()?;
        self.emit_node(e, t.right[node] as usize)?;
        e.end_if()
    }

    fn emit_leaf(&self, e: &mut Emitter<'_>, node: usize) -> Result<()> {
        let t = self.tree;
        match (self.leaf, self.task) {
            (Leaf::Assign, Task::Classification { .. }) => {
                let result = e.var("result")?;
                e.set(&result, &e.count(t.leaf_class(node))?)
            }
            (Leaf::Assign, Task::Regression) => {
                let result = e.var("result")?;
                e.set(&result, &e.double(t.value[node][0])?)
            }
            (Leaf::Vote, _) => {
                let votes = e.var("votes")?;
                let slot = e.at(&votes, &e.count(t.leaf_class(node))?)?;
                emit_add(e, &slot, &self.vote(e)?)
            }
            (Leaf::Accumulate, _) => {
                let proba = e.var("proba")?;
                for (c, p) in self.distribution(node).into_iter().enumerate() {
                    if p == 0.0 {
                        continue;
                    }
                    let slot = e.at(&proba, &e.count(c)?)?;
                    emit_add(e, &slot, &e.term(p)?)?;
                }
                Ok(())
            }
            (Leaf::Sum, _) => {
                let total = e.var("total")?;
                emit_add(e, &total, &e.term(t.value[node][0])?)
            }
        }
    }

    /// Walk the hoisted arrays until a leaf, then apply the leaf action
    /// through `node`.
    fn emit_traversal(&self, e: &mut Emitter<'_>) -> Result<()> {
        let node = e.var("node")?;
        let lefts = e.data(&self.name("lefts"))?;
        let rights = e.data(&self.name("rights"))?;
        let indices = e.data(&self.name("indices"))?;
        let thresholds = e.data(&self.name("thresholds"))?;

        let left = e.at(&lefts, &node)?;
        let leaf = e.int(Tree::LEAF)?;
        e.while_(&left, "!=", &leaf)?;
        let x = feature(e, &e.at(&indices, &node)?)?;
        e.if_(&x, "<=", &e.at(&thresholds, &node)?)?;
        e.set(&node, &left)?;
        e.else_()?;
        e.set(&node, &e.at(&rights, &node)?)?;
        e.end_if()?;
        e.end_while()?;

        match (self.leaf, self.task) {
            (Leaf::Assign, Task::Classification { .. }) => {
                let classes = e.data(&self.name("classes"))?;
                e.set(&e.var("result")?, &e.at(&classes, &node)?)
            }
            (Leaf::Assign, Task::Regression) | (Leaf::Sum, _) => {
                let values = e.data(&self.name("values"))?;
                let target = if self.leaf == Leaf::Sum { "total" } else { "result" };
                let target = e.var(target)?;
                let value = e.at(&values, &node)?;
                if self.leaf == Leaf::Sum {
                    emit_add(e, &target, &value)
                } else {
                    e.set(&target, &value)
                }
            }
            (Leaf::Vote, _) => {
                let classes = e.data(&self.name("classes"))?;
                let slot = e.at(&e.var("votes")?, &e.at(&classes, &node)?)?;
                emit_add(e, &slot, &self.vote(e)?)
            }
            (Leaf::Accumulate, task) => {
                let values = e.data(&self.name("values"))?;
                let proba = e.var("proba")?;
                let c = e.var("c")?;
                e.for_n("c", 0, task.n_classes().unwrap_or(1))?;
                let slot = e.at(&proba, &c)?;
                emit_add(e, &slot, &e.at2(&values, &node, &c)?)?;
                e.end_for()
            }
        }
    }
}

/// A single decision tree: the leaf stores its class or value in `result`.
pub struct DecisionTreeGenerator<'p> {
    params: &'p DecisionTreeParameters,
}

impl<'p> DecisionTreeGenerator<'p> {
    pub fn new(params: &'p DecisionTreeParameters) -> Self {
        Self { params }
    }

    fn fragment(&self, method: Method) -> TreeFragment<'p> {
        let leaf = match method {
            Method::Predict => Leaf::Assign,
            Method::PredictProba => Leaf::Accumulate,
        };
        TreeFragment {
            tree: &self.params.tree,
            task: self.params.task,
            prefix: String::new(),
            leaf,
            weight: None,
        }
    }
}

impl Generator for DecisionTreeGenerator<'_> {
    fn family(&self) -> Family {
        Family::DecisionTree
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

    fn arrays(&self, mode: PackagingMode, method: Method) -> Vec<DataArray> {
        self.fragment(method).arrays(mode)
    }

    fn emit_body(&self, e: &mut Emitter<'_>) -> Result<()> {
        if let (Method::PredictProba, Some(n_classes)) = (e.method(), self.probabilities()) {
            emit_scores(e, "proba", NumberKind::Double, n_classes)?;
            if e.mode() != PackagingMode::Embedded {
                e.init_int("node", 0)?;
            }
            self.fragment(Method::PredictProba).emit(e)?;
            let proba = e.var("proba")?;
            return e.ret(&proba);
        }
        match self.output() {
            NumberKind::Int => e.init_int("result", 0)?,
            NumberKind::Double => e.init_double("result", 0.0)?,
        }
        if e.mode() != PackagingMode::Embedded {
            e.init_int("node", 0)?;
        }
        self.fragment(Method::Predict).emit(e)?;
        let result = e.var("result")?;
        e.ret(&result)
    }
}
