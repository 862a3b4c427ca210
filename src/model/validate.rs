use super::*;

const TREE: &str = "decision tree";
const ENSEMBLE: &str = "tree ensemble";
const SVM: &str = "support vector machine";
const KNN: &str = "k-nearest-neighbors";
const BAYES: &str = "naive Bayes";
const MLP: &str = "multilayer perceptron";

// ─── Shared checks ─────────────────────────────────────────────────

fn finite(path: &str, values: &[f64]) -> Result<()> {
    for (i, v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(PortError::malformed(
                format!("{}[{}]", path, i),
                format!("value {} is not finite", v),
            ));
        }
    }
    Ok(())
}

fn finite_scalar(path: &str, v: f64) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(PortError::malformed(path, format!("value {} is not finite", v)))
    }
}

/// Check a rectangular matrix with `cols` columns and finite entries.
fn matrix(path: &str, rows: &[Vec<f64>], cols: usize) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(PortError::malformed(
                format!("{}[{}]", path, i),
                format!("expected {} columns, found {}", cols, row.len()),
            ));
        }
        finite(&format!("{}[{}]", path, i), row)?;
    }
    Ok(())
}

fn length(path: &str, found: usize, expected: usize) -> Result<()> {
    if found != expected {
        return Err(PortError::malformed(
            path,
            format!("expected {} entries, found {}", expected, found),
        ));
    }
    Ok(())
}

fn features(family: &str, n_features: usize) -> Result<()> {
    if n_features == 0 {
        return Err(PortError::not_fitted(family, "n_features is zero"));
    }
    Ok(())
}

fn classes(family: &str, task: Task) -> Result<()> {
    if let Task::Classification { n_classes } = task {
        if n_classes < 2 {
            return Err(PortError::not_fitted(
                family,
                format!("classification needs at least 2 classes, found {}", n_classes),
            ));
        }
    }
    Ok(())
}

// ─── Trees ─────────────────────────────────────────────────────────

/// Validate one tree. `path` prefixes error locations, e.g. `trees[3]`.
pub(crate) fn tree(family: &str, path: &str, t: &Tree, n_features: usize, task: Task) -> Result<()> {
    let n = t.n_nodes();
    if n == 0 {
        return Err(PortError::not_fitted(family, format!("{} has no nodes", path)));
    }
    length(&format!("{}.right", path), t.right.len(), n)?;
    length(&format!("{}.feature", path), t.feature.len(), n)?;
    length(&format!("{}.threshold", path), t.threshold.len(), n)?;
    length(&format!("{}.value", path), t.value.len(), n)?;
    finite(&format!("{}.threshold", path), &t.threshold)?;

    let width = match task {
        Task::Classification { n_classes } => n_classes,
        Task::Regression => 1,
    };
    matrix(&format!("{}.value", path), &t.value, width)?;

    let mut parents = vec![0usize; n];
    for node in 0..n {
        let (l, r) = (t.left[node], t.right[node]);
        if l == Tree::LEAF || r == Tree::LEAF {
            if l != r {
                return Err(PortError::malformed(
                    format!("{}.left[{}]", path, node),
                    "a node must have both children or none",
                ));
            }
            if width > 1 && t.value[node].iter().sum::<f64>() <= 0.0 {
                return Err(PortError::malformed(
                    format!("{}.value[{}]", path, node),
                    "leaf class distribution must have a positive total",
                ));
            }
            continue;
        }
        for (side, child) in [("left", l), ("right", r)] {
            // Pre-order ids: children always come after their parent.
            if child <= node as i64 || child >= n as i64 {
                return Err(PortError::malformed(
                    format!("{}.{}[{}]", path, side, node),
                    format!("child {} out of range {}..{}", child, node + 1, n),
                ));
            }
            parents[child as usize] += 1;
        }
        let f = t.feature[node];
        if f < 0 || f >= n_features as i64 {
            return Err(PortError::malformed(
                format!("{}.feature[{}]", path, node),
                format!("feature {} out of range 0..{}", f, n_features),
            ));
        }
    }
    if let Some(orphan) = (1..n).find(|&i| parents[i] != 1) {
        return Err(PortError::malformed(
            format!("{}.left", path),
            format!("node {} has {} parents", orphan, parents[orphan]),
        ));
    }
    Ok(())
}

impl DecisionTreeParameters {
    pub fn validate(&self) -> Result<()> {
        features(TREE, self.n_features)?;
        classes(TREE, self.task)?;
        tree(TREE, "tree", &self.tree, self.n_features, self.task)
    }
}

impl EnsembleParameters {
    pub fn validate(&self) -> Result<()> {
        features(ENSEMBLE, self.n_features)?;
        classes(ENSEMBLE, self.task)?;
        if self.trees.is_empty() {
            return Err(PortError::not_fitted(ENSEMBLE, "ensemble has no trees"));
        }
        let fits = match self.combination {
            Combination::Mean => self.task == Task::Regression,
            Combination::MajorityVote
            | Combination::ProbabilityAverage
            | Combination::WeightedVote
            | Combination::WeightedProbability => self.task != Task::Regression,
        };
        if !fits {
            return Err(PortError::malformed(
                "combination",
                format!("{:?} does not apply to {:?}", self.combination, self.task),
            ));
        }
        match (&self.weights, self.combination.is_weighted()) {
            (None, true) => {
                return Err(PortError::malformed(
                    "weights",
                    format!("{:?} needs one weight per tree", self.combination),
                ))
            }
            (Some(_), false) => {
                return Err(PortError::malformed(
                    "weights",
                    format!("{:?} does not use tree weights", self.combination),
                ))
            }
            (Some(weights), true) => {
                length("weights", weights.len(), self.trees.len())?;
                finite("weights", weights)?;
                if let Some(i) = weights.iter().position(|w| *w < 0.0) {
                    return Err(PortError::malformed(
                        format!("weights[{}]", i),
                        "tree weight must not be negative",
                    ));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err(PortError::not_fitted(ENSEMBLE, "tree weights sum to zero"));
                }
            }
            (None, false) => {}
        }
        for (i, t) in self.trees.iter().enumerate() {
            tree(ENSEMBLE, &format!("trees[{}]", i), t, self.n_features, self.task)?;
        }
        Ok(())
    }
}

// ─── SVM ───────────────────────────────────────────────────────────

fn kernel(k: &Kernel) -> Result<()> {
    match *k {
        Kernel::Linear => Ok(()),
        Kernel::Poly { gamma, coef0, degree } => {
            finite_scalar("kernel.gamma", gamma)?;
            finite_scalar("kernel.coef0", coef0)?;
            finite_scalar("kernel.degree", degree)
        }
        Kernel::Rbf { gamma } => finite_scalar("kernel.gamma", gamma),
        Kernel::Sigmoid { gamma, coef0 } => {
            finite_scalar("kernel.gamma", gamma)?;
            finite_scalar("kernel.coef0", coef0)
        }
    }
}

impl SvmParameters {
    pub fn validate(&self) -> Result<()> {
        features(SVM, self.n_features)?;
        match &self.model {
            SvmModel::Linear {
                coefficients,
                intercepts,
            } => {
                if coefficients.is_empty() {
                    return Err(PortError::not_fitted(SVM, "no coefficient rows"));
                }
                matrix("coefficients", coefficients, self.n_features)?;
                length("intercepts", intercepts.len(), coefficients.len())?;
                finite("intercepts", intercepts)
            }
            SvmModel::Kernel {
                support_vectors,
                dual_coefficients,
                intercepts,
                n_support,
                kernel: k,
            } => {
                if support_vectors.is_empty() {
                    return Err(PortError::not_fitted(SVM, "no support vectors"));
                }
                let n_classes = n_support.len();
                if n_classes < 2 {
                    return Err(PortError::not_fitted(
                        SVM,
                        format!("at least 2 classes needed, found {}", n_classes),
                    ));
                }
                matrix("support_vectors", support_vectors, self.n_features)?;
                length(
                    "n_support",
                    n_support.iter().sum(),
                    support_vectors.len(),
                )?;
                length("dual_coefficients", dual_coefficients.len(), n_classes - 1)?;
                matrix("dual_coefficients", dual_coefficients, support_vectors.len())?;
                length("intercepts", intercepts.len(), n_classes * (n_classes - 1) / 2)?;
                finite("intercepts", intercepts)?;
                kernel(k)
            }
        }
    }
}

// ─── KNN ───────────────────────────────────────────────────────────

impl KnnParameters {
    pub fn validate(&self) -> Result<()> {
        features(KNN, self.n_features)?;
        classes(KNN, self.task)?;
        if self.samples.is_empty() {
            return Err(PortError::not_fitted(KNN, "no training rows"));
        }
        if self.k == 0 || self.k > self.samples.len() {
            return Err(PortError::malformed(
                "k",
                format!("k must be within 1..={}, got {}", self.samples.len(), self.k),
            ));
        }
        matrix("samples", &self.samples, self.n_features)?;
        length("targets", self.targets.len(), self.samples.len())?;
        finite("targets", &self.targets)?;
        if let Task::Classification { n_classes } = self.task {
            for (i, t) in self.targets.iter().enumerate() {
                if t.fract() != 0.0 || *t < 0.0 || *t >= n_classes as f64 {
                    return Err(PortError::malformed(
                        format!("targets[{}]", i),
                        format!("{} is not a class index below {}", t, n_classes),
                    ));
                }
            }
        }
        if let Metric::Minkowski { p } = self.metric {
            finite_scalar("metric.p", p)?;
            if p < 1.0 {
                return Err(PortError::malformed("metric.p", "p must be at least 1"));
            }
        }
        Ok(())
    }
}

// ─── Naive Bayes ───────────────────────────────────────────────────

fn open_unit(path: &str, rows: &[Vec<f64>]) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        for (j, p) in row.iter().enumerate() {
            if !(*p > 0.0 && *p < 1.0) {
                return Err(PortError::malformed(
                    format!("{}[{}][{}]", path, i, j),
                    format!("probability {} must lie strictly between 0 and 1", p),
                ));
            }
        }
    }
    Ok(())
}

impl NaiveBayesParameters {
    pub fn validate(&self) -> Result<()> {
        features(BAYES, self.n_features)?;
        let priors = self.priors();
        if priors.len() < 2 {
            return Err(PortError::not_fitted(
                BAYES,
                format!("at least 2 classes needed, found {}", priors.len()),
            ));
        }
        finite("priors", priors)?;
        if let Some(i) = priors.iter().position(|p| *p <= 0.0) {
            return Err(PortError::malformed(
                format!("priors[{}]", i),
                "class prior must be positive",
            ));
        }
        match &self.model {
            NaiveBayesModel::Gaussian {
                theta, variance, ..
            } => {
                length("theta", theta.len(), priors.len())?;
                length("variance", variance.len(), priors.len())?;
                matrix("theta", theta, self.n_features)?;
                matrix("variance", variance, self.n_features)?;
                for (i, row) in variance.iter().enumerate() {
                    if let Some(j) = row.iter().position(|v| *v <= 0.0) {
                        return Err(PortError::malformed(
                            format!("variance[{}][{}]", i, j),
                            "variance must be positive",
                        ));
                    }
                }
                Ok(())
            }
            NaiveBayesModel::Bernoulli {
                feature_probabilities,
                binarize,
                ..
            } => {
                length(
                    "feature_probabilities",
                    feature_probabilities.len(),
                    priors.len(),
                )?;
                matrix("feature_probabilities", feature_probabilities, self.n_features)?;
                open_unit("feature_probabilities", feature_probabilities)?;
                if let Some(b) = binarize {
                    finite_scalar("binarize", *b)?;
                }
                Ok(())
            }
        }
    }
}

// ─── MLP ───────────────────────────────────────────────────────────

impl MlpParameters {
    pub fn validate(&self) -> Result<()> {
        features(MLP, self.n_features)?;
        classes(MLP, self.task)?;
        if self.layers.is_empty() {
            return Err(PortError::not_fitted(MLP, "network has no layers"));
        }
        let mut width = self.n_features;
        for (l, layer) in self.layers.iter().enumerate() {
            let path = format!("layers[{}]", l);
            length(&format!("{}.weights", path), layer.n_inputs(), width)?;
            if layer.n_outputs() == 0 {
                return Err(PortError::not_fitted(MLP, format!("{} has no units", path)));
            }
            matrix(&format!("{}.weights", path), &layer.weights, layer.n_outputs())?;
            finite(&format!("{}.bias", path), &layer.bias)?;
            width = layer.n_outputs();
        }
        let last = &self.layers[self.layers.len() - 1];
        match self.task {
            Task::Regression if width != 1 => Err(PortError::malformed(
                "layers",
                format!("regression needs a single output unit, found {}", width),
            )),
            Task::Classification { .. } if width == 1 && last.activation != Activation::Logistic => {
                Err(PortError::malformed(
                    "layers",
                    "a single classification output must use the logistic activation",
                ))
            }
            Task::Classification { n_classes } if width > 1 && width != n_classes => {
                Err(PortError::malformed(
                    "layers",
                    format!("expected {} output units, found {}", n_classes, width),
                ))
            }
            Task::Classification { n_classes } if width == 1 && n_classes != 2 => {
                Err(PortError::malformed(
                    "layers",
                    "a single output unit only fits binary classification",
                ))
            }
            _ => Ok(()),
        }
    }
}
