use super::{emit_add, emit_argmax, emit_softmax, Generator, FEATURES};
use crate::emit::Emitter;
use crate::error::Result;
use crate::model::{Activation, Family, Layer, MlpParameters, Task};
use crate::pack::{DataArray, Method, NumberKind, PackagingMode};

/// Dense layers in order; layer `l` writes its units to `hidden_l`.
pub struct MlpGenerator<'p> {
    params: &'p MlpParameters,
}

impl<'p> MlpGenerator<'p> {
    pub fn new(params: &'p MlpParameters) -> Self {
        Self { params }
    }

    fn emit_layer(&self, e: &mut Emitter<'_>, l: usize, layer: &Layer, input: &str) -> Result<String> {
        let weights = e.data(&format!("weights_{}", l))?;
        let bias = e.data(&format!("bias_{}", l))?;
        let name = format!("hidden_{}", l);
        let (i, j) = (e.var("i")?, e.var("j")?);

        e.zeros(&name, NumberKind::Double, layer.n_outputs())?;
        let hidden = e.var(&name)?;
        e.for_n("j", 0, layer.n_outputs())?;
        e.init("acc", NumberKind::Double, &e.at(&bias, &j)?)?;
        let acc = e.var("acc")?;
        e.for_n("i", 0, layer.n_inputs())?;
        let w = e.at2(&weights, &i, &j)?;
        emit_add(e, &acc, &format!("{} * {}", e.at(input, &i)?, w))?;
        e.end_for()?;
        let unit = e.at(&hidden, &j)?;
        match layer.activation {
            Activation::Relu => {
                let zero = e.exact(0.0)?;
                e.if_(&acc, "<", &zero)?;
                e.set(&acc, &zero)?;
                e.end_if()?;
                e.set(&unit, &acc)?;
            }
            Activation::Logistic => {
                let one = e.exact(1.0)?;
                let exp = e.call("exp", &format!("-{}", acc))?;
                e.set(&unit, &format!("{} / ({} + {})", one, one, exp))?;
            }
            Activation::Tanh => e.set(&unit, &e.call("tanh", &acc)?)?,
            Activation::Identity | Activation::Softmax => e.set(&unit, &acc)?,
        }
        e.end_for()?;

        if layer.activation == Activation::Softmax {
            emit_softmax(e, &hidden, &hidden, layer.n_outputs(), &format!("_{}", l))?;
        }
        Ok(hidden)
    }

    /// Copy the output layer into the returned array. A single logistic
    /// unit is the positive class; the negative class gets the complement.
    fn emit_proba(&self, e: &mut Emitter<'_>, output: &str, n_outputs: usize, n_classes: usize) -> Result<()> {
        e.result("proba", n_classes)?;
        let proba = e.var("proba")?;
        if n_outputs == 1 {
            let positive = e.at(output, "0")?;
            e.set(&e.at(&proba, "1")?, &positive)?;
            e.set(&e.at(&proba, "0")?, &format!("{} - {}", e.exact(1.0)?, positive))?;
        } else {
            let j = e.var("j")?;
            e.for_n("j", 0, n_outputs)?;
            e.set(&e.at(&proba, &j)?, &e.at(output, &j)?)?;
            e.end_for()?;
        }
        e.ret(&proba)
    }
}

impl Generator for MlpGenerator<'_> {
    fn family(&self) -> Family {
        Family::Mlp
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
        self.params
            .layers
            .iter()
            .enumerate()
            .flat_map(|(l, layer)| {
                [
                    DataArray::matrix(&format!("weights_{}", l), &layer.weights),
                    DataArray::doubles(&format!("bias_{}", l), layer.bias.clone()),
                ]
            })
            .collect()
    }

    fn emit_body(&self, e: &mut Emitter<'_>) -> Result<()> {
        let mut input = e.var(FEATURES)?;
        for (l, layer) in self.params.layers.iter().enumerate() {
            input = self.emit_layer(e, l, layer, &input)?;
        }
        let n_outputs = self.params.layers.last().map_or(1, |layer| layer.n_outputs());
        if let (Method::PredictProba, Some(n_classes)) = (e.method(), self.probabilities()) {
            return self.emit_proba(e, &input, n_outputs, n_classes);
        }
        match self.params.task {
            Task::Regression => e.ret(&e.at(&input, "0")?),
            Task::Classification { .. } if n_outputs == 1 => {
                e.init_int("label", 0)?;
                let label = e.var("label")?;
                e.if_(&e.at(&input, "0")?, ">", &e.exact(0.5)?)?;
                e.set(&label, "1")?;
                e.end_if()?;
                e.ret(&label)
            }
            Task::Classification { .. } => emit_argmax(e, &input, n_outputs),
        }
    }
}
