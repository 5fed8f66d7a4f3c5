use std::fmt;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;

/// Role of a neuron inside the network. The role decides how the accumulated
/// input turns into an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeuronKind {
    /// Passes the externally supplied value through untouched.
    Input,
    /// Always outputs 1.0; never linked to from the previous layer.
    Bias,
    Inner,
    Output,
}

impl NeuronKind {
    pub fn activation(&self) -> ActivationFunction {
        match self {
            NeuronKind::Input | NeuronKind::Bias => ActivationFunction::Identity,
            NeuronKind::Inner | NeuronKind::Output => ActivationFunction::Sigmoid,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            NeuronKind::Input => "inpN",
            NeuronKind::Bias => "B",
            NeuronKind::Inner => "innN",
            NeuronKind::Output => "outN",
        }
    }
}

/// One unit of a layer.
///
/// The neuron only carries the per-example state (its accumulated raw input).
/// Its incoming weights live in the owning layer's weight matrix, row `i` for
/// the neuron at index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    kind: NeuronKind,
    input: f64,
}

impl Neuron {
    pub fn new(kind: NeuronKind) -> Neuron {
        Neuron { kind, input: 0.0 }
    }

    pub fn bias() -> Neuron {
        Neuron::new(NeuronKind::Bias)
    }

    pub fn kind(&self) -> NeuronKind {
        self.kind
    }

    /// Clears the accumulator before a new forward pass.
    pub fn reset(&mut self) {
        self.input = 0.0;
    }

    /// Adds one term of the weighted sum.
    pub fn input(&mut self, x: f64) {
        self.input += x;
    }

    /// Raw accumulated input, before activation.
    pub fn raw_input(&self) -> f64 {
        self.input
    }

    pub fn output(&self) -> f64 {
        match self.kind {
            NeuronKind::Bias => 1.0,
            kind => kind.activation().function(self.input),
        }
    }

    /// Contribution of this neuron along a link carrying `weight`.
    pub fn output_to(&self, weight: f64) -> f64 {
        self.output() * weight
    }

    /// Slope of the activation at the current output, `o · (1 - o)` for
    /// sigmoid neurons.
    pub fn derivative(&self) -> f64 {
        self.kind.activation().derivative_from_output(self.output())
    }
}

impl fmt::Display for Neuron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.6})", self.kind.tag(), self.output())
    }
}
