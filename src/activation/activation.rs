use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Transfer function applied to a neuron's accumulated input.
///
/// The kind of neuron fixes which one is used: input neurons pass values
/// through unchanged, inner and output neurons squash with the logistic sigmoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    Identity,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Identity => x,
        }
    }

    /// Derivative expressed in terms of the activated output `y = f(x)`.
    ///
    /// For the sigmoid this is `y · (1 - y)`, which lets backprop reuse the
    /// outputs stored by the forward pass.
    pub fn derivative_from_output(&self, y: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => y * (1.0 - y),
            ActivationFunction::Identity => 1.0,
        }
    }
}
