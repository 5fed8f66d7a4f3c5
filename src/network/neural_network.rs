use std::fmt;

use crate::error::Result;

/// What callers need from a trainable network.
///
/// `Display` gives a human-readable dump of the structure and weights, meant
/// for diagnostics only.
pub trait NeuralNetwork: fmt::Display {
    /// Forward pass. Fails with `DimensionMismatch` when `input` does not
    /// match the input width; never changes the weights.
    fn run(&mut self, input: &[f64]) -> Result<Vec<f64>>;

    /// Trains on `(inputs[i], targets[i])` pairs, continuing from the current
    /// weights. Shapes are checked before any weight changes.
    fn train(&mut self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<()>;
}
