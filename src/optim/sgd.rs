use crate::error::Result;
use crate::layers::layer::Layer;

/// Plain gradient descent: every weight moves by `η · δ · x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update to `layer` from its error terms and the input it saw
    /// during the forward pass.
    pub fn step(&self, layer: &mut Layer, deltas: &[f64]) -> Result<()> {
        let lr = self.learning_rate;
        let update = layer.weight_gradient(deltas).map(|g| g * lr);
        layer.update_weights(&update)
    }
}
