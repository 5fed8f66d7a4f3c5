use serde::{Serialize, Deserialize};

use crate::error::{NetworkError, Result};

/// Hyperparameters used by `NeuralNetwork::train`.
///
/// # Fields
/// - `epochs`        — full passes over the training data per `train` call
/// - `learning_rate` — step size η of the weight update `Δw = η · δ · x`
/// - `shuffle`       — visit the examples in a fresh random order every epoch;
///                     when `false` the caller's order is kept exactly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub shuffle: bool,
}

impl TrainConfig {
    pub fn new(epochs: usize, learning_rate: f64) -> Self {
        TrainConfig {
            epochs,
            learning_rate,
            shuffle: false,
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Rejects learning rates that are not finite and positive.
    pub fn validate(&self) -> Result<()> {
        let lr = self.learning_rate;
        if !lr.is_finite() || lr <= 0.0 {
            return Err(NetworkError::config(format!(
                "learning_rate must be a positive number, got {}",
                lr
            )));
        }
        Ok(())
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(1, 0.8)
    }
}
