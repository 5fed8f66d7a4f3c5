use std::fmt;
use std::sync::mpsc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{NetworkError, Result};
use crate::layers::layer::{Layer, LayerKind};
use crate::loss::mse::MseLoss;
use crate::network::neural_network::NeuralNetwork;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainConfig;

/// Feedforward network made of an input layer, any number of inner layers and
/// an output layer, trained by backpropagation with online gradient descent.
///
/// The topology is fixed at construction; only the weights change afterwards.
#[derive(Debug, Clone)]
pub struct NeuronBasedNeuralNetwork {
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
    config: TrainConfig,
    rng: StdRng,
}

impl NeuronBasedNeuralNetwork {
    /// Builds a network with default training settings and entropy-seeded weights.
    ///
    /// `layer_sizes[0]` is the input width and the last entry the output width.
    pub fn new(layer_sizes: &[usize]) -> Result<NeuronBasedNeuralNetwork> {
        NeuronBasedNeuralNetwork::with_rng(layer_sizes, TrainConfig::default(), StdRng::from_entropy())
    }

    pub fn with_config(layer_sizes: &[usize], config: TrainConfig) -> Result<NeuronBasedNeuralNetwork> {
        NeuronBasedNeuralNetwork::with_rng(layer_sizes, config, StdRng::from_entropy())
    }

    /// Same as `with_config`, but weight initialisation and shuffling are
    /// reproducible for a given seed.
    pub fn seeded(layer_sizes: &[usize], config: TrainConfig, seed: u64) -> Result<NeuronBasedNeuralNetwork> {
        NeuronBasedNeuralNetwork::with_rng(layer_sizes, config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(
        layer_sizes: &[usize],
        config: TrainConfig,
        mut rng: StdRng,
    ) -> Result<NeuronBasedNeuralNetwork> {
        validate_layer_sizes(layer_sizes)?;
        config.validate()?;

        let last = layer_sizes.len() - 1;
        let mut layers = Vec::with_capacity(layer_sizes.len());
        layers.push(Layer::input(layer_sizes[0])?);
        for l in 1..=last {
            let kind = if l == last { LayerKind::Output } else { LayerKind::Inner };
            layers.push(Layer::new(kind, layer_sizes[l], layer_sizes[l - 1], &mut rng)?);
        }

        debug!(?layer_sizes, "built network");
        Ok(NeuronBasedNeuralNetwork {
            layer_sizes: layer_sizes.to_vec(),
            layers,
            config,
            rng,
        })
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn nbr_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// # Panics
    /// Panics if `index >= nbr_layers()`.
    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    /// Mutable access for setting weights by hand. Layer sizes cannot change
    /// through this handle.
    pub fn layer_mut(&mut self, index: usize) -> &mut Layer {
        &mut self.layers[index]
    }

    pub fn input_width(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn output_width(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TrainConfig {
        &mut self.config
    }

    /// Feeds `input` through every layer in order.
    fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let mut current = input.to_vec();
        for layer in &mut self.layers {
            layer.feed(&current)?;
            current = layer.output();
        }
        Ok(current)
    }

    /// Error terms of every layer for the last forward pass, index-aligned
    /// with `layers()`. The input layer has no weights and gets an empty row.
    ///
    /// Must run before any weights change so the inner terms see the weights
    /// that produced the output.
    pub fn error_terms(&self, target: &[f64]) -> Result<Vec<Vec<f64>>> {
        if target.len() != self.output_width() {
            return Err(NetworkError::dimension(
                self.output_width(),
                target.len(),
                "target",
            ));
        }
        let last = self.layers.len() - 1;
        let mut deltas = vec![Vec::new(); self.layers.len()];
        deltas[last] = self.layers[last].output_deltas(target)?;
        for l in (1..last).rev() {
            deltas[l] = self.layers[l].hidden_deltas(&self.layers[l + 1], &deltas[l + 1])?;
        }
        Ok(deltas)
    }

    /// One forward pass, one backward pass and one weight update for a single
    /// example. Returns the squared error measured before the update.
    pub fn train_example(&mut self, input: &[f64], target: &[f64], optimizer: &Sgd) -> Result<f64> {
        self.check_example(input, target, 0)?;

        let output = self.forward(input)?;
        let loss = MseLoss::loss(&output, target);

        let deltas = self.error_terms(target)?;
        for l in (1..self.layers.len()).rev() {
            optimizer.step(&mut self.layers[l], &deltas[l])?;
        }
        Ok(loss)
    }

    /// Like `train`, also streaming per-epoch stats into `progress_tx`.
    /// Returns the mean loss of the last completed epoch.
    pub fn train_with_progress(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        progress_tx: &mpsc::Sender<EpochStats>,
    ) -> Result<f64> {
        train_loop(self, inputs, targets, Some(progress_tx))
    }

    /// Mean squared error over a dataset, without touching the weights.
    pub fn evaluate(&mut self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<f64> {
        self.check_dataset(inputs, targets)?;
        let outputs = inputs
            .iter()
            .map(|input| self.forward(input))
            .collect::<Result<Vec<_>>>()?;
        Ok(MseLoss::mean_over(&outputs, targets))
    }

    /// Checks row counts and every row width against the topology.
    pub fn check_dataset(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<()> {
        if inputs.len() != targets.len() {
            return Err(NetworkError::dimension(
                inputs.len(),
                targets.len(),
                "target row count",
            ));
        }
        for (row, (input, target)) in inputs.iter().zip(targets).enumerate() {
            self.check_example(input, target, row)?;
        }
        Ok(())
    }

    fn check_example(&self, input: &[f64], target: &[f64], row: usize) -> Result<()> {
        if input.len() != self.input_width() {
            return Err(NetworkError::dimension(
                self.input_width(),
                input.len(),
                format!("input row {}", row),
            ));
        }
        if target.len() != self.output_width() {
            return Err(NetworkError::dimension(
                self.output_width(),
                target.len(),
                format!("target row {}", row),
            ));
        }
        Ok(())
    }

    pub(crate) fn shuffle(&mut self, order: &mut [usize]) {
        order.shuffle(&mut self.rng);
    }
}

/// A topology needs at least an input and an output layer, none of them empty.
pub fn validate_layer_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(NetworkError::construction(format!(
            "need at least 2 layer sizes, got {}",
            layer_sizes.len()
        )));
    }
    if let Some(l) = layer_sizes.iter().position(|&size| size == 0) {
        return Err(NetworkError::construction(format!(
            "layer {} has no neurons",
            l
        )));
    }
    Ok(())
}

impl NeuralNetwork for NeuronBasedNeuralNetwork {
    fn run(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_width() {
            return Err(NetworkError::dimension(
                self.input_width(),
                input.len(),
                "network input",
            ));
        }
        self.forward(input)
    }

    fn train(&mut self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<()> {
        train_loop(self, inputs, targets, None).map(|_| ())
    }
}

impl fmt::Display for NeuronBasedNeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "==Network== {} layers {:?}", self.layers.len(), self.layer_sizes)?;
        for (l, layer) in self.layers.iter().enumerate() {
            write!(f, "\nlayer {}: {}", l, layer)?;
        }
        Ok(())
    }
}
