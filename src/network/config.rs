use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::network::network::{validate_layer_sizes, NeuronBasedNeuralNetwork};
use crate::train::train_config::TrainConfig;

/// A serializable description of a network: topology, training settings and
/// an optional seed.
///
/// Only the architecture is stored, never trained weights. Saving a config
/// and building from it later gives a fresh network with the same shape (and,
/// with a seed, the same initial weights).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Human-readable name, used in logs and as the file stem by callers.
    pub name: String,
    /// Layer widths, input first, output last.
    pub layer_sizes: Vec<usize>,
    #[serde(default)]
    pub train: TrainConfig,
    /// Seed for weight initialisation and shuffling; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkConfig {
    pub fn new(name: impl Into<String>, layer_sizes: Vec<usize>) -> NetworkConfig {
        NetworkConfig {
            name: name.into(),
            layer_sizes,
            train: TrainConfig::default(),
            seed: None,
        }
    }

    /// Checks the topology and the training settings.
    pub fn validate(&self) -> Result<()> {
        validate_layer_sizes(&self.layer_sizes)?;
        self.train.validate()
    }

    /// Builds a fresh network from this description.
    pub fn build(&self) -> Result<NeuronBasedNeuralNetwork> {
        self.validate()?;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        NeuronBasedNeuralNetwork::with_rng(&self.layer_sizes, self.train, rng)
    }

    pub fn from_json(json: &str) -> Result<NetworkConfig> {
        let config: NetworkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a config previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkConfig> {
        let json = std::fs::read_to_string(path)?;
        NetworkConfig::from_json(&json)
    }
}
