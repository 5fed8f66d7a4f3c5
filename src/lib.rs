pub mod error;
pub mod math;
pub mod activation;
pub mod neuron;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{NetworkError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use neuron::neuron::{Neuron, NeuronKind};
pub use layers::layer::{Layer, LayerKind};
pub use network::config::NetworkConfig;
pub use network::network::NeuronBasedNeuralNetwork;
pub use network::neural_network::NeuralNetwork;
pub use loss::mse::MseLoss;
pub use optim::sgd::Sgd;
pub use train::{train_epoch, train_loop, EpochStats, TrainConfig};
