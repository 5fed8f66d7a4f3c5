pub mod config;
pub mod network;
pub mod neural_network;

pub use config::NetworkConfig;
pub use network::NeuronBasedNeuralNetwork;
pub use neural_network::NeuralNetwork;
