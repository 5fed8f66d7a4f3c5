use crate::{
    error::Result,
    network::network::NeuronBasedNeuralNetwork,
    optim::sgd::Sgd,
};

/// One online pass over the examples, visiting them in `order`.
///
/// Returns the mean squared error measured on each example just before its
/// own weight update.
pub fn train_epoch(
    network: &mut NeuronBasedNeuralNetwork,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    order: &[usize],
    optimizer: &Sgd,
) -> Result<f64> {
    if order.is_empty() {
        return Ok(0.0);
    }

    let mut total_loss = 0.0;
    for &idx in order {
        total_loss += network.train_example(&inputs[idx], &targets[idx], optimizer)?;
    }

    Ok(total_loss / order.len() as f64)
}
