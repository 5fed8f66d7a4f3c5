use std::sync::mpsc;
use std::time::Instant;

use tracing::{info, trace};

use crate::error::Result;
use crate::network::network::NeuronBasedNeuralNetwork;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::trainer::train_epoch;

/// Trains `network` for `network.config().epochs` epochs of online gradient
/// descent and returns the mean training loss of the **last completed epoch**.
///
/// The whole dataset is checked against the network's topology, and the
/// training settings are validated, before any weight changes. A
/// `DimensionMismatch` or `Config` error leaves the network untouched.
///
/// # Arguments
/// - `network`     — trained in place; repeated calls continue from the current weights
/// - `inputs`      — one row per example, each of the network's input width
/// - `targets`     — one row per example, each of the network's output width
/// - `progress_tx` — optional channel receiving one `EpochStats` per epoch
///
/// # Early termination
/// The loop stops after the current epoch if the `progress_tx` receiver has
/// been dropped.
pub fn train_loop(
    network: &mut NeuronBasedNeuralNetwork,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    progress_tx: Option<&mpsc::Sender<EpochStats>>,
) -> Result<f64> {
    network.check_dataset(inputs, targets)?;

    let config = *network.config();
    config.validate()?;
    let optimizer = Sgd::new(config.learning_rate);
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    let mut last_train_loss = 0.0;

    info!(
        epochs = config.epochs,
        examples = inputs.len(),
        learning_rate = config.learning_rate,
        "starting training"
    );
    let t_run = Instant::now();

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        if config.shuffle {
            network.shuffle(&mut order);
        }
        let train_loss = train_epoch(network, inputs, targets, &order, &optimizer)?;
        last_train_loss = train_loss;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        trace!(epoch, train_loss, "epoch finished");

        if let Some(tx) = progress_tx {
            if tx.send(stats).is_err() {
                info!(epoch, "progress receiver dropped, stopping early");
                break;
            }
        }
    }

    let elapsed_ms = t_run.elapsed().as_millis() as u64;
    info!(train_loss = last_train_loss, elapsed_ms, "training finished");
    Ok(last_train_loss)
}
