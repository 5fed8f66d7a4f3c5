use std::sync::mpsc;

use approx::assert_abs_diff_eq;
use neuron_nn::{
    Matrix, NetworkError, NeuralNetwork, NeuronBasedNeuralNetwork, Sgd, TrainConfig,
};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn xor_data() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let targets = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    (inputs, targets)
}

/// 2-2-1 network with known weights; last column of each row is the bias.
fn fixed_network() -> NeuronBasedNeuralNetwork {
    let mut net = NeuronBasedNeuralNetwork::seeded(&[2, 2, 1], TrainConfig::default(), 1).unwrap();
    net.layer_mut(1)
        .set_all_weights(Matrix::from_data(vec![
            vec![0.5, -0.6, 0.1],
            vec![-0.3, 0.8, -0.2],
        ]))
        .unwrap();
    net.layer_mut(2).set_weights(0, &[1.2, -0.7, 0.3]).unwrap();
    net
}

#[test]
fn run_is_deterministic_for_fixed_weights() {
    let mut net = fixed_network();
    let first = net.run(&[0.3, 0.9]).unwrap();
    for _ in 0..10 {
        let again = net.run(&[0.3, 0.9]).unwrap();
        assert_eq!(first[0].to_bits(), again[0].to_bits());
    }
}

#[test]
fn wrong_input_width_is_rejected_without_mutation() {
    let mut net = fixed_network();
    let before: Vec<Matrix> = net.layers().iter().map(|l| l.weights().clone()).collect();

    for bad in [vec![], vec![1.0], vec![1.0, 0.0, 1.0]] {
        match net.run(&bad) {
            Err(NetworkError::DimensionMismatch { expected, got, .. }) => {
                assert_eq!(expected, 2);
                assert_eq!(got, bad.len());
            }
            other => panic!("expected a dimension mismatch, got {:?}", other),
        }
    }

    let after: Vec<Matrix> = net.layers().iter().map(|l| l.weights().clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn forward_pass_matches_hand_computation() {
    let mut net = fixed_network();
    let (x1, x2) = (1.0, 0.0);

    let h1 = sigmoid(0.5 * x1 - 0.6 * x2 + 0.1);
    let h2 = sigmoid(-0.3 * x1 + 0.8 * x2 - 0.2);
    let expected = sigmoid(1.2 * h1 - 0.7 * h2 + 0.3);

    let out = net.run(&[x1, x2]).unwrap();
    assert_eq!(out.len(), 1);
    assert_abs_diff_eq!(out[0], expected, epsilon = 1e-9);
}

#[test]
fn single_step_applies_delta_rule_to_output_weights() {
    let mut net = fixed_network();
    let lr = 0.8;
    let (input, target) = ([0.0, 1.0], [1.0]);

    let o = net.run(&input).unwrap()[0];
    let h = net.layer(1).output();
    let delta = (target[0] - o) * o * (1.0 - o);
    let w_before: Vec<f64> = (0..3).map(|j| net.layer(2).weight_to(0, j)).collect();

    net.train_example(&input, &target, &Sgd::new(lr)).unwrap();

    assert_abs_diff_eq!(net.layer(2).weight_to(0, 0), w_before[0] + lr * delta * h[0], epsilon = 1e-12);
    assert_abs_diff_eq!(net.layer(2).weight_to(0, 1), w_before[1] + lr * delta * h[1], epsilon = 1e-12);
    assert_abs_diff_eq!(net.layer(2).weight_to(0, 2), w_before[2] + lr * delta, epsilon = 1e-12);
}

#[test]
fn xor_training_reduces_error_and_converges() {
    let (inputs, targets) = xor_data();
    let config = TrainConfig::new(10_000, 0.8);
    let mut net = NeuronBasedNeuralNetwork::seeded(&[2, 6, 1], config, 2024).unwrap();

    let (tx, rx) = mpsc::channel();
    net.train_with_progress(&inputs, &targets, &tx).unwrap();
    drop(tx);

    let stats: Vec<_> = rx.iter().collect();
    assert_eq!(stats.len(), 10_000);
    assert_eq!(stats[0].epoch, 1);
    let first = stats[0].train_loss;
    let last = stats[stats.len() - 1].train_loss;
    assert!(last < first, "loss went from {} to {}", first, last);

    for (input, target) in inputs.iter().zip(&targets) {
        let out = net.run(input).unwrap();
        assert!(
            (out[0] - target[0]).abs() < 0.1,
            "{:?} -> {} (target {})",
            input,
            out[0],
            target[0]
        );
    }
}

#[test]
fn repeated_train_calls_continue_from_current_weights() {
    let (inputs, targets) = xor_data();
    let mut net = NeuronBasedNeuralNetwork::seeded(&[2, 4, 1], TrainConfig::new(200, 0.8), 5).unwrap();
    let mut twin = net.clone();

    net.train(&inputs, &targets).unwrap();
    net.train(&inputs, &targets).unwrap();

    twin.config_mut().epochs = 400;
    twin.train(&inputs, &targets).unwrap();

    assert_eq!(net.layer(1).weights(), twin.layer(1).weights());
    assert_eq!(net.layer(2).weights(), twin.layer(2).weights());
}

#[test]
fn dropped_receiver_stops_training_after_one_epoch() {
    let (inputs, targets) = xor_data();
    let mut net = NeuronBasedNeuralNetwork::seeded(&[2, 3, 1], TrainConfig::new(50, 0.8), 8).unwrap();
    let mut once = net.clone();
    once.config_mut().epochs = 1;

    let (tx, rx) = mpsc::channel();
    drop(rx);
    net.train_with_progress(&inputs, &targets, &tx).unwrap();
    once.train(&inputs, &targets).unwrap();

    assert_eq!(net.layer(2).weights(), once.layer(2).weights());
}

#[test]
fn shuffled_training_is_reproducible_for_a_seed() {
    let (inputs, targets) = xor_data();
    let config = TrainConfig::new(100, 0.5).with_shuffle(true);
    let mut a = NeuronBasedNeuralNetwork::seeded(&[2, 3, 1], config, 77).unwrap();
    let mut b = NeuronBasedNeuralNetwork::seeded(&[2, 3, 1], config, 77).unwrap();

    a.train(&inputs, &targets).unwrap();
    b.train(&inputs, &targets).unwrap();

    assert_eq!(a.run(&[1.0, 0.0]).unwrap(), b.run(&[1.0, 0.0]).unwrap());
}

#[test]
fn zero_width_layers_are_construction_errors() {
    for sizes in [vec![2, 0, 1], vec![0, 2], vec![2, 3, 0], vec![4]] {
        assert!(matches!(
            NeuronBasedNeuralNetwork::new(&sizes),
            Err(NetworkError::Construction { .. })
        ));
    }
}
