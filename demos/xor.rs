use neuron_nn::{NeuralNetwork, NeuronBasedNeuralNetwork, TrainConfig};

const INPUTS: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

fn xor_targets(inputs: &[Vec<f64>]) -> Vec<Vec<f64>> {
    inputs
        .iter()
        .map(|x| vec![if x[0] == x[1] { 0.0 } else { 1.0 }])
        .collect()
}

fn diagnostic(network: &mut NeuronBasedNeuralNetwork) -> neuron_nn::Result<f64> {
    let mut error = 0.0;
    for input in &INPUTS {
        let target = if input[0] == input[1] { 0.0 } else { 1.0 };
        let out = network.run(input)?[0];
        error += (out - target).powi(2) / 2.0;
        println!("  {} & {} -> {:.4}", input[0], input[1], out);
    }
    Ok(error / INPUTS.len() as f64)
}

fn main() -> neuron_nn::Result<()> {
    let inputs: Vec<Vec<f64>> = INPUTS.iter().map(|x| x.to_vec()).collect();
    let targets = xor_targets(&inputs);

    let mut network = NeuronBasedNeuralNetwork::with_config(&[2, 3, 1], TrainConfig::new(1000, 0.8))?;

    println!("==Without Training==");
    println!("Mean error: {:.6}", diagnostic(&mut network)?);

    for round in 1..=10 {
        network.train(&inputs, &targets)?;
        let loss = network.evaluate(&inputs, &targets)?;
        println!("Epoch {}: loss = {:.6}", round * 1000, loss);
    }

    println!("==With Training==");
    println!("Mean error: {:.6}", diagnostic(&mut network)?);
    println!("{}", network);

    // How often does a fresh network learn XOR within 10 000 epochs?
    let attempts = 20;
    let mut successes = 0;
    for _ in 0..attempts {
        let mut fresh = NeuronBasedNeuralNetwork::with_config(&[2, 3, 1], TrainConfig::new(2500, 0.8))?;
        for _ in 0..4 {
            fresh.train(&inputs, &targets)?;
            if fresh.evaluate(&inputs, &targets)? / 2.0 < 0.01 {
                successes += 1;
                break;
            }
        }
    }
    println!("Success rate: {}/{}", successes, attempts);

    Ok(())
}
