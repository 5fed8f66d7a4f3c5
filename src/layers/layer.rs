use std::fmt;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{NetworkError, Result};
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::neuron::neuron::{Neuron, NeuronKind};

/// Position of a layer in the network, which fixes the kind of its neurons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Input,
    Inner,
    Output,
}

impl LayerKind {
    fn neuron_kind(&self) -> NeuronKind {
        match self {
            LayerKind::Input => NeuronKind::Input,
            LayerKind::Inner => NeuronKind::Inner,
            LayerKind::Output => NeuronKind::Output,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerKind::Input => "input",
            LayerKind::Inner => "inner",
            LayerKind::Output => "output",
        };
        f.write_str(name)
    }
}

/// An ordered group of neurons of one kind.
///
/// Non-input layers own the weights of every link arriving at their neurons
/// as a `(size) x (prev_size + 1)` matrix. Column `j < prev_size` holds the
/// weight from neuron `j` of the previous layer; the last column holds the
/// weight from this layer's bias unit.
#[derive(Debug, Clone)]
pub struct Layer {
    kind: LayerKind,
    neurons: Vec<Neuron>,
    bias: Option<Neuron>,
    prev_size: usize,
    weights: Matrix,
    last_input: Vec<f64>,
}

impl Layer {
    /// Builds the first layer of a network: `size` identity neurons, no weights.
    pub fn input(size: usize) -> Result<Layer> {
        if size == 0 {
            return Err(NetworkError::construction("input layer must have at least one neuron"));
        }
        Ok(Layer {
            kind: LayerKind::Input,
            neurons: vec![Neuron::new(NeuronKind::Input); size],
            bias: None,
            prev_size: 0,
            weights: Matrix::default(),
            last_input: vec![0.0; size],
        })
    }

    /// Builds an inner or output layer fed by `prev_size` neurons plus a bias
    /// unit, with randomly initialised weights.
    pub fn new<R: Rng + ?Sized>(
        kind: LayerKind,
        size: usize,
        prev_size: usize,
        rng: &mut R,
    ) -> Result<Layer> {
        if kind == LayerKind::Input {
            return Err(NetworkError::construction("use Layer::input for the input layer"));
        }
        if size == 0 || prev_size == 0 {
            return Err(NetworkError::construction(format!(
                "{} layer needs a positive size and a positive previous size, got {} and {}",
                kind, size, prev_size
            )));
        }

        let mut layer = Layer {
            kind,
            neurons: vec![Neuron::new(kind.neuron_kind()); size],
            bias: Some(Neuron::bias()),
            prev_size,
            weights: Matrix::zeros(size, prev_size + 1),
            last_input: vec![0.0; prev_size],
        };
        let links = layer.nbr_links();
        for neuron in 0..size {
            layer.create_weights(neuron, links, rng)?;
        }
        Ok(layer)
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Number of neurons, not counting the bias unit.
    pub fn nbr_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Incoming links per neuron: previous width plus one for the bias.
    /// Zero for the input layer.
    pub fn nbr_links(&self) -> usize {
        match self.kind {
            LayerKind::Input => 0,
            _ => self.prev_size + 1,
        }
    }

    pub fn prev_size(&self) -> usize {
        self.prev_size
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// # Panics
    /// Panics if `index >= nbr_neurons()`.
    pub fn neuron_at(&self, index: usize) -> &Neuron {
        &self.neurons[index]
    }

    pub fn bias(&self) -> Option<&Neuron> {
        self.bias.as_ref()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// Input vector seen by the last forward pass.
    pub fn last_input(&self) -> &[f64] {
        &self.last_input
    }

    /// Re-draws the `n` incoming weights of `neuron` from N(0, 1/prev_size).
    pub fn create_weights<R: Rng + ?Sized>(&mut self, neuron: usize, n: usize, rng: &mut R) -> Result<()> {
        self.check_neuron(neuron);
        if n != self.nbr_links() {
            return Err(NetworkError::construction(format!(
                "neuron {} of the {} layer has {} links, cannot create {} weights",
                neuron,
                self.kind,
                self.nbr_links(),
                n
            )));
        }
        let row = Matrix::gaussian(1, n, self.prev_size, rng);
        self.weights.set_row(neuron, row.row(0));
        Ok(())
    }

    /// Weight of link `link` arriving at `neuron`; `link == prev_size` is the bias.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn weight_to(&self, neuron: usize, link: usize) -> f64 {
        self.check_neuron(neuron);
        assert!(
            link < self.nbr_links(),
            "link index {} out of range for {} links",
            link,
            self.nbr_links()
        );
        self.weights[(neuron, link)]
    }

    /// Replaces the incoming weights of one neuron.
    pub fn set_weights(&mut self, neuron: usize, weights: &[f64]) -> Result<()> {
        self.check_neuron(neuron);
        if weights.len() != self.nbr_links() {
            return Err(NetworkError::dimension(
                self.nbr_links(),
                weights.len(),
                format!("weights of neuron {}", neuron),
            ));
        }
        self.weights.set_row(neuron, weights);
        Ok(())
    }

    /// Replaces the whole weight matrix; the shape must not change.
    pub fn set_all_weights(&mut self, weights: Matrix) -> Result<()> {
        self.check_shape(&weights, "weight matrix")?;
        self.weights = weights;
        Ok(())
    }

    /// Adds `deltas[i]` to weight `i` of one neuron.
    pub fn update_neuron_weights(&mut self, neuron: usize, deltas: &[f64]) -> Result<()> {
        self.check_neuron(neuron);
        if deltas.len() != self.nbr_links() {
            return Err(NetworkError::dimension(
                self.nbr_links(),
                deltas.len(),
                format!("weight deltas of neuron {}", neuron),
            ));
        }
        for (w, d) in self.weights.data[neuron].iter_mut().zip(deltas) {
            *w += d;
        }
        Ok(())
    }

    /// Adds a full delta matrix, one row per neuron.
    pub fn update_weights(&mut self, deltas: &Matrix) -> Result<()> {
        self.check_shape(deltas, "weight update")?;
        self.weights = std::mem::take(&mut self.weights) + deltas;
        Ok(())
    }

    /// Feeds one vector through the layer.
    ///
    /// The input layer takes one raw value per neuron. Other layers take the
    /// previous layer's output and rebuild every neuron's weighted sum,
    /// including the bias term.
    pub fn feed(&mut self, input: &[f64]) -> Result<()> {
        let expected = match self.kind {
            LayerKind::Input => self.nbr_neurons(),
            _ => self.prev_size,
        };
        if input.len() != expected {
            return Err(NetworkError::dimension(
                expected,
                input.len(),
                format!("{} layer input", self.kind),
            ));
        }

        self.last_input.clear();
        self.last_input.extend_from_slice(input);

        match self.kind {
            LayerKind::Input => {
                for (neuron, &x) in self.neurons.iter_mut().zip(input) {
                    neuron.reset();
                    neuron.input(x);
                }
            }
            _ => {
                let bias = self.bias.clone().unwrap_or_else(Neuron::bias);
                let bias_link = self.prev_size;
                for (i, neuron) in self.neurons.iter_mut().enumerate() {
                    let row = self.weights.row(i);
                    neuron.reset();
                    for (&x, &w) in input.iter().zip(row) {
                        neuron.input(x * w);
                    }
                    neuron.input(bias.output_to(row[bias_link]));
                }
            }
        }
        Ok(())
    }

    pub fn output(&self) -> Vec<f64> {
        self.neurons.iter().map(Neuron::output).collect()
    }

    /// Error terms of an output layer: `(target - o) · o · (1 - o)`.
    pub fn output_deltas(&self, targets: &[f64]) -> Result<Vec<f64>> {
        if targets.len() != self.nbr_neurons() {
            return Err(NetworkError::dimension(
                self.nbr_neurons(),
                targets.len(),
                format!("{} layer targets", self.kind),
            ));
        }
        let output = self.output();
        Ok(MseLoss::derivative(&output, targets)
            .into_iter()
            .zip(&self.neurons)
            .map(|(grad, neuron)| -grad * neuron.derivative())
            .collect())
    }

    /// Error terms of this layer given the error terms of the layer it feeds:
    /// `o · (1 - o) · Σ_k δ_k · w_{k→this}`.
    ///
    /// `next` must still hold the weights used by the forward pass.
    pub fn hidden_deltas(&self, next: &Layer, next_deltas: &[f64]) -> Result<Vec<f64>> {
        if next.prev_size != self.nbr_neurons() {
            return Err(NetworkError::dimension(
                self.nbr_neurons(),
                next.prev_size,
                format!("inputs of the {} layer fed by this one", next.kind),
            ));
        }
        if next_deltas.len() != next.nbr_neurons() {
            return Err(NetworkError::dimension(
                next.nbr_neurons(),
                next_deltas.len(),
                format!("{} layer error terms", next.kind),
            ));
        }
        let back = next.weights.transpose_mul_vec(next_deltas);
        Ok(self.neurons
            .iter()
            .zip(back)
            .map(|(neuron, err)| neuron.derivative() * err)
            .collect())
    }

    /// Gradient matrix `δ · xᵀ` where `x` is the last input extended with the
    /// bias output.
    pub fn weight_gradient(&self, deltas: &[f64]) -> Matrix {
        let mut x = self.last_input.clone();
        x.push(self.bias.as_ref().map_or(1.0, Neuron::output));
        Matrix::outer(deltas, &x)
    }

    /// Reports the first dimension (rows, then columns) that disagrees with
    /// the weight matrix.
    fn check_shape(&self, other: &Matrix, what: &str) -> Result<()> {
        if other.rows != self.weights.rows {
            return Err(NetworkError::dimension(
                self.weights.rows,
                other.rows,
                format!("{} layer {} rows", self.kind, what),
            ));
        }
        if other.cols != self.weights.cols {
            return Err(NetworkError::dimension(
                self.weights.cols,
                other.cols,
                format!("{} layer {} columns", self.kind, what),
            ));
        }
        Ok(())
    }

    fn check_neuron(&self, neuron: usize) {
        assert!(
            neuron < self.nbr_neurons(),
            "neuron index {} out of range for {} layer of {} neurons",
            neuron,
            self.kind,
            self.nbr_neurons()
        );
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} layer, {} neurons", self.kind, self.nbr_neurons())?;
        if self.kind == LayerKind::Input {
            return Ok(());
        }
        for (neuron, row) in self.neurons.iter().zip(&self.weights.data) {
            let (links, bias) = row.split_at(self.prev_size);
            let links: Vec<String> = links.iter().map(|w| format!("{:.6}", w)).collect();
            write!(f, "\n  {} <- [{}] bias {:.6}", neuron, links.join(", "), bias[0])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn inner_layer() -> Layer {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = Layer::new(LayerKind::Inner, 2, 3, &mut rng).unwrap();
        layer
            .set_all_weights(Matrix::from_data(vec![
                vec![0.1, 0.2, 0.3, 0.5],
                vec![-0.4, 0.0, 0.6, -1.0],
            ]))
            .unwrap();
        layer
    }

    #[test]
    fn new_layer_wires_bias_column() {
        let layer = inner_layer();
        assert_eq!(layer.nbr_neurons(), 2);
        assert_eq!(layer.nbr_links(), 4);
        assert_eq!((layer.weights().rows, layer.weights().cols), (2, 4));
        assert_eq!(layer.weight_to(1, 3), -1.0);
        assert_eq!(layer.bias().map(Neuron::output), Some(1.0));
    }

    #[test]
    fn input_layer_passes_values_through() {
        let mut layer = Layer::input(3).unwrap();
        layer.feed(&[0.5, -2.0, 7.0]).unwrap();
        assert_eq!(layer.output(), vec![0.5, -2.0, 7.0]);
        assert_eq!(layer.nbr_links(), 0);
    }

    #[test]
    fn feed_computes_weighted_sum_with_bias() {
        let mut layer = inner_layer();
        layer.feed(&[1.0, 2.0, 3.0]).unwrap();
        let out = layer.output();
        assert_relative_eq!(layer.neuron_at(0).raw_input(), 0.1 + 0.4 + 0.9 + 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[0], sigmoid(1.9), epsilon = 1e-12);
        assert_relative_eq!(out[1], sigmoid(-0.4 + 1.8 - 1.0), epsilon = 1e-12);
    }

    #[test]
    fn feed_resets_previous_sums() {
        let mut layer = inner_layer();
        layer.feed(&[1.0, 2.0, 3.0]).unwrap();
        let first = layer.output();
        layer.feed(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(first, layer.output());
    }

    #[test]
    fn feed_rejects_wrong_width() {
        let mut layer = inner_layer();
        let err = layer.feed(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::DimensionMismatch { expected: 3, got: 2, .. }
        ));
    }

    #[test]
    fn create_weights_rejects_mismatched_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layer = inner_layer();
        assert!(matches!(
            layer.create_weights(0, 3, &mut rng),
            Err(NetworkError::Construction { .. })
        ));
        layer.create_weights(0, 4, &mut rng).unwrap();
        assert_eq!(layer.weight_to(1, 0), -0.4);
    }

    #[test]
    fn update_weights_is_additive() {
        let mut layer = inner_layer();
        layer.update_neuron_weights(0, &[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_relative_eq!(layer.weight_to(0, 3), 1.5);

        let deltas = Matrix::from_data(vec![vec![0.0; 4], vec![0.5; 4]]);
        layer.update_weights(&deltas).unwrap();
        assert_relative_eq!(layer.weight_to(1, 0), 0.1, epsilon = 1e-12);
        assert!(layer.update_weights(&Matrix::zeros(1, 4)).is_err());
        assert!(layer.set_weights(0, &[0.0; 3]).is_err());
    }

    #[test]
    fn output_deltas_use_sigmoid_slope() {
        let mut layer = inner_layer();
        layer.feed(&[1.0, 2.0, 3.0]).unwrap();
        let o = layer.output();
        let deltas = layer.output_deltas(&[1.0, 0.0]).unwrap();
        assert_relative_eq!(deltas[0], (1.0 - o[0]) * o[0] * (1.0 - o[0]), epsilon = 1e-12);
        assert_relative_eq!(deltas[1], (0.0 - o[1]) * o[1] * (1.0 - o[1]), epsilon = 1e-12);
    }

    #[test]
    fn hidden_deltas_sum_over_downstream_links() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut hidden = inner_layer();
        hidden.feed(&[1.0, 2.0, 3.0]).unwrap();
        let mut out = Layer::new(LayerKind::Output, 1, 2, &mut rng).unwrap();
        out.set_weights(0, &[0.7, -0.2, 0.1]).unwrap();

        let deltas = hidden.hidden_deltas(&out, &[0.5]).unwrap();
        let h = hidden.output();
        assert_relative_eq!(deltas[0], h[0] * (1.0 - h[0]) * 0.5 * 0.7, epsilon = 1e-12);
        assert_relative_eq!(deltas[1], h[1] * (1.0 - h[1]) * 0.5 * -0.2, epsilon = 1e-12);
    }

    #[test]
    fn weight_gradient_appends_bias_input() {
        let mut layer = inner_layer();
        layer.feed(&[1.0, 2.0, 3.0]).unwrap();
        let grad = layer.weight_gradient(&[2.0, -1.0]);
        assert_eq!(grad.data[0], vec![2.0, 4.0, 6.0, 2.0]);
        assert_eq!(grad.data[1], vec![-1.0, -2.0, -3.0, -1.0]);
    }

    #[test]
    fn output_deltas_reject_wrong_target_width() {
        let mut layer = inner_layer();
        layer.feed(&[1.0, 2.0, 3.0]).unwrap();
        for targets in [&[1.0][..], &[1.0, 0.0, 5.0][..]] {
            assert!(matches!(
                layer.output_deltas(targets),
                Err(NetworkError::DimensionMismatch { expected: 2, .. })
            ));
        }
    }

    #[test]
    fn hidden_deltas_reject_mismatched_downstream() {
        let mut rng = StdRng::seed_from_u64(5);
        let hidden = inner_layer();
        let out = Layer::new(LayerKind::Output, 1, 2, &mut rng).unwrap();
        let unrelated = Layer::new(LayerKind::Output, 1, 3, &mut rng).unwrap();

        assert!(matches!(
            hidden.hidden_deltas(&out, &[]),
            Err(NetworkError::DimensionMismatch { expected: 1, got: 0, .. })
        ));
        assert!(matches!(
            hidden.hidden_deltas(&unrelated, &[0.5]),
            Err(NetworkError::DimensionMismatch { expected: 2, got: 3, .. })
        ));
    }

    #[test]
    fn shape_errors_name_the_differing_dimension() {
        let mut layer = inner_layer();
        match layer.set_all_weights(Matrix::zeros(4, 2)) {
            Err(NetworkError::DimensionMismatch { expected, got, context }) => {
                assert_eq!((expected, got), (2, 4));
                assert!(context.ends_with("rows"));
            }
            other => panic!("expected a row mismatch, got {:?}", other),
        }
        match layer.update_weights(&Matrix::zeros(2, 3)) {
            Err(NetworkError::DimensionMismatch { expected, got, context }) => {
                assert_eq!((expected, got), (4, 3));
                assert!(context.ends_with("columns"));
            }
            other => panic!("expected a column mismatch, got {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn weight_to_panics_past_the_end() {
        inner_layer().weight_to(0, 4);
    }

    #[test]
    fn zero_sized_layers_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Layer::input(0).is_err());
        assert!(Layer::new(LayerKind::Output, 0, 2, &mut rng).is_err());
        assert!(Layer::new(LayerKind::Input, 2, 2, &mut rng).is_err());
    }
}
