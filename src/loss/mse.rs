/// Squared-error loss, the quantity plain backprop with sigmoid outputs descends.
pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE for one example: mean((predicted - expected)²)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        if predicted.is_empty() {
            return 0.0;
        }
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>() / n
    }

    /// Per-output gradient of the squared error: predicted - expected.
    /// The output error term is the negation of this times the sigmoid slope.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| a - b)
            .collect()
    }

    /// Mean of the per-example losses over a set of (prediction, target) rows.
    pub fn mean_over(predicted: &[Vec<f64>], expected: &[Vec<f64>]) -> f64 {
        if predicted.is_empty() {
            return 0.0;
        }
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| MseLoss::loss(p, e))
            .sum::<f64>() / predicted.len() as f64
    }
}
