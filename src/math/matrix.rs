use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Index, IndexMut};

/// Dense row-major matrix. Layers store their incoming weights in one of these,
/// one row per destination neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Uniform samples in (0, 1] so that ln(u1) stays finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Fills a (rows, cols) matrix with samples from N(0, 1) / sqrt(fan_in).
    ///
    /// `fan_in` is the width of the layer feeding the weights, not counting the
    /// bias unit.
    pub fn gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, fan_in: usize, rng: &mut R) -> Matrix {
        let scale = 1.0 / (fan_in.max(1) as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * scale;
            }
        }
        res
    }

    /// Builds a matrix from row vectors. All rows must have the same length.
    ///
    /// # Panics
    /// Panics if the rows are ragged.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map_or(0, |row| row.len());
        assert!(
            data.iter().all(|row| row.len() == cols),
            "Matrix rows must all have {} columns",
            cols
        );
        Matrix {
            rows: data.len(),
            cols,
            data
        }
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    /// Replaces row `i`; the new row must have exactly `cols` entries.
    pub fn set_row(&mut self, i: usize, values: &[f64]) {
        assert_eq!(values.len(), self.cols, "row length must equal column count");
        self.data[i].copy_from_slice(values);
    }

    /// Computes `selfᵀ · v`: entry j is Σ_i self[i][j] · v[i].
    ///
    /// Used to send error terms backwards through a layer's weights.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.rows, "vector length must equal row count");
        let mut res = vec![0.0; self.cols];
        for (row, &scale) in self.data.iter().zip(v.iter()) {
            for (acc, &w) in res.iter_mut().zip(row.iter()) {
                *acc += w * scale;
            }
        }
        res
    }

    /// Outer product `a · bᵀ`, shape (a.len(), b.len()).
    pub fn outer(a: &[f64], b: &[f64]) -> Matrix {
        Matrix::from_data(
            a.iter()
                .map(|&x| b.iter().map(|&y| x * y).collect())
                .collect()
        )
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        }
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i][j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i][j]
    }
}

impl Add<&Matrix> for Matrix {
    type Output = Matrix;

    fn add(mut self, rhs: &Matrix) -> Self::Output {
        if !self.same_shape(rhs) {
            panic!("Matrices are of incorrect sizes")
        }

        for i in 0..self.rows {
            for j in 0..self.cols {
                self.data[i][j] += rhs.data[i][j];
            }
        }

        self
    }
}
