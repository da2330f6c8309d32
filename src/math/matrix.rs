use rand::Rng;
use std::f32::consts::PI;

use crate::error::ShapeError;

/// Dense row-major `f32` matrix.
///
/// `data[i * cols + j]` is element `(i, j)`. The flat layout is the same
/// one the weight file uses, so tensors are copied in and out without
/// any reordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wraps a row-major buffer. Fails if `data.len() != rows * cols`.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<f32>) -> Result<Matrix, ShapeError> {
        if data.len() != rows * cols {
            return Err(ShapeError::DataLength { rows, cols, actual: data.len() });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from a list of rows, all of which must share one width.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Matrix, ShapeError> {
        let Some(first) = rows.first() else {
            return Err(ShapeError::EmptyBatch);
        };
        let cols = first.len();
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for row in rows {
            if row.len() != cols {
                return Err(ShapeError::RaggedRows { first: cols, other: row.len() });
            }
            data.extend(row);
        }
        Ok(Matrix { rows: n_rows, cols, data })
    }

    /// Uniform samples in `[low, high)`.
    pub fn uniform<R: Rng + ?Sized>(rows: usize, cols: usize, low: f32, high: f32, rng: &mut R) -> Matrix {
        let data = (0..rows * cols).map(|_| rng.gen_range(low..high)).collect();
        Matrix { rows, cols, data }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
        // (0, 1] keeps ln() finite.
        let u1: f32 = 1.0 - rng.gen::<f32>();
        let u2: f32 = 1.0 - rng.gen::<f32>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Shape: (rows, cols). `cols` is the fan-in, matching the
    /// (out_features, in_features) layout of a layer's weight matrix.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / cols as f32).sqrt();
        let data = (0..rows * cols)
            .map(|_| Matrix::sample_standard_normal(rng) * std_dev)
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics, and a zero-width matrix has no meaningful rows
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.cols + j]
    }

    /// Affine kernel: `self · weightsᵗ + bias`, one output row per input row.
    ///
    /// `weights` is (out, in); `self` is (batch, in). Every output element is
    /// accumulated left to right over `in` and the bias is added last, so the
    /// result is bit-identical across calls.
    pub fn affine_transposed(&self, weights: &Matrix, bias: &[f32]) -> Result<Matrix, ShapeError> {
        if weights.rows == 0 || weights.cols == 0 {
            return Err(ShapeError::ZeroDimension);
        }
        if self.cols != weights.cols {
            return Err(ShapeError::RowWidth { row: 0, expected: weights.cols, actual: self.cols });
        }
        if bias.len() != weights.rows {
            return Err(ShapeError::BiasLength { expected: weights.rows, actual: bias.len() });
        }

        let mut res = Matrix::zeros(self.rows, weights.rows);
        for (x, out) in self.iter_rows().zip(res.data.chunks_exact_mut(weights.rows)) {
            for (o, y) in out.iter_mut().enumerate() {
                let w = weights.row(o);
                let mut sum = 0.0f32;
                for (xi, wi) in x.iter().zip(w) {
                    sum += xi * wi;
                }
                *y = sum + bias[o];
            }
        }
        Ok(res)
    }

    /// Applies `functor` to every element in place.
    pub fn map_in_place<F>(&mut self, functor: F)
    where
        F: Fn(f32) -> f32,
    {
        for x in &mut self.data {
            *x = functor(*x);
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
