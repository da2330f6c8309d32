use crate::{activation::activation::ActivationFunction, error::ShapeError, math::matrix::Matrix};

/// One affine transform plus activation. Immutable once built.
///
/// `weights` has shape (out_features, in_features), the same orientation
/// the weight file stores it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    weights: Matrix,
    biases: Vec<f32>,
    activator: ActivationFunction,
}

impl Layer {
    pub fn new(weights: Matrix, biases: Vec<f32>, activation: ActivationFunction) -> Result<Layer, ShapeError> {
        if weights.rows() == 0 || weights.cols() == 0 {
            return Err(ShapeError::ZeroDimension);
        }
        if biases.len() != weights.rows() {
            return Err(ShapeError::BiasLength { expected: weights.rows(), actual: biases.len() });
        }
        Ok(Layer { weights, biases, activator: activation })
    }

    pub fn in_features(&self) -> usize {
        self.weights.cols()
    }

    pub fn out_features(&self) -> usize {
        self.weights.rows()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activator
    }

    /// `activation(input · Wᵗ + b)` for every row of `input`.
    pub fn feed_from(&self, input: &Matrix) -> Result<Matrix, ShapeError> {
        let mut z = input.affine_transposed(&self.weights, &self.biases)?;
        if self.activator != ActivationFunction::Identity {
            let act = self.activator;
            z.map_in_place(|x| act.function(x));
        }
        Ok(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known_layer() -> Layer {
        let w = Matrix::from_rows(vec![vec![2.0, 3.0]]).unwrap();
        Layer::new(w, vec![1.0], ActivationFunction::ReLU).unwrap()
    }

    #[test]
    fn known_vector_positive() {
        let x = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        assert_eq!(known_layer().feed_from(&x).unwrap().as_slice(), &[6.0]);
    }

    #[test]
    fn known_vector_clamped() {
        let x = Matrix::from_rows(vec![vec![-1.0, -1.0]]).unwrap();
        assert_eq!(known_layer().feed_from(&x).unwrap().as_slice(), &[0.0]);
    }

    #[test]
    fn rejects_bias_mismatch() {
        let w = Matrix::zeros(3, 2);
        assert_eq!(
            Layer::new(w, vec![0.0; 2], ActivationFunction::Identity).unwrap_err(),
            ShapeError::BiasLength { expected: 3, actual: 2 }
        );
    }

    #[test]
    fn rejects_zero_dimension() {
        assert_eq!(
            Layer::new(Matrix::zeros(0, 4), vec![], ActivationFunction::Identity).unwrap_err(),
            ShapeError::ZeroDimension
        );
    }
}
