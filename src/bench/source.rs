use rand::{rngs::StdRng, SeedableRng};

use crate::{error::ShapeError, math::matrix::Matrix};

/// Supplies input batches to the sweep harness.
pub trait InputSource {
    /// Width of every row this source produces.
    fn width(&self) -> usize;

    /// Draws a fresh batch of `batch_size` rows.
    fn draw(&mut self, batch_size: usize) -> Result<Matrix, ShapeError>;
}

/// Cycles through a fixed dataset, continuing where the previous draw
/// stopped and wrapping around at the end.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    data: Matrix,
    cursor: usize,
}

impl DatasetSource {
    pub fn new(rows: Vec<Vec<f32>>) -> Result<DatasetSource, ShapeError> {
        let data = Matrix::from_rows(rows)?;
        if data.cols() == 0 {
            return Err(ShapeError::ZeroDimension);
        }
        Ok(DatasetSource { data, cursor: 0 })
    }
}

impl InputSource for DatasetSource {
    fn width(&self) -> usize {
        self.data.cols()
    }

    fn draw(&mut self, batch_size: usize) -> Result<Matrix, ShapeError> {
        if batch_size == 0 {
            return Err(ShapeError::EmptyBatch);
        }
        let mut flat = Vec::with_capacity(batch_size * self.width());
        for _ in 0..batch_size {
            flat.extend_from_slice(self.data.row(self.cursor));
            self.cursor = (self.cursor + 1) % self.data.rows();
        }
        Matrix::from_flat(batch_size, self.width(), flat)
    }
}

/// Uniform random rows in `[low, high)` from a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomSource {
    width: usize,
    low: f32,
    high: f32,
    rng: StdRng,
}

impl RandomSource {
    /// Values in `[-5, 5)`.
    pub fn new(width: usize, seed: u64) -> RandomSource {
        RandomSource::with_range(width, -5.0, 5.0, seed)
    }

    pub fn with_range(width: usize, low: f32, high: f32, seed: u64) -> RandomSource {
        RandomSource { width, low, high, rng: StdRng::seed_from_u64(seed) }
    }
}

impl InputSource for RandomSource {
    fn width(&self) -> usize {
        self.width
    }

    fn draw(&mut self, batch_size: usize) -> Result<Matrix, ShapeError> {
        if batch_size == 0 {
            return Err(ShapeError::EmptyBatch);
        }
        if self.width == 0 {
            return Err(ShapeError::ZeroDimension);
        }
        Ok(Matrix::uniform(batch_size, self.width, self.low, self.high, &mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_source_wraps_around() {
        let mut src = DatasetSource::new(vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]]).unwrap();
        let a = src.draw(2).unwrap();
        assert_eq!(a.as_slice(), &[1.0, 1.0, 2.0, 2.0]);
        let b = src.draw(3).unwrap();
        assert_eq!(b.as_slice(), &[3.0, 3.0, 1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn dataset_source_rejects_empty_rows() {
        assert_eq!(DatasetSource::new(vec![]).unwrap_err(), ShapeError::EmptyBatch);
    }

    #[test]
    fn random_source_is_seeded() {
        let a = RandomSource::new(4, 9).draw(6).unwrap();
        let b = RandomSource::new(4, 9).draw(6).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.rows(), a.cols()), (6, 4));
    }

    #[test]
    fn zero_batch_is_rejected() {
        assert_eq!(RandomSource::new(4, 0).draw(0).unwrap_err(), ShapeError::EmptyBatch);
    }
}
