use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rand::Rng;

use crate::{
    error::{FormatError, ShapeError},
    layers::dense::Layer,
    math::matrix::Matrix,
    network::spec::{LayerSpec, TopologyConfig},
    store::weights,
};

/// A validated, immutable stack of dense layers.
///
/// Adjacency (`layer[i].out_features == layer[i + 1].in_features`) is checked
/// once in [`Network::new`]; afterwards the network is only ever read, so a
/// single instance can be shared across threads and evaluated concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Result<Network, ShapeError> {
        if layers.is_empty() {
            return Err(ShapeError::EmptyTopology);
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].out_features() != pair[1].in_features() {
                return Err(ShapeError::Adjacency {
                    layer: i + 1,
                    expected: pair[1].in_features(),
                    actual: pair[0].out_features(),
                });
            }
        }
        Ok(Network { layers })
    }

    /// Randomly initialised network: He-normal weights, biases uniform in
    /// `[-0.1, 0.1)`. Stands in for a trained model when none is available.
    pub fn random<R: Rng + ?Sized>(config: &TopologyConfig, rng: &mut R) -> Result<Network, ShapeError> {
        config.validate()?;
        let layers = config.layer_specs().into_iter()
            .map(|spec| {
                let weights = Matrix::he(spec.out_features, spec.in_features, &mut *rng);
                let biases = Matrix::uniform(1, spec.out_features, -0.1, 0.1, &mut *rng).into_vec();
                Layer::new(weights, biases, spec.activation)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Network::new(layers)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].in_features()
    }

    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1].out_features()
    }

    /// Shapes and activations of every layer, in declared order.
    pub fn specs(&self) -> Vec<LayerSpec> {
        self.layers.iter()
            .map(|l| LayerSpec {
                in_features: l.in_features(),
                out_features: l.out_features(),
                activation: l.activation(),
            })
            .collect()
    }

    /// Multiply-add estimate for one input row: `2 × Σ in × out`.
    /// Bias additions are left out.
    pub fn flops_per_row(&self) -> u64 {
        self.layers.iter()
            .map(|l| 2 * (l.in_features() * l.out_features()) as u64)
            .sum()
    }

    /// Forward pass over a batch of rows. Returns raw output scores.
    pub fn forward(&self, batch: &Matrix) -> Result<Matrix, ShapeError> {
        if batch.rows() == 0 {
            return Err(ShapeError::EmptyBatch);
        }
        if batch.cols() != self.input_width() {
            return Err(ShapeError::RowWidth {
                row: 0,
                expected: self.input_width(),
                actual: batch.cols(),
            });
        }

        let mut current = self.layers[0].feed_from(batch)?;
        for layer in &self.layers[1..] {
            current = layer.feed_from(&current)?;
        }
        Ok(current)
    }

    /// Forward pass over loose rows, reporting the first row with a bad width.
    pub fn forward_rows(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ShapeError> {
        if rows.is_empty() {
            return Err(ShapeError::EmptyBatch);
        }
        let expected = self.input_width();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(ShapeError::RowWidth { row, expected, actual: r.len() });
        }
        let batch = Matrix::from_rows(rows.to_vec())?;
        let out = self.forward(&batch)?;
        Ok(out.iter_rows().map(<[f32]>::to_vec).collect())
    }

    /// Writes the weight file (one line per tensor) to `path`.
    pub fn save_weights<P: AsRef<Path>>(&self, path: P) -> Result<(), FormatError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        weights::write_weights(self, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a weight file previously written by `save_weights`, reshaping
    /// each line according to `config`.
    pub fn load_weights<P: AsRef<Path>>(path: P, config: &TopologyConfig) -> Result<Network, FormatError> {
        config.validate()?;
        let file = File::open(path)?;
        weights::read_weights(BufReader::new(file), &config.layer_specs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use rand::{rngs::StdRng, SeedableRng};

    fn layer(out: usize, inp: usize, act: ActivationFunction) -> Layer {
        Layer::new(Matrix::zeros(out, inp), vec![0.0; out], act).unwrap()
    }

    #[test]
    fn rejects_broken_adjacency() {
        let err = Network::new(vec![
            layer(8, 4, ActivationFunction::ReLU),
            layer(3, 7, ActivationFunction::Identity),
        ])
        .unwrap_err();
        assert_eq!(err, ShapeError::Adjacency { layer: 1, expected: 7, actual: 8 });
    }

    #[test]
    fn rejects_empty_topology() {
        assert_eq!(Network::new(vec![]).unwrap_err(), ShapeError::EmptyTopology);
    }

    #[test]
    fn iris_network_widths_and_flops() {
        let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(net.input_width(), 4);
        assert_eq!(net.output_width(), 3);
        assert_eq!(net.flops_per_row(), 2 * (256 + 1024 + 48));
        assert_eq!(net.specs(), TopologyConfig::iris().layer_specs());
    }

    #[test]
    fn forward_rejects_wide_rows() {
        let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(3)).unwrap();
        let err = net.forward(&Matrix::zeros(2, 5)).unwrap_err();
        assert_eq!(err, ShapeError::RowWidth { row: 0, expected: 4, actual: 5 });
    }

    #[test]
    fn forward_rows_reports_offending_row() {
        let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(3)).unwrap();
        let rows = vec![vec![0.0; 4], vec![0.0; 4], vec![0.0; 5]];
        assert_eq!(
            net.forward_rows(&rows).unwrap_err(),
            ShapeError::RowWidth { row: 2, expected: 4, actual: 5 }
        );
    }

    #[test]
    fn forward_rejects_empty_batch() {
        let net = Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(net.forward(&Matrix::zeros(0, 4)).unwrap_err(), ShapeError::EmptyBatch);
    }

    #[test]
    fn nan_input_propagates_to_output() {
        let w = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        let net = Network::new(vec![Layer::new(w, vec![0.0], ActivationFunction::Identity).unwrap()]).unwrap();
        let out = net.forward(&Matrix::from_rows(vec![vec![f32::NAN, 1.0]]).unwrap()).unwrap();
        assert!(out.get(0, 0).is_nan());
    }
}
