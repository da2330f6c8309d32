use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;
use crate::error::{ConfigError, ShapeError};

/// Describes one layer of a topology.
///
/// Fields:
/// - `in_features`  — width of the rows fed into this layer
/// - `out_features` — number of output units
/// - `activation`   — activation applied after the affine transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub in_features: usize,
    pub out_features: usize,
    pub activation: ActivationFunction,
}

impl LayerSpec {
    /// Number of elements in the weight tensor (out × in).
    pub fn weight_len(&self) -> usize {
        self.in_features * self.out_features
    }
}

/// Layer widths of the fixed three-layer classifier.
///
/// `input → hidden1 (ReLU) → hidden2 (ReLU) → output (raw logits)`.
/// Both the weight store and the engine take their shapes from here, so a
/// weight file never has to carry shape metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub input_width: usize,
    pub hidden1_width: usize,
    pub hidden2_width: usize,
    pub output_width: usize,
}

impl TopologyConfig {
    /// 4 Iris features → 64 → 16 → 3 species.
    pub const fn iris() -> TopologyConfig {
        TopologyConfig {
            input_width: 4,
            hidden1_width: 64,
            hidden2_width: 16,
            output_width: 3,
        }
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        let widths = [self.input_width, self.hidden1_width, self.hidden2_width, self.output_width];
        if widths.contains(&0) {
            return Err(ShapeError::ZeroDimension);
        }
        Ok(())
    }

    /// Ordered layer descriptions (input → output).
    pub fn layer_specs(&self) -> Vec<LayerSpec> {
        vec![
            LayerSpec {
                in_features: self.input_width,
                out_features: self.hidden1_width,
                activation: ActivationFunction::ReLU,
            },
            LayerSpec {
                in_features: self.hidden1_width,
                out_features: self.hidden2_width,
                activation: ActivationFunction::ReLU,
            },
            LayerSpec {
                in_features: self.hidden2_width,
                out_features: self.output_width,
                activation: ActivationFunction::Identity,
            },
        ]
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `TopologyConfig` from a JSON file.
    pub fn load_json(path: &str) -> Result<TopologyConfig, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
        serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_string(), source })
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        TopologyConfig::iris()
    }
}
