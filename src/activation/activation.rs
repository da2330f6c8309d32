use serde::{Serialize, Deserialize};

/// Elementwise activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationFunction {
    /// Raw logits, no-op.
    Identity,
    #[serde(rename = "relu")]
    ReLU,
}

impl ActivationFunction {
    /// Element-wise activation. NaN passes through ReLU unchanged.
    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Identity => x,
            ActivationFunction::ReLU => if x < 0.0 { 0.0 } else { x },
        }
    }
}
