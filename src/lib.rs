pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod store;
pub mod engine;
pub mod data;
pub mod bench;
pub mod config;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{LayerSpec, Network, TopologyConfig};
pub use store::{deserialize, serialize};
pub use engine::{predict_classes, ExternalBackend, InferenceBackend};
pub use bench::{run_sweep, run_sweep_with, DatasetSource, InputSource, RandomSource, SweepOptions, SweepTable};
pub use config::BenchConfig;
pub use error::{ConfigError, DataError, FormatError, InferenceError, ShapeError, SweepError};
