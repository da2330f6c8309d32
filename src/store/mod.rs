pub mod weights;

pub use weights::{deserialize, read_weights, serialize, write_weights};
