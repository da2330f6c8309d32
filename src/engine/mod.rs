pub mod backend;
pub mod external;
pub mod reference;

pub use backend::{predict_classes, InferenceBackend};
pub use external::ExternalBackend;
