pub mod metrics;
pub mod source;
pub mod sweep;
pub mod table;

pub use metrics::CellMetrics;
pub use source::{DatasetSource, InputSource, RandomSource};
pub use sweep::{run_sweep, run_sweep_with, SweepOptions};
pub use table::{BenchmarkEntry, SweepTable};
