//! Benchmark configuration loaded from JSON.
//!
//! Every field is optional in the file; missing ones take the defaults below.
//!
//! ```json
//! {
//!   "topology": { "input_width": 4, "hidden1_width": 64, "hidden2_width": 16, "output_width": 3 },
//!   "batch_sizes": [1, 6, 16, 64],
//!   "pass_counts": [1, 10, 100, 1000, 10000],
//!   "parallel": false,
//!   "warmup_passes": 0,
//!   "seed": 42
//! }
//! ```

use std::path::Path;

use log::warn;
use serde::{Serialize, Deserialize};

use crate::{bench::sweep::SweepOptions, error::ConfigError, network::spec::TopologyConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub topology: TopologyConfig,
    pub batch_sizes: Vec<usize>,
    pub pass_counts: Vec<usize>,
    pub parallel: bool,
    pub warmup_passes: usize,
    /// Seed for synthetic weights and random input batches.
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            topology: TopologyConfig::iris(),
            batch_sizes: vec![1, 6, 16, 64],
            pass_counts: vec![1, 10, 100, 1000, 10000],
            parallel: false,
            warmup_passes: 0,
            seed: 42,
        }
    }
}

impl BenchConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<BenchConfig, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("config file '{}' not found, using default configuration", display);
                return Ok(BenchConfig::default());
            }
            Err(source) => return Err(ConfigError::Read { path: display, source }),
        };
        let config: BenchConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: display, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topology.validate().map_err(|e| ConfigError::Invalid(format!("topology: {e}")))?;
        if self.batch_sizes.is_empty() || self.batch_sizes.contains(&0) {
            return Err(ConfigError::Invalid("batch_sizes must be non-empty and positive".into()));
        }
        if self.pass_counts.is_empty() || self.pass_counts.contains(&0) {
            return Err(ConfigError::Invalid("pass_counts must be non-empty and positive".into()));
        }
        Ok(())
    }

    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions { parallel: self.parallel, warmup_passes: self.warmup_passes }
    }
}
