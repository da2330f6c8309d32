//! Derived throughput figures. None of this is stored in the raw table; it
//! is computed from it on demand.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::bench::table::BenchmarkEntry;

/// Forward passes per second. Zero when no time was measured.
pub fn throughput(passes: usize, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    passes as f64 / elapsed_seconds
}

/// Estimated floating-point operations per second:
/// `flops_per_row × batch_size × passes / elapsed`.
pub fn flop_rate(flops_per_row: u64, batch_size: usize, passes: usize, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    flops_per_row as f64 * batch_size as f64 * passes as f64 / elapsed_seconds
}

/// One sweep cell with its derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellMetrics {
    pub batch_size: usize,
    pub passes: usize,
    pub elapsed_seconds: f64,
    pub passes_per_second: f64,
    pub rows_per_second: f64,
    pub gflops: f64,
}

impl CellMetrics {
    pub fn from_entry(entry: &BenchmarkEntry, flops_per_row: u64) -> CellMetrics {
        let passes_per_second = throughput(entry.passes, entry.elapsed_seconds);
        CellMetrics {
            batch_size: entry.batch_size,
            passes: entry.passes,
            elapsed_seconds: entry.elapsed_seconds,
            passes_per_second,
            rows_per_second: passes_per_second * entry.batch_size as f64,
            gflops: flop_rate(flops_per_row, entry.batch_size, entry.passes, entry.elapsed_seconds) * 1e-9,
        }
    }
}

/// Human-readable table for CLI output.
pub fn summary(metrics: &[CellMetrics]) -> String {
    let mut out = format!(
        "{:>10} {:>10} {:>14} {:>14} {:>14} {:>10}\n",
        "batch", "passes", "elapsed (s)", "passes/s", "rows/s", "GFLOP/s",
    );
    out.push_str(&"-".repeat(77));
    out.push('\n');
    for m in metrics {
        out.push_str(&format!(
            "{:>10} {:>10} {:>14.6} {:>14.1} {:>14.1} {:>10.4}\n",
            m.batch_size, m.passes, m.elapsed_seconds, m.passes_per_second, m.rows_per_second, m.gflops,
        ));
    }
    out
}

/// Writes the metrics as pretty-printed JSON.
pub fn save_json<P: AsRef<Path>>(metrics: &[CellMetrics], path: P) -> std::io::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, metrics)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_elapsed_yields_zero_rates() {
        assert_eq!(throughput(10, 0.0), 0.0);
        assert_eq!(flop_rate(100, 1, 10, 0.0), 0.0);
    }

    #[test]
    fn iris_flop_rate() {
        // 2 × (4·64 + 64·16 + 16·3) = 2656 flops per row
        let rate = flop_rate(2656, 6, 1000, 0.5);
        assert_relative_eq!(rate, 2656.0 * 6.0 * 1000.0 / 0.5);
    }

    #[test]
    fn cell_metrics_derive_from_entry() {
        let entry = BenchmarkEntry { batch_size: 4, passes: 100, elapsed_seconds: 0.25 };
        let m = CellMetrics::from_entry(&entry, 1000);
        assert_relative_eq!(m.passes_per_second, 400.0);
        assert_relative_eq!(m.rows_per_second, 1600.0);
        assert_relative_eq!(m.gflops, 1.6e-3, max_relative = 1e-12);
    }

    #[test]
    fn summary_lists_every_cell() {
        let entry = BenchmarkEntry { batch_size: 1, passes: 10, elapsed_seconds: 0.1 };
        let s = summary(&[CellMetrics::from_entry(&entry, 10)]);
        assert!(s.contains("GFLOP/s"));
        assert_eq!(s.lines().count(), 3);
    }
}
