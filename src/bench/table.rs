use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::bench::metrics::CellMetrics;

/// One timed sweep cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkEntry {
    pub batch_size: usize,
    pub passes: usize,
    pub elapsed_seconds: f64,
}

/// Elapsed seconds for every (batch size, pass count) cell.
///
/// Rows follow `batch_sizes`, columns follow `pass_counts`, both in the
/// order the sweep was given. A table is only ever built complete.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTable {
    batch_sizes: Vec<usize>,
    pass_counts: Vec<usize>,
    elapsed: Vec<f64>,
}

impl SweepTable {
    pub(crate) fn new(batch_sizes: Vec<usize>, pass_counts: Vec<usize>, elapsed: Vec<f64>) -> SweepTable {
        debug_assert_eq!(elapsed.len(), batch_sizes.len() * pass_counts.len());
        SweepTable { batch_sizes, pass_counts, elapsed }
    }

    pub fn rows(&self) -> usize {
        self.batch_sizes.len()
    }

    pub fn cols(&self) -> usize {
        self.pass_counts.len()
    }

    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }

    pub fn pass_counts(&self) -> &[usize] {
        &self.pass_counts
    }

    /// Elapsed seconds for every pass count at row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.pass_counts.len();
        &self.elapsed[i * n..(i + 1) * n]
    }

    /// Elapsed seconds for a cell, looked up by its keys.
    pub fn get(&self, batch_size: usize, passes: usize) -> Option<f64> {
        let i = self.batch_sizes.iter().position(|&b| b == batch_size)?;
        let j = self.pass_counts.iter().position(|&p| p == passes)?;
        Some(self.elapsed[i * self.pass_counts.len() + j])
    }

    /// All cells in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = BenchmarkEntry> + '_ {
        self.batch_sizes.iter().enumerate().flat_map(move |(i, &batch_size)| {
            self.pass_counts.iter().zip(self.row(i)).map(move |(&passes, &elapsed_seconds)| {
                BenchmarkEntry { batch_size, passes, elapsed_seconds }
            })
        })
    }

    /// Column labels, e.g. `1000_passes`.
    pub fn column_headers(&self) -> Vec<String> {
        self.pass_counts.iter().map(|p| format!("{}_passes", p)).collect()
    }

    pub fn metrics(&self, flops_per_row: u64) -> Vec<CellMetrics> {
        self.entries().map(|e| CellMetrics::from_entry(&e, flops_per_row)).collect()
    }

    /// Writes `batch_size,<p>_passes,...` followed by one row per batch size.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "batch_size,{}", self.column_headers().join(","))?;
        for (i, batch_size) in self.batch_sizes.iter().enumerate() {
            let cells: Vec<String> = self.row(i).iter().map(|s| s.to_string()).collect();
            writeln!(writer, "{},{}", batch_size, cells.join(","))?;
        }
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_csv(&mut writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SweepTable {
        SweepTable::new(vec![1, 6], vec![1, 10, 100], vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6])
    }

    #[test]
    fn lookup_by_keys() {
        let t = table();
        assert_eq!(t.get(6, 10), Some(0.5));
        assert_eq!(t.get(1, 100), Some(0.3));
        assert_eq!(t.get(2, 1), None);
        assert_eq!(t.row(1), &[0.4, 0.5, 0.6]);
    }

    #[test]
    fn entries_are_row_major() {
        let e: Vec<_> = table().entries().collect();
        assert_eq!(e.len(), 6);
        assert_eq!(e[3], BenchmarkEntry { batch_size: 6, passes: 1, elapsed_seconds: 0.4 });
    }

    #[test]
    fn csv_layout() {
        let mut buf = Vec::new();
        table().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "batch_size,1_passes,10_passes,100_passes");
        assert_eq!(lines[1], "1,0.1,0.2,0.3");
        assert_eq!(lines[2], "6,0.4,0.5,0.6");
    }
}
