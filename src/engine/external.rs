//! Backend that shells out to a separate inference executable.
//!
//! Protocol: the batch is written to the child's stdin as CSV, one row per
//! line. The child prints one CSV row of `output_width` values per input row
//! on stdout and exits with status 0.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::debug;

use crate::{
    engine::backend::InferenceBackend,
    error::{FormatError, InferenceError, ShapeError},
    math::matrix::Matrix,
};

#[derive(Debug, Clone)]
pub struct ExternalBackend {
    program: PathBuf,
    args: Vec<String>,
    input_width: usize,
    output_width: usize,
    flops_per_row: u64,
    label: String,
}

impl ExternalBackend {
    pub fn new(program: impl Into<PathBuf>, input_width: usize, output_width: usize) -> ExternalBackend {
        let program = program.into();
        let label = format!("external:{}", program.display());
        ExternalBackend {
            program,
            args: Vec::new(),
            input_width,
            output_width,
            flops_per_row: 0,
            label,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the per-row FLOP estimate reported to the sweep harness.
    pub fn with_flops_per_row(mut self, flops: u64) -> Self {
        self.flops_per_row = flops;
        self
    }

    fn process_error(&self, detail: impl Into<String>) -> InferenceError {
        InferenceError::Process {
            command: self.program.display().to_string(),
            detail: detail.into(),
        }
    }

    fn parse_output(&self, stdout: &str, expected_rows: usize) -> Result<Matrix, InferenceError> {
        let mut data = Vec::with_capacity(expected_rows * self.output_width);
        let mut rows = 0;
        for (idx, line) in stdout.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let line_no = idx + 1;
            let mut count = 0;
            for (col, token) in line.split(',').enumerate() {
                let value = token.trim().parse::<f32>().map_err(|_| FormatError::InvalidNumber {
                    line: line_no,
                    column: col + 1,
                    token: token.to_string(),
                })?;
                data.push(value);
                count += 1;
            }
            if count != self.output_width {
                return Err(FormatError::ElementCount {
                    tensor: format!("output row {}", idx),
                    line: line_no,
                    expected: self.output_width,
                    actual: count,
                }
                .into());
            }
            rows += 1;
        }
        if rows != expected_rows {
            return Err(self.process_error(format!("returned {} rows for a batch of {}", rows, expected_rows)));
        }
        Ok(Matrix::from_flat(rows, self.output_width, data)?)
    }
}

impl InferenceBackend for ExternalBackend {
    fn flops_per_row(&self) -> u64 {
        self.flops_per_row
    }

    fn infer(&self, batch: &Matrix) -> Result<Matrix, InferenceError> {
        if batch.rows() == 0 {
            return Err(ShapeError::EmptyBatch.into());
        }
        if batch.cols() != self.input_width {
            return Err(ShapeError::RowWidth { row: 0, expected: self.input_width, actual: batch.cols() }.into());
        }

        let mut payload = String::new();
        for row in batch.iter_rows() {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            payload.push_str(&cells.join(","));
            payload.push('\n');
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.process_error(format!("spawn failed: {e}")))?;

        let mut stdin = child.stdin.take().ok_or_else(|| self.process_error("stdin not captured"))?;

        // The child may fill its stdout pipe before it has read all of stdin.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || {
                let res = stdin.write_all(payload.as_bytes());
                drop(stdin);
                res
            });
            let output = child.wait_with_output();
            let written = writer.join();
            (output, written)
        });

        let output = output.map_err(|e| self.process_error(format!("wait failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.process_error(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        // A child that exits without reading all of stdin is judged by its output.
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("{}: child closed stdin early", self.label);
            }
            Ok(Err(e)) => return Err(self.process_error(format!("writing stdin failed: {e}"))),
            Err(_) => return Err(self.process_error("stdin writer panicked")),
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{}: {} bytes of output for {} rows", self.label, stdout.len(), batch.rows());
        self.parse_output(&stdout, batch.rows())
    }

    fn name(&self) -> &str {
        &self.label
    }
}
