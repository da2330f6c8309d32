//! Cross-checks an engine against outputs recorded by the training side.
//!
//! The file is read as one flat stream of numbers: each sample is
//! `input_width` inputs followed by `output_width` expected logits. Line
//! breaks are not significant, so both the exported two-line form
//!
//! ```text
//! 5.1,3.5,1.4,0.2
//! 2.31,-0.87,-4.02
//! ```
//!
//! and one sample per line are accepted.

use std::path::Path;

use log::{info, warn};

use crate::{
    data::csv,
    engine::backend::InferenceBackend,
    error::{DataError, InferenceError},
    math::matrix::Matrix,
};

/// Default absolute tolerance between reference and computed logits.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSample {
    pub input: Vec<f32>,
    pub expected: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct ReferenceReport {
    pub samples: usize,
    pub max_abs_diff: f32,
    pub tolerance: f32,
    /// Indices of samples whose worst element exceeds the tolerance.
    pub mismatches: Vec<usize>,
}

impl ReferenceReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Cuts a flat value stream into reference samples.
pub fn samples_from_values(
    values: &[f32],
    input_width: usize,
    output_width: usize,
) -> Result<Vec<ReferenceSample>, DataError> {
    let stride = input_width + output_width;
    if values.is_empty() || stride == 0 {
        return Err(DataError::Empty);
    }
    let leftover = values.len() % stride;
    if leftover != 0 {
        return Err(DataError::Width { row: values.len() / stride + 1, expected: stride, actual: leftover });
    }
    Ok(values
        .chunks_exact(stride)
        .map(|chunk| {
            let (input, expected) = chunk.split_at(input_width);
            ReferenceSample { input: input.to_vec(), expected: expected.to_vec() }
        })
        .collect())
}

/// Parses reference text, skipping blank lines and a leading header.
pub fn parse_samples(
    text: &str,
    input_width: usize,
    output_width: usize,
) -> Result<Vec<ReferenceSample>, DataError> {
    let values = csv::parse_values(text)?;
    samples_from_values(&values, input_width, output_width)
}

pub fn load_samples<P: AsRef<Path>>(
    path: P,
    input_width: usize,
    output_width: usize,
) -> Result<Vec<ReferenceSample>, DataError> {
    let text = std::fs::read_to_string(path)?;
    parse_samples(&text, input_width, output_width)
}

/// Runs every sample through `backend` in one batch and compares logits.
pub fn verify<B: InferenceBackend + ?Sized>(
    backend: &B,
    samples: &[ReferenceSample],
    tolerance: f32,
) -> Result<ReferenceReport, InferenceError> {
    let batch = Matrix::from_rows(samples.iter().map(|s| s.input.clone()).collect())?;
    let outputs = backend.infer(&batch)?;

    let mut max_abs_diff = 0.0f32;
    let mut mismatches = Vec::new();
    for (i, (sample, got)) in samples.iter().zip(outputs.iter_rows()).enumerate() {
        let worst = sample.expected.iter()
            .zip(got)
            .map(|(e, g)| (e - g).abs())
            .fold(0.0f32, |acc, d| if d.is_nan() || d > acc { d } else { acc });
        if worst.is_nan() || worst > tolerance {
            warn!("reference sample {}: expected {:?}, got {:?}", i, sample.expected, got);
            mismatches.push(i);
        }
        if worst.is_nan() || worst > max_abs_diff {
            max_abs_diff = worst;
        }
    }

    info!(
        "{}: {} reference samples, max |diff| = {:e}, {} mismatches",
        backend.name(),
        samples.len(),
        max_abs_diff,
        mismatches.len()
    );
    Ok(ReferenceReport { samples: samples.len(), max_abs_diff, tolerance, mismatches })
}
