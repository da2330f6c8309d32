//! Error types shared across the weight store, the engine and the sweep harness.

use thiserror::Error;

/// Shape violations: bad input widths, broken layer adjacency, ragged data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("batch must contain at least one row")]
    EmptyBatch,

    #[error("row {row} has width {actual}, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("layer {layer} expects {expected} inputs but previous layer produces {actual}")]
    Adjacency {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("bias has {actual} elements, expected {expected}")]
    BiasLength { expected: usize, actual: usize },

    #[error("buffer holds {actual} values, a {rows}x{cols} matrix needs {}", .rows * .cols)]
    DataLength {
        rows: usize,
        cols: usize,
        actual: usize,
    },

    #[error("rows have differing widths ({first} vs {other})")]
    RaggedRows { first: usize, other: usize },

    #[error("dimension must be non-zero")]
    ZeroDimension,

    #[error("topology must contain at least one layer")]
    EmptyTopology,
}

/// Malformed, truncated or mis-shaped weight file.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("missing tensor '{tensor}' (expected on line {line})")]
    MissingTensor { tensor: String, line: usize },

    #[error("tensor '{tensor}' on line {line} has {actual} values, expected {expected}")]
    ElementCount {
        tensor: String,
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("line {line}, column {column}: '{token}' is not a valid number")]
    InvalidNumber {
        line: usize,
        column: usize,
        token: String,
    },

    #[error("tensor rejected by layer construction: {0}")]
    Shape(#[from] ShapeError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single `infer` call on any backend.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("malformed backend output: {0}")]
    Format(#[from] FormatError),

    #[error("external backend '{command}' failed: {detail}")]
    Process { command: String, detail: String },
}

/// Fatal error that aborts a whole sweep. No partial table survives it.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("cell (batch_size={batch_size}, passes={passes}) failed: {source}")]
    Inference {
        batch_size: usize,
        passes: usize,
        #[source]
        source: InferenceError,
    },

    #[error("input source could not supply a batch of {batch_size}: {detail}")]
    Source { batch_size: usize, detail: String },

    #[error("sweep axis '{0}' must be non-empty and contain only positive values")]
    EmptyAxis(&'static str),
}

/// Dataset CSV problems.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("row {row}, column {column}: '{token}' is not a valid number")]
    InvalidNumber {
        row: usize,
        column: usize,
        token: String,
    },

    #[error("row {row} has {actual} numeric columns, expected {expected}")]
    Width {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("dataset contains no data rows")]
    Empty,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Config file read/parse problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
