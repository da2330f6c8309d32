//! Text weight file: one line per learnable tensor, in declaration order.
//!
//! ```text
//! line 1: layer1.weight   row-major (out, in), comma-separated
//! line 2: layer1.bias
//! line 3: layer2.weight
//! ...
//! ```
//!
//! No header and no shape metadata: the reader reshapes each line using the
//! [`LayerSpec`]s it is given. Values are written with Rust's shortest
//! round-trip `f32` formatting, so `deserialize(serialize(n))` reproduces
//! every weight bit for bit.
//!
//! Lines after the last expected tensor are ignored.

use std::io::{BufRead, Write};

use log::debug;

use crate::{
    error::FormatError,
    layers::dense::Layer,
    math::matrix::Matrix,
    network::{network::Network, spec::LayerSpec},
};

/// Name of the `index`-th tensor (`layer{n}.weight` / `layer{n}.bias`).
pub fn tensor_name(index: usize) -> String {
    let kind = if index % 2 == 0 { "weight" } else { "bias" };
    format!("layer{}.{}", index / 2 + 1, kind)
}

/// Emits `network` as weight-file text.
pub fn serialize(network: &Network) -> String {
    let mut text = String::new();
    for layer in network.layers() {
        text.push_str(&format_line(layer.weights().as_slice()));
        text.push_str(&format_line(layer.biases()));
    }
    text
}

/// Rebuilds a network from weight-file text. `specs` supplies every shape.
pub fn deserialize(text: &str, specs: &[LayerSpec]) -> Result<Network, FormatError> {
    read_weights(text.as_bytes(), specs)
}

pub fn write_weights<W: Write>(network: &Network, writer: &mut W) -> Result<(), FormatError> {
    for layer in network.layers() {
        writer.write_all(format_line(layer.weights().as_slice()).as_bytes())?;
        writer.write_all(format_line(layer.biases()).as_bytes())?;
    }
    Ok(())
}

pub fn read_weights<R: BufRead>(reader: R, specs: &[LayerSpec]) -> Result<Network, FormatError> {
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut layers = Vec::with_capacity(specs.len());

    for (i, spec) in specs.iter().enumerate() {
        let weight_idx = 2 * i;
        line_no += 1;
        let weights = next_tensor(&mut lines, weight_idx, line_no, spec.weight_len())?;
        line_no += 1;
        let biases = next_tensor(&mut lines, weight_idx + 1, line_no, spec.out_features)?;

        let weights = Matrix::from_flat(spec.out_features, spec.in_features, weights)?;
        layers.push(Layer::new(weights, biases, spec.activation)?);
    }

    let extra = lines
        .filter_map(Result::ok)
        .filter(|l| !l.trim().is_empty())
        .count();
    if extra > 0 {
        debug!("weight file: ignoring {} unconsumed line(s) after {} tensors", extra, 2 * specs.len());
    }

    Ok(Network::new(layers)?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// One tensor as a comma-separated line, newline included.
fn format_line(values: &[f32]) -> String {
    let mut line = values.iter().map(f32::to_string).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

fn next_tensor<I>(lines: &mut I, index: usize, line_no: usize, expected: usize) -> Result<Vec<f32>, FormatError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let line = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(FormatError::MissingTensor { tensor: tensor_name(index), line: line_no });
        }
    };

    let values = parse_line(&line, line_no)?;
    if values.len() != expected {
        return Err(FormatError::ElementCount {
            tensor: tensor_name(index),
            line: line_no,
            expected,
            actual: values.len(),
        });
    }
    Ok(values)
}

/// Parses one comma-separated line. A blank line yields no values.
fn parse_line(line: &str, line_no: usize) -> Result<Vec<f32>, FormatError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .enumerate()
        .map(|(col, token)| {
            token.trim().parse::<f32>().map_err(|_| FormatError::InvalidNumber {
                line: line_no,
                column: col + 1,
                token: token.to_string(),
            })
        })
        .collect()
}
