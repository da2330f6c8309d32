use crate::{error::InferenceError, math::matrix::Matrix, network::network::Network};

/// Something that turns a batch of input rows into a batch of output rows.
///
/// The sweep harness only sees this trait, so the in-process [`Network`] and
/// an external executable can be benchmarked the same way.
pub trait InferenceBackend {
    /// Estimated multiply-add count for one input row, used for FLOP rates.
    fn flops_per_row(&self) -> u64;

    fn infer(&self, batch: &Matrix) -> Result<Matrix, InferenceError>;

    /// Short label for logs and reports.
    fn name(&self) -> &str;
}

impl InferenceBackend for Network {
    fn flops_per_row(&self) -> u64 {
        Network::flops_per_row(self)
    }

    fn infer(&self, batch: &Matrix) -> Result<Matrix, InferenceError> {
        Ok(self.forward(batch)?)
    }

    fn name(&self) -> &str {
        "in-process"
    }
}

/// Arg-max class index for every output row. Ties go to the lowest index;
/// NaN never wins a comparison.
pub fn predict_classes(outputs: &Matrix) -> Vec<usize> {
    outputs.iter_rows().map(argmax).collect()
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f32]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] || (v[best].is_nan() && !x.is_nan()) {
            best = i;
        }
    }
    best
}
