use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::{
    bench::{source::InputSource, table::SweepTable},
    engine::backend::InferenceBackend,
    error::{InferenceError, SweepError},
    math::matrix::Matrix,
};

/// How a sweep is executed.
///
/// # Fields
/// - `parallel`      — time independent cells concurrently on the rayon pool;
///                     each cell reads its own clock
/// - `warmup_passes` — untimed passes run before each cell's timed loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOptions {
    pub parallel: bool,
    pub warmup_passes: usize,
}

/// Sequential sweep with no warm-up.
pub fn run_sweep<B, S>(
    backend: &B,
    source: &mut S,
    batch_sizes: &[usize],
    pass_counts: &[usize],
) -> Result<SweepTable, SweepError>
where
    B: InferenceBackend + Sync + ?Sized,
    S: InputSource + ?Sized,
{
    run_sweep_with(backend, source, batch_sizes, pass_counts, SweepOptions::default())
}

/// Times `backend` over every (batch size × pass count) cell.
///
/// One batch is drawn per batch size, in the given order, before any of its
/// cells are timed; batch construction is never inside the timed region.
/// The first failing cell aborts the sweep and no table is returned.
pub fn run_sweep_with<B, S>(
    backend: &B,
    source: &mut S,
    batch_sizes: &[usize],
    pass_counts: &[usize],
    options: SweepOptions,
) -> Result<SweepTable, SweepError>
where
    B: InferenceBackend + Sync + ?Sized,
    S: InputSource + ?Sized,
{
    if batch_sizes.is_empty() || batch_sizes.contains(&0) {
        return Err(SweepError::EmptyAxis("batch_sizes"));
    }
    if pass_counts.is_empty() || pass_counts.contains(&0) {
        return Err(SweepError::EmptyAxis("pass_counts"));
    }

    info!(
        "sweep on {}: batch sizes {:?} x pass counts {:?} ({})",
        backend.name(),
        batch_sizes,
        pass_counts,
        if options.parallel { "parallel" } else { "sequential" },
    );
    let t_start = Instant::now();

    let elapsed = if options.parallel {
        let batches = batch_sizes.iter()
            .map(|&n| draw(source, n))
            .collect::<Result<Vec<_>, _>>()?;

        let cells: Vec<(usize, usize)> = (0..batch_sizes.len())
            .flat_map(|i| (0..pass_counts.len()).map(move |j| (i, j)))
            .collect();

        cells.par_iter()
            .map(|&(i, j)| run_cell(backend, &batches[i], pass_counts[j], options.warmup_passes))
            .collect::<Result<Vec<f64>, SweepError>>()?
    } else {
        let mut elapsed = Vec::with_capacity(batch_sizes.len() * pass_counts.len());
        for &n in batch_sizes {
            let batch = draw(source, n)?;
            for &passes in pass_counts {
                elapsed.push(run_cell(backend, &batch, passes, options.warmup_passes)?);
            }
        }
        elapsed
    };

    info!("sweep finished in {:.3}s", t_start.elapsed().as_secs_f64());
    Ok(SweepTable::new(batch_sizes.to_vec(), pass_counts.to_vec(), elapsed))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn draw<S: InputSource + ?Sized>(source: &mut S, batch_size: usize) -> Result<Matrix, SweepError> {
    let batch = source.draw(batch_size).map_err(|e| SweepError::Source {
        batch_size,
        detail: e.to_string(),
    })?;
    debug!("drew batch of {} rows x {} features", batch.rows(), batch.cols());
    Ok(batch)
}

fn run_cell<B>(backend: &B, batch: &Matrix, passes: usize, warmup: usize) -> Result<f64, SweepError>
where
    B: InferenceBackend + ?Sized,
{
    let fail = |source: InferenceError| SweepError::Inference {
        batch_size: batch.rows(),
        passes,
        source,
    };

    for _ in 0..warmup {
        backend.infer(batch).map_err(fail)?;
    }

    let elapsed = time_passes(backend, batch, passes).map_err(fail)?;
    info!(
        "  batch {:>5} | {:>7} passes | {:.6}s",
        batch.rows(),
        passes,
        elapsed,
    );
    Ok(elapsed)
}

/// Wall-clock seconds for `passes` sequential inference calls.
fn time_passes<B>(backend: &B, batch: &Matrix, passes: usize) -> Result<f64, InferenceError>
where
    B: InferenceBackend + ?Sized,
{
    let start = Instant::now();
    for _ in 0..passes {
        let out = backend.infer(batch)?;
        std::hint::black_box(out);
    }
    Ok(start.elapsed().as_secs_f64())
}
