use std::sync::atomic::{AtomicUsize, Ordering};

use iris_bench::{
    bench::metrics, run_sweep, run_sweep_with, DatasetSource, ExternalBackend, InferenceBackend, InferenceError,
    InputSource, Matrix, Network, RandomSource, ShapeError, SweepError, SweepOptions, TopologyConfig,
};
use rand::{rngs::StdRng, SeedableRng};

fn iris_network() -> Network {
    Network::random(&TopologyConfig::iris(), &mut StdRng::seed_from_u64(31)).unwrap()
}

/// Counts calls and fails on a chosen one.
struct FlakyBackend {
    inner: Network,
    calls: AtomicUsize,
    fail_on: usize,
}

impl InferenceBackend for FlakyBackend {
    fn flops_per_row(&self) -> u64 {
        self.inner.flops_per_row()
    }

    fn infer(&self, batch: &Matrix) -> Result<Matrix, InferenceError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_on {
            return Err(ShapeError::EmptyBatch.into());
        }
        Ok(self.inner.forward(batch)?)
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

#[test]
fn two_by_two_sweep() {
    let table = run_sweep(&iris_network(), &mut RandomSource::new(4, 3), &[1, 6], &[1, 10]).unwrap();
    assert_eq!(table.rows(), 2);
    assert_eq!(table.cols(), 2);
    for e in table.entries() {
        assert!(e.elapsed_seconds >= 0.0);
    }
    assert!(table.get(6, 10).is_some());
}

#[test]
fn dataset_source_drives_the_sweep() {
    let rows = vec![vec![5.1, 3.5, 1.4, 0.2], vec![7.0, 3.2, 4.7, 1.4], vec![6.3, 3.3, 6.0, 2.5]];
    let mut source = DatasetSource::new(rows).unwrap();
    let table = run_sweep(&iris_network(), &mut source, &[1, 6, 16], &[1, 5]).unwrap();
    assert_eq!(table.batch_sizes(), &[1, 6, 16]);
}

#[test]
fn more_passes_take_longer_on_average() {
    let net = iris_network();
    let mut short = 0.0;
    let mut long = 0.0;
    for seed in 0..5 {
        let table = run_sweep(&net, &mut RandomSource::new(4, seed), &[6], &[1, 1000]).unwrap();
        short += table.get(6, 1).unwrap();
        long += table.get(6, 1000).unwrap();
    }
    assert!(long > short, "1000 passes ({long}s) should exceed 1 pass ({short}s)");
}

#[test]
fn mid_sweep_failure_aborts_everything() {
    let backend = FlakyBackend { inner: iris_network(), calls: AtomicUsize::new(0), fail_on: 5 };
    // Calls: cell (1,1)=1, cell (1,10)=10 -> the sixth call lands inside cell (1,10).
    let err = run_sweep(&backend, &mut RandomSource::new(4, 0), &[1, 6], &[1, 10]).unwrap_err();
    match err {
        SweepError::Inference { batch_size, passes, source } => {
            assert_eq!((batch_size, passes), (1, 10));
            assert!(matches!(source, InferenceError::Shape(ShapeError::EmptyBatch)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 6);
}

#[test]
fn parallel_failure_also_aborts() {
    let backend = FlakyBackend { inner: iris_network(), calls: AtomicUsize::new(0), fail_on: 0 };
    let options = SweepOptions { parallel: true, warmup_passes: 0 };
    let res = run_sweep_with(&backend, &mut RandomSource::new(4, 0), &[1, 6], &[1, 10], options);
    assert!(matches!(res, Err(SweepError::Inference { .. })));
}

#[test]
fn source_failure_is_fatal() {
    struct Dry;
    impl InputSource for Dry {
        fn width(&self) -> usize {
            4
        }
        fn draw(&mut self, _batch_size: usize) -> Result<Matrix, ShapeError> {
            Err(ShapeError::ZeroDimension)
        }
    }
    let err = run_sweep(&iris_network(), &mut Dry, &[3], &[1]).unwrap_err();
    assert!(matches!(err, SweepError::Source { batch_size: 3, .. }));
}

#[test]
fn derived_metrics_cover_every_cell() {
    let net = iris_network();
    let table = run_sweep(&net, &mut RandomSource::new(4, 4), &[1, 6], &[10, 100]).unwrap();
    let cells = table.metrics(net.flops_per_row());
    assert_eq!(cells.len(), 4);
    for (cell, entry) in cells.iter().zip(table.entries()) {
        assert_eq!(cell.elapsed_seconds, entry.elapsed_seconds);
        assert_eq!(cell.gflops, metrics::flop_rate(2656, entry.batch_size, entry.passes, entry.elapsed_seconds) * 1e-9);
    }
}

#[cfg(unix)]
#[test]
fn external_backend_is_swept_like_the_engine() {
    let backend = ExternalBackend::new("/bin/sh", 4, 4).with_args(["-c", "cat"]);
    let table = run_sweep(&backend, &mut RandomSource::new(4, 6), &[1, 6], &[1, 2]).unwrap();
    assert_eq!((table.rows(), table.cols()), (2, 2));
    assert!(table.entries().all(|e| e.elapsed_seconds > 0.0));
}

#[cfg(unix)]
#[test]
fn failing_external_backend_aborts_the_sweep() {
    let backend = ExternalBackend::new("/bin/sh", 4, 3).with_args(["-c", "cat >/dev/null; exit 1"]);
    let err = run_sweep(&backend, &mut RandomSource::new(4, 6), &[1, 6], &[1]).unwrap_err();
    assert!(matches!(
        err,
        SweepError::Inference { batch_size: 1, passes: 1, source: InferenceError::Process { .. } }
    ));
}
