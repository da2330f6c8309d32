//! # iris-bench
//!
//! Command-line front end for the weight interchange and benchmark harness.
//!
//! ## Usage
//! ```bash
//! # Write a randomly initialised 4→64→16→3 weight file
//! iris-bench export --out data/model.txt
//!
//! # Sweep batch sizes × pass counts and write the result table
//! iris-bench bench --weights data/model.txt --data data/iris.csv --out data/inference_times.csv
//!
//! # Compare engine output with logits recorded at training time
//! iris-bench check --weights data/model.txt --reference data/example.csv
//!
//! # Time a separate inference executable over the same sweep
//! iris-bench bench --weights data/model.txt --external ./infer --external-arg data/model.txt
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};

use iris_bench::{
    bench::{metrics, InputSource},
    data,
    engine::reference,
    BenchConfig, DatasetSource, ExternalBackend, InferenceBackend, Matrix, Network, RandomSource,
    TopologyConfig,
};

#[derive(Parser)]
#[command(
    name = "iris-bench",
    about = "Dense-network weight interchange and inference throughput sweeps",
    version
)]
struct Cli {
    /// Path to a JSON benchmark configuration (defaults apply when absent).
    #[arg(short, long, global = true, default_value = "bench.json")]
    config: PathBuf,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a randomly initialised weight file.
    Export {
        #[arg(short, long)]
        out: PathBuf,

        /// Overrides the config seed.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the batch-size × pass-count sweep.
    Bench {
        /// Weight file; a seeded random network is used when omitted.
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Dataset CSV to draw batches from; random rows are used when omitted.
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Where to write the elapsed-seconds table.
        #[arg(short, long, default_value = "inference_times.csv")]
        out: PathBuf,

        /// Also write per-cell throughput metrics as JSON.
        #[arg(long)]
        metrics_json: Option<PathBuf>,

        /// Time cells concurrently.
        #[arg(long)]
        parallel: bool,

        /// Benchmark an external executable instead of the in-process engine.
        #[arg(long)]
        external: Option<PathBuf>,

        /// Argument passed to the external executable (repeatable).
        #[arg(long = "external-arg", requires = "external", allow_hyphen_values = true)]
        external_args: Vec<String>,
    },

    /// Verify engine output against reference logits.
    Check {
        #[arg(short, long)]
        weights: PathBuf,

        /// CSV rows of inputs followed by expected logits.
        #[arg(short, long)]
        reference: PathBuf,

        #[arg(long, default_value_t = iris_bench::engine::reference::DEFAULT_TOLERANCE)]
        tolerance: f32,
    },

    /// Print the arg-max class for every dataset row.
    Predict {
        #[arg(short, long)]
        weights: PathBuf,

        #[arg(short, long)]
        data: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_network(path: &Path, topology: &TopologyConfig) -> anyhow::Result<Network> {
    Network::load_weights(path, topology)
        .with_context(|| format!("loading weights from '{}'", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = BenchConfig::load(&cli.config)?;

    match cli.command {
        Commands::Export { out, seed } => {
            let mut rng = StdRng::seed_from_u64(seed.unwrap_or(config.seed));
            let network = Network::random(&config.topology, &mut rng)?;
            network.save_weights(&out)
                .with_context(|| format!("writing weights to '{}'", out.display()))?;
            println!("wrote {} tensors to {}", 2 * network.layers().len(), out.display());
        }

        Commands::Bench { weights, data: data_path, out, metrics_json, parallel, external, external_args } => {
            let network = match &weights {
                Some(path) => load_network(path, &config.topology)?,
                None => Network::random(&config.topology, &mut StdRng::seed_from_u64(config.seed))?,
            };

            let mut source: Box<dyn InputSource> = match &data_path {
                Some(path) => {
                    let rows = data::load_rows(path, network.input_width())
                        .with_context(|| format!("reading dataset '{}'", path.display()))?;
                    Box::new(DatasetSource::new(rows)?)
                }
                None => Box::new(RandomSource::new(network.input_width(), config.seed)),
            };

            let backend: Box<dyn InferenceBackend + Sync> = match external {
                Some(program) => Box::new(
                    ExternalBackend::new(program, network.input_width(), network.output_width())
                        .with_args(external_args)
                        .with_flops_per_row(network.flops_per_row()),
                ),
                None => Box::new(network),
            };

            let mut options = config.sweep_options();
            options.parallel |= parallel;

            let table = iris_bench::run_sweep_with(
                backend.as_ref(),
                source.as_mut(),
                &config.batch_sizes,
                &config.pass_counts,
                options,
            )?;

            let cells = table.metrics(backend.flops_per_row());
            println!("{}", metrics::summary(&cells));

            table.save_csv(&out)
                .with_context(|| format!("writing results to '{}'", out.display()))?;
            println!("results written to {}", out.display());

            if let Some(path) = metrics_json {
                metrics::save_json(&cells, &path)
                    .with_context(|| format!("writing metrics to '{}'", path.display()))?;
            }
        }

        Commands::Check { weights, reference: ref_path, tolerance } => {
            let network = load_network(&weights, &config.topology)?;
            let samples = reference::load_samples(&ref_path, network.input_width(), network.output_width())
                .with_context(|| format!("reading reference '{}'", ref_path.display()))?;
            let report = reference::verify(&network, &samples, tolerance)?;
            println!(
                "{} samples, max |diff| = {:e} (tolerance {:e})",
                report.samples, report.max_abs_diff, report.tolerance
            );
            if !report.passed() {
                bail!("{} sample(s) outside tolerance: {:?}", report.mismatches.len(), report.mismatches);
            }
            println!("outputs match");
        }

        Commands::Predict { weights, data: data_path } => {
            let network = load_network(&weights, &config.topology)?;
            let rows = data::load_rows(&data_path, network.input_width())
                .with_context(|| format!("reading dataset '{}'", data_path.display()))?;
            let outputs = network.forward(&Matrix::from_rows(rows)?)?;
            for (i, class) in iris_bench::predict_classes(&outputs).into_iter().enumerate() {
                println!("{},{}", i, class);
            }
        }
    }

    Ok(())
}
