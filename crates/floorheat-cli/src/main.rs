//! Floorheat command-line interface.
//!
//! Batch-processes a directory of floorplan data sets and prints one CSV
//! row of summary statistics per building.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use floorheat_batch::{run_batch, BackendSelector, BatchConfig, BatchOutcome, ParallelConfig};
use floorheat_solver::{BackendKind, SolveConfig, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE};

mod npy;
use npy::NpyDirectorySource;

#[derive(Parser)]
#[command(name = "floorheat")]
#[command(about = "Steady-state heat simulation over building floorplans", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory with building_ids.txt and per-building .npy files
    #[arg(value_name = "DATA_DIR")]
    data_dir: PathBuf,

    /// Number of buildings to process from the worklist
    #[arg(short = 'n', long = "count", default_value_t = 10)]
    count: usize,

    /// Maximum sweeps per building
    #[arg(long, default_value_t = DEFAULT_MAX_ITER)]
    max_iter: usize,

    /// Convergence tolerance for backends that support early exit
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Always run the full iteration budget, never exit early
    #[arg(long)]
    no_early_exit: bool,

    /// Relaxation backend: auto, scalar, threads, device, or device-fused
    #[arg(long, default_value = "auto")]
    backend: String,

    /// Process buildings one at a time instead of in parallel
    #[arg(long)]
    sequential_batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let selector = parse_backend(&cli.backend)?;
    let backend = selector.create_backend()?;

    let source = NpyDirectorySource::new(cli.data_dir.clone());
    let ids = source
        .read_worklist(cli.count)
        .with_context(|| format!("failed to read worklist in {}", cli.data_dir.display()))?;
    if ids.is_empty() {
        bail!("worklist in {} is empty", cli.data_dir.display());
    }

    let mut solve = SolveConfig::default()
        .with_max_iter(cli.max_iter)
        .with_tolerance(cli.tolerance);
    if cli.no_early_exit {
        solve = solve.without_early_exit();
    }
    let parallel = if cli.sequential_batch {
        ParallelConfig::sequential()
    } else {
        ParallelConfig::default()
    };
    let config = BatchConfig::default()
        .with_solve(solve)
        .with_parallel(parallel);

    if cli.verbose {
        eprintln!("Backend: {}", backend.kind());
        eprintln!("Buildings: {}", ids.len());
        eprintln!("Max iterations: {}", cli.max_iter);
        match solve.tolerance {
            Some(tol) => eprintln!("Tolerance: {tol:e}"),
            None => eprintln!("Tolerance: disabled"),
        }
    }

    let outcome = run_batch(&source, &ids, backend.as_ref(), &config)?;
    print_report(&outcome, cli.verbose);

    if outcome.summaries.is_empty() {
        bail!("all {} buildings failed", outcome.failures.len());
    }
    Ok(())
}

fn parse_backend(name: &str) -> Result<BackendSelector> {
    match name.to_lowercase().as_str() {
        "auto" => Ok(BackendSelector::auto()),
        "scalar" => Ok(BackendSelector::scalar_only()),
        "threads" => Ok(BackendSelector::prefer(BackendKind::Threads)),
        "device" => Ok(BackendSelector::prefer(BackendKind::Device)),
        "device-fused" | "fused" => Ok(BackendSelector::prefer(BackendKind::DeviceFused)),
        other => bail!("unknown backend '{other}' (expected auto, scalar, threads, device, or device-fused)"),
    }
}

fn print_report(outcome: &BatchOutcome, verbose: bool) {
    println!("building_id,mean_temp,std_temp,pct_above_18,pct_below_15");
    for summary in &outcome.summaries {
        println!(
            "{},{:.4},{:.4},{:.2},{:.2}",
            summary.id,
            summary.stats.mean,
            summary.stats.std_dev,
            summary.stats.pct_above_18,
            summary.stats.pct_below_15
        );
        if verbose {
            eprintln!(
                "{}: {} sweeps, final delta {:.3e}{}",
                summary.id,
                summary.report.iterations,
                summary.report.last_delta,
                if summary.report.converged() {
                    ""
                } else {
                    " (iteration budget reached)"
                }
            );
        }
    }
    for failure in &outcome.failures {
        eprintln!("error: building {}: {}", failure.id, failure.error);
    }
}
