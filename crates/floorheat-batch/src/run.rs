//! Worklist processing.

use floorheat_core::{summarize, FieldStatistics, Grid, InteriorMask};
use floorheat_solver::{BackendKind, RelaxationBackend, SolveConfig, SolveReport};
use rayon::prelude::*;

use crate::error::{Error, Result, SourceError};

/// One building's inputs, ready to solve.
#[derive(Debug)]
pub struct BuildingDomain {
    pub grid: Grid,
    pub mask: InteriorMask,
}

/// Supplier of building domains, keyed by building id.
///
/// Loading lives outside the core: the CLI reads `.npy` files, tests build
/// domains in memory. Implementations must be shareable across workers.
pub trait BuildingSource: Sync {
    fn load(&self, id: &str) -> std::result::Result<BuildingDomain, SourceError>;
}

/// Per-building result record.
#[derive(Debug, Clone)]
pub struct BuildingSummary {
    pub id: String,
    pub stats: FieldStatistics,
    pub report: SolveReport,
}

/// A building whose processing failed; siblings are unaffected.
#[derive(Debug)]
pub struct BuildingFailure {
    pub id: String,
    pub error: Error,
}

/// Everything a batch produced: completed summaries in worklist order plus
/// the isolated failures.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub summaries: Vec<BuildingSummary>,
    pub failures: Vec<BuildingFailure>,
}

/// Configuration for inter-building parallelism.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Process buildings concurrently at all.
    pub enabled: bool,
    /// Minimum worklist size to go parallel (below this, sequential wins).
    pub min_buildings: usize,
    /// Worker cap. None = rayon's global pool size.
    pub threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_buildings: 4,
            threads: None,
        }
    }
}

impl ParallelConfig {
    /// Fully sequential batch processing.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// Configuration for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    pub solve: SolveConfig,
    pub parallel: ParallelConfig,
}

impl BatchConfig {
    pub fn with_solve(mut self, solve: SolveConfig) -> Self {
        self.solve = solve;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Load, solve, and summarize every building in `ids`, in order.
///
/// Each building is independent: its grid is owned by exactly one worker for
/// the duration of the solve, and a failure (load error, precondition
/// violation, empty interior) is recorded in the outcome without aborting
/// the rest of the worklist. Summaries come back in worklist order under
/// both the sequential and the parallel path.
///
/// The GPU backends keep the batch sequential: they serialize on one device
/// queue, so handing them to several workers only adds contention.
pub fn run_batch(
    source: &dyn BuildingSource,
    ids: &[String],
    backend: &dyn RelaxationBackend,
    config: &BatchConfig,
) -> Result<BatchOutcome> {
    config.solve.validate().map_err(Error::Solver)?;

    let device_backend = matches!(
        backend.kind(),
        BackendKind::Device | BackendKind::DeviceFused
    );
    let use_parallel = config.parallel.enabled
        && !device_backend
        && ids.len() >= config.parallel.min_buildings
        && rayon::current_num_threads() > 1;

    let results: Vec<(usize, std::result::Result<BuildingSummary, Error>)> = if use_parallel {
        log::info!(
            "processing {} buildings in parallel on the {} backend ({} workers)",
            ids.len(),
            backend.kind(),
            config
                .parallel
                .threads
                .unwrap_or_else(rayon::current_num_threads)
        );
        let work = |(idx, id): (usize, &String)| {
            (idx, process_building(source, id, backend, &config.solve))
        };
        match config.parallel.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::Source(Box::new(e)))?;
                pool.install(|| ids.par_iter().enumerate().map(work).collect())
            }
            None => ids.par_iter().enumerate().map(work).collect(),
        }
    } else {
        log::info!(
            "processing {} buildings sequentially on the {} backend",
            ids.len(),
            backend.kind()
        );
        ids.iter()
            .enumerate()
            .map(|(idx, id)| (idx, process_building(source, id, backend, &config.solve)))
            .collect()
    };

    let mut outcome = BatchOutcome::default();
    for (idx, result) in results {
        match result {
            Ok(summary) => outcome.summaries.push(summary),
            Err(error) => {
                log::warn!("building {} failed: {}", ids[idx], error);
                outcome.failures.push(BuildingFailure {
                    id: ids[idx].clone(),
                    error,
                });
            }
        }
    }
    Ok(outcome)
}

fn process_building(
    source: &dyn BuildingSource,
    id: &str,
    backend: &dyn RelaxationBackend,
    solve: &SolveConfig,
) -> std::result::Result<BuildingSummary, Error> {
    let BuildingDomain { mut grid, mask } = source.load(id).map_err(Error::Source)?;
    let report = backend.solve(&mut grid, &mask, solve)?;
    let stats = summarize(&grid, &mask)?;
    Ok(BuildingSummary {
        id: id.to_string(),
        stats,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::BackendSelector;

    /// Source generating square all-room domains whose size is the numeric id.
    struct SyntheticSource;

    impl BuildingSource for SyntheticSource {
        fn load(&self, id: &str) -> std::result::Result<BuildingDomain, SourceError> {
            let n: usize = id.parse()?;
            let field = vec![0.0; n * n];
            let grid = Grid::from_interior(&field, n, n, 25.0)?;
            let mask = InteriorMask::all_rooms(n, n)?;
            Ok(BuildingDomain { grid, mask })
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_batch_preserves_worklist_order() {
        let backend = BackendSelector::auto().create_backend().unwrap();
        let config = BatchConfig::default()
            .with_solve(SolveConfig::default().with_max_iter(500).with_tolerance(1e-6));
        let worklist = ids(&["3", "5", "2", "7", "4"]);

        let outcome = run_batch(&SyntheticSource, &worklist, backend.as_ref(), &config).unwrap();
        assert!(outcome.failures.is_empty());
        let got: Vec<&str> = outcome.summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(got, vec!["3", "5", "2", "7", "4"]);

        // Uniform border everywhere: every room converges to 25.
        for summary in &outcome.summaries {
            assert!((summary.stats.mean - 25.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let backend = BackendSelector::auto().create_backend().unwrap();
        let config = BatchConfig::default()
            .with_solve(SolveConfig::default().with_max_iter(100).with_tolerance(1e-6));
        // "bogus" fails to parse; "0" fails the empty-domain precondition.
        let worklist = ids(&["3", "bogus", "0", "4"]);

        let outcome = run_batch(&SyntheticSource, &worklist, backend.as_ref(), &config).unwrap();
        assert_eq!(outcome.summaries.len(), 2);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.summaries[0].id, "3");
        assert_eq!(outcome.summaries[1].id, "4");
        assert_eq!(outcome.failures[0].id, "bogus");
        assert_eq!(outcome.failures[1].id, "0");
    }

    #[test]
    fn test_invalid_solve_config_rejected_up_front() {
        let backend = BackendSelector::auto().create_backend().unwrap();
        let config = BatchConfig::default().with_solve(SolveConfig::default().with_max_iter(0));
        let err = run_batch(&SyntheticSource, &ids(&["3"]), backend.as_ref(), &config);
        assert!(err.is_err());
    }
}
