//! Benchmark driver
//!
//! Runs two fork-join trials over the same fixed-iteration workload:
//! one worker per physical core pinned to each core's first hardware
//! thread, then one worker per logical processing unit. Reports elapsed
//! wall time and a derived throughput figure for each.

mod config;
mod report;

pub use config::{BenchConfig, LogicalMapping, DEFAULT_N_WORK};
pub use report::BenchReport;

use std::thread;
use std::time::{Duration, Instant};

use crate::pin::{CorePinner, CpuBinder, PinError};
use crate::topology::Topology;

/// Timing of a single trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialResult {
    /// Workers spawned, one per target processing unit
    pub workers: usize,
    /// Wall time of the whole parallel region, spawn to last join
    pub elapsed: Duration,
}

impl TrialResult {
    /// Aggregate throughput in units of 1e9 loop iterations per second
    pub fn giga_ops(&self, n_work: u64) -> f64 {
        (n_work as f64 * self.workers as f64 / 1e9) / self.elapsed.as_secs_f64()
    }
}

/// Run one timed trial: spawn `workers` fresh threads, pin each via
/// `map(ordinal)`, run the accumulation loop, join them all.
///
/// Any worker's pin failure fails the whole trial; there are no
/// retries. Workers are spawned fresh per trial, so every trial re-pins
/// from a clean slate rather than inheriting earlier bindings.
pub fn run_trial<B, M>(
    topology: &Topology,
    binder: &B,
    workers: usize,
    n_work: u64,
    map: M,
) -> Result<TrialResult, PinError>
where
    B: CpuBinder + Sync,
    M: Fn(usize) -> (usize, usize) + Sync,
{
    let pinner = CorePinner::new(topology, binder);
    let start = Instant::now();

    thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|ordinal| {
                let pinner = &pinner;
                let map = &map;
                s.spawn(move || -> Result<(), PinError> {
                    let (core_index, logical_index) = map(ordinal);
                    pinner.pin(core_index, logical_index)?;
                    work_loop(n_work);
                    Ok(())
                })
            })
            .collect();

        // Join is the barrier: the trial ends when the last worker does
        handles.into_iter().try_for_each(|h| match h.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        })
    })?;

    let elapsed = start.elapsed();
    tracing::debug!(workers, ?elapsed, "trial complete");

    Ok(TrialResult { workers, elapsed })
}

/// Run both trials and assemble the report.
pub fn run<B: CpuBinder + Sync>(
    topology: &Topology,
    binder: &B,
    config: &BenchConfig,
) -> Result<BenchReport, PinError> {
    let physical_cores = topology.physical_core_count();
    let logical_cores = topology.logical_unit_count();

    // Physical trial: one worker per core, always on sibling 0
    let phys = run_trial(topology, binder, physical_cores, config.n_work, |w| (w, 0))?;

    // Logical trial: one worker per hardware thread
    let logical = run_trial(topology, binder, logical_cores, config.n_work, |w| {
        config.logical_mapping.decompose(w, topology)
    })?;

    Ok(BenchReport {
        physical_cores,
        logical_cores,
        t_phys: phys.elapsed.as_secs_f64(),
        t_logical: logical.elapsed.as_secs_f64(),
        gflops_phys: phys.giga_ops(config.n_work),
        gflops_logical: logical.giga_ops(config.n_work),
    })
}

// Fixed-count accumulation loop: no cross-iteration data dependency
// beyond the accumulator, result discarded through black_box so the
// loop is not optimized away.
fn work_loop(n_work: u64) {
    let mut sum: u64 = 0;
    for i in 0..n_work {
        sum = sum.wrapping_add(i);
    }
    std::hint::black_box(sum);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::test_support::RecordingBinder;

    const TEST_N_WORK: u64 = 10_000;

    #[test]
    fn test_physical_trial_worker_count() {
        let topology = Topology::mock(&[2, 2]);
        let binder = RecordingBinder::default();

        let trial =
            run_trial(&topology, &binder, topology.physical_core_count(), TEST_N_WORK, |w| {
                (w, 0)
            })
            .unwrap();

        assert_eq!(trial.workers, 2);
        assert_eq!(binder.bind_count(), 2);
        // Each core's first hardware thread
        assert_eq!(binder.bound_cpus(), vec![0, 2]);
    }

    #[test]
    fn test_logical_trial_worker_count() {
        let topology = Topology::mock(&[2, 2]);
        let binder = RecordingBinder::default();
        let config = BenchConfig {
            n_work: TEST_N_WORK,
            ..BenchConfig::default()
        };

        let trial = run_trial(
            &topology,
            &binder,
            topology.logical_unit_count(),
            config.n_work,
            |w| config.logical_mapping.decompose(w, &topology),
        )
        .unwrap();

        assert_eq!(trial.workers, 4);
        assert_eq!(binder.bind_count(), 4);
        assert_eq!(binder.bound_cpus(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_elapsed_strictly_positive() {
        let topology = Topology::mock(&[2, 2]);
        let binder = RecordingBinder::default();

        let trial = run_trial(&topology, &binder, 2, TEST_N_WORK, |w| (w, 0)).unwrap();
        assert!(trial.elapsed > Duration::ZERO);
    }

    #[test]
    fn test_run_reports_both_trials() {
        let topology = Topology::mock(&[2, 2]);
        let binder = RecordingBinder::default();
        let config = BenchConfig {
            n_work: TEST_N_WORK,
            ..BenchConfig::default()
        };

        let report = run(&topology, &binder, &config).unwrap();

        assert_eq!(report.physical_cores, 2);
        assert_eq!(report.logical_cores, 4);
        assert!(report.t_phys > 0.0);
        assert!(report.t_logical > 0.0);
        assert!(report.gflops_phys > 0.0);
        assert!(report.gflops_logical > 0.0);
        // 2 physical binds + 4 logical binds
        assert_eq!(binder.bind_count(), 6);
    }

    #[test]
    fn test_modulo_mapping_faults_on_mismatched_topology() {
        // 3 cores with 2 hardware threads each: the modulo mapping
        // asks for sibling index 2 and the trial must fail, not bind a
        // wrong unit.
        let topology = Topology::mock(&[2, 2, 2]);
        let binder = RecordingBinder::default();
        let config = BenchConfig {
            n_work: TEST_N_WORK,
            ..BenchConfig::default()
        };

        let err = run_trial(
            &topology,
            &binder,
            topology.logical_unit_count(),
            config.n_work,
            |w| config.logical_mapping.decompose(w, &topology),
        )
        .unwrap_err();

        assert!(matches!(err, PinError::LogicalIndexOutOfRange { .. }));
    }

    #[test]
    fn test_per_core_siblings_covers_every_unit() {
        let topology = Topology::mock(&[2, 1, 3]);
        let binder = RecordingBinder::default();
        let mapping = LogicalMapping::PerCoreSiblings;

        let trial = run_trial(
            &topology,
            &binder,
            topology.logical_unit_count(),
            TEST_N_WORK,
            |w| mapping.decompose(w, &topology),
        )
        .unwrap();

        assert_eq!(trial.workers, 6);
        assert_eq!(binder.bound_cpus(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_giga_ops() {
        let trial = TrialResult {
            workers: 4,
            elapsed: Duration::from_secs(2),
        };
        let giga_ops = trial.giga_ops(1_000_000_000);
        assert!((giga_ops - 2.0).abs() < 1e-9);
    }
}
