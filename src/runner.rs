use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{ensure, Result};

use crate::client::Client;
use crate::db::Db;
use crate::generator::batched::{batch_size_for, BatchedCounterGenerator};
use crate::properties::Properties;
use crate::workload::{CoreWorkload, CoreWorkloadConfig};

/// Outcome of one phase across all workers.
#[derive(Debug, Clone, Copy)]
pub struct PhaseSummary {
    /// Operations attempted.
    pub ops: u64,
    /// Operations that succeeded.
    pub succeeded: u64,
    /// Wall time of the phase.
    pub elapsed: Duration,
}

impl PhaseSummary {
    /// Successful operations per second.
    pub fn throughput(&self) -> f64 {
        self.succeeded as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

/// The worker count from a property bag (`threadcount`, default 1).
pub fn thread_count(props: &Properties) -> Result<usize> {
    props.get_usize("threadcount", 1)
}

/// The allocator for a load phase: issuance begins at the workload's
/// `insertstart`, with the batch size heuristic applied.
pub fn load_allocator(config: &CoreWorkloadConfig, threads: usize) -> Arc<BatchedCounterGenerator> {
    let batch_size = batch_size_for(config.record_count(), threads as u64);
    Arc::new(BatchedCounterGenerator::new(config.insert_start(), batch_size))
}

/// The allocator for run phases against a database loaded by an earlier
/// process: issuance begins one past the existing key space, so run-phase
/// inserts extend it and the frontier starts fully advanced.
pub fn preloaded_allocator(
    config: &CoreWorkloadConfig,
    threads: usize,
) -> Arc<BatchedCounterGenerator> {
    let batch_size = batch_size_for(config.record_count(), threads as u64);
    Arc::new(BatchedCounterGenerator::new(
        config.insert_start() + config.record_count(),
        batch_size,
    ))
}

/// Run the load phase: `threads` workers insert `recordcount` records
/// between them, every keynum exactly once. Returns the phase summary; the
/// allocator is returned to the caller through `run_load_with` when run
/// phases follow.
pub fn run_load<D>(db: &D, config: &CoreWorkloadConfig, threads: usize) -> Result<PhaseSummary>
where
    D: Db + Sync,
{
    run_load_with(db, config, threads, load_allocator(config, threads))
}

/// Run the load phase over a caller-provided allocator. The same allocator
/// must be passed to the subsequent [`run_transactions`] calls so the
/// transaction distributions observe its frontier.
pub fn run_load_with<D>(
    db: &D,
    config: &CoreWorkloadConfig,
    threads: usize,
    allocator: Arc<BatchedCounterGenerator>,
) -> Result<PhaseSummary>
where
    D: Db + Sync,
{
    let total = config.record_count();
    tracing::info!(records = total, threads, "loading records");
    run_phase(db, config, threads, allocator, total, true)
}

/// Run one transaction phase: `threads` workers execute `operationcount`
/// mixed operations between them against the allocator's key space.
pub fn run_transactions<D>(
    db: &D,
    config: &CoreWorkloadConfig,
    threads: usize,
    allocator: Arc<BatchedCounterGenerator>,
) -> Result<PhaseSummary>
where
    D: Db + Sync,
{
    let total = config.operation_count();
    tracing::info!(operations = total, threads, "running transactions");
    run_phase(db, config, threads, allocator, total, false)
}

fn run_phase<D>(
    db: &D,
    config: &CoreWorkloadConfig,
    threads: usize,
    allocator: Arc<BatchedCounterGenerator>,
    total: u64,
    is_load: bool,
) -> Result<PhaseSummary>
where
    D: Db + Sync,
{
    ensure!(threads >= 1, "at least one worker thread is required");

    // Build all workload states up front so configuration errors surface
    // before any thread starts.
    let workloads = (0..threads)
        .map(|index| CoreWorkload::new(config, allocator.clone(), index as u64))
        .collect::<Result<Vec<_>>>()?;

    let started = Instant::now();
    let results: Vec<Result<u64>> = std::thread::scope(|scope| {
        let handles: Vec<_> = workloads
            .into_iter()
            .enumerate()
            .map(|(index, workload)| {
                scope.spawn(move || -> Result<u64> {
                    db.init()?;
                    let mut client = Client::new(db, workload);
                    let share = worker_share(total, threads as u64, index as u64);
                    let mut succeeded = 0;
                    if is_load {
                        for _ in 0..share {
                            succeeded += u64::from(client.do_insert());
                        }
                        client.finish_load();
                    } else {
                        for _ in 0..share {
                            succeeded += u64::from(client.do_transaction());
                        }
                    }
                    db.cleanup()?;
                    Ok(succeeded)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect()
    });

    let mut succeeded = 0;
    for result in results {
        succeeded += result?;
    }
    let summary = PhaseSummary { ops: total, succeeded, elapsed: started.elapsed() };
    tracing::info!(
        ops = summary.ops,
        succeeded = summary.succeeded,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        throughput = summary.throughput(),
        "phase complete"
    );
    Ok(summary)
}

/// This worker's slice of the phase budget; slices differ by at most one and
/// sum to `total`.
fn worker_share(total: u64, threads: u64, index: u64) -> u64 {
    total * (index + 1) / threads - total * index / threads
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_share_partitions_budget() {
        for (total, threads) in [(100u64, 3u64), (7, 4), (0, 2), (10_000, 7)] {
            let sum: u64 = (0..threads).map(|i| worker_share(total, threads, i)).sum();
            assert_eq!(sum, total);
            for i in 0..threads {
                let share = worker_share(total, threads, i);
                assert!(share <= total / threads + 1);
            }
        }
    }
}
