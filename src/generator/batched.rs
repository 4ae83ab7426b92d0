use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Coordinates the insert key space `[start, start + record_count)` across
/// loader threads.
///
/// Keys are handed out in disjoint batches of `batch_size` contiguous keynums,
/// so issuance costs one mutex acquisition per `batch_size` inserts per
/// thread. Threads complete batches in arbitrary order; the completion
/// frontier only ever advances over the maximal prefix of completed batches.
/// A slow thread stalls the frontier at its batch but never stalls issuance
/// to other threads.
///
/// The frontier is mirrored into an atomic so transaction threads can read it
/// without touching the lock. The mirror is published with release ordering
/// and read with acquire ordering: a thread observing frontier ≥ k also
/// observes every store operation the completing loader performed on the keys
/// below k.
///
/// Contract violations (double issue, completing an unissued batch, a
/// misaligned batch start) are programmer errors and panic.
#[derive(Debug)]
pub struct BatchedCounterGenerator {
    start: u64,
    batch_size: u64,
    state: Mutex<BatchState>,
    // Mirror of start + completed * batch_size for lock-free reads.
    frontier: AtomicU64,
}

#[derive(Debug)]
struct BatchState {
    issued: u64,
    completed: u64,
    outstanding: BTreeSet<u64>,
}

impl BatchState {
    fn assert_invariants(&self) {
        debug_assert!(self.completed <= self.issued);
        debug_assert_eq!(self.outstanding.len() as u64, self.issued - self.completed);
        debug_assert!(self
            .outstanding
            .iter()
            .all(|batch| (self.completed..self.issued).contains(batch)));
    }
}

impl BatchedCounterGenerator {
    /// Create an allocator over the key space beginning at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn new(start: u64, batch_size: u64) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        Self {
            start,
            batch_size,
            state: Mutex::new(BatchState {
                issued: 0,
                completed: 0,
                outstanding: BTreeSet::new(),
            }),
            frontier: AtomicU64::new(start),
        }
    }

    /// First keynum of the key space.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of keynums per batch.
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Hand out the next batch. Returns the first keynum of a range of
    /// `batch_size` keynums now owned exclusively by the caller. Batches are
    /// issued in ascending order.
    pub fn next_batch(&self) -> u64 {
        let mut state = self.state.lock();
        let batch = state.issued;
        assert!(!state.outstanding.contains(&batch), "batch {batch} issued twice");
        state.outstanding.insert(batch);
        state.issued += 1;
        state.assert_invariants();

        let first_keynum = self.start + batch * self.batch_size;
        tracing::debug!(batch, first_keynum, "issued batch");
        first_keynum
    }

    /// Report that every keynum of the batch starting at `batch_start` has
    /// been produced, then advance the frontier over the completed prefix and
    /// publish it to the lock-free mirror.
    pub fn mark_completed(&self, batch_start: u64) {
        let mut state = self.state.lock();
        assert!(
            batch_start >= self.start && (batch_start - self.start) % self.batch_size == 0,
            "keynum {batch_start} is not a batch boundary"
        );
        let batch = (batch_start - self.start) / self.batch_size;
        assert!(
            state.outstanding.remove(&batch),
            "batch {batch} completed but not outstanding"
        );
        while state.completed < state.issued && !state.outstanding.contains(&state.completed) {
            state.completed += 1;
        }
        state.assert_invariants();

        let frontier = self.start + state.completed * self.batch_size;
        // The prefix scan never retreats, so neither does the mirror.
        debug_assert!(frontier >= self.frontier.load(Ordering::Relaxed));
        self.frontier.store(frontier, Ordering::Release);
    }

    /// The completion frontier: `start` plus the length of the completed
    /// prefix in keynums. Every keynum strictly below it belongs to a
    /// completed batch. Lock-free.
    pub fn last_completed_keynum(&self) -> u64 {
        self.frontier.load(Ordering::Acquire)
    }
}

/// Batch size heuristic of the harness: √records, shrunk when that would give
/// the workers fewer than one batch each, and never below one keynum.
pub fn batch_size_for(record_count: u64, threads: u64) -> u64 {
    let mut batch_size = (record_count as f64).sqrt() as u64;
    if threads > 0 && record_count / batch_size.max(1) < threads {
        batch_size = record_count / threads;
    }
    batch_size.max(1)
}
