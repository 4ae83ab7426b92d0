use std::sync::Arc;

use rand::rngs::SmallRng;

use super::batched::BatchedCounterGenerator;
use super::zipfian::ZipfianGenerator;
use super::Generator;

/// Biases draws toward recently completed keynums: reads the allocator
/// frontier per draw, takes a zipfian offset over the materialized prefix and
/// subtracts it from the frontier. The hottest keynums are the ones whose
/// inserting batches were most recently handed back.
#[derive(Debug)]
pub struct SkewedLatestGenerator {
    frontier: Arc<BatchedCounterGenerator>,
    zipfian: ZipfianGenerator,
    last: u64,
}

impl SkewedLatestGenerator {
    /// Creates a latest generator tracking `frontier`.
    pub fn new(frontier: Arc<BatchedCounterGenerator>) -> Self {
        let start = frontier.start();
        Self {
            frontier,
            zipfian: ZipfianGenerator::new(0, 0),
            last: start,
        }
    }
}

impl Generator for SkewedLatestGenerator {
    type Output = u64;

    fn next(&mut self, rng: &mut SmallRng) -> Self::Output {
        let max = self.frontier.last_completed_keynum();
        let start = self.frontier.start();
        if max == start {
            // Nothing materialized yet; the rejection loop above the frontier
            // handles this draw.
            self.last = start;
            return start;
        }
        // The frontier is one past the newest completed keynum, so the
        // hottest draw is max - 1.
        let span = max - start;
        self.last = max - 1 - self.zipfian.next_with_count(rng, span);
        self.last
    }

    fn last(&self) -> Self::Output {
        self.last
    }
}

/// Like [`SkewedLatestGenerator`], but the hot window is clamped to the most
/// recent [`Self::WINDOW_BATCHES`] batches. During mixed workloads with
/// concurrent inserts this keeps draws well clear of the keynums whose
/// batches may still be outstanding, so the rejection loop above the frontier
/// rarely fires.
#[derive(Debug)]
pub struct AcknowledgedLatestGenerator {
    frontier: Arc<BatchedCounterGenerator>,
    window: u64,
    zipfian: ZipfianGenerator,
    last: u64,
}

impl AcknowledgedLatestGenerator {
    /// Width of the hot window, in batches.
    pub const WINDOW_BATCHES: u64 = 16;

    /// Creates a windowed latest generator tracking `frontier`.
    pub fn new(frontier: Arc<BatchedCounterGenerator>) -> Self {
        let start = frontier.start();
        let window = frontier.batch_size() * Self::WINDOW_BATCHES;
        Self {
            frontier,
            window,
            zipfian: ZipfianGenerator::new(0, 0),
            last: start,
        }
    }
}

impl Generator for AcknowledgedLatestGenerator {
    type Output = u64;

    fn next(&mut self, rng: &mut SmallRng) -> Self::Output {
        let max = self.frontier.last_completed_keynum();
        let start = self.frontier.start();
        if max == start {
            self.last = start;
            return start;
        }
        let span = (max - start).min(self.window);
        self.last = max - 1 - self.zipfian.next_with_count(rng, span);
        self.last
    }

    fn last(&self) -> Self::Output {
        self.last
    }
}
