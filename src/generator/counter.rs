//  Copyright 2024 MrCroxx
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates a sequence of numeric values in an atomic manner.
///
/// Unlike the distribution generators this one may be shared across workers;
/// it hands out each value exactly once without locks. Overflow is undefined
/// for the intended workload sizes.
#[derive(Debug)]
pub struct CounterGenerator {
    counter: AtomicU64,
}

impl CounterGenerator {
    /// Create a counter that starts at `start`.
    pub fn new(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    /// Return the current value and advance the counter by one.
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Return the current value and advance the counter by `n`, reserving the
    /// range `[value, value + n)` for the caller.
    pub fn next_n(&self, n: u64) -> u64 {
        self.counter.fetch_add(n, Ordering::Relaxed)
    }

    /// Get the last generated value.
    ///
    /// # Panics
    ///
    /// `next()` must be called before calling `last()` when starting at 0.
    pub fn last(&self) -> u64 {
        self.counter.load(Ordering::Relaxed) - 1
    }

    /// Reset the counter to `start`.
    pub fn set(&self, start: u64) {
        self.counter.store(start, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sequence() {
        let counter = CounterGenerator::new(7);
        assert_eq!(counter.next(), 7);
        assert_eq!(counter.next(), 8);
        assert_eq!(counter.last(), 8);
        assert_eq!(counter.next_n(10), 9);
        assert_eq!(counter.next(), 19);
        counter.set(100);
        assert_eq!(counter.next(), 100);
    }

    #[test]
    fn test_concurrent_exactness() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 10_000;

        let counter = CounterGenerator::new(0);
        let mut produced = vec![];
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| scope.spawn(|| (0..PER_THREAD).map(|_| counter.next()).collect::<Vec<_>>()))
                .collect();
            for handle in handles {
                produced.extend(handle.join().unwrap());
            }
        });

        let distinct: HashSet<_> = produced.iter().copied().collect();
        assert_eq!(distinct.len(), THREADS * PER_THREAD);
        assert_eq!(*distinct.iter().min().unwrap(), 0);
        assert_eq!(*distinct.iter().max().unwrap(), (THREADS * PER_THREAD) as u64 - 1);
    }
}
