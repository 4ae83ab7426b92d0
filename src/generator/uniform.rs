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

use rand::{rngs::SmallRng, Rng};

use super::Generator;

/// A generator that returns values uniformly randomly from the interval
/// [lower_bound, upper_bound] inclusive (that is, lower_bound and upper_bound
/// are possible values).
#[derive(Debug)]
pub struct UniformGenerator {
    lower_bound: u64,
    upper_bound: u64,
    last: u64,
}

impl UniformGenerator {
    /// Creates a uniform generator over `[lower_bound, upper_bound]`.
    ///
    /// # Panics
    ///
    /// Panics if `lower_bound > upper_bound`.
    pub fn new(lower_bound: u64, upper_bound: u64) -> Self {
        assert!(
            lower_bound <= upper_bound,
            "invalid uniform interval [{lower_bound}, {upper_bound}]"
        );
        Self {
            lower_bound,
            upper_bound,
            last: lower_bound,
        }
    }
}

impl Generator for UniformGenerator {
    type Output = u64;

    fn next(&mut self, rng: &mut SmallRng) -> Self::Output {
        self.last = rng.gen_range(self.lower_bound..=self.upper_bound);
        self.last
    }

    fn last(&self) -> Self::Output {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_bounds() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut gen = UniformGenerator::new(10, 20);
        for _ in 0..10_000 {
            let v = gen.next(&mut rng);
            assert!((10..=20).contains(&v));
            assert_eq!(gen.last(), v);
        }
    }

    #[test]
    fn test_degenerate_interval() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut gen = UniformGenerator::new(5, 5);
        assert_eq!(gen.next(&mut rng), 5);
    }
}
