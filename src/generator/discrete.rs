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

use anyhow::{bail, ensure, Result};
use rand::{rngs::SmallRng, Rng};

use super::Generator;

/// Choice of the generated value of [`DiscreteGenerator`].
#[derive(Debug)]
pub struct Choice<T> {
    /// Value to generate.
    pub val: T,
    /// Possibility weight of the choice.
    pub weight: f64,
}

/// Generates a distribution by choosing from a discrete set of values.
///
/// Entries with weight 0 are permitted and unreachable. Ties between entries
/// break toward the earlier addition.
#[derive(Debug)]
pub struct DiscreteGenerator<T> {
    choices: Vec<Choice<T>>,
    sum: f64,
    last: T,
}

impl<T> DiscreteGenerator<T>
where
    T: Clone,
{
    /// Create a generator that chooses from a discrete set of weighted values.
    ///
    /// The choice list must be non-empty with a positive weight sum; anything
    /// else is a configuration error.
    pub fn new(choices: Vec<Choice<T>>) -> Result<Self> {
        let Some(first) = choices.first() else {
            bail!("discrete chooser requires at least one choice");
        };
        let last = first.val.clone();
        let sum: f64 = choices.iter().map(|choice| choice.weight).sum();
        ensure!(sum > 0.0, "discrete chooser weights must sum to a positive value, got {sum}");
        Ok(Self { choices, sum, last })
    }
}

impl<T> Generator for DiscreteGenerator<T>
where
    T: Clone,
{
    type Output = T;

    fn next(&mut self, rng: &mut SmallRng) -> Self::Output {
        let mut target = rng.gen::<f64>() * self.sum;
        for choice in self.choices.iter() {
            if target < choice.weight {
                self.last = choice.val.clone();
                return choice.val.clone();
            }
            target -= choice.weight;
        }
        // Floating-point residue can leave `target` a hair past the final
        // cumulative weight. Not an error: fall back to the previous choice.
        self.last.clone()
    }

    /// Get the most recently chosen value.
    fn last(&self) -> Self::Output {
        self.last.clone()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_empty_rejected() {
        assert!(DiscreteGenerator::<u8>::new(vec![]).is_err());
    }

    #[test]
    fn test_zero_sum_rejected() {
        let choices = vec![Choice { val: 0u8, weight: 0.0 }];
        assert!(DiscreteGenerator::new(choices).is_err());
    }

    #[test]
    fn test_zero_weight_unreachable() {
        let mut rng = SmallRng::seed_from_u64(0);
        let choices = vec![
            Choice { val: 'a', weight: 1.0 },
            Choice { val: 'b', weight: 0.0 },
            Choice { val: 'c', weight: 1.0 },
        ];
        let mut gen = DiscreteGenerator::new(choices).unwrap();
        for _ in 0..10_000 {
            assert_ne!(gen.next(&mut rng), 'b');
        }
    }

    #[test]
    fn test_proportions() {
        let mut rng = SmallRng::seed_from_u64(1);
        let choices = vec![
            Choice { val: 0usize, weight: 0.5 },
            Choice { val: 1usize, weight: 0.5 },
        ];
        let mut gen = DiscreteGenerator::new(choices).unwrap();

        const DRAWS: usize = 100_000;
        let mut counts = [0usize; 2];
        for _ in 0..DRAWS {
            counts[gen.next(&mut rng)] += 1;
        }
        let ratio = counts[0] as f64 / DRAWS as f64;
        assert!((ratio - 0.5).abs() < 0.01, "observed ratio {ratio}");
    }

    #[test]
    fn test_last_tracks_choice() {
        let mut rng = SmallRng::seed_from_u64(2);
        let choices = vec![
            Choice { val: 'x', weight: 1.0 },
            Choice { val: 'y', weight: 2.0 },
        ];
        let mut gen = DiscreteGenerator::new(choices).unwrap();
        // Before any draw, `last` is the first added value.
        assert_eq!(gen.last(), 'x');
        for _ in 0..100 {
            let v = gen.next(&mut rng);
            assert_eq!(gen.last(), v);
        }
    }
}
