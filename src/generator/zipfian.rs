use rand::{rngs::SmallRng, Rng};

use super::Generator;
use crate::utils::fnvhash64;

/// Default skew of the zipfian generators.
pub const ZIPFIAN_CONSTANT: f64 = 0.99;

/// Generates values from `[base, base + items)` following a zipfian
/// distribution: item popularity falls off polynomially with rank, so a few
/// items receive most of the draws.
///
/// The active domain may grow between draws via [`Self::next_with_count`];
/// the cached zeta constant is then extended with the new tail terms instead
/// of being recomputed from scratch.
#[derive(Debug)]
pub struct ZipfianGenerator {
    items: u64,
    base: u64,
    theta: f64,
    zeta2theta: f64,
    alpha: f64,
    count_for_zeta: u64,
    zetan: f64,
    eta: f64,
    last: u64,
}

impl ZipfianGenerator {
    /// Creates a zipfian generator over `[min, max]` with the default skew.
    pub fn new(min: u64, max: u64) -> Self {
        Self::with_constant(min, max, ZIPFIAN_CONSTANT)
    }

    /// Creates a zipfian generator over `[min, max]` with skew `theta`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn with_constant(min: u64, max: u64, theta: f64) -> Self {
        assert!(min <= max, "invalid zipfian interval [{min}, {max}]");
        let items = max - min + 1;
        let zeta2theta = zeta_range(0, 2, theta, 0.0);
        let zetan = zeta_range(0, items, theta, 0.0);
        Self {
            items,
            base: min,
            theta,
            zeta2theta,
            alpha: 1.0 / (1.0 - theta),
            count_for_zeta: items,
            zetan,
            eta: eta(items, theta, zeta2theta, zetan),
            last: min,
        }
    }

    /// Draw from the first `items` elements of the domain.
    ///
    /// When `items` grew since the previous draw, only the zeta terms for the
    /// new tail are computed. A shrinking domain has no incremental path and
    /// recomputes from scratch.
    pub fn next_with_count(&mut self, rng: &mut SmallRng, items: u64) -> u64 {
        if items != self.count_for_zeta {
            if items > self.count_for_zeta {
                self.zetan = zeta_range(self.count_for_zeta, items, self.theta, self.zetan);
            } else {
                self.zetan = zeta_range(0, items, self.theta, 0.0);
            }
            self.count_for_zeta = items;
            self.eta = eta(items, self.theta, self.zeta2theta, self.zetan);
        }

        let u: f64 = rng.gen();
        let uz = u * self.zetan;

        self.last = if uz < 1.0 {
            self.base
        } else if uz < 1.0 + 0.5f64.powf(self.theta) {
            self.base + 1
        } else {
            self.base + (items as f64 * (self.eta * u - self.eta + 1.0).powf(self.alpha)) as u64
        };
        self.last
    }
}

impl Generator for ZipfianGenerator {
    type Output = u64;

    fn next(&mut self, rng: &mut SmallRng) -> Self::Output {
        let items = self.items;
        self.next_with_count(rng, items)
    }

    fn last(&self) -> Self::Output {
        self.last
    }
}

/// Zipfian popularity spread over the whole domain: the zipfian rank is pushed
/// through a 64-bit scrambler, so hot items keep their share of the draws but
/// lose all locality in keynum order. Used when keys are inserted in order and
/// access skew must not cluster on adjacent keys.
#[derive(Debug)]
pub struct ScrambledZipfianGenerator {
    base: u64,
    items: u64,
    zipfian: ZipfianGenerator,
    last: u64,
}

impl ScrambledZipfianGenerator {
    /// Creates a scrambled zipfian generator over `[min, max]`.
    pub fn new(min: u64, max: u64) -> Self {
        let items = max - min + 1;
        Self {
            base: min,
            items,
            zipfian: ZipfianGenerator::new(0, items - 1),
            last: min,
        }
    }
}

impl Generator for ScrambledZipfianGenerator {
    type Output = u64;

    fn next(&mut self, rng: &mut SmallRng) -> Self::Output {
        let rank = self.zipfian.next(rng);
        self.last = self.base + fnvhash64(rank) % self.items;
        self.last
    }

    fn last(&self) -> Self::Output {
        self.last
    }
}

fn zeta_range(start: u64, n: u64, theta: f64, initial: f64) -> f64 {
    let mut sum = initial;
    for i in start..n {
        sum += 1.0 / ((i + 1) as f64).powf(theta);
    }
    sum
}

fn eta(items: u64, theta: f64, zeta2theta: f64, zetan: f64) -> f64 {
    (1.0 - (2.0 / items as f64).powf(1.0 - theta)) / (1.0 - zeta2theta / zetan)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_bounds() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut gen = ZipfianGenerator::new(100, 199);
        for _ in 0..10_000 {
            let v = gen.next(&mut rng);
            assert!((100..=199).contains(&v), "draw {v} out of bounds");
        }
    }

    #[test]
    fn test_skew() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut gen = ZipfianGenerator::new(0, 999);
        let mut head = 0usize;
        const DRAWS: usize = 100_000;
        for _ in 0..DRAWS {
            if gen.next(&mut rng) == 0 {
                head += 1;
            }
        }
        // The top item of a 1000-element zipf(0.99) draws far more often than
        // the uniform share of 0.1%.
        assert!(head > DRAWS / 100, "head item drawn {head} times");
    }

    #[test]
    fn test_incremental_zeta_matches_fresh() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut grown = ZipfianGenerator::new(0, 99);
        grown.next_with_count(&mut rng, 500);

        let fresh = ZipfianGenerator::new(0, 499);
        assert!((grown.zetan - fresh.zetan).abs() < 1e-9);
        assert!((grown.eta - fresh.eta).abs() < 1e-9);
    }

    #[test]
    fn test_scrambled_bounds() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut gen = ScrambledZipfianGenerator::new(50, 149);
        for _ in 0..10_000 {
            let v = gen.next(&mut rng);
            assert!((50..=149).contains(&v), "draw {v} out of bounds");
            assert_eq!(gen.last(), v);
        }
    }
}
