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

use rand::rngs::SmallRng;

/// A [`Generator`] generates values following some distribution.
///
/// Generators are owned by a single worker and draw from that worker's RNG,
/// so every worker's stream is deterministic given its seed.
pub trait Generator {
    /// Output type of the generator.
    type Output;

    /// Generate the next value.
    fn next(&mut self, rng: &mut SmallRng) -> Self::Output;

    /// Get the last generated value.
    fn last(&self) -> Self::Output;
}

/// A numeric generator resolved to its concrete distribution once at
/// construction time and dispatched by variant on the draw path.
#[derive(Debug)]
pub enum NumberGenerator {
    /// Always the same value.
    Constant(constant::ConstantGenerator),
    /// Uniform over a closed interval.
    Uniform(uniform::UniformGenerator),
    /// Zipf-distributed with configurable skew.
    Zipfian(zipfian::ZipfianGenerator),
    /// Zipf-distributed popularity with no locality in keynum order.
    ScrambledZipfian(zipfian::ScrambledZipfianGenerator),
    /// Biased toward recently completed keynums.
    SkewedLatest(latest::SkewedLatestGenerator),
    /// Biased toward recently completed keynums, clamped to a safety window.
    AcknowledgedLatest(latest::AcknowledgedLatestGenerator),
}

impl Generator for NumberGenerator {
    type Output = u64;

    fn next(&mut self, rng: &mut SmallRng) -> u64 {
        match self {
            Self::Constant(gen) => gen.next(rng),
            Self::Uniform(gen) => gen.next(rng),
            Self::Zipfian(gen) => gen.next(rng),
            Self::ScrambledZipfian(gen) => gen.next(rng),
            Self::SkewedLatest(gen) => gen.next(rng),
            Self::AcknowledgedLatest(gen) => gen.next(rng),
        }
    }

    fn last(&self) -> u64 {
        match self {
            Self::Constant(gen) => gen.last(),
            Self::Uniform(gen) => gen.last(),
            Self::Zipfian(gen) => gen.last(),
            Self::ScrambledZipfian(gen) => gen.last(),
            Self::SkewedLatest(gen) => gen.last(),
            Self::AcknowledgedLatest(gen) => gen.last(),
        }
    }
}

/// Batched insert key allocator.
pub mod batched;
/// Constant value generator.
pub mod constant;
/// Atomic counters.
pub mod counter;
/// Discrete value generator.
pub mod discrete;
/// Frontier-following generators.
pub mod latest;
/// Uniform value generator.
pub mod uniform;
/// Zipfian generators.
pub mod zipfian;
