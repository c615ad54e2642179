// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Contains the [`MonteCarlo`] struct.
//!

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::sample::Sample;

/// A struct to keep track of the fraction of the values at least as large as the test value.
struct Exceedance {
    /// Number of values not smaller than the test value
    extreme: usize,
    /// Total number of values
    total: usize,
}

impl Exceedance {
    /// Statistics closer than this to the test value count as equal to it.
    const TOLERANCE: f64 = 1e-10;

    /// Returns the initial `Exceedance`
    fn new() -> Exceedance {
        Exceedance {
            extreme: 0,
            total: 0,
        }
    }

    /// Updates the ratio with a new `statistic`.
    fn update(&mut self, statistic: f64, test_statistic: f64) {
        if statistic >= test_statistic - Self::TOLERANCE {
            self.extreme += 1;
        }
        self.total += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    /// Gives the ratio so far, counting the test value itself as one of the observations.
    fn ratio(&self) -> f64 {
        (self.extreme + 1) as f64 / (self.total + 1) as f64
    }
}

/// The struct that contains the state of a Monte-Carlo simulation.
///
/// [`MonteCarlo<S>`] repeatedly calls [`Sample::generate`] and [`Sample::evaluate`] methods of `S` and
/// calculates a result from the statistics returned by [`Sample::evaluate`].
pub struct MonteCarlo<S> {
    /// Number of iterations of the Monte-Carlo simulation.
    pub iterations: usize,
    sample: S,
    /// The random generator used by `sample.generate`
    rng: StdRng,
}

impl<S: Sample> MonteCarlo<S> {
    /// Returns the statistic calculated from one iteration of a Monte-Carlo simulation.
    fn simulate_iteration(&mut self) -> f64 {
        self.sample.generate(&mut self.rng);
        self.sample.evaluate()
    }

    /// Runs a Monte-Carlo simulation and returns the probability of a statistic at least as large
    /// as `test_statistic`.
    ///
    /// The observed statistic is counted as one of the simulated ones, so the result is never
    /// zero: `(k + 1) / (iterations + 1)` where `k` iterations reached `test_statistic`.
    pub fn simulate_pvalue(mut self, test_statistic: f64) -> f64 {
        let mut ratio = Exceedance::new();
        for _ in 0..self.iterations {
            let statistic = self.simulate_iteration();
            ratio.update(statistic, test_statistic);
        }
        ratio.ratio()
    }
}

impl<S> MonteCarlo<S> {
    /// The default value of `self.iterations`
    pub const DEFAULT_ITERATIONS: usize = 10_000;

    /// Constructs an instance for a Monte-Carlo simulation based on the implementation [Sample] by
    /// `S`.
    pub fn new(sample: S) -> Self {
        Self::with_rng(sample, StdRng::from_entropy())
    }

    /// Constructs an instance whose random generator is seeded with `seed`, for reproducible
    /// simulations.
    pub fn with_seed(sample: S, seed: u64) -> Self {
        Self::with_rng(sample, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sample: S, rng: StdRng) -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            sample,
            rng,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    /// A uniform value in [0, 1).
    struct Uniform(f64);

    impl Sample for Uniform {
        fn generate(&mut self, rng: &mut impl Rng) {
            self.0 = rng.gen();
        }

        fn evaluate(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn pvalue_of_uniform() {
        let mut simulation = MonteCarlo::with_seed(Uniform(0.0), 42);
        simulation.iterations = 20_000;
        let pvalue = simulation.simulate_pvalue(0.75);
        assert!((pvalue - 0.25).abs() < 0.02, "pvalue was {pvalue}");
    }

    #[test]
    fn pvalue_is_never_zero() {
        let mut simulation = MonteCarlo::with_seed(Uniform(0.0), 1);
        simulation.iterations = 99;
        let pvalue = simulation.simulate_pvalue(2.0);
        assert!((pvalue - 0.01).abs() < 1e-12);
    }

    #[test]
    fn seeded_simulations_repeat() {
        let first = MonteCarlo::with_seed(Uniform(0.0), 7).simulate_pvalue(0.5);
        let second = MonteCarlo::with_seed(Uniform(0.0), 7).simulate_pvalue(0.5);
        assert_eq!(first, second);
    }
}
