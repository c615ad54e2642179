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

//! The two-sample Kolmogorov-Smirnov test.
//!
//! The statistic is the largest distance between the empirical distribution functions of two
//! samples. Its p-value comes either from the asymptotic Kolmogorov distribution
//! ([`GofMethod::Asymptotic`]) or from a permutation test run by
//! [`MonteCarlo`](crate::MonteCarlo) ([`GofMethod::Permutation`]).

use rand::Rng;

use crate::error::{Error, Result};
use crate::monte_carlo::MonteCarlo;
use crate::sample::PermutationSample;

/// The statistic and the p-value of a goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GofResult {
    /// The Kolmogorov-Smirnov distance.
    pub statistic: f64,
    /// Probability of a distance at least as large if both samples share a distribution.
    pub p_value: f64,
}

impl GofResult {
    /// Whether the samples differ significantly at level `alpha`, i.e. `p_value <= alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value <= alpha
    }
}

/// How the p-value of the Kolmogorov-Smirnov statistic is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GofMethod {
    /// The limiting Kolmogorov distribution with Stephens' correction for finite samples.
    #[default]
    Asymptotic,
    /// Random reassignment of the pooled values to the two samples.
    Permutation {
        /// Number of random splits.
        iterations: usize,
    },
}

impl GofMethod {
    /// A permutation test with [`MonteCarlo::DEFAULT_ITERATIONS`] splits.
    pub const PERMUTATION: GofMethod = GofMethod::Permutation {
        iterations: MonteCarlo::<PermutationSample>::DEFAULT_ITERATIONS,
    };
}

/// Computes the two-sample Kolmogorov-Smirnov statistic of `first` and `second`.
///
/// `NaN` values are ignored. Returns `None` if either sample has no other values.
#[must_use]
pub fn ks_statistic(first: &[f64], second: &[f64]) -> Option<f64> {
    let mut first = without_nan(first);
    let mut second = without_nan(second);
    if first.is_empty() || second.is_empty() {
        return None;
    }
    first.sort_by(f64::total_cmp);
    second.sort_by(f64::total_cmp);
    Some(sorted_ks_statistic(&first, &second))
}

fn without_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// [`ks_statistic`] for non-empty samples that are already sorted.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn sorted_ks_statistic(first: &[f64], second: &[f64]) -> f64 {
    let (n, m) = (first.len(), second.len());
    let (mut i, mut j) = (0, 0);
    let mut dmax: f64 = 0.0;
    while i < n && j < m {
        // Step both distribution functions past every value equal to the smaller head.
        let x = first[i].min(second[j]);
        while i < n && first[i] <= x {
            i += 1;
        }
        while j < m && second[j] <= x {
            j += 1;
        }
        dmax = dmax.max((i as f64 / n as f64 - j as f64 / m as f64).abs());
    }
    dmax
}

/// Asymptotic p-value of the Kolmogorov-Smirnov statistic `statistic` for samples of sizes `n`
/// and `m`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn ks_pvalue(statistic: f64, n: usize, m: usize) -> f64 {
    if n == 0 || m == 0 {
        return 1.0;
    }
    let effective = ((n * m) as f64 / (n + m) as f64).sqrt();
    kolmogorov_sf((effective + 0.12 + 0.11 / effective) * statistic)
}

/// The survival function of the Kolmogorov distribution,
/// `Q(λ) = 2 Σ (-1)^(k-1) exp(-2 k² λ²)`.
fn kolmogorov_sf(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous: f64 = 0.0;
    for k in 1..=100 {
        let k = f64::from(k);
        let term = sign * (a2 * k * k).exp();
        sum += term;
        if term.abs() <= 1e-3 * previous || term.abs() <= 1e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous = term.abs();
    }
    // The series only fails to converge for tiny λ, where Q is 1.
    1.0
}

/// Tests whether `first` and `second` are drawn from the same distribution.
///
/// `NaN` values are ignored. `rng` is only used by [`GofMethod::Permutation`], to seed the
/// simulation.
///
/// # Errors
/// Returns [`Error::EmptySample`] if either sample is empty.
pub fn ks_2samp(
    first: &[f64],
    second: &[f64],
    method: GofMethod,
    rng: &mut impl Rng,
) -> Result<GofResult> {
    let (first, second) = (without_nan(first), without_nan(second));
    let statistic = ks_statistic(&first, &second).ok_or(Error::EmptySample)?;
    let p_value = match method {
        GofMethod::Asymptotic => ks_pvalue(statistic, first.len(), second.len()),
        GofMethod::Permutation { iterations } => {
            let sample = PermutationSample::new(&first, &second).ok_or(Error::EmptySample)?;
            let mut simulation = MonteCarlo::with_seed(sample, rng.gen());
            simulation.iterations = iterations;
            simulation.simulate_pvalue(statistic)
        }
    };
    Ok(GofResult { statistic, p_value })
}
