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

//! Selection of the catalog distribution that best describes a dataset.
//!
//! Every candidate is fitted to the data, a synthetic sample of the same size is drawn from the
//! fit and the two are compared with the two-sample Kolmogorov-Smirnov test. Candidates whose fit
//! is acceptable at the significance level (`p > alpha`) are preferred over those that are not;
//! within the same tier the smaller statistic wins and the earlier candidate wins ties.
//!
//! ```
//! use geometrics::catalog::Family;
//! use geometrics::selector::{best_fit, SelectorConfig};
//! use rand::distributions::Distribution;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let exp = statrs::distribution::Exp::new(0.5).unwrap();
//! let data: Vec<f64> = exp.sample_iter(&mut rng).take(5_000).collect();
//!
//! let candidates = [Family::Normal, Family::Exponential];
//! let outcome = best_fit(&data, &candidates, &SelectorConfig::default(), &mut rng).unwrap();
//! assert_eq!(outcome.winner, Family::Exponential);
//! assert_eq!(outcome.results.len(), 2);
//! ```

use rand::Rng;

use crate::catalog::{Family, TheoreticalFit};
use crate::error::{Error, Result};
use crate::gof::{ks_2samp, GofMethod, GofResult};

/// Options of [`best_fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorConfig {
    /// Significance level separating acceptable fits from rejected ones.
    pub alpha: f64,
    /// Whether to keep the synthetic sample of the winning distribution.
    pub return_sample: bool,
    /// How p-values are computed.
    pub method: GofMethod,
}

impl SelectorConfig {
    /// The default value of `self.alpha`
    pub const DEFAULT_ALPHA: f64 = 0.05;
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            alpha: Self::DEFAULT_ALPHA,
            return_sample: false,
            method: GofMethod::default(),
        }
    }
}

/// A candidate distribution that could not be compared with the data.
#[derive(Debug)]
pub struct Skipped {
    /// The candidate.
    pub family: Family,
    /// Why it was skipped.
    pub error: Error,
}

/// The result of [`best_fit`].
#[derive(Debug)]
pub struct BestFit {
    /// The selected distribution.
    pub winner: Family,
    /// The test result of the winner.
    pub winner_result: GofResult,
    /// Test results of every candidate that could be fitted, in the order they were tried.
    pub results: Vec<(Family, GofResult)>,
    /// Candidates that failed to fit.
    pub skipped: Vec<Skipped>,
    /// The synthetic sample of the winner if [`SelectorConfig::return_sample`] was set.
    pub synthetic: Option<Vec<f64>>,
}

impl BestFit {
    /// The test result of `family`, if it was tried and fitted.
    #[must_use]
    pub fn get(&self, family: Family) -> Option<&GofResult> {
        self.results
            .iter()
            .find_map(|(candidate, result)| (*candidate == family).then_some(result))
    }
}

/// Whether `candidate` should replace `best` as the best fit at level `alpha`.
fn improves(candidate: &GofResult, best: &GofResult, alpha: f64) -> bool {
    match (
        candidate.is_significant(alpha),
        best.is_significant(alpha),
    ) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate.statistic < best.statistic,
    }
}

/// Compares `samples` with every distribution of `candidates` and selects the best fitting one.
///
/// A candidate that fails to fit is logged and reported in [`BestFit::skipped`] instead of
/// aborting the comparison.
///
/// # Errors
/// Returns [`Error::EmptySample`] for an empty dataset and [`Error::NoCandidates`] if no
/// candidate could be fitted.
pub fn best_fit(
    samples: &[f64],
    candidates: &[Family],
    config: &SelectorConfig,
    rng: &mut impl Rng,
) -> Result<BestFit> {
    if samples.is_empty() {
        return Err(Error::EmptySample);
    }
    let mut results = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();
    let mut best: Option<(Family, GofResult, Vec<f64>)> = None;

    for &family in candidates {
        let fit = match TheoreticalFit::new(samples, family, rng) {
            Ok(fit) => fit,
            Err(error) => {
                tracing::warn!("skipping {family}: {error}");
                skipped.push(Skipped { family, error });
                continue;
            }
        };
        let result = ks_2samp(samples, &fit.synthetic, config.method, rng)?;
        tracing::debug!(
            "{family}: statistic {:.4}, p-value {:.4}",
            result.statistic,
            result.p_value
        );
        results.push((family, result));

        let replace = match &best {
            None => true,
            Some((_, best_result, _)) => improves(&result, best_result, config.alpha),
        };
        if replace {
            tracing::debug!("{family} is the best fit so far");
            best = Some((family, result, fit.synthetic));
        }
    }

    let (winner, winner_result, synthetic) = best.ok_or(Error::NoCandidates)?;
    Ok(BestFit {
        winner,
        winner_result,
        results,
        skipped,
        synthetic: config.return_sample.then_some(synthetic),
    })
}

/// [`best_fit`] over the whole [`CATALOG`](crate::catalog::CATALOG).
///
/// # Errors
/// See [`best_fit`].
pub fn best_fit_catalog(
    samples: &[f64],
    config: &SelectorConfig,
    rng: &mut impl Rng,
) -> Result<BestFit> {
    best_fit(samples, crate::catalog::CATALOG, config, rng)
}

#[cfg(test)]
mod tests {
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use statrs::distribution::{Exp, Gamma, Normal};

    use super::*;
    use crate::catalog::CATALOG;

    fn result(statistic: f64, p_value: f64) -> GofResult {
        GofResult { statistic, p_value }
    }

    #[test]
    fn acceptable_fit_beats_rejected_fit() {
        let alpha = 0.05;
        assert!(improves(&result(0.3, 0.2), &result(0.1, 0.01), alpha));
        assert!(!improves(&result(0.1, 0.01), &result(0.3, 0.2), alpha));
    }

    #[test]
    fn same_tier_prefers_smaller_statistic() {
        let alpha = 0.05;
        assert!(improves(&result(0.1, 0.5), &result(0.2, 0.4), alpha));
        assert!(!improves(&result(0.2, 0.5), &result(0.1, 0.4), alpha));
        assert!(improves(&result(0.2, 0.01), &result(0.3, 0.02), alpha));
        // Ties keep the earlier candidate.
        assert!(!improves(&result(0.2, 0.3), &result(0.2, 0.3), alpha));
        // A p-value equal to alpha is significant.
        assert!(improves(&result(0.5, 0.06), &result(0.1, 0.05), alpha));
    }

    #[test]
    fn selects_generating_family() {
        let candidates = [Family::Normal, Family::Logistic, Family::Exponential];
        let exp = Exp::new(0.5).unwrap();
        let mut wins = 0;
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let data: Vec<f64> = (&exp).sample_iter(&mut rng).take(5_000).collect();
            let outcome = best_fit(&data, &candidates, &SelectorConfig::default(), &mut rng)
                .unwrap();
            if outcome.winner == Family::Exponential {
                wins += 1;
            }
        }
        assert!(wins >= 8, "exponential won {wins} of 10 trials");
    }

    #[test]
    fn own_family_is_not_rejected() {
        let gamma = Gamma::new(3.0, 2.0).unwrap();
        let config = SelectorConfig::default();
        let mut accepted = 0;
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(100 + seed);
            let data: Vec<f64> = (&gamma).sample_iter(&mut rng).take(500).collect();
            let outcome = best_fit(&data, &[Family::Gamma], &config, &mut rng).unwrap();
            if !outcome.winner_result.is_significant(config.alpha) {
                accepted += 1;
            }
        }
        assert!(accepted >= 15, "gamma accepted in {accepted} of 20 trials");
    }

    #[test]
    fn failed_candidates_are_skipped() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let data: Vec<f64> = (&normal).sample_iter(&mut rng).take(300).collect();
        let config = SelectorConfig {
            return_sample: true,
            ..SelectorConfig::default()
        };
        let outcome = best_fit_catalog(&data, &config, &mut rng).unwrap();

        // Negative values are outside the support of the positive families.
        let skipped: Vec<Family> = outcome.skipped.iter().map(|s| s.family).collect();
        for family in [
            Family::LogNormal,
            Family::Exponential,
            Family::Pareto,
            Family::WeibullMin,
            Family::InverseNormal,
            Family::Gamma,
        ] {
            assert!(skipped.contains(&family), "{family} was not skipped");
            assert!(outcome.get(family).is_none());
        }
        assert_eq!(outcome.results.len() + outcome.skipped.len(), CATALOG.len());
        assert_eq!(outcome.synthetic.as_ref().map(Vec::len), Some(data.len()));
        assert!(outcome.get(Family::Normal).is_some());
    }

    #[test]
    fn no_candidate_fits() {
        let mut rng = StdRng::seed_from_u64(0);
        let data = [-1.0, -2.0, -3.0];
        let err = best_fit(
            &data,
            &[Family::Pareto, Family::Gamma],
            &SelectorConfig::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoCandidates));
        assert!(matches!(
            best_fit(&[], CATALOG, &SelectorConfig::default(), &mut rng),
            Err(Error::EmptySample)
        ));
    }

    #[test]
    fn sample_is_only_returned_on_request() {
        let mut rng = StdRng::seed_from_u64(2);
        let data: Vec<f64> = (1..=100).map(f64::from).collect();
        let outcome = best_fit(
            &data,
            &[Family::Normal],
            &SelectorConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert!(outcome.synthetic.is_none());
        assert_eq!(outcome.winner, Family::Normal);
    }
}
