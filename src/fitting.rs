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

//! Contains [`FittingDistribution`] trait and its implementors.
//!
//! Fitting a distribution happens in two steps: [`FittingDistribution::estimate`] computes the
//! parameters from the dataset and [`FittingDistribution::with_parameters`] constructs the
//! distribution from them. [`FittingDistribution::fit`] runs both and rejects non-finite
//! parameters in between, so that a degenerate dataset is reported as
//! [`Error::FitFailed`] instead of producing a distribution full of `NaN`.
//!
//! Where the maximum likelihood estimate has a closed form it is used directly. The shape of the
//! Weibull and gamma distributions and the scale of the Gumbel distribution are found by
//! bisection on the likelihood equation. The logistic distribution is fitted by moments.
use statrs::distribution::{Exp, Gamma, LogNormal, Normal, Pareto, Weibull};
use statrs::function::gamma::digamma;
use statrs::statistics::Statistics;

use crate::distributions::{Gumbel, GumbelLeft, InverseGaussian, Logistic};
use crate::error::{Error, Result};

#[allow(clippy::module_name_repetitions)]
/// A trait for probability distributions that can be constructed from a dataset.
pub trait FittingDistribution: Sized {
    /// Key of the distribution in the catalog, used in error messages.
    const KEY: &'static str;

    /// Names of the parameters in the order returned by [`Self::estimate`].
    const PARAMETERS: &'static [&'static str];

    /// Estimates the parameters of the distribution from `samples`.
    ///
    /// # Errors
    /// Returns [`Error::FitFailed`] when `samples` lie outside the support of the distribution.
    fn estimate(samples: &[f64]) -> Result<Vec<f64>>;

    /// Constructs the distribution from parameters in the order of [`Self::PARAMETERS`].
    ///
    /// # Errors
    /// Returns [`Error::FitFailed`] when the parameters are not valid for the distribution.
    fn with_parameters(parameters: &[f64]) -> Result<Self>;

    /// Constructs `Self` from `samples` dataset in a way that approximates its distribution.
    ///
    /// # Errors
    /// Returns [`Error::EmptySample`] for an empty dataset and [`Error::FitFailed`] when the
    /// estimated parameters are not finite or not valid.
    fn fit(samples: &[f64]) -> Result<Self> {
        let parameters = fit_parameters::<Self>(samples)?;
        Self::with_parameters(&parameters)
    }
}

/// Estimates the parameters of `D` and checks that they are finite.
pub(crate) fn fit_parameters<D: FittingDistribution>(samples: &[f64]) -> Result<Vec<f64>> {
    if samples.is_empty() {
        return Err(Error::EmptySample);
    }
    let parameters = D::estimate(samples)?;
    if let Some((name, value)) = D::PARAMETERS
        .iter()
        .zip(&parameters)
        .find(|(_, value)| !value.is_finite())
    {
        return Err(Error::fit_failed(
            D::KEY,
            format!("invalid parameter {name} = {value}"),
        ));
    }
    Ok(parameters)
}

/// Fails unless every value of `samples` is strictly positive.
fn require_positive(key: &'static str, samples: &[f64]) -> Result<()> {
    if samples.iter().all(|&x| x > 0.0) {
        Ok(())
    } else {
        Err(Error::fit_failed(key, "data must be strictly positive"))
    }
}

/// Error for a parameter slice of the wrong length.
fn parameter_count(key: &'static str, expected: usize, parameters: &[f64]) -> Error {
    Error::fit_failed(
        key,
        format!("expected {expected} parameters, got {}", parameters.len()),
    )
}

/// Finds the root of the increasing function `f` by bisection, starting the search for a bracket
/// at `start`.
///
/// Returns `NaN` if `f` is positive everywhere below `start` and infinity if it is negative
/// everywhere above it, so that the caller reports a fit failure.
fn increasing_root(f: impl Fn(f64) -> f64, start: f64) -> f64 {
    const MAX_STEPS: usize = 200;
    if !(start.is_finite() && start > 0.0) {
        return f64::NAN;
    }
    let mut lo = start;
    let mut steps = 0;
    while f(lo) > 0.0 {
        lo /= 2.0;
        steps += 1;
        if steps == MAX_STEPS {
            return f64::NAN;
        }
    }
    let mut hi = start;
    steps = 0;
    while f(hi) < 0.0 {
        hi *= 2.0;
        steps += 1;
        if steps == MAX_STEPS {
            return f64::INFINITY;
        }
    }
    for _ in 0..MAX_STEPS {
        let mid = 0.5 * (lo + hi);
        if f(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-12 * hi {
            break;
        }
    }
    0.5 * (lo + hi)
}

impl FittingDistribution for Normal {
    const KEY: &'static str = "normal";
    const PARAMETERS: &'static [&'static str] = &["mean", "std_dev"];

    /// Returns the mean of `samples` and their population standard deviation, the maximum
    /// likelihood estimates.
    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        Ok(vec![
            Statistics::mean(samples),
            Statistics::population_std_dev(samples),
        ])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [mean, std_dev] => {
                Normal::new(mean, std_dev).map_err(|e| Error::fit_failed(Self::KEY, e))
            }
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

impl FittingDistribution for LogNormal {
    const KEY: &'static str = "lognormal";
    const PARAMETERS: &'static [&'static str] = &["location", "scale"];

    /// Fits a normal distribution to the logarithms of `samples`.
    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        require_positive(Self::KEY, samples)?;
        let logs: Vec<f64> = samples.iter().map(|x| x.ln()).collect();
        Ok(vec![
            Statistics::mean(&logs),
            Statistics::population_std_dev(&logs),
        ])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [location, scale] => {
                LogNormal::new(location, scale).map_err(|e| Error::fit_failed(Self::KEY, e))
            }
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

impl FittingDistribution for Exp {
    const KEY: &'static str = "exponential";
    const PARAMETERS: &'static [&'static str] = &["rate"];

    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        if samples.iter().any(|&x| x < 0.0) {
            return Err(Error::fit_failed(Self::KEY, "data must be non-negative"));
        }
        Ok(vec![1.0 / Statistics::mean(samples)])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [rate] => Exp::new(rate).map_err(|e| Error::fit_failed(Self::KEY, e)),
            _ => Err(parameter_count(Self::KEY, 1, parameters)),
        }
    }
}

impl FittingDistribution for Logistic {
    const KEY: &'static str = Logistic::KEY;
    const PARAMETERS: &'static [&'static str] = &["location", "scale"];

    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        let (location, scale) = Logistic::moments(
            Statistics::mean(samples),
            Statistics::population_std_dev(samples),
        );
        Ok(vec![location, scale])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [location, scale] => Logistic::new(location, scale),
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

impl FittingDistribution for Pareto {
    const KEY: &'static str = "pareto";
    const PARAMETERS: &'static [&'static str] = &["scale", "shape"];

    /// The scale is the smallest value, the shape is `n / Σ ln(x / scale)`.
    #[allow(clippy::cast_precision_loss)]
    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        require_positive(Self::KEY, samples)?;
        let scale = Statistics::min(samples);
        let log_sum: f64 = samples.iter().map(|x| (x / scale).ln()).sum();
        Ok(vec![scale, samples.len() as f64 / log_sum])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [scale, shape] => {
                Pareto::new(scale, shape).map_err(|e| Error::fit_failed(Self::KEY, e))
            }
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

impl FittingDistribution for Weibull {
    const KEY: &'static str = "weibull_min";
    const PARAMETERS: &'static [&'static str] = &["shape", "scale"];

    /// Solves `Σ xᵏ ln x / Σ xᵏ - 1/k = mean(ln x)` for the shape `k`.
    ///
    /// The values are divided by their maximum first, which leaves the equation unchanged and
    /// keeps `xᵏ` from overflowing.
    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        require_positive(Self::KEY, samples)?;
        let max = Statistics::max(samples);
        let logs: Vec<f64> = samples.iter().map(|x| (x / max).ln()).collect();
        let mean_log = Statistics::mean(&logs);
        let likelihood = |k: f64| {
            let (weighted, total) = logs.iter().fold((0.0, 0.0), |(weighted, total), &l| {
                let w = (k * l).exp();
                (weighted + w * l, total + w)
            });
            weighted / total - 1.0 / k - mean_log
        };
        let shape = increasing_root(likelihood, 1.0);
        let moment = logs.iter().map(|l| (shape * l).exp()).sum::<f64>() / len(&logs);
        Ok(vec![shape, max * moment.powf(1.0 / shape)])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [shape, scale] => {
                Weibull::new(shape, scale).map_err(|e| Error::fit_failed(Self::KEY, e))
            }
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

/// Maximum likelihood location and scale of a right Gumbel distribution.
///
/// The scale solves `β = mean(x) - Σ x e^(-x/β) / Σ e^(-x/β)`. Values are shifted by their
/// minimum inside the exponentials.
fn gumbel_estimate(samples: &[f64]) -> (f64, f64) {
    let mean = Statistics::mean(samples);
    let min = Statistics::min(samples);
    let weights = move |beta: f64| samples.iter().map(move |x| (-(x - min) / beta).exp());
    let likelihood = |beta: f64| {
        let (weighted, total) = samples
            .iter()
            .zip(weights(beta))
            .fold((0.0, 0.0), |(weighted, total), (x, w)| {
                (weighted + w * x, total + w)
            });
        beta - mean + weighted / total
    };
    // Start from the method of moments estimate.
    let start = Statistics::population_std_dev(samples) * 6f64.sqrt() / std::f64::consts::PI;
    let scale = increasing_root(likelihood, start);
    let location = min - scale * (weights(scale).sum::<f64>() / len(samples)).ln();
    (location, scale)
}

impl FittingDistribution for Gumbel {
    const KEY: &'static str = Gumbel::KEY;
    const PARAMETERS: &'static [&'static str] = &["location", "scale"];

    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        let (location, scale) = gumbel_estimate(samples);
        Ok(vec![location, scale])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [location, scale] => Gumbel::new(location, scale),
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

impl FittingDistribution for GumbelLeft {
    const KEY: &'static str = GumbelLeft::KEY;
    const PARAMETERS: &'static [&'static str] = &["location", "scale"];

    /// Fits a right Gumbel distribution to the negated values.
    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        let negated: Vec<f64> = samples.iter().map(|x| -x).collect();
        let (location, scale) = gumbel_estimate(&negated);
        Ok(vec![-location, scale])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [location, scale] => GumbelLeft::new(location, scale),
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

impl FittingDistribution for InverseGaussian {
    const KEY: &'static str = InverseGaussian::KEY;
    const PARAMETERS: &'static [&'static str] = &["mean", "shape"];

    /// The mean of `samples` and `n / Σ (1/x - 1/mean)`.
    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        require_positive(Self::KEY, samples)?;
        let mean = Statistics::mean(samples);
        let deviation: f64 = samples.iter().map(|x| 1.0 / x - 1.0 / mean).sum();
        Ok(vec![mean, len(samples) / deviation])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [mean, shape] => InverseGaussian::new(mean, shape),
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

impl FittingDistribution for Gamma {
    const KEY: &'static str = "gamma";
    const PARAMETERS: &'static [&'static str] = &["shape", "rate"];

    /// Solves `ln k - ψ(k) = ln mean(x) - mean(ln x)` for the shape `k`, starting from Minka's
    /// closed-form approximation.
    fn estimate(samples: &[f64]) -> Result<Vec<f64>> {
        require_positive(Self::KEY, samples)?;
        let mean = Statistics::mean(samples);
        let s = mean.ln() - samples.iter().map(|x| x.ln()).sum::<f64>() / len(samples);
        // s vanishes for constant data, up to rounding.
        let shape = if s > 1e-12 {
            let start = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
            increasing_root(|k| s - (k.ln() - digamma(k)), start)
        } else {
            f64::INFINITY
        };
        Ok(vec![shape, shape / mean])
    }

    fn with_parameters(parameters: &[f64]) -> Result<Self> {
        match *parameters {
            [shape, rate] => Gamma::new(shape, rate).map_err(|e| Error::fit_failed(Self::KEY, e)),
            _ => Err(parameter_count(Self::KEY, 2, parameters)),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn len(samples: &[f64]) -> f64 {
    samples.len() as f64
}
