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

//! Continuous distributions of the catalog that `statrs` does not provide.
//!
//! Each type offers `cdf` and `pdf` and implements [`rand::distributions::Distribution`]. Sampling
//! is delegated to `rand_distr` where it has the distribution.

use std::f64::consts::{PI, SQRT_2};

use rand::distributions::{Distribution, Open01};
use rand::Rng;
use statrs::function::erf;

use crate::error::{Error, Result};

/// Right-skewed Gumbel (extreme value type I) distribution of maxima.
#[derive(Debug, Clone)]
pub struct Gumbel {
    location: f64,
    scale: f64,
    sampler: rand_distr::Gumbel<f64>,
}

impl Gumbel {
    /// Key of the distribution in the catalog.
    pub const KEY: &'static str = "gumbel_r";

    /// Constructs the distribution. `scale` must be positive and both parameters finite.
    ///
    /// # Errors
    /// Returns [`Error::FitFailed`] for invalid parameters.
    pub fn new(location: f64, scale: f64) -> Result<Self> {
        if !location.is_finite() || !(scale.is_finite() && scale > 0.0) {
            return Err(Error::fit_failed(
                Self::KEY,
                format!("invalid parameters: location {location}, scale {scale}"),
            ));
        }
        let sampler = rand_distr::Gumbel::new(location, scale)
            .map_err(|e| Error::fit_failed(Self::KEY, format!("{e:?}")))?;
        Ok(Self {
            location,
            scale,
            sampler,
        })
    }

    /// The location parameter μ (the mode).
    #[must_use]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// The scale parameter β.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `exp(-exp(-(x - μ)/β))`
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        (-(-z).exp()).exp()
    }

    /// `exp(-(z + exp(-z)))/β` with `z = (x - μ)/β`
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        (-(z + (-z).exp())).exp() / self.scale
    }
}

impl Distribution<f64> for Gumbel {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sampler.sample(rng)
    }
}

/// Left-skewed Gumbel distribution of minima, the mirror image of [`Gumbel`].
#[derive(Debug, Clone)]
pub struct GumbelLeft {
    /// The distribution of `-X`.
    mirror: Gumbel,
}

impl GumbelLeft {
    /// Key of the distribution in the catalog.
    pub const KEY: &'static str = "gumbel_l";

    /// Constructs the distribution. `scale` must be positive and both parameters finite.
    ///
    /// # Errors
    /// Returns [`Error::FitFailed`] for invalid parameters.
    pub fn new(location: f64, scale: f64) -> Result<Self> {
        let mirror = Gumbel::new(-location, scale).map_err(|err| match err {
            Error::FitFailed { reason, .. } => Error::fit_failed(Self::KEY, reason),
            other => other,
        })?;
        Ok(Self { mirror })
    }

    /// The location parameter μ (the mode).
    #[must_use]
    pub fn location(&self) -> f64 {
        -self.mirror.location
    }

    /// The scale parameter β.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.mirror.scale
    }

    /// `1 - exp(-exp((x - μ)/β))`
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        1.0 - self.mirror.cdf(-x)
    }

    /// Density at `x`.
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        self.mirror.pdf(-x)
    }
}

impl Distribution<f64> for GumbelLeft {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        -self.mirror.sample(rng)
    }
}

/// Logistic distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Logistic {
    location: f64,
    scale: f64,
}

impl Logistic {
    /// Key of the distribution in the catalog.
    pub const KEY: &'static str = "logistic";

    /// Constructs the distribution. `scale` must be positive and both parameters finite.
    ///
    /// # Errors
    /// Returns [`Error::FitFailed`] for invalid parameters.
    pub fn new(location: f64, scale: f64) -> Result<Self> {
        if !location.is_finite() || !(scale.is_finite() && scale > 0.0) {
            return Err(Error::fit_failed(
                Self::KEY,
                format!("invalid parameters: location {location}, scale {scale}"),
            ));
        }
        Ok(Self { location, scale })
    }

    /// The location parameter μ (mean and median).
    #[must_use]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// The scale parameter s.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `1 / (1 + exp(-(x - μ)/s))`
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        1.0 / (1.0 + (-z).exp())
    }

    /// Density at `x`.
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        // The density is symmetric, using |z| keeps exp from overflowing.
        let z = ((x - self.location) / self.scale).abs();
        let e = (-z).exp();
        e / (self.scale * (1.0 + e) * (1.0 + e))
    }

    /// Location and scale of the logistic distribution with the given mean and standard
    /// deviation.
    pub(crate) fn moments(mean: f64, std_dev: f64) -> (f64, f64) {
        (mean, std_dev * 3f64.sqrt() / PI)
    }
}

impl Distribution<f64> for Logistic {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // Inverse transform; Open01 excludes both endpoints.
        let u: f64 = rng.sample(Open01);
        self.location + self.scale * (u / (1.0 - u)).ln()
    }
}

/// Inverse Gaussian (Wald) distribution.
#[derive(Debug, Clone)]
pub struct InverseGaussian {
    mean: f64,
    shape: f64,
    sampler: rand_distr::InverseGaussian<f64>,
}

impl InverseGaussian {
    /// Key of the distribution in the catalog.
    pub const KEY: &'static str = "inv_norm";

    /// Constructs the distribution. Both parameters must be positive and finite.
    ///
    /// # Errors
    /// Returns [`Error::FitFailed`] for invalid parameters.
    pub fn new(mean: f64, shape: f64) -> Result<Self> {
        if !(mean.is_finite() && mean > 0.0 && shape.is_finite() && shape > 0.0) {
            return Err(Error::fit_failed(
                Self::KEY,
                format!("invalid parameters: mean {mean}, shape {shape}"),
            ));
        }
        let sampler = rand_distr::InverseGaussian::new(mean, shape)
            .map_err(|e| Error::fit_failed(Self::KEY, format!("{e:?}")))?;
        Ok(Self {
            mean,
            shape,
            sampler,
        })
    }

    /// The mean μ.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The shape λ.
    #[must_use]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Cumulative distribution function.
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let root = (self.shape / x).sqrt();
        let first = std_normal_cdf(root * (x / self.mean - 1.0));
        // exp(2λ/μ) overflows long before the product does, so combine them in log space.
        let second =
            (2.0 * self.shape / self.mean + ln_std_normal_tail(root * (x / self.mean + 1.0))).exp();
        (first + second).clamp(0.0, 1.0)
    }

    /// Density at `x`.
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let deviation = x - self.mean;
        (self.shape / (2.0 * PI * x.powi(3))).sqrt()
            * (-self.shape * deviation * deviation / (2.0 * self.mean * self.mean * x)).exp()
    }
}

impl Distribution<f64> for InverseGaussian {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sampler.sample(rng)
    }
}

/// Φ(z)
fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erf::erfc(-z / SQRT_2)
}

/// ln(1 - Φ(z)), accurate for large `z` where `erfc` underflows.
fn ln_std_normal_tail(z: f64) -> f64 {
    if z < 30.0 {
        (0.5 * erf::erfc(z / SQRT_2)).ln()
    } else {
        -0.5 * z * z - z.ln() - 0.5 * (2.0 * PI).ln()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    /// Trapezoidal integral of `f` over `[a, b]`.
    fn integrate(f: impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
        let steps = 20_000;
        let h = (b - a) / f64::from(steps);
        let inner: f64 = (1..steps).map(|i| f(a + f64::from(i) * h)).sum();
        h * (0.5 * f(a) + inner + 0.5 * f(b))
    }

    #[test]
    fn gumbel_cdf_matches_density() {
        let d = Gumbel::new(1.5, 2.0).unwrap();
        assert_abs_diff_eq!(d.cdf(1.5), (-1f64).exp(), epsilon = 1e-12);
        let area = integrate(|x| d.pdf(x), -10.0, 3.0);
        assert_abs_diff_eq!(area, d.cdf(3.0), epsilon = 1e-4);
    }

    #[test]
    fn gumbel_left_mirrors_right() {
        let right = Gumbel::new(2.0, 0.5).unwrap();
        let left = GumbelLeft::new(-2.0, 0.5).unwrap();
        for x in [-4.0, -2.0, -1.0, 0.0, 1.0] {
            assert_abs_diff_eq!(left.cdf(x), 1.0 - right.cdf(-x), epsilon = 1e-12);
            assert_abs_diff_eq!(left.pdf(x), right.pdf(-x), epsilon = 1e-12);
        }
        assert_abs_diff_eq!(left.location(), -2.0);
    }

    #[test]
    fn logistic_is_symmetric() {
        let d = Logistic::new(3.0, 1.2).unwrap();
        assert_abs_diff_eq!(d.cdf(3.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(d.cdf(1.0) + d.cdf(5.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.pdf(1.0), d.pdf(5.0), epsilon = 1e-12);
        assert!(d.pdf(1e6).is_finite());
    }

    #[test]
    fn logistic_samples_have_expected_moments() {
        let d = Logistic::new(-1.0, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let n = 50_000;
        let samples: Vec<f64> = (0..n).map(|_| d.sample(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / f64::from(n);
        assert_abs_diff_eq!(mean, -1.0, epsilon = 0.02);
    }

    #[test]
    fn inverse_gaussian_cdf_matches_density() {
        let d = InverseGaussian::new(1.0, 3.0).unwrap();
        assert_abs_diff_eq!(d.cdf(0.0), 0.0);
        let area = integrate(|x| d.pdf(x), 1e-9, 2.0);
        assert_abs_diff_eq!(area, d.cdf(2.0), epsilon = 1e-4);
    }

    #[test]
    fn inverse_gaussian_cdf_with_large_shape() {
        // 2λ/μ is far beyond what exp can represent.
        let d = InverseGaussian::new(1.0, 2_000.0).unwrap();
        let c = d.cdf(1.0);
        assert!(c.is_finite());
        assert!((0.45..0.55).contains(&c), "cdf at the mean was {c}");
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(Gumbel::new(0.0, 0.0).is_err());
        assert!(Logistic::new(f64::NAN, 1.0).is_err());
        assert!(InverseGaussian::new(-1.0, 1.0).is_err());
        let err = GumbelLeft::new(0.0, f64::INFINITY).unwrap_err();
        assert!(matches!(
            err,
            Error::FitFailed {
                distribution: "gumbel_l",
                ..
            }
        ));
    }
}
