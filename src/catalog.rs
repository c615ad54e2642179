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

//! The catalog of theoretical distributions and the fitter built on it.
//!
//! [`CATALOG`] is a constant table: every [`Family`] that can be fitted, in the order in which
//! [`best_fit`](crate::selector::best_fit) tries them. Names are looked up case-insensitively with
//! [`Family::from_name`] or by parsing.

use std::fmt;
use std::str::FromStr;

use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::{
    Continuous, ContinuousCDF, Exp, Gamma, LogNormal, Normal, Pareto, Weibull,
};

use crate::distributions::{Gumbel, GumbelLeft, InverseGaussian, Logistic};
use crate::error::{Error, Result};
use crate::fitting::{fit_parameters, FittingDistribution};

/// A parametric family of continuous distributions that can be fitted to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Normal distribution.
    Normal,
    /// Log-normal distribution.
    LogNormal,
    /// Exponential distribution.
    Exponential,
    /// Logistic distribution.
    Logistic,
    /// Pareto (type I) distribution.
    Pareto,
    /// Weibull distribution of minima.
    WeibullMin,
    /// Right-skewed Gumbel distribution.
    GumbelR,
    /// Left-skewed Gumbel distribution.
    GumbelL,
    /// Inverse Gaussian distribution.
    InverseNormal,
    /// Gamma distribution.
    Gamma,
}

/// Every fittable family, in the default order of comparison.
pub const CATALOG: &[Family] = &[
    Family::Normal,
    Family::LogNormal,
    Family::Exponential,
    Family::Logistic,
    Family::Pareto,
    Family::WeibullMin,
    Family::GumbelR,
    Family::GumbelL,
    Family::InverseNormal,
    Family::Gamma,
];

impl Family {
    /// Canonical name of the family.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Family::Normal => Normal::KEY,
            Family::LogNormal => LogNormal::KEY,
            Family::Exponential => Exp::KEY,
            Family::Logistic => Logistic::KEY,
            Family::Pareto => Pareto::KEY,
            Family::WeibullMin => Weibull::KEY,
            Family::GumbelR => Gumbel::KEY,
            Family::GumbelL => GumbelLeft::KEY,
            Family::InverseNormal => InverseGaussian::KEY,
            Family::Gamma => Gamma::KEY,
        }
    }

    /// Names of the parameters reported by [`Fitted::parameters`].
    #[must_use]
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            Family::Normal => Normal::PARAMETERS,
            Family::LogNormal => LogNormal::PARAMETERS,
            Family::Exponential => Exp::PARAMETERS,
            Family::Logistic => Logistic::PARAMETERS,
            Family::Pareto => Pareto::PARAMETERS,
            Family::WeibullMin => Weibull::PARAMETERS,
            Family::GumbelR => Gumbel::PARAMETERS,
            Family::GumbelL => GumbelLeft::PARAMETERS,
            Family::InverseNormal => InverseGaussian::PARAMETERS,
            Family::Gamma => Gamma::PARAMETERS,
        }
    }

    /// Looks up a family by its key or a common alias, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Family> {
        let name = name.trim().to_lowercase();
        let alias = match name.as_str() {
            "norm" => Some(Family::Normal),
            "expon" => Some(Family::Exponential),
            "weibull" => Some(Family::WeibullMin),
            "gumbel" => Some(Family::GumbelR),
            "invgauss" | "inverse_normal" => Some(Family::InverseNormal),
            _ => None,
        };
        alias.or_else(|| CATALOG.iter().copied().find(|family| family.key() == name))
    }

    /// Fits the family to `samples`.
    ///
    /// # Errors
    /// Returns [`Error::EmptySample`] for an empty dataset and [`Error::FitFailed`] naming the
    /// family when the parameters cannot be estimated or are not finite.
    pub fn fit(self, samples: &[f64]) -> Result<Fitted> {
        let (parameters, model) = match self {
            Family::Normal => fit_model(samples, Model::Normal)?,
            Family::LogNormal => fit_model(samples, Model::LogNormal)?,
            Family::Exponential => fit_model(samples, Model::Exponential)?,
            Family::Logistic => fit_model(samples, Model::Logistic)?,
            Family::Pareto => fit_model(samples, Model::Pareto)?,
            Family::WeibullMin => fit_model(samples, Model::Weibull)?,
            Family::GumbelR => fit_model(samples, Model::GumbelR)?,
            Family::GumbelL => fit_model(samples, Model::GumbelL)?,
            Family::InverseNormal => fit_model(samples, Model::InverseGaussian)?,
            Family::Gamma => fit_model(samples, Model::Gamma)?,
        };
        Ok(Fitted {
            family: self,
            parameters,
            model,
        })
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Family::from_name(s).ok_or_else(|| Error::UnknownDistribution(s.to_string()))
    }
}

fn fit_model<D: FittingDistribution>(
    samples: &[f64],
    wrap: fn(D) -> Model,
) -> Result<(Vec<f64>, Model)> {
    let parameters = fit_parameters::<D>(samples)?;
    let distr = D::with_parameters(&parameters)?;
    Ok((parameters, wrap(distr)))
}

/// The distribution behind a [`Fitted`].
#[derive(Debug, Clone)]
enum Model {
    Normal(Normal),
    LogNormal(LogNormal),
    Exponential(Exp),
    Logistic(Logistic),
    Pareto(Pareto),
    Weibull(Weibull),
    GumbelR(Gumbel),
    GumbelL(GumbelLeft),
    InverseGaussian(InverseGaussian),
    Gamma(Gamma),
}

/// A distribution of the catalog with parameters fitted to a dataset.
#[derive(Debug, Clone)]
pub struct Fitted {
    family: Family,
    parameters: Vec<f64>,
    model: Model,
}

impl Fitted {
    /// The family the distribution belongs to.
    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    /// The fitted parameters, in the order of [`Family::parameter_names`].
    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Cumulative distribution function.
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        match &self.model {
            Model::Normal(d) => d.cdf(x),
            Model::LogNormal(d) => d.cdf(x),
            Model::Exponential(d) => d.cdf(x),
            Model::Logistic(d) => d.cdf(x),
            Model::Pareto(d) => d.cdf(x),
            Model::Weibull(d) => d.cdf(x),
            Model::GumbelR(d) => d.cdf(x),
            Model::GumbelL(d) => d.cdf(x),
            Model::InverseGaussian(d) => d.cdf(x),
            Model::Gamma(d) => d.cdf(x),
        }
    }

    /// Probability density function.
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        match &self.model {
            Model::Normal(d) => d.pdf(x),
            Model::LogNormal(d) => d.pdf(x),
            Model::Exponential(d) => d.pdf(x),
            Model::Logistic(d) => d.pdf(x),
            Model::Pareto(d) => d.pdf(x),
            Model::Weibull(d) => d.pdf(x),
            Model::GumbelR(d) => d.pdf(x),
            Model::GumbelL(d) => d.pdf(x),
            Model::InverseGaussian(d) => d.pdf(x),
            Model::Gamma(d) => d.pdf(x),
        }
    }
}

impl Distribution<f64> for Fitted {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.model {
            Model::Normal(d) => d.sample(rng),
            Model::LogNormal(d) => d.sample(rng),
            Model::Exponential(d) => d.sample(rng),
            Model::Logistic(d) => d.sample(rng),
            Model::Pareto(d) => d.sample(rng),
            Model::Weibull(d) => d.sample(rng),
            Model::GumbelR(d) => d.sample(rng),
            Model::GumbelL(d) => d.sample(rng),
            Model::InverseGaussian(d) => d.sample(rng),
            Model::Gamma(d) => d.sample(rng),
        }
    }
}

/// A theoretical distribution fitted to a dataset, with the quantities needed to compare the two.
#[derive(Debug, Clone)]
pub struct TheoreticalFit {
    /// The fitted distribution.
    pub distribution: Fitted,
    /// A sample of the same size as the dataset drawn from [`Self::distribution`].
    pub synthetic: Vec<f64>,
    /// The density at every value of the dataset multiplied by the size of the dataset, on the
    /// scale of a histogram of counts.
    pub density: Vec<f64>,
}

impl TheoreticalFit {
    /// Fits `family` to `samples` and draws the synthetic sample with `rng`.
    ///
    /// # Errors
    /// See [`Family::fit`].
    #[allow(clippy::cast_precision_loss)]
    pub fn new(samples: &[f64], family: Family, rng: &mut impl Rng) -> Result<Self> {
        let distribution = family.fit(samples)?;
        let synthetic: Vec<f64> = (&distribution)
            .sample_iter(rng)
            .take(samples.len())
            .collect();
        let n = samples.len() as f64;
        let density = samples.iter().map(|&x| distribution.pdf(x) * n).collect();
        Ok(Self {
            distribution,
            synthetic,
            density,
        })
    }
}

/// Fits the distribution named `name` to `samples`.
///
/// Returns a sample of equal size drawn from the fitted distribution and its density at `samples`
/// scaled by their number.
///
/// # Errors
/// Returns [`Error::UnknownDistribution`] if `name` is not in the catalog, otherwise see
/// [`Family::fit`].
pub fn theoretical_distribution(
    samples: &[f64],
    name: &str,
    rng: &mut impl Rng,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let family: Family = name.parse()?;
    let fit = TheoreticalFit::new(samples, family, rng)?;
    Ok((fit.synthetic, fit.density))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Family::from_name("Normal"), Some(Family::Normal));
        assert_eq!(Family::from_name("WEIBULL_MIN"), Some(Family::WeibullMin));
        assert_eq!(Family::from_name("invgauss"), Some(Family::InverseNormal));
        assert_eq!(Family::from_name("Gumbel"), Some(Family::GumbelR));
        assert_eq!(Family::from_name("exponenatial"), None);
    }

    #[test]
    fn every_key_round_trips() {
        for &family in CATALOG {
            assert_eq!(family.key().parse::<Family>().unwrap(), family);
            assert_eq!(family.to_string(), family.key());
        }
    }

    #[test]
    fn unknown_name_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = theoretical_distribution(&[1.0, 2.0], "powerlaww", &mut rng).unwrap_err();
        assert!(matches!(err, Error::UnknownDistribution(ref name) if name == "powerlaww"));
    }

    #[test]
    fn synthetic_sample_has_same_size() {
        let mut rng = StdRng::seed_from_u64(11);
        let data: Vec<f64> = (1..=250).map(|i| f64::from(i) / 10.0).collect();
        for &family in CATALOG {
            let fit = TheoreticalFit::new(&data, family, &mut rng).unwrap();
            assert_eq!(fit.synthetic.len(), data.len(), "{family}");
            assert_eq!(fit.density.len(), data.len(), "{family}");
            assert_eq!(
                fit.distribution.parameters().len(),
                family.parameter_names().len()
            );
            assert!(fit.density.iter().all(|d| d.is_finite() && *d >= 0.0));
        }
    }

    #[test]
    fn density_is_scaled_by_sample_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = [-1.0, 0.0, 1.0, 2.0];
        let (_, density) = theoretical_distribution(&data, "NORMAL", &mut rng).unwrap();
        let normal = Normal::new(0.5, 1.25f64.sqrt()).unwrap();
        for (x, d) in data.iter().zip(&density) {
            assert_relative_eq!(*d, 4.0 * normal.pdf(*x), max_relative = 1e-9);
        }
    }

    #[test]
    fn non_finite_parameters_name_the_family() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = theoretical_distribution(&[2.0; 5], "pareto", &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::FitFailed {
                distribution: "pareto",
                ..
            }
        ));
    }
}
