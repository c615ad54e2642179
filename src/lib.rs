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

//! Statistical helpers for exploring geoscience datasets.
//!
//! Geometrics answers three recurring questions about a column of measurements:
//!
//! * how many bins its histogram should have ([`bins`]),
//! * which parameters a given distribution takes when fitted to it ([`catalog`], [`fitting`]),
//! * and which distribution of a fixed catalog describes it best ([`selector`]).
//!
//! Fitted distributions are compared with the data through a synthetic sample of the same size
//! and the two-sample Kolmogorov-Smirnov test ([`gof`]). Its p-value is either asymptotic or
//! simulated by permutations with [`MonteCarlo`].
//!
//! # Examples
//!
//! Fitting a log-normal distribution to porosity-like data and checking the fit:
//! ```
//! use geometrics::{ks_2samp, theoretical_distribution, GofMethod};
//! use rand::distributions::Distribution;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(3);
//! let lognormal = statrs::distribution::LogNormal::new(-1.5, 0.4).unwrap();
//! let porosity: Vec<f64> = lognormal.sample_iter(&mut rng).take(1_000).collect();
//!
//! let (synthetic, density) = theoretical_distribution(&porosity, "lognormal", &mut rng).unwrap();
//! assert_eq!(synthetic.len(), porosity.len());
//! assert_eq!(density.len(), porosity.len());
//!
//! let result = ks_2samp(&porosity, &synthetic, GofMethod::Asymptotic, &mut rng).unwrap();
//! println!("KS = {:.3}, p = {:.3}", result.statistic, result.p_value);
//! ```
//!
//! Choosing the number of bins, either from a named rule or explicitly:
//! ```
//! use geometrics::{BinRule, Bins};
//!
//! let rule: Bins = "sturges".parse().unwrap();
//! assert_eq!(rule, Bins::Rule(BinRule::Sturges));
//! assert_eq!(Bins::Rule(BinRule::Sqrt).count(100), 10);
//! assert_eq!(Bins::Count(25).count(100), 25);
//! assert!("bogus".parse::<Bins>().is_err());
//! ```
#![deny(clippy::pedantic)]
#![deny(missing_docs)]

pub mod bins;
pub mod catalog;
pub mod distributions;
pub mod error;
pub mod fitting;
pub mod gof;
pub mod histogram;
pub mod io;
pub mod monte_carlo;
pub mod sample;
pub mod selector;

pub use bins::{BinRule, Bins};
pub use catalog::{theoretical_distribution, Family, Fitted, TheoreticalFit, CATALOG};
pub use error::{Error, Result};
pub use gof::{ks_2samp, GofMethod, GofResult};
pub use histogram::{prepare_histogram, Histogram, HistogramSpec, Series};
pub use io::{load_csv, CsvOptions};
pub use monte_carlo::MonteCarlo;
pub use selector::{best_fit, best_fit_catalog, BestFit, SelectorConfig};
