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

//! Everything a histogram plot needs except the drawing.
//!
//! [`prepare_histogram`] takes one or more datasets, decides the number of bins, optionally adds a
//! sample from a theoretical distribution fitted to the first dataset, and returns the bin edges,
//! the counts of every dataset and the annotations comparing each dataset with the theoretical
//! one.

use rand::Rng;

use crate::bins::Bins;
use crate::catalog::{Family, TheoreticalFit};
use crate::error::{Error, Result};
use crate::gof::{ks_2samp, GofMethod, GofResult};

/// The data of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// A single unlabeled dataset.
    Single(Vec<f64>),
    /// Several datasets, each with its legend label.
    Labeled(Vec<(String, Vec<f64>)>),
}

impl Series {
    /// Label given to the dataset of [`Series::Single`].
    pub const SINGLE_LABEL: &'static str = "data";

    fn into_labeled(self) -> Vec<(String, Vec<f64>)> {
        match self {
            Series::Single(values) => vec![(Self::SINGLE_LABEL.to_string(), values)],
            Series::Labeled(series) => series,
        }
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Series::Single(values)
    }
}

/// Options of [`prepare_histogram`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSpec {
    /// How the number of bins is chosen, from the size of the largest dataset.
    pub bins: Bins,
    /// Theoretical distribution to compare the data with.
    pub comparison: Option<Family>,
    /// Significance level of the comparison.
    pub alpha: f64,
}

impl HistogramSpec {
    /// The default value of `self.alpha`
    pub const DEFAULT_ALPHA: f64 = 0.05;
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self {
            bins: Bins::default(),
            comparison: None,
            alpha: Self::DEFAULT_ALPHA,
        }
    }
}

/// The comparison of one dataset with the theoretical distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Label of the dataset.
    pub label: String,
    /// The Kolmogorov-Smirnov test against the synthetic sample.
    pub result: GofResult,
    /// Whether the dataset differs significantly from the theoretical distribution.
    pub significant: bool,
}

impl Annotation {
    /// Text of the annotation, e.g. `"KS = 0.041, p = 0.230"`.
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "KS = {:.3}, {}",
            self.result.statistic,
            format_pvalue(self.result.p_value)
        )
    }
}

/// Counts of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    /// Legend label.
    pub label: String,
    /// Number of values in every bin.
    pub counts: Vec<usize>,
}

/// A histogram ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, one more than the number of bins.
    pub edges: Vec<f64>,
    /// Counts of every dataset, the synthetic sample last if there is one.
    pub series: Vec<HistogramSeries>,
    /// One comparison per observed dataset, empty without a comparison distribution.
    pub annotations: Vec<Annotation>,
}

impl Histogram {
    /// Number of bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Legend labels in the order of [`Self::series`].
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|series| series.label.as_str())
    }
}

/// Formats a p-value for an annotation, with three decimals.
///
/// ```
/// assert_eq!(geometrics::histogram::format_pvalue(0.0421), "p = 0.042");
/// assert_eq!(geometrics::histogram::format_pvalue(0.0002), "p < 0.001");
/// ```
#[must_use]
pub fn format_pvalue(p_value: f64) -> String {
    if p_value < 0.001 {
        "p < 0.001".to_string()
    } else {
        format!("p = {p_value:.3}")
    }
}

/// Computes the bins, counts and comparison annotations of a histogram of `series`.
///
/// With a comparison distribution, it is fitted to the first dataset and a synthetic sample of the
/// same size is added as the last series, labeled with the key of the distribution. Every observed
/// dataset is then tested against the synthetic sample.
///
/// # Errors
/// Returns [`Error::EmptySample`] if there is no data, and the fitting errors of
/// [`TheoreticalFit::new`].
pub fn prepare_histogram(
    series: Series,
    spec: &HistogramSpec,
    rng: &mut impl Rng,
) -> Result<Histogram> {
    let mut series = series.into_labeled();
    let largest = series.iter().map(|(_, values)| values.len()).max();
    let Some(largest) = largest.filter(|&len| len > 0) else {
        return Err(Error::EmptySample);
    };
    let bins = spec.bins.count(largest);

    let mut annotations = Vec::new();
    if let Some(family) = spec.comparison {
        // Missing values are NaN and take no part in the fit.
        let observed: Vec<f64> = series[0].1.iter().copied().filter(|x| !x.is_nan()).collect();
        let fit = TheoreticalFit::new(&observed, family, rng)?;
        for (label, values) in &series {
            let result = ks_2samp(values, &fit.synthetic, GofMethod::Asymptotic, rng)?;
            annotations.push(Annotation {
                label: label.clone(),
                result,
                significant: result.is_significant(spec.alpha),
            });
        }
        series.push((family.key().to_string(), fit.synthetic));
    }

    let edges = edges(series.iter().flat_map(|(_, values)| values.iter().copied()), bins);
    let series = series
        .into_iter()
        .map(|(label, values)| HistogramSeries {
            counts: count(&values, &edges),
            label,
        })
        .collect();
    Ok(Histogram {
        edges,
        series,
        annotations,
    })
}

/// `bins + 1` equal-width edges spanning the finite `values`.
#[allow(clippy::cast_precision_loss)]
fn edges(values: impl Iterator<Item = f64>, bins: usize) -> Vec<f64> {
    let (min, max) = values
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
            (min.min(x), max.max(x))
        });
    let (min, max) = if min > max {
        // No finite values at all.
        (0.0, 1.0)
    } else if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + i as f64 * width })
        .collect()
}

/// Counts `values` in the bins delimited by `edges`; the last bin includes its right edge.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn count(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len() - 1;
    let (min, max) = (edges[0], edges[bins]);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0; bins];
    for &x in values {
        if !(min..=max).contains(&x) {
            continue;
        }
        let index = (((x - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use statrs::distribution::Normal;

    use super::*;
    use crate::bins::BinRule;

    #[test]
    fn single_series_counts() {
        let mut rng = StdRng::seed_from_u64(0);
        let data: Vec<f64> = (0..100).map(f64::from).collect();
        let histogram = prepare_histogram(data.into(), &HistogramSpec::default(), &mut rng).unwrap();
        assert_eq!(histogram.bins(), 10);
        assert_eq!(histogram.series.len(), 1);
        assert_eq!(histogram.series[0].counts, vec![10; 10]);
        assert_eq!(histogram.labels().collect::<Vec<_>>(), vec!["data"]);
        assert!(histogram.annotations.is_empty());
        assert_eq!(histogram.edges[0], 0.0);
        assert_eq!(histogram.edges[10], 99.0);
    }

    #[test]
    fn bins_follow_largest_series() {
        let mut rng = StdRng::seed_from_u64(0);
        let series = Series::Labeled(vec![
            ("short".to_string(), vec![1.0, 2.0, 3.0]),
            ("long".to_string(), (0..1000).map(f64::from).collect()),
        ]);
        let spec = HistogramSpec {
            bins: BinRule::Sturges.into(),
            ..HistogramSpec::default()
        };
        let histogram = prepare_histogram(series, &spec, &mut rng).unwrap();
        // 1 + log2(1000) = 10.97
        assert_eq!(histogram.bins(), 11);
        assert_eq!(histogram.labels().collect::<Vec<_>>(), vec!["short", "long"]);
        let total: usize = histogram.series[1].counts.iter().sum();
        assert_eq!(total, 1000);
    }

    #[test]
    fn comparison_adds_synthetic_series() {
        let normal = Normal::new(5.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let data: Vec<f64> = (&normal).sample_iter(&mut rng).take(400).collect();
        let spec = HistogramSpec {
            bins: Bins::Count(12),
            comparison: Some(Family::Normal),
            ..HistogramSpec::default()
        };
        let histogram = prepare_histogram(Series::Single(data), &spec, &mut rng).unwrap();

        assert_eq!(histogram.bins(), 12);
        assert_eq!(histogram.labels().collect::<Vec<_>>(), vec!["data", "normal"]);
        assert_eq!(histogram.series[1].counts.iter().sum::<usize>(), 400);
        assert_eq!(histogram.annotations.len(), 1);
        let annotation = &histogram.annotations[0];
        assert_eq!(annotation.label, "data");
        assert!(annotation.text().starts_with("KS = "));
    }

    #[test]
    fn missing_values_are_skipped() {
        let mut rng = StdRng::seed_from_u64(5);
        let data = vec![1.0, f64::NAN, 2.0, 3.0, f64::NAN, 4.0, 2.5];
        let spec = HistogramSpec {
            bins: Bins::Count(3),
            comparison: Some(Family::Normal),
            ..HistogramSpec::default()
        };
        let histogram = prepare_histogram(data.into(), &spec, &mut rng).unwrap();
        assert_eq!(histogram.series[0].counts.iter().sum::<usize>(), 5);
        assert_eq!(histogram.series[1].counts.iter().sum::<usize>(), 5);
        assert!(histogram.annotations[0].result.p_value.is_finite());
    }

    #[test]
    fn constant_data_gets_one_wide_bin() {
        let mut rng = StdRng::seed_from_u64(0);
        let spec = HistogramSpec {
            bins: Bins::Count(1),
            ..HistogramSpec::default()
        };
        let histogram = prepare_histogram(vec![2.0; 5].into(), &spec, &mut rng).unwrap();
        assert_eq!(histogram.edges, vec![1.5, 2.5]);
        assert_eq!(histogram.series[0].counts, vec![5]);
    }

    #[test]
    fn empty_input_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        let spec = HistogramSpec::default();
        assert!(matches!(
            prepare_histogram(Series::Single(Vec::new()), &spec, &mut rng),
            Err(Error::EmptySample)
        ));
        assert!(matches!(
            prepare_histogram(Series::Labeled(Vec::new()), &spec, &mut rng),
            Err(Error::EmptySample)
        ));
    }

    #[test]
    fn pvalue_formatting() {
        assert_eq!(format_pvalue(0.5), "p = 0.500");
        assert_eq!(format_pvalue(0.001), "p = 0.001");
        assert_eq!(format_pvalue(0.000_999), "p < 0.001");
    }
}
