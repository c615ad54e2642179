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

//! Contains the [`Error`] type shared by every module of the crate.

use thiserror::Error;

/// The error type returned by the fallible operations of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A bin rule that is neither a known rule name nor an integer.
    #[error("invalid bin rule: {rule}. Select from sqrt, rice or sturges only")]
    InvalidBinRule {
        /// The rejected rule as given by the caller.
        rule: String,
    },

    /// A distribution name that is not in the catalog.
    #[error("unsupported distribution: {0}")]
    UnknownDistribution(String),

    /// An operation that needs at least one value received none.
    #[error("sample is empty")]
    EmptySample,

    /// Fitting a distribution to a dataset did not produce usable parameters.
    #[error("error fitting {distribution} distribution: {reason}")]
    FitFailed {
        /// Catalog key of the distribution that failed.
        distribution: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// Every candidate of a best-fit search failed to fit.
    #[error("no candidate distribution could be fitted")]
    NoCandidates,

    /// A CSV cell that is neither a number nor a missing value.
    #[error("column {column}, row {row}: cannot parse {value:?} as a number")]
    InvalidValue {
        /// Name of the column.
        column: String,
        /// One-based data row, not counting the header.
        row: usize,
        /// The offending cell.
        value: String,
    },

    /// Reading or parsing a CSV file failed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// An I/O error outside of CSV parsing.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shorthand `Result` type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Builds [`Error::FitFailed`] for the distribution with catalog key `distribution`.
    pub(crate) fn fit_failed(distribution: &'static str, reason: impl ToString) -> Self {
        Error::FitFailed {
            distribution,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_rule_message_lists_choices() {
        let err = Error::InvalidBinRule {
            rule: "bogus".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("bogus"));
        assert!(message.contains("sqrt, rice or sturges"));
    }

    #[test]
    fn fit_failure_names_distribution() {
        let err = Error::fit_failed("pareto", "shape is not finite");
        assert_eq!(
            err.to_string(),
            "error fitting pareto distribution: shape is not finite"
        );
    }
}
