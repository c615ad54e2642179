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

//! Rules for choosing the number of histogram bins.
//!
//! A named rule is a [`BinRule`]. A caller that already knows the number of bins uses
//! [`Bins::Count`]. Both are wrapped by [`Bins`], which can also be parsed from text for
//! compatibility with configuration files that mix the two.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A named formula converting a sample size to a number of histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinRule {
    /// `ceil(sqrt(n))`
    #[default]
    Sqrt,
    /// `2 * n^(1/3)`
    Rice,
    /// `1 + log2(n)`
    Sturges,
}

impl BinRule {
    /// Returns the number of bins for a dataset of `length` values.
    ///
    /// The result is not rounded except for [`BinRule::Sqrt`]; see [`Bins::count`].
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn bins(self, length: usize) -> f64 {
        let n = length as f64;
        match self {
            BinRule::Sqrt => n.sqrt().ceil(),
            BinRule::Rice => 2.0 * n.cbrt(),
            BinRule::Sturges => 1.0 + n.log2(),
        }
    }

    /// The name used when parsing and printing the rule.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BinRule::Sqrt => "sqrt",
            BinRule::Rice => "rice",
            BinRule::Sturges => "sturges",
        }
    }
}

impl fmt::Display for BinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqrt" => Ok(BinRule::Sqrt),
            "rice" => Ok(BinRule::Rice),
            "sturges" => Ok(BinRule::Sturges),
            _ => Err(Error::InvalidBinRule {
                rule: s.to_string(),
            }),
        }
    }
}

/// How the number of histogram bins is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bins {
    /// Derive the number from the sample size.
    Rule(BinRule),
    /// Use exactly this many bins.
    Count(usize),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Rule(BinRule::default())
    }
}

impl From<BinRule> for Bins {
    fn from(rule: BinRule) -> Self {
        Bins::Rule(rule)
    }
}

impl Bins {
    /// Returns the number of bins for a dataset of `length` values, before rounding.
    ///
    /// An explicit count is returned unchanged whatever `length` is.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn bins(self, length: usize) -> f64 {
        match self {
            Bins::Rule(rule) => rule.bins(length),
            Bins::Count(count) => count as f64,
        }
    }

    /// Returns the number of bins rounded up to a whole number, never less than one.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn count(self, length: usize) -> usize {
        let bins = self.bins(length).ceil();
        if bins.is_finite() && bins >= 1.0 {
            bins as usize
        } else {
            1
        }
    }
}

impl FromStr for Bins {
    type Err = Error;

    /// Parses either a rule name or an integer.
    ///
    /// An integer is taken as the number of bins and a warning is logged, since older
    /// configurations used the same field for both meanings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(count) = s.trim().parse::<usize>() {
            tracing::warn!(
                "bin rule {count} is an integer, assuming it is the number of bins. \
                 If not, check your input"
            );
            return Ok(Bins::Count(count));
        }
        s.parse::<BinRule>().map(Bins::Rule)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use approx::assert_abs_diff_eq;

    use super::*;

    /// Collects everything a `tracing` subscriber writes.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn sqrt_rule() {
        assert_abs_diff_eq!(BinRule::Sqrt.bins(100), 10.0);
        assert_abs_diff_eq!(BinRule::Sqrt.bins(101), 11.0);
        for n in 1..500 {
            assert_abs_diff_eq!(BinRule::Sqrt.bins(n), (n as f64).sqrt().ceil());
        }
    }

    #[test]
    fn sturges_rule() {
        assert_abs_diff_eq!(BinRule::Sturges.bins(100), 7.643_856, epsilon = 1e-6);
        assert_abs_diff_eq!(BinRule::Sturges.bins(1), 1.0);
        assert_eq!(Bins::Rule(BinRule::Sturges).count(100), 8);
    }

    #[test]
    fn rice_rule() {
        assert_abs_diff_eq!(BinRule::Rice.bins(1000), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(BinRule::Rice.bins(8), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn explicit_count_is_unchanged() {
        assert_abs_diff_eq!(Bins::Count(7).bins(100), 7.0);
        assert_abs_diff_eq!(Bins::Count(7).bins(1_000_000), 7.0);
        assert_eq!(Bins::Count(0).count(10), 1);
    }

    #[test]
    fn parse_rule_names() {
        assert_eq!("sqrt".parse::<Bins>().unwrap(), Bins::Rule(BinRule::Sqrt));
        assert_eq!("Rice".parse::<Bins>().unwrap(), Bins::Rule(BinRule::Rice));
        assert_eq!(
            " sturges ".parse::<Bins>().unwrap(),
            Bins::Rule(BinRule::Sturges)
        );
    }

    #[test]
    fn parse_integer_warns() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let bins = tracing::subscriber::with_default(subscriber, || "7".parse::<Bins>());

        assert_eq!(bins.unwrap(), Bins::Count(7));
        let logged = captured.text();
        assert!(logged.contains("WARN"), "no warning in {logged:?}");
        assert!(logged.contains("number of bins"));
    }

    #[test]
    fn parse_bogus_fails() {
        let err = "bogus".parse::<Bins>().unwrap_err();
        assert!(matches!(err, Error::InvalidBinRule { ref rule } if rule == "bogus"));
        assert!("".parse::<BinRule>().is_err());
        assert!("-3".parse::<Bins>().is_err());
    }
}
