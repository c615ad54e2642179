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

//! Contains the [`Sample`] trait and the datasets simulated by the goodness-of-fit tests.

use rand::seq::SliceRandom;

use crate::gof;

/// A dataset that can be randomly regenerated and reduced to a single statistic.
pub trait Sample {
    /// Replaces the dataset with a new random one.
    fn generate(&mut self, rng: &mut impl rand::Rng);

    /// Computes the statistic of the current dataset.
    fn evaluate(&self) -> f64;
}

/// Two samples pooled together and randomly split back into groups of the original sizes.
///
/// The statistic is the two-sample Kolmogorov-Smirnov distance between the groups. Under the
/// hypothesis that both samples come from the same distribution every split is equally likely,
/// which makes the simulated statistics the null distribution of the observed one.
#[allow(clippy::module_name_repetitions)]
pub struct PermutationSample {
    /// Both groups, each sorted after [`Sample::generate`].
    pooled: Box<[f64]>,
    /// Size of the first group.
    split: usize,
}

impl Sample for PermutationSample {
    fn generate(&mut self, rng: &mut impl rand::Rng) {
        self.pooled.shuffle(rng);
        let (first, second) = self.pooled.split_at_mut(self.split);
        first.sort_by(f64::total_cmp);
        second.sort_by(f64::total_cmp);
    }

    fn evaluate(&self) -> f64 {
        let (first, second) = self.pooled.split_at(self.split);
        gof::sorted_ks_statistic(first, second)
    }
}

impl PermutationSample {
    /// Pools `first` and `second`. Returns `None` if either of them is empty.
    #[must_use]
    pub fn new(first: &[f64], second: &[f64]) -> Option<Self> {
        if first.is_empty() || second.is_empty() {
            return None;
        }
        let pooled = first.iter().chain(second).copied().collect();
        Some(Self {
            pooled,
            split: first.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn empty_groups_are_rejected() {
        assert!(PermutationSample::new(&[], &[1.0]).is_none());
        assert!(PermutationSample::new(&[1.0], &[]).is_none());
    }

    #[test]
    fn generate_keeps_values_and_sizes() {
        let mut sample = PermutationSample::new(&[1.0, 2.0, 3.0], &[4.0, 5.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        sample.generate(&mut rng);
        let mut values = sample.pooled.to_vec();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let (first, second) = sample.pooled.split_at(3);
        assert!(first.windows(2).all(|w| w[0] <= w[1]));
        assert!(second.windows(2).all(|w| w[0] <= w[1]));
        let statistic = sample.evaluate();
        assert!((0.0..=1.0).contains(&statistic));
    }
}
