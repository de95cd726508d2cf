use std::fmt::{Display, Formatter};

/// A linear threshold function: the output is `true` iff `Σ weights[i]·x[i] ≥ threshold`.
///
/// `weights` always has exactly one entry per network variable, zero for non-parents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdFunction {
    pub weights: Vec<i64>,
    pub threshold: i64,
}

impl ThresholdFunction {
    /// A function with all-zero weights and zero threshold (constant `true`).
    pub fn zero(size: usize) -> ThresholdFunction {
        ThresholdFunction {
            weights: vec![0; size],
            threshold: 0,
        }
    }

    /// Ids and weights of all parents (variables with a non-zero weight).
    pub fn parents(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0)
            .map(|(id, w)| (id, *w))
    }

    pub fn weighted_sum(&self, values: &[bool]) -> i64 {
        self.parents()
            .filter(|(id, _)| values.get(*id).copied().unwrap_or(false))
            .map(|(_, w)| w)
            .sum()
    }

    pub fn evaluate(&self, values: &[bool]) -> bool {
        self.weighted_sum(values) >= self.threshold
    }

    /// The least and the greatest weighted sum over all completions of a partial valuation.
    pub fn bounds(&self, known: impl Fn(usize) -> Option<bool>) -> (i64, i64) {
        let mut min = 0;
        let mut max = 0;
        for (id, weight) in self.parents() {
            match known(id) {
                Some(true) => {
                    min += weight;
                    max += weight;
                }
                Some(false) => {}
                None if weight < 0 => min += weight,
                None => max += weight,
            }
        }
        (min, max)
    }

    /// The output value if a partial valuation already determines it.
    pub fn fixed_output(&self, known: impl Fn(usize) -> Option<bool>) -> Option<bool> {
        let (min, max) = self.bounds(known);
        if min >= self.threshold {
            Some(true)
        } else if max < self.threshold {
            Some(false)
        } else {
            None
        }
    }
}

impl Display for ThresholdFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .parents()
            .map(|(id, w)| format!("{w}*x{id}"))
            .collect::<Vec<_>>();
        if terms.is_empty() {
            write!(f, "0 >= {}", self.threshold)
        } else {
            write!(f, "{} >= {}", terms.join(" + "), self.threshold)
        }
    }
}
