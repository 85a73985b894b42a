//! Recombination strategies over equal-length bit strings.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Two-point recombination always exchanges this window, clipped to the
/// chromosome when shorter.
const SEGMENT_START: usize = 3;
const SEGMENT_END: usize = 9;

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[error("cannot recombine chromosomes of different lengths ({lhs} and {rhs})")]
pub struct LengthMismatchError {
    pub lhs: usize,
    pub rhs: usize,
}

/// Where a crossover cut the parents, reported alongside the children so the
/// breeding step can be logged and replayed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum CutPoints {
    /// No exchange happened (chromosomes too short, or uniform crossover).
    None,
    /// One cut; the suffix from this index on was exchanged.
    Single(usize),
    /// The half-open window `start..end` was exchanged.
    Segment { start: usize, end: usize },
}

/// Recombination strategy for one parent pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Crossover {
    /// One cut, random in `1..length` unless fixed at construction.
    SinglePoint { point: Option<usize> },
    /// Exchanges a fixed mid-chromosome window.
    TwoPoint,
    /// Independently swaps each position with probability one half.
    Uniform,
}

impl Crossover {
    pub fn single_point() -> Self {
        Self::SinglePoint { point: None }
    }

    /// Single-point crossover that always cuts at `point`.
    pub fn single_point_at(point: usize) -> Self {
        Self::SinglePoint { point: Some(point) }
    }

    pub fn two_point() -> Self {
        Self::TwoPoint
    }

    pub fn uniform() -> Self {
        Self::Uniform
    }

    /// Recombines two parents into two children.
    ///
    /// Parents shorter than 2 bits have no interior cut, so they are returned
    /// unchanged with `CutPoints::None`.
    #[instrument(level = "debug", skip(self, rng), fields(strategy = ?self))]
    pub(crate) fn apply<R: Rng>(
        &self,
        rng: &mut R,
        parent1: &str,
        parent2: &str,
    ) -> Result<(String, String, CutPoints), LengthMismatchError> {
        if parent1.len() != parent2.len() {
            return Err(LengthMismatchError {
                lhs: parent1.len(),
                rhs: parent2.len(),
            });
        }

        let length = parent1.len();
        if length < 2 {
            return Ok((parent1.to_string(), parent2.to_string(), CutPoints::None));
        }

        match self {
            Self::SinglePoint { point } => {
                let cut = match point {
                    Some(cut) => (*cut).clamp(1, length - 1),
                    None => rng.random_range(1..length),
                };
                let (child1, child2) = exchange_window(parent1, parent2, cut, length);
                Ok((child1, child2, CutPoints::Single(cut)))
            }
            Self::TwoPoint => {
                let start = SEGMENT_START.min(length);
                let end = SEGMENT_END.min(length);
                let (child1, child2) = exchange_window(parent1, parent2, start, end);
                Ok((child1, child2, CutPoints::Segment { start, end }))
            }
            Self::Uniform => {
                let mut child1 = String::with_capacity(length);
                let mut child2 = String::with_capacity(length);
                for (b1, b2) in parent1.chars().zip(parent2.chars()) {
                    if rng.random_bool(0.5) {
                        child1.push(b2);
                        child2.push(b1);
                    } else {
                        child1.push(b1);
                        child2.push(b2);
                    }
                }
                Ok((child1, child2, CutPoints::None))
            }
        }
    }
}

/// Swaps the window `start..end` between the parents.
fn exchange_window(parent1: &str, parent2: &str, start: usize, end: usize) -> (String, String) {
    let child1 = format!("{}{}{}", &parent1[..start], &parent2[start..end], &parent1[end..]);
    let child2 = format!("{}{}{}", &parent2[..start], &parent1[start..end], &parent2[end..]);
    (child1, child2)
}
