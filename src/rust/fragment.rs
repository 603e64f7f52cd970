use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{PipelineError, PipelineResult};

/// A 1-based inclusive window of residue positions.
///
/// `lower >= 1` and `upper >= lower` hold for every range built through
/// [`FragmentRange::new`] or [`resolve_fragments`], so a range always spans at
/// least one residue. Ordered by lower then upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentRange {
    pub lower: usize,
    pub upper: usize,
}

impl FragmentRange {
    pub fn new(lower: usize, upper: usize) -> PipelineResult<Self> {
        if lower == 0 || upper < lower {
            return Err(PipelineError::ValidationError {
                message: format!("Invalid fragment range [{}, {}]", lower, upper),
            });
        }
        Ok(Self { lower, upper })
    }

    /// Number of residues covered.
    pub fn span(&self) -> usize {
        self.upper - self.lower + 1
    }

    pub fn contains(&self, position: usize) -> bool {
        self.lower <= position && position <= self.upper
    }

    /// The residues this window covers in `sequence`, if it fits.
    pub fn extract<'a>(&self, sequence: &'a str) -> Option<&'a str> {
        sequence.get(self.lower - 1..self.upper)
    }
}

impl fmt::Display for FragmentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Every length-`length` window of a `sequence_length`-residue sequence that
/// contains the 1-based `position`, sorted by lower bound.
///
/// Windows never extend past either terminus, so positions near an end get
/// fewer than `length` windows, and a sequence shorter than `length` gets none.
///
/// # Example
///
/// ```rust
/// use neopairs::fragment::resolve_fragments;
///
/// let windows = resolve_fragments(123, 9, 200);
/// assert_eq!(windows.len(), 9);
/// assert_eq!((windows[0].lower, windows[0].upper), (115, 123));
/// assert_eq!((windows[8].lower, windows[8].upper), (123, 131));
/// ```
pub fn resolve_fragments(
    position: usize,
    length: usize,
    sequence_length: usize,
) -> Vec<FragmentRange> {
    if position == 0 || length == 0 || length > sequence_length {
        return Vec::new();
    }

    let index = position - 1;
    let mut lower = (index + 1).saturating_sub(length);
    let mut upper = lower + length - 1;
    let mut ranges = Vec::with_capacity(length.min(sequence_length - length + 1));

    while lower <= index && upper < sequence_length {
        ranges.push(FragmentRange { lower: lower + 1, upper: upper + 1 });
        lower += 1;
        upper += 1;
    }
    ranges
}
