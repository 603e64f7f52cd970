use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest peptide window accepted on the command line or in a config.
pub const MAX_PEPTIDE_LENGTH: usize = 50;

/// A type-safe wrapper for peptide window lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize")]
pub struct PeptideLength(usize);

impl PeptideLength {
    /// Create a new peptide length with validation
    pub fn new(length: usize) -> Result<Self, String> {
        if length == 0 {
            Err("Peptide length must be greater than 0".to_string())
        } else if length > MAX_PEPTIDE_LENGTH {
            Err(format!("Peptide length too large (max {})", MAX_PEPTIDE_LENGTH))
        } else {
            Ok(PeptideLength(length))
        }
    }

    /// Get the raw value
    pub fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for PeptideLength {
    type Error = String;

    fn try_from(length: usize) -> Result<Self, String> {
        Self::new(length)
    }
}

impl fmt::Display for PeptideLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 1-based residue position within a protein
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize")]
pub struct Position(usize);

impl Position {
    /// Create a new position, rejecting zero
    pub fn new(pos: usize) -> Result<Self, String> {
        if pos == 0 {
            Err("Positions are 1-based and must be at least 1".to_string())
        } else {
            Ok(Position(pos))
        }
    }

    /// Get the raw value
    pub fn get(&self) -> usize {
        self.0
    }

    /// Zero-based offset into a sequence
    pub fn index(&self) -> usize {
        self.0 - 1
    }
}

impl TryFrom<usize> for Position {
    type Error = String;

    fn try_from(pos: usize) -> Result<Self, String> {
        Self::new(pos)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fraction of tumor cells carrying a mutation, in [0, 1].
///
/// Used both as the per-mutation confidence and as the minimum threshold
/// applied when grouping mutations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64")]
pub struct CellFraction(f64);

impl CellFraction {
    pub const CLONAL: CellFraction = CellFraction(1.0);

    /// Create a new cell fraction with validation
    pub fn new(fraction: f64) -> Result<Self, String> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            Err(format!("Cell fraction must lie in [0, 1], got {}", fraction))
        } else {
            Ok(CellFraction(fraction))
        }
    }

    /// Get the raw value
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for CellFraction {
    type Error = String;

    fn try_from(fraction: f64) -> Result<Self, String> {
        Self::new(fraction)
    }
}

impl Default for CellFraction {
    fn default() -> Self {
        CellFraction::CLONAL
    }
}

impl fmt::Display for CellFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
