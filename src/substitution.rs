//! Substitution calls such as `N501Y` and the routine that derives them
//! from an alignment against the reference window.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::align::PairwiseAligner;
use crate::error::{AavarError, AlignError};
use crate::matrix::{SubstitutionMatrix, CANONICAL};

/// One residue change at a 1-based reference position.
///
/// Ordered by position first so sorted output follows the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Substitution {
    pub position: usize,
    pub reference: u8,
    pub observed: u8,
}

impl Substitution {
    pub fn new(reference: u8, position: usize, observed: u8) -> Self {
        Self { position, reference, observed }
    }

    /// Both residues are among the 20 canonical amino acids.
    pub fn is_canonical(&self) -> bool {
        CANONICAL.contains(&self.reference) && CANONICAL.contains(&self.observed)
    }

    /// Matrix score of replacing the reference residue by the observed one.
    pub fn score(&self, matrix: &SubstitutionMatrix) -> Option<i32> {
        matrix.score(self.reference, self.observed)
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.reference as char, self.position, self.observed as char)
    }
}

impl FromStr for Substitution {
    type Err = AavarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() < 3 || !s.is_ascii() {
            return Err(AavarError::Parse(format!("malformed substitution '{}'", s)));
        }
        let reference = bytes[0];
        let observed = bytes[bytes.len() - 1];
        if reference.is_ascii_digit() || observed.is_ascii_digit() {
            return Err(AavarError::Parse(format!("malformed substitution '{}'", s)));
        }
        let digits = &s[1..s.len() - 1];
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AavarError::Parse(format!("malformed position in '{}'", s)));
        }
        let position = digits
            .parse::<usize>()
            .map_err(|e| AavarError::Parse(format!("malformed position in '{}': {}", s, e)))?;
        Ok(Substitution::new(reference, position, observed))
    }
}

impl Serialize for Substitution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Call substitutions of `candidate` against `window`, which starts at
/// 0-based `window_start` in the reference.
///
/// Returns `Ok(None)` when the alignment is not a single ungapped diagonal
/// over the whole window (tied optima or any indel). Errors from the
/// aligner itself are passed through for the caller to skip the record.
pub fn call_substitutions(
    aligner: &PairwiseAligner,
    window: &[u8],
    window_start: usize,
    candidate: &[u8],
) -> Result<Option<Vec<Substitution>>, AlignError> {
    let alignment = aligner.align(window, candidate)?;
    if !alignment.is_linear(window.len()) {
        return Ok(None);
    }
    let calls = window
        .iter()
        .zip(candidate)
        .enumerate()
        .filter(|(_, (r, c))| r != c)
        .map(|(offset, (&r, &c))| Substitution::new(r, window_start + offset + 1, c))
        .collect();
    Ok(Some(calls))
}
