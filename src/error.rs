use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum AavarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Rendering a figure failed
    #[error("Plot error: {0}")]
    Plot(String),
    #[error("Reference file {0} contains no sequence")]
    EmptyReference(PathBuf),
    /// The window does not fit inside the reference
    #[error("Invalid reference window [{start}, {stop}) for a reference of length {len}")]
    InvalidWindow { start: usize, stop: usize, len: usize },
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Reasons the aligner refuses a sequence pair. These are never fatal: the
/// offending record is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("cannot align an empty sequence")]
    EmptySequence,
    #[error("residue '{residue}' at offset {offset} is not in the {matrix} alphabet")]
    UnknownResidue {
        residue: char,
        offset: usize,
        matrix: &'static str,
    },
}
