pub mod align;
pub mod classify;
pub mod error;
pub mod export;
pub mod fasta;
pub mod matrix;
pub mod pipeline;
pub mod plots;
pub mod stats;
pub mod substitution;
pub mod tables;
pub mod tally;

pub use align::{Alignment, PairwiseAligner};
pub use classify::{Category, VariantSets};
pub use error::{AavarError, AlignError};
pub use fasta::{load_lines, load_reference, load_sequences, SequenceRecord};
pub use matrix::SubstitutionMatrix;
pub use pipeline::{run, Args};
pub use substitution::{call_substitutions, Substitution};
pub use tally::{scan, Collection, ReferenceWindow, ScanStats, SubstitutionCounts};
