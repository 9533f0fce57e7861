//! Per-collection substitution frequencies.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::align::PairwiseAligner;
use crate::error::AavarError;
use crate::fasta::SequenceRecord;
use crate::substitution::{call_substitutions, Substitution};

/// The three sequence collections under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Collection {
    Predict,
    Train,
    Test,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Predict, Collection::Train, Collection::Test];

    /// Label used in the merged frequency table.
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Predict => "Predict",
            Collection::Train => "Train",
            Collection::Test => "Test",
        }
    }

    /// Group name used in figures.
    pub fn group(&self) -> &'static str {
        match self {
            Collection::Predict => "predict",
            Collection::Train => "train",
            Collection::Test => "test",
        }
    }

    /// Train and test records are full-length proteins cut down to the
    /// window before alignment; generated records already are the window.
    pub fn slices_window(&self) -> bool {
        !matches!(self, Collection::Predict)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `[start, stop)` of the reference, 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceWindow {
    pub start: usize,
    pub stop: usize,
    pub residues: Vec<u8>,
}

impl ReferenceWindow {
    pub fn new(reference: &[u8], start: usize, stop: usize) -> Result<Self, AavarError> {
        if start >= stop || stop > reference.len() {
            return Err(AavarError::InvalidWindow { start, stop, len: reference.len() });
        }
        Ok(Self { start, stop, residues: reference[start..stop].to_vec() })
    }

    /// Cut `seq` to the window coordinates, clamped to its length.
    pub fn slice<'s>(&self, seq: &'s [u8]) -> &'s [u8] {
        let end = self.stop.min(seq.len());
        let begin = self.start.min(end);
        &seq[begin..end]
    }
}

/// Occurrence count per substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionCounts {
    counts: BTreeMap<Substitution, usize>,
}

impl SubstitutionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, calls: &[Substitution]) {
        for call in calls {
            *self.counts.entry(*call).or_insert(0) += 1;
        }
    }

    pub fn count(&self, sub: &Substitution) -> usize {
        self.counts.get(sub).copied().unwrap_or(0)
    }

    /// The set of distinct calls seen.
    pub fn keys(&self) -> BTreeSet<Substitution> {
        self.counts.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Substitution, usize)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<Substitution> for SubstitutionCounts {
    fn from_iter<I: IntoIterator<Item = Substitution>>(iter: I) -> Self {
        let mut counts = SubstitutionCounts::new();
        let calls: Vec<Substitution> = iter.into_iter().collect();
        counts.record(&calls);
        counts
    }
}

/// What happened to the records of one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub records: usize,
    /// Unique ungapped alignment, calls recorded
    pub accepted: usize,
    /// Tied optima or gapped alignment
    pub rejected: usize,
    /// The aligner refused the sequence
    pub failed: usize,
}

/// Align every record of `collection` against the window and count the
/// substitutions of those passing the quality gate.
pub fn scan(
    aligner: &PairwiseAligner,
    window: &ReferenceWindow,
    collection: Collection,
    records: &[SequenceRecord],
) -> (SubstitutionCounts, ScanStats) {
    let mut counts = SubstitutionCounts::new();
    let mut stats = ScanStats { records: records.len(), ..Default::default() };

    for record in records {
        let candidate = if collection.slices_window() {
            window.slice(&record.data)
        } else {
            &record.data[..]
        };
        match call_substitutions(aligner, &window.residues, window.start, candidate) {
            Ok(Some(calls)) => {
                counts.record(&calls);
                stats.accepted += 1;
            }
            Ok(None) => {
                debug!("{}: {} does not align linearly to the window", collection, record.id);
                stats.rejected += 1;
            }
            Err(e) => {
                debug!("{}: skipping {}: {}", collection, record.id, e);
                stats.failed += 1;
            }
        }
    }

    if stats.failed > 0 {
        warn!(
            "{}: {} of {} records could not be aligned and were skipped",
            collection, stats.failed, stats.records
        );
    }
    info!(
        "{}: {} records, {} accepted, {} rejected, {} distinct substitutions",
        collection,
        stats.records,
        stats.accepted,
        stats.rejected,
        counts.len()
    );
    (counts, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &[u8] = b"MFVFLVLLPLVSSQCVNLTTRTQLPPAYTNSFTRGVYYPDKVFRSSVLHS";

    fn record(id: &str, data: &[u8]) -> SequenceRecord {
        SequenceRecord { id: id.to_string(), data: data.to_vec() }
    }

    #[test]
    fn test_window_bounds() {
        assert!(ReferenceWindow::new(REFERENCE, 10, 20).is_ok());
        assert!(matches!(
            ReferenceWindow::new(REFERENCE, 20, 20),
            Err(AavarError::InvalidWindow { .. })
        ));
        assert!(ReferenceWindow::new(REFERENCE, 10, REFERENCE.len() + 1).is_err());
    }

    #[test]
    fn test_window_slice_clamps() {
        let window = ReferenceWindow::new(REFERENCE, 10, 20).unwrap();
        assert_eq!(window.slice(REFERENCE), &REFERENCE[10..20]);
        assert_eq!(window.slice(&REFERENCE[..15]), &REFERENCE[10..15]);
        assert!(window.slice(&REFERENCE[..5]).is_empty());
    }

    #[test]
    fn test_counts_accumulate_per_record() {
        let mut counts = SubstitutionCounts::new();
        let n501y = Substitution::new(b'N', 501, b'Y');
        let e484k = Substitution::new(b'E', 484, b'K');
        counts.record(&[n501y, e484k]);
        counts.record(&[n501y]);
        assert_eq!(counts.count(&n501y), 2);
        assert_eq!(counts.count(&e484k), 1);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.keys().into_iter().next(), Some(e484k));
    }

    #[test]
    fn test_scan_predict_aligns_whole_records() {
        let aligner = PairwiseAligner::default();
        let window = ReferenceWindow::new(REFERENCE, 10, 30).unwrap();
        let mut mutant = window.residues.clone();
        mutant[3] = b'R'; // Q14R
        let records = vec![
            record("same", &window.residues),
            record("mutant", &mutant),
            record("mutant again", &mutant),
            record("short", &window.residues[..12]),
            record("bad", b"NOT#A#PROTEIN"),
        ];
        let (counts, stats) = scan(&aligner, &window, Collection::Predict, &records);
        assert_eq!(counts.count(&Substitution::new(b'Q', 14, b'R')), 2);
        assert_eq!(counts.len(), 1);
        assert_eq!(
            stats,
            ScanStats { records: 5, accepted: 3, rejected: 1, failed: 1 }
        );
    }

    #[test]
    fn test_scan_train_slices_to_window() {
        let aligner = PairwiseAligner::default();
        let window = ReferenceWindow::new(REFERENCE, 10, 30).unwrap();
        let mut full = REFERENCE.to_vec();
        full[12] = b'Y'; // S13Y
        let records = vec![record("full", &full), record("truncated", &REFERENCE[..8])];
        let (counts, stats) = scan(&aligner, &window, Collection::Train, &records);
        assert_eq!(counts.count(&Substitution::new(b'S', 13, b'Y')), 1);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.failed, 1);
    }
}
