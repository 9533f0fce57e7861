//! CSV tables and the JSON run summary.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use serde::Serialize;

use crate::classify::{Category, Recall, VariantMeta, VariantSets};
use crate::error::AavarError;
use crate::substitution::Substitution;
use crate::tally::{Collection, ScanStats, SubstitutionCounts};

pub const FREQUENCY_TABLE: &str = "merged_substitution_info.csv";
pub const VARIANT_META_TABLE: &str = "variant_meta_df.csv";
pub const SUMMARY_JSON: &str = "summary.json";

#[derive(Debug, Serialize)]
struct FrequencyRow {
    substitution: String,
    frequency: usize,
    group: &'static str,
}

#[derive(Debug, Serialize)]
struct VariantMetaRow {
    #[serde(rename = "Mutation")]
    mutation: String,
    in_train: &'static str,
    in_test: &'static str,
    in_predict: &'static str,
    prediction_identity: String,
    #[serde(rename = "BLOSUM80")]
    blosum80: Option<i32>,
    #[serde(rename = "PAM30")]
    pam30: Option<i32>,
}

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Long-form `substitution,frequency,group` table, one block per
/// collection in the order given.
pub fn write_frequencies<W: Write>(
    writer: W,
    tables: &[(Collection, &SubstitutionCounts)],
) -> Result<(), AavarError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (collection, counts) in tables {
        for (sub, frequency) in counts.iter() {
            wtr.serialize(FrequencyRow {
                substitution: sub.to_string(),
                frequency,
                group: collection.label(),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_variant_meta<W: Write>(writer: W, rows: &[VariantMeta]) -> Result<(), AavarError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(VariantMetaRow {
            mutation: row.mutation.to_string(),
            in_train: flag(row.in_train),
            in_test: flag(row.in_test),
            in_predict: flag(row.in_predict),
            prediction_identity: row.prediction_identity(),
            blosum80: row.blosum80,
            pam30: row.pam30,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Everything the run found, in one document.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub reference: String,
    pub window_start: usize,
    pub window_stop: usize,
    pub scans: BTreeMap<Collection, ScanStats>,
    pub train: BTreeSet<Substitution>,
    pub test: BTreeSet<Substitution>,
    pub predict: BTreeSet<Substitution>,
    pub novel_test_predicted: BTreeSet<Substitution>,
    pub known_predicted: BTreeSet<Substitution>,
    pub novel_predicted: BTreeSet<Substitution>,
    pub partition: BTreeMap<Category, usize>,
    pub test_recall: Recall,
    pub train_recall: Recall,
}

impl RunSummary {
    pub fn new(
        reference: &str,
        window: (usize, usize),
        scans: BTreeMap<Collection, ScanStats>,
        sets: &VariantSets,
    ) -> Self {
        Self {
            reference: reference.to_string(),
            window_start: window.0,
            window_stop: window.1,
            scans,
            train: sets.train.clone(),
            test: sets.test.clone(),
            predict: sets.predict.clone(),
            novel_test_predicted: sets.novel_test_predicted(),
            known_predicted: sets.known_predicted(),
            novel_predicted: sets.novel_predicted(),
            partition: sets.partition(),
            test_recall: sets.recall(Collection::Test),
            train_recall: sets.recall(Collection::Train),
        }
    }
}

pub fn write_summary<W: Write>(writer: W, summary: &RunSummary) -> Result<(), AavarError> {
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
