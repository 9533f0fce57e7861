//! Set algebra over the train, test and predicted substitution sets.
//!
//! Classification is by membership only; frequencies play no part.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::matrix::SubstitutionMatrix;
use crate::substitution::Substitution;
use crate::tally::{Collection, SubstitutionCounts};

/// Where a predicted substitution was already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "IN_TEST_ONLY")]
    TestOnly,
    #[serde(rename = "IN_TRAIN_ONLY")]
    TrainOnly,
    #[serde(rename = "IN_TRAIN_AND_TEST")]
    TrainAndTest,
    #[serde(rename = "NOVEL")]
    Novel,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::TestOnly,
        Category::TrainOnly,
        Category::TrainAndTest,
        Category::Novel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::TestOnly => "IN_TEST_ONLY",
            Category::TrainOnly => "IN_TRAIN_ONLY",
            Category::TrainAndTest => "IN_TRAIN_AND_TEST",
            Category::Novel => "NOVEL",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How much of a reference set the model reproduced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Recall {
    pub predicted: usize,
    pub not_predicted: usize,
}

/// Membership flags and matrix scores of one substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMeta {
    pub mutation: Substitution,
    pub in_train: bool,
    pub in_test: bool,
    pub in_predict: bool,
    pub blosum80: Option<i32>,
    pub pam30: Option<i32>,
}

fn py_bool(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

impl VariantMeta {
    /// `in_test|in_train|in_predict`, e.g. `True|False|True`.
    pub fn prediction_identity(&self) -> String {
        format!(
            "{}|{}|{}",
            py_bool(self.in_test),
            py_bool(self.in_train),
            py_bool(self.in_predict)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSets {
    pub train: BTreeSet<Substitution>,
    pub test: BTreeSet<Substitution>,
    pub predict: BTreeSet<Substitution>,
}

impl VariantSets {
    pub fn new(
        train: BTreeSet<Substitution>,
        test: BTreeSet<Substitution>,
        predict: BTreeSet<Substitution>,
    ) -> Self {
        Self { train, test, predict }
    }

    pub fn from_counts(
        train: &SubstitutionCounts,
        test: &SubstitutionCounts,
        predict: &SubstitutionCounts,
    ) -> Self {
        Self::new(train.keys(), test.keys(), predict.keys())
    }

    pub fn get(&self, collection: Collection) -> &BTreeSet<Substitution> {
        match collection {
            Collection::Predict => &self.predict,
            Collection::Train => &self.train,
            Collection::Test => &self.test,
        }
    }

    /// Test calls absent from training that the model produced.
    pub fn novel_test_predicted(&self) -> BTreeSet<Substitution> {
        self.test
            .difference(&self.train)
            .filter(|s| self.predict.contains(s))
            .copied()
            .collect()
    }

    /// Train or test calls that the model produced.
    pub fn known_predicted(&self) -> BTreeSet<Substitution> {
        self.test
            .union(&self.train)
            .filter(|s| self.predict.contains(s))
            .copied()
            .collect()
    }

    /// Predicted calls seen in neither train nor test.
    pub fn novel_predicted(&self) -> BTreeSet<Substitution> {
        self.predict
            .iter()
            .filter(|s| !self.train.contains(s) && !self.test.contains(s))
            .copied()
            .collect()
    }

    /// Category of a predicted call; `None` if it was not predicted.
    pub fn category(&self, sub: &Substitution) -> Option<Category> {
        if !self.predict.contains(sub) {
            return None;
        }
        Some(match (self.train.contains(sub), self.test.contains(sub)) {
            (false, true) => Category::TestOnly,
            (true, false) => Category::TrainOnly,
            (true, true) => Category::TrainAndTest,
            (false, false) => Category::Novel,
        })
    }

    /// Size of each category over the predicted set. Every category is
    /// present, possibly with zero.
    pub fn partition(&self) -> BTreeMap<Category, usize> {
        let mut sizes: BTreeMap<Category, usize> = Category::ALL.iter().map(|&c| (c, 0)).collect();
        for sub in &self.predict {
            if let Some(category) = self.category(sub) {
                *sizes.entry(category).or_insert(0) += 1;
            }
        }
        sizes
    }

    /// Split `collection` into calls the model produced and calls it missed.
    pub fn recall(&self, collection: Collection) -> Recall {
        let set = self.get(collection);
        let predicted = set.intersection(&self.predict).count();
        Recall { predicted, not_predicted: set.len() - predicted }
    }

    /// Every distinct call across the three sets.
    pub fn all(&self) -> BTreeSet<Substitution> {
        self.predict
            .iter()
            .chain(&self.test)
            .chain(&self.train)
            .copied()
            .collect()
    }

    /// One row per distinct call, sorted.
    pub fn metadata(
        &self,
        blosum80: &SubstitutionMatrix,
        pam30: &SubstitutionMatrix,
    ) -> Vec<VariantMeta> {
        self.all()
            .into_iter()
            .map(|mutation| VariantMeta {
                mutation,
                in_train: self.train.contains(&mutation),
                in_test: self.test.contains(&mutation),
                in_predict: self.predict.contains(&mutation),
                blosum80: mutation.score(blosum80),
                pam30: mutation.score(pam30),
            })
            .collect()
    }
}
