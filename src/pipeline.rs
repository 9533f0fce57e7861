use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::align::PairwiseAligner;
use crate::classify::{Category, VariantSets};
use crate::error::AavarError;
use crate::export::{exportable, write_export, EXPORT_TARGETS};
use crate::fasta::{load_lines, load_reference, load_sequences, SequenceRecord};
use crate::matrix::SubstitutionMatrix;
use crate::plots;
use crate::stats::random_pair_scores;
use crate::substitution::Substitution;
use crate::tables::{
    write_frequencies, write_summary, write_variant_meta, RunSummary, FREQUENCY_TABLE,
    SUMMARY_JSON, VARIANT_META_TABLE,
};
use crate::tally::{scan, Collection, ReferenceWindow, ScanStats, SubstitutionCounts};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "aavar",
    version,
    about = "Call amino-acid substitutions in generated RBD sequences and compare them \
             with train/test variants"
)]
pub struct Args {
    /// Reference protein FASTA (single record)
    #[arg(long, default_value = "./data/sars_wild.fasta")]
    pub reference: PathBuf,

    /// Generated sequences, one per line
    #[arg(short, long, default_value = "./calc/generated_rbd_small.txt")]
    pub generated: PathBuf,

    /// Training variants FASTA
    #[arg(long, default_value = "./data/all_train.fasta")]
    pub train: PathBuf,

    /// Held-out variants FASTA
    #[arg(long, default_value = "./data/all_test.fasta")]
    pub test: PathBuf,

    /// Directory for tables, exports and the run summary
    #[arg(long = "calc-dir", default_value = "./calc")]
    pub calc_dir: PathBuf,

    /// Directory for figures
    #[arg(long = "fig-dir", default_value = "./fig")]
    pub fig_dir: PathBuf,

    /// Window start, 0-based inclusive
    #[arg(long, default_value_t = 426)]
    pub start: usize,

    /// Window end, exclusive
    #[arg(long, default_value_t = 515)]
    pub stop: usize,

    #[arg(long = "gap-open", default_value_t = -2, allow_hyphen_values = true)]
    pub gap_open: i32,

    #[arg(long = "gap-extend", default_value_t = 0, allow_hyphen_values = true)]
    pub gap_extend: i32,

    /// Seed for the random substitution baseline
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip figure rendering
    #[arg(long = "no-plots")]
    pub no_plots: bool,

    #[arg(
        short = 'L',
        long = "level",
        help = "Logging level",
        value_name = "LEVEL",
        default_value_t = log::Level::Info
    )]
    pub level: log::Level,
}

/// Substitution tallies of the three collections, kept for the whole run.
#[derive(Debug, Default)]
pub struct Tallies {
    pub predict: SubstitutionCounts,
    pub train: SubstitutionCounts,
    pub test: SubstitutionCounts,
    pub scans: BTreeMap<Collection, ScanStats>,
}

impl Tallies {
    pub fn get(&self, collection: Collection) -> &SubstitutionCounts {
        match collection {
            Collection::Predict => &self.predict,
            Collection::Train => &self.train,
            Collection::Test => &self.test,
        }
    }

    pub fn sets(&self) -> VariantSets {
        VariantSets::from_counts(&self.train, &self.test, &self.predict)
    }
}

fn load_collection(args: &Args, collection: Collection) -> Result<Vec<SequenceRecord>, AavarError> {
    match collection {
        Collection::Predict => load_lines(&args.generated),
        Collection::Train => load_sequences(&args.train),
        Collection::Test => load_sequences(&args.test),
    }
}

/// Load every collection and tally its substitutions against the window.
pub fn tally_collections(
    args: &Args,
    aligner: &PairwiseAligner,
    window: &ReferenceWindow,
) -> Result<Tallies, AavarError> {
    let mut tallies = Tallies::default();
    for collection in Collection::ALL {
        let records = load_collection(args, collection)?;
        info!("{}: loaded {} sequences", collection, records.len());
        let (counts, stats) = scan(aligner, window, collection, &records);
        tallies.scans.insert(collection, stats);
        match collection {
            Collection::Predict => tallies.predict = counts,
            Collection::Train => tallies.train = counts,
            Collection::Test => tallies.test = counts,
        }
    }
    Ok(tallies)
}

fn joined(set: &BTreeSet<Substitution>) -> String {
    set.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
}

fn log_sets(sets: &VariantSets) {
    for collection in Collection::ALL {
        let set = sets.get(collection);
        info!("{} substitutions ({}): {}", collection, set.len(), joined(set));
    }
    let novel_test = sets.novel_test_predicted();
    info!(
        "Test substitutions absent from training and predicted ({}): {}",
        novel_test.len(),
        joined(&novel_test)
    );
    let known = sets.known_predicted();
    info!("Known substitutions predicted ({}): {}", known.len(), joined(&known));
    let novel = sets.novel_predicted();
    info!("Novel predicted substitutions ({}): {}", novel.len(), joined(&novel));
    for (category, size) in sets.partition() {
        info!("  {}: {}", category, size);
    }
}

fn render(path: &Path, drawn: Result<bool, Box<dyn std::error::Error>>) -> Result<(), AavarError> {
    match drawn {
        Ok(true) => {
            info!("Wrote {}", path.display());
            Ok(())
        }
        Ok(false) => {
            warn!("Nothing to draw for {}, skipped", path.display());
            Ok(())
        }
        Err(e) => Err(AavarError::Plot(format!("{}: {}", path.display(), e))),
    }
}

/// Render every figure into `fig_dir`.
pub fn draw_figures(
    fig_dir: &Path,
    window: &ReferenceWindow,
    sets: &VariantSets,
    seed: Option<u64>,
) -> Result<(), AavarError> {
    let path = fig_dir.join(plots::DENSITY_PLOT);
    let positions = plots::position_groups(sets, window.start + plots::EDGE_TRIM);
    render(&path, plots::density_plot(&path, &positions))?;

    let recall_pies = [
        (Collection::Test, plots::TEST_PIE),
        (Collection::Train, plots::TRAIN_PIE),
    ];
    for (collection, file_name) in recall_pies {
        let recall = sets.recall(collection);
        let path = fig_dir.join(file_name);
        let title = format!("{} substitutions", collection);
        let slices = [("PREDICTED", recall.predicted), ("NOT_PREDICTED", recall.not_predicted)];
        render(&path, plots::pie_chart(&path, &title, &slices))?;
    }

    let partition = sets.partition();
    let slices: Vec<(&str, usize)> = Category::ALL
        .iter()
        .map(|c| (c.label(), partition.get(c).copied().unwrap_or(0)))
        .collect();
    let path = fig_dir.join(plots::PREDICTED_PIE);
    render(&path, plots::pie_chart(&path, "Predicted substitutions", &slices))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    for (matrix, file_name) in [
        (SubstitutionMatrix::blosum80(), plots::BLOSUM80_BOXPLOT),
        (SubstitutionMatrix::pam30(), plots::PAM30_BOXPLOT),
    ] {
        let random = random_pair_scores(&matrix, sets.predict.len(), &mut rng);
        let groups = plots::score_groups(sets, &matrix, &random);
        let path = fig_dir.join(file_name);
        let title = format!("{} scores", matrix.name());
        render(&path, plots::box_plot(&path, &title, &groups))?;
    }
    Ok(())
}

/// Write the structural-tool mutation lists for every canonical predicted
/// call. Train and test calls are never exported.
pub fn write_exports(calc_dir: &Path, sets: &VariantSets) -> Result<(), AavarError> {
    let calls = exportable(&sets.predict);
    if calls.len() < sets.predict.len() {
        info!(
            "{} predicted calls with non-canonical residues left out of exports",
            sets.predict.len() - calls.len()
        );
    }
    for target in &EXPORT_TARGETS {
        let path = calc_dir.join(target.file_name);
        write_export(BufWriter::new(File::create(&path)?), target, &calls)?;
        info!(
            "Wrote {} calls for {} chain {} to {}",
            calls.len(),
            target.structure,
            target.chain,
            path.display()
        );
    }
    Ok(())
}

pub fn run(args: Args) -> Result<(), AavarError> {
    if args.start >= args.stop {
        return Err(AavarError::InvalidWindow { start: args.start, stop: args.stop, len: 0 });
    }
    fs::create_dir_all(&args.calc_dir)?;
    fs::create_dir_all(&args.fig_dir)?;

    let reference = load_reference(&args.reference)?;
    let window = ReferenceWindow::new(&reference.data, args.start, args.stop)?;
    info!(
        "Reference {} ({} residues), window [{}, {}) of {} residues",
        reference.id,
        reference.data.len(),
        window.start,
        window.stop,
        window.residues.len()
    );

    let aligner =
        PairwiseAligner::new(SubstitutionMatrix::blosum62(), args.gap_open, args.gap_extend);
    let tallies = tally_collections(&args, &aligner, &window)?;
    let sets = tallies.sets();
    log_sets(&sets);

    let path = args.calc_dir.join(FREQUENCY_TABLE);
    let tables: Vec<(Collection, &SubstitutionCounts)> =
        Collection::ALL.iter().map(|&c| (c, tallies.get(c))).collect();
    write_frequencies(BufWriter::new(File::create(&path)?), &tables)?;
    info!("Wrote {}", path.display());

    let path = args.calc_dir.join(VARIANT_META_TABLE);
    let rows = sets.metadata(&SubstitutionMatrix::blosum80(), &SubstitutionMatrix::pam30());
    write_variant_meta(BufWriter::new(File::create(&path)?), &rows)?;
    info!("Wrote {} rows to {}", rows.len(), path.display());

    if args.no_plots {
        info!("Figure rendering disabled");
    } else {
        draw_figures(&args.fig_dir, &window, &sets, args.seed)?;
    }

    write_exports(&args.calc_dir, &sets)?;

    let path = args.calc_dir.join(SUMMARY_JSON);
    let summary = RunSummary::new(
        &reference.id,
        (window.start, window.stop),
        tallies.scans.clone(),
        &sets,
    );
    write_summary(BufWriter::new(File::create(&path)?), &summary)?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_layout() {
        let args = Args::parse_from(["aavar"]);
        assert_eq!(args.start, 426);
        assert_eq!(args.stop, 515);
        assert_eq!(args.gap_open, -2);
        assert_eq!(args.gap_extend, 0);
        assert_eq!(args.reference, PathBuf::from("./data/sars_wild.fasta"));
        assert_eq!(args.generated, PathBuf::from("./calc/generated_rbd_small.txt"));
        assert_eq!(args.level, log::Level::Info);
        assert!(!args.no_plots);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_negative_gap_scores_parse() {
        let args = Args::parse_from([
            "aavar", "--gap-open", "-5", "--gap-extend", "-1", "-L", "debug",
        ]);
        assert_eq!(args.gap_open, -5);
        assert_eq!(args.gap_extend, -1);
        assert_eq!(args.level, log::Level::Debug);
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let mut args = Args::parse_from(["aavar"]);
        args.start = 515;
        args.stop = 426;
        assert!(matches!(run(args), Err(AavarError::InvalidWindow { .. })));
    }
}
