use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use aavar::Args;

/// 50 residues of spike N-terminus; windows in the tests cover [10, 30).
pub const REFERENCE: &str = "MFVFLVLLPLVSSQCVNLTTRTQLPPAYTNSFTRGVYYPDKVFRSSVLHS";
pub const START: usize = 10;
pub const STOP: usize = 30;

pub fn window() -> String {
    REFERENCE[START..STOP].to_string()
}

/// Replace the residue at 1-based `position` of `seq`, where `seq` begins
/// at reference offset `offset`.
pub fn mutate(seq: &str, offset: usize, position: usize, residue: char) -> String {
    let mut bytes = seq.as_bytes().to_vec();
    bytes[position - 1 - offset] = residue as u8;
    String::from_utf8(bytes).unwrap()
}

pub fn write_file(path: &Path, content: &str) {
    let mut file = File::create(path).unwrap();
    write!(file, "{}", content).unwrap();
    file.sync_all().unwrap();
}

/// Create default Args for testing, all inputs and outputs under `dir`
pub fn default_test_args(dir: &Path) -> Args {
    Args {
        reference: dir.join("reference.fasta"),
        generated: dir.join("generated.txt"),
        train: dir.join("train.fasta"),
        test: dir.join("test.fasta"),
        calc_dir: dir.join("calc"),
        fig_dir: dir.join("fig"),
        start: START,
        stop: STOP,
        gap_open: -2,
        gap_extend: 0,
        seed: Some(42),
        no_plots: true,
        level: log::Level::Info,
    }
}

fn fasta(prefix: &str, seqs: &[String]) -> String {
    seqs.iter()
        .enumerate()
        .map(|(i, seq)| format!(">{}_{}\n{}\n", prefix, i + 1, seq))
        .collect()
}

/// Write the reference plus the three collections. `train` and `test` are
/// full-length sequences; `generated` are window-length.
pub fn write_inputs(args: &Args, generated: &[String], train: &[String], test: &[String]) {
    write_file(&args.reference, &format!(">spike\n{}\n{}\n", &REFERENCE[..25], &REFERENCE[25..]));
    write_file(&args.generated, &(generated.join("\n") + "\n"));
    write_file(&args.train, &fasta("train", train));
    write_file(&args.test, &fasta("test", test));
}

/// Train carries Q14R, test carries S13Y, the generated set carries both.
pub fn write_fixtures(args: &Args) -> PathBuf {
    let generated = [
        mutate(&window(), START, 14, 'R'),
        mutate(&window(), START, 13, 'Y'),
        window(),
        String::new(),
        mutate(&window(), START, 14, 'R'),
    ];
    let train = [mutate(REFERENCE, 0, 14, 'R')];
    let test = [REFERENCE.to_string(), mutate(REFERENCE, 0, 13, 'Y')];
    write_inputs(args, &generated, &train, &test);
    args.calc_dir.clone()
}
