mod common;

use aavar::{load_lines, load_reference, load_sequences, run, AavarError};
use common::{
    default_test_args, mutate, window, write_file, write_fixtures, write_inputs, REFERENCE, START,
};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_file() -> NamedTempFile {
    NamedTempFile::new().unwrap()
}

#[test]
fn load_sequences_keeps_last_record() {
    let mut file = temp_file();
    writeln!(file, ">a\nMFVF\n>b\nLVLL\nPLV").unwrap();
    file.as_file_mut().sync_all().unwrap();
    let seqs = load_sequences(file.path()).unwrap();
    assert_eq!(seqs.len(), 2);
    assert_eq!(seqs[0].id, "a");
    assert_eq!(seqs[1].data, b"LVLLPLV".to_vec());
}

#[test]
fn load_reference_joins_lines() {
    let mut file = temp_file();
    write!(file, ">spike\r\nMFVF\r\nLVLL\r\n").unwrap();
    file.as_file_mut().sync_all().unwrap();
    let reference = load_reference(file.path()).unwrap();
    assert_eq!(reference.id, "spike");
    assert_eq!(reference.data, b"MFVFLVLL".to_vec());
}

#[test]
fn load_reference_rejects_header_only() {
    let mut file = temp_file();
    writeln!(file, ">spike").unwrap();
    file.as_file_mut().sync_all().unwrap();
    assert!(matches!(load_reference(file.path()), Err(AavarError::EmptyReference(_))));
}

#[test]
fn load_lines_skips_blank_lines() {
    let mut file = temp_file();
    writeln!(file, "MFVF\n\nLVLL").unwrap();
    file.as_file_mut().sync_all().unwrap();
    let seqs = load_lines(file.path()).unwrap();
    assert_eq!(seqs.len(), 2);
    assert_eq!(seqs[1].data, b"LVLL".to_vec());
}

#[test]
fn run_writes_tables_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let args = default_test_args(dir.path());
    let calc = write_fixtures(&args);
    let fig = args.fig_dir.clone();
    run(args).unwrap();

    let frequencies = fs::read_to_string(calc.join("merged_substitution_info.csv")).unwrap();
    assert_eq!(
        frequencies,
        "substitution,frequency,group\n\
         S13Y,1,Predict\n\
         Q14R,2,Predict\n\
         Q14R,1,Train\n\
         S13Y,1,Test\n"
    );

    let meta = fs::read_to_string(calc.join("variant_meta_df.csv")).unwrap();
    let lines: Vec<&str> = meta.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("S13Y,False,True,True,True|False|True,"));
    assert!(lines[2].starts_with("Q14R,True,False,True,False|True|True,"));

    assert_eq!(
        fs::read_to_string(calc.join("mutabind2_7df4.txt")).unwrap(),
        "B\t13\tY\nB\t14\tR\n"
    );
    assert_eq!(
        fs::read_to_string(calc.join("mutabind2_8d8q.txt")).unwrap(),
        "A\t13\tY\nA\t14\tR\n"
    );
    assert_eq!(
        fs::read_to_string(calc.join("saambe3d_6moj.txt")).unwrap(),
        "E 13 S Y\nE 14 Q R\n"
    );
    assert_eq!(
        fs::read_to_string(calc.join("saambe3d_8d8q.txt")).unwrap(),
        "A 13 S Y\nA 14 Q R\n"
    );

    // figures disabled
    assert!(fig.is_dir());
    assert_eq!(fs::read_dir(&fig).unwrap().count(), 0);
}

#[test]
fn run_summary_reports_scans_and_partition() {
    let dir = tempfile::tempdir().unwrap();
    let args = default_test_args(dir.path());
    let calc = write_fixtures(&args);
    run(args).unwrap();

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(calc.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["reference"], "spike");
    assert_eq!(summary["window_start"], 10);
    assert_eq!(summary["scans"]["Predict"]["records"], 4);
    assert_eq!(summary["scans"]["Predict"]["accepted"], 4);
    assert_eq!(summary["scans"]["Test"]["accepted"], 2);
    assert_eq!(summary["partition"]["IN_TEST_ONLY"], 1);
    assert_eq!(summary["partition"]["IN_TRAIN_ONLY"], 1);
    assert_eq!(summary["partition"]["NOVEL"], 0);
    assert_eq!(summary["novel_test_predicted"], serde_json::json!(["S13Y"]));
    assert_eq!(summary["test_recall"]["predicted"], 1);
    assert_eq!(summary["test_recall"]["not_predicted"], 0);
}

#[test]
fn run_renders_figures() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = default_test_args(dir.path());
    args.no_plots = false;
    write_fixtures(&args);
    let fig = args.fig_dir.clone();
    run(args).unwrap();

    for name in [
        "test_substitutions_pie_chart.svg",
        "train_substitutions_pie_chart.svg",
        "predicted_substitutions_pie_chart.svg",
        "blosum80_boxplot.svg",
        "pam30_boxplot.svg",
    ] {
        let svg = fs::read_to_string(fig.join(name)).unwrap();
        assert!(svg.contains("<svg"), "{} is not an SVG document", name);
    }
    // every call sits within ten residues of the window start
    assert!(!fig.join("substitution_distribution_density_plot.svg").exists());
}

#[test]
fn run_exports_predicted_calls_only() {
    let dir = tempfile::tempdir().unwrap();
    let args = default_test_args(dir.path());
    let calc = args.calc_dir.clone();
    // Q14R predicted; S13Y seen only in train, V16A only in test
    write_inputs(
        &args,
        &[mutate(&window(), START, 14, 'R')],
        &[mutate(REFERENCE, 0, 13, 'Y')],
        &[mutate(REFERENCE, 0, 16, 'A')],
    );
    run(args).unwrap();

    assert_eq!(fs::read_to_string(calc.join("mutabind2_7df4.txt")).unwrap(), "B\t14\tR\n");
    assert_eq!(fs::read_to_string(calc.join("mutabind2_8d8q.txt")).unwrap(), "A\t14\tR\n");
    assert_eq!(fs::read_to_string(calc.join("saambe3d_6moj.txt")).unwrap(), "E 14 Q R\n");
    assert_eq!(fs::read_to_string(calc.join("saambe3d_8d8q.txt")).unwrap(), "A 14 Q R\n");

    // the metadata table still lists every call
    let meta = fs::read_to_string(calc.join("variant_meta_df.csv")).unwrap();
    assert_eq!(meta.lines().count(), 4);
}

#[test]
fn run_renders_position_density() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = default_test_args(dir.path());
    args.no_plots = false;
    let fig = args.fig_dir.clone();
    // every call at least ten residues past the window start
    write_inputs(
        &args,
        &[
            mutate(&window(), START, 21, 'K'),
            mutate(&window(), START, 24, 'F'),
            mutate(&window(), START, 28, 'H'),
        ],
        &[mutate(REFERENCE, 0, 21, 'K'), mutate(REFERENCE, 0, 28, 'H')],
        &[mutate(REFERENCE, 0, 24, 'F'), mutate(REFERENCE, 0, 28, 'H')],
    );
    run(args).unwrap();

    let svg = fs::read_to_string(fig.join("substitution_distribution_density_plot.svg")).unwrap();
    // one filled area per group: train, test and predict
    assert_eq!(svg.matches("<polygon").count(), 3);
    for group in ["train", "test", "predict"] {
        assert!(svg.contains(group), "legend is missing {}", group);
    }
}

#[test]
fn run_rejects_window_past_reference_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = default_test_args(dir.path());
    write_fixtures(&args);
    args.stop = REFERENCE.len() + 1;
    assert!(matches!(run(args), Err(AavarError::InvalidWindow { .. })));
}

#[test]
fn run_fails_on_missing_reference() {
    let dir = tempfile::tempdir().unwrap();
    let args = default_test_args(dir.path());
    write_file(&args.generated, "MFVF\n");
    assert!(matches!(run(args), Err(AavarError::Io(_))));
}
