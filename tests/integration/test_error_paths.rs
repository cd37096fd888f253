//! Error path integration tests.
//!
//! These tests verify exit codes and diagnostics for usage errors, invalid manifests and
//! inconsistent alignment input.

use ampclip_lib::sam::builder::RecordBuilder;
use rstest::rstest;
use tempfile::TempDir;

use crate::helpers::{run_ampclip, write_input_bam, write_manifest};

const AMP1: &str = "amp1\t1\t101\tACGTACGTACGTACGTACGT\t170\tTTTTGGGGCCCCAAAATTTT";

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ==================== Usage ====================

#[rstest]
#[case::no_arguments(&[])]
#[case::two_arguments(&["manifest.txt", "in.bam"])]
#[case::four_arguments(&["manifest.txt", "in.bam", "out.bam", "extra"])]
#[case::unknown_option(&["--bogus", "manifest.txt", "in.bam", "out.bam"])]
fn test_wrong_arguments_exit_one(#[case] args: &[&str]) {
    let output = run_ampclip(args);
    assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
}

#[rstest]
#[case::help("--help")]
#[case::version("--version")]
fn test_help_and_version_exit_zero(#[case] flag: &str) {
    let output = run_ampclip([flag]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("ampclip"));
}

#[test]
fn test_help_describes_dropped_secondary_records() {
    let output = run_ampclip(["--help"]);
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("supplementary pieces of matched reads"), "{help}");
}

// ==================== Inputs ====================

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let input = write_input_bam(dir.path(), &[]);
    let output = dir.path().join("out.bam");

    let result = run_ampclip([
        dir.path().join("missing.txt").to_str().unwrap(),
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains("File does not exist"), "{}", stderr(&result));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_bam() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let output = dir.path().join("out.bam");

    let result = run_ampclip([
        manifest.to_str().unwrap(),
        dir.path().join("missing.bam").to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains("Input BAM"), "{}", stderr(&result));
}

#[test]
fn test_output_same_as_input() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let input = write_input_bam(dir.path(), &[]);

    let result =
        run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), input.to_str().unwrap()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains("must differ"), "{}", stderr(&result));
}

#[test]
fn test_zero_threads() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let input = write_input_bam(dir.path(), &[]);
    let output = dir.path().join("out.bam");

    let result = run_ampclip([
        "--threads",
        "0",
        manifest.to_str().unwrap(),
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains("threads"), "{}", stderr(&result));
}

// ==================== Manifest ====================

#[rstest]
#[case::empty_sense_primer("amp1\t1\t101\t\t170\tACGT", "sense interval")]
#[case::negative_antisense("amp1\t1\t101\tACGT\t2\tACGTACGT", "antisense interval")]
#[case::non_numeric_start("amp1\t1\tabc\tACGT\t170\tACGT", "Failed to read primer manifest")]
fn test_invalid_manifest(#[case] row: &str, #[case] message: &str) {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[row]);
    let input = write_input_bam(dir.path(), &[]);
    let output = dir.path().join("out.bam");

    let result =
        run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), output.to_str().unwrap()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains(message), "{}", stderr(&result));
    assert!(!output.exists());
}

// ==================== Alignments ====================

#[test]
fn test_duplicate_primary_read() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let read = RecordBuilder::mapped_read().name("dup").alignment_start(101).cigar("50M").build();
    let input = write_input_bam(dir.path(), &[read.clone(), read]);
    let output = dir.path().join("out.bam");

    let result =
        run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), output.to_str().unwrap()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains("Duplicate primary alignment"), "{}", stderr(&result));
    assert!(stderr(&result).contains("dup"));
}
