//! End-to-end CLI tests for primer clipping.
//!
//! These tests run the actual `ampclip` binary and validate:
//! 1. Clipping of FR pairs and mate field updates
//! 2. Handling of unmatched, secondary and deletion-bearing reads
//! 3. Metrics, histogram and `@PG` output

use ampclip_lib::sam::builder::RecordBuilder;
use std::collections::HashMap;
use tempfile::TempDir;

use crate::helpers::{
    assert_alignment, assert_consistent_length, assert_string_tag, create_fr_pair, read_bam,
    run_ampclip, string_tag, write_input_bam, write_manifest,
};

/// Sense footprint `[100, 120)`, antisense footprint `[150, 170)` on chr1.
const AMP1: &str = "amp1\t1\t101\tACGTACGTACGTACGTACGT\t170\tTTTTGGGGCCCCAAAATTTT";
/// Sense footprint `[1000, 1010)`, antisense footprint `[1190, 1200)` on chr1.
const AMP2: &str = "amp2\tchr1\t1001\tGGGGGCCCCC\t1200\tAAAAATTTTT";

fn paths(dir: &TempDir) -> (String, String) {
    let output = dir.path().join("output.bam");
    let metrics = dir.path().join("metrics.txt");
    (output.to_string_lossy().to_string(), metrics.to_string_lossy().to_string())
}

/// Parses a TSV into one map per row keyed by column name.
fn read_tsv(path: &std::path::Path) -> Vec<HashMap<String, String>> {
    let contents = std::fs::read_to_string(path).expect("Failed to read TSV");
    let mut lines = contents.lines();
    let header: Vec<&str> = lines.next().expect("TSV has a header").split('\t').collect();
    lines
        .map(|line| {
            let values = line.split('\t').map(String::from);
            header.iter().map(|h| (*h).to_string()).zip(values).collect()
        })
        .collect()
}

#[test]
fn test_clips_fr_pair_and_updates_mates() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let (r1, r2) = create_fr_pair("q1", 101, "50M", 111, "60M");
    let input = write_input_bam(dir.path(), &[r1, r2]);
    let (output, _) = paths(&dir);

    let result = run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), &output]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let (_, records) = read_bam(std::path::Path::new(&output));
    assert_eq!(records.len(), 2);
    let (r1, r2) = (&records[0], &records[1]);

    assert_alignment(r1, 121, "20S30M");
    assert_alignment(r2, 121, "10S30M20S");
    for record in &records {
        assert_consistent_length(record);
        assert_string_tag(record, *b"X0", "amp1");
        assert_string_tag(record, *b"X3", "amp1");
    }
    assert_string_tag(r1, *b"X2", "50M");
    assert_string_tag(r2, *b"X2", "60M");

    assert_eq!(r1.mate_alignment_start().map(usize::from), Some(121));
    assert_eq!(r2.mate_alignment_start().map(usize::from), Some(121));
    assert_string_tag(r1, *b"MC", "10S30M20S");
    assert_string_tag(r2, *b"MC", "20S30M");
    assert_eq!(r1.template_length(), 30);
    assert_eq!(r2.template_length(), -30);
}

#[test]
fn test_unmatched_reads_dropped_by_default() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let (r1, r2) = create_fr_pair("q1", 101, "50M", 111, "60M");
    let far = RecordBuilder::mapped_read().name("far").alignment_start(5001).cigar("40M").build();
    let input = write_input_bam(dir.path(), &[r1, far, r2]);
    let (output, _) = paths(&dir);

    let result = run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), &output]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let (_, records) = read_bam(std::path::Path::new(&output));
    let names: Vec<String> =
        records.iter().map(|r| r.name().map(ToString::to_string).unwrap_or_default()).collect();
    assert_eq!(names, vec!["q1", "q1"]);
}

#[test]
fn test_keep_unmatched_writes_unmatched_reads_unchanged() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let far = RecordBuilder::mapped_read().name("far").alignment_start(5001).cigar("40M").build();
    let other_chrom = RecordBuilder::mapped_read()
        .name("chr2read")
        .reference_sequence_id(1)
        .alignment_start(101)
        .cigar("3S37M")
        .build();
    let input = write_input_bam(dir.path(), &[far, other_chrom]);
    let (output, _) = paths(&dir);

    let result = run_ampclip([
        "--keep-unmatched",
        manifest.to_str().unwrap(),
        input.to_str().unwrap(),
        &output,
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let (_, records) = read_bam(std::path::Path::new(&output));
    assert_eq!(records.len(), 2);
    assert_alignment(&records[0], 5001, "40M");
    assert_alignment(&records[1], 101, "3S37M");
    for record in &records {
        assert!(string_tag(record, *b"X0").is_none());
    }
    assert_string_tag(&records[1], *b"X2", "3S37M");
}

#[test]
fn test_deletion_at_clip_boundary() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &["ampD\t1\t101\tACGTACGTAC\t400\tACGTACGTAC"]);
    let read =
        RecordBuilder::mapped_read().name("del").alignment_start(101).cigar("10M5D40M").build();
    let input = write_input_bam(dir.path(), &[read]);
    let (output, _) = paths(&dir);

    let result = run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), &output]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let (_, records) = read_bam(std::path::Path::new(&output));
    assert_alignment(&records[0], 116, "10S40M");
    assert_consistent_length(&records[0]);
}

#[test]
fn test_secondary_alignment_passes_through() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let primary = RecordBuilder::mapped_read().name("s1").alignment_start(101).cigar("50M").build();
    let secondary = RecordBuilder::mapped_read()
        .name("s1")
        .secondary(true)
        .alignment_start(101)
        .cigar("50M")
        .build();
    let input = write_input_bam(dir.path(), &[primary, secondary]);
    let (output, _) = paths(&dir);

    let result = run_ampclip([
        "--keep-unmatched",
        manifest.to_str().unwrap(),
        input.to_str().unwrap(),
        &output,
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let (_, records) = read_bam(std::path::Path::new(&output));
    assert_eq!(records.len(), 2);
    assert_alignment(&records[0], 121, "20S30M");
    assert_alignment(&records[1], 101, "50M");
    assert_string_tag(&records[1], *b"X2", "50M");
}

#[test]
fn test_contig_prefix_controls_matching() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let read = RecordBuilder::mapped_read().name("p1").alignment_start(101).cigar("50M").build();
    let input = write_input_bam(dir.path(), &[read]);
    let (output, _) = paths(&dir);

    // Without the prefix the manifest names chromosome "1", which is not in the header
    let result = run_ampclip([
        "--contig-prefix",
        "",
        manifest.to_str().unwrap(),
        input.to_str().unwrap(),
        &output,
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let (_, records) = read_bam(std::path::Path::new(&output));
    assert!(records.is_empty());
}

#[test]
fn test_metrics_and_histogram() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1, AMP2]);
    let (r1, r2) = create_fr_pair("q1", 101, "50M", 111, "60M");
    let far = RecordBuilder::mapped_read().name("far").alignment_start(5001).cigar("40M").build();
    let input = write_input_bam(dir.path(), &[r1, r2, far]);
    let (output, metrics) = paths(&dir);
    let histogram = dir.path().join("histogram.txt");

    let result = run_ampclip([
        "--metrics",
        &metrics,
        "--clip-histogram",
        histogram.to_str().unwrap(),
        manifest.to_str().unwrap(),
        input.to_str().unwrap(),
        &output,
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let rows = read_tsv(std::path::Path::new(&metrics));
    assert_eq!(rows.len(), 3);
    let amp1 = &rows[0];
    assert_eq!(amp1["primer_pair"], "amp1");
    assert_eq!(amp1["chromosome"], "chr1");
    assert_eq!(amp1["sense_start"], "100");
    assert_eq!(amp1["antisense_end"], "170");
    assert_eq!(amp1["reads"], "2");
    assert_eq!(amp1["reads_positive_strand"], "1");
    assert_eq!(amp1["reads_negative_strand"], "1");
    assert_eq!(amp1["reads_mate_same_pair"], "2");
    // R1 clips 20 at 5'; R2 clips 20 at 5' and 10 at 3'
    assert_eq!(amp1["bases_clipped_five_prime"], "40");
    assert_eq!(amp1["bases_clipped_three_prime"], "10");
    assert_eq!(rows[1]["primer_pair"], "amp2");
    assert_eq!(rows[1]["reads"], "0");
    assert_eq!(rows[2]["primer_pair"], "unmatched");
    assert_eq!(rows[2]["reads"], "1");
    assert_eq!(rows[2]["sense_start"], "");

    let histogram = read_tsv(&histogram);
    let count = |end: &str, length: &str| {
        histogram
            .iter()
            .find(|row| {
                row["primer_pair"] == "amp1" && row["end"] == end && row["length"] == length
            })
            .map(|row| row["count"].clone())
    };
    assert_eq!(count("five_prime", "20").as_deref(), Some("2"));
    assert_eq!(count("three_prime", "0").as_deref(), Some("1"));
    assert_eq!(count("three_prime", "10").as_deref(), Some("1"));
}

#[test]
fn test_output_header_has_program_record() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1]);
    let input = write_input_bam(dir.path(), &[]);
    let (output, _) = paths(&dir);

    let result = run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), &output]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let (header, records) = read_bam(std::path::Path::new(&output));
    assert!(records.is_empty());
    assert!(header.programs().as_ref().contains_key(b"ampclip".as_slice()));
    assert_eq!(header.reference_sequences().len(), 2);
}

#[test]
fn test_threaded_output_matches_single_threaded() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), &[AMP1, AMP2]);
    let mut records = Vec::new();
    for i in 0..200 {
        let (r1, r2) = create_fr_pair(&format!("q{i}"), 101 + (i % 15), "50M", 111, "60M");
        records.push(r1);
        records.push(r2);
    }
    let input = write_input_bam(dir.path(), &records);
    let single = dir.path().join("single.bam");
    let threaded = dir.path().join("threaded.bam");

    for (path, threads) in [(&single, "1"), (&threaded, "3")] {
        let result = run_ampclip([
            "--threads",
            threads,
            manifest.to_str().unwrap(),
            input.to_str().unwrap(),
            path.to_str().unwrap(),
        ]);
        assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    }

    let (_, single) = read_bam(&single);
    let (_, threaded) = read_bam(&threaded);
    assert_eq!(single.len(), 400);
    assert_eq!(single, threaded);
}

#[test]
fn test_manifest_with_compact_column_names() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("manifest.txt");
    std::fs::write(
        &manifest,
        format!(
            "TargetID\tChromosome\tSenseStart\tSenseSequence\tAntisenseStart\tAntisenseSequence\n\
             {AMP1}\n"
        ),
    )
    .unwrap();
    let (r1, r2) = create_fr_pair("q1", 101, "50M", 111, "60M");
    let input = write_input_bam(dir.path(), &[r1, r2]);
    let (output, _) = paths(&dir);

    let result = run_ampclip([manifest.to_str().unwrap(), input.to_str().unwrap(), &output]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let (_, records) = read_bam(std::path::Path::new(&output));
    assert_eq!(records.len(), 2);
    assert_alignment(&records[0], 121, "20S30M");
    assert_alignment(&records[1], 121, "10S30M20S");
}
