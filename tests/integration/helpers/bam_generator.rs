//! Utilities for generating test inputs programmatically and running the binary.

#![allow(dead_code)]

use ampclip_lib::bam_io::create_bam_reader;
use ampclip_lib::sam::builder::{RecordBuilder, create_header, write_bam};
use noodles::sam::Header;
use noodles::sam::alignment::record_buf::RecordBuf;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Manifest header using the primary column spellings.
pub const MANIFEST_HEADER: &str =
    "Customer TargetID\tChr\tSense Start\tSense Sequence\tAntisense Start\tAntisense Sequence";

/// Header with `chr1` and `chr2`, 10kb each.
pub fn create_test_header() -> Header {
    create_header(&[("chr1", 10_000), ("chr2", 10_000)])
}

/// Writes a manifest with `rows` (tab-delimited, without header) and returns its path.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_manifest(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("manifest.txt");
    let mut contents = String::from(MANIFEST_HEADER);
    contents.push('\n');
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    std::fs::write(&path, contents).expect("Failed to write manifest");
    path
}

/// Writes `records` to `dir/input.bam` with [`create_test_header`] and returns its path.
///
/// # Panics
///
/// Panics if the BAM cannot be written.
pub fn write_input_bam(dir: &Path, records: &[RecordBuf]) -> PathBuf {
    let path = dir.join("input.bam");
    write_bam(&path, &create_test_header(), records).expect("Failed to write input BAM");
    path
}

/// Reads every record of a BAM file, in order, along with its header.
///
/// # Panics
///
/// Panics if the BAM cannot be read.
pub fn read_bam(path: &Path) -> (Header, Vec<RecordBuf>) {
    let (mut reader, header) = create_bam_reader(path, 1).expect("Failed to open BAM");
    let records = reader
        .record_bufs(&header)
        .collect::<io::Result<Vec<_>>>()
        .expect("Failed to read BAM records");
    (header, records)
}

/// An FR pair on chromosome 0: R1 forward at `r1_start` and R2 reverse at `r2_start`
/// (both 1-based), with mate fields, template length and `MC` tags filled in.
pub fn create_fr_pair(
    name: &str,
    r1_start: usize,
    r1_cigar: &str,
    r2_start: usize,
    r2_cigar: &str,
) -> (RecordBuf, RecordBuf) {
    let mut r1 = RecordBuilder::mapped_read()
        .name(name)
        .first_segment(true)
        .mate_reverse_complement(true)
        .alignment_start(r1_start)
        .cigar(r1_cigar)
        .mate(0, r2_start)
        .tag("MC", r2_cigar)
        .build();
    let mut r2 = RecordBuilder::mapped_read()
        .name(name)
        .first_segment(false)
        .reverse_complement(true)
        .alignment_start(r2_start)
        .cigar(r2_cigar)
        .mate(0, r1_start)
        .tag("MC", r1_cigar)
        .build();

    let r2_end = r2_start + ampclip_lib::cigar::reference_length(r2.cigar().as_ref()) - 1;
    let tlen = i32::try_from(r2_end - r1_start + 1).expect("template length fits in i32");
    *r1.template_length_mut() = tlen;
    *r2.template_length_mut() = -tlen;
    (r1, r2)
}

/// Runs the `ampclip` binary with `args`.
///
/// # Panics
///
/// Panics if the binary cannot be started.
pub fn run_ampclip<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_ampclip"))
        .args(args)
        .output()
        .expect("Failed to run ampclip")
}
