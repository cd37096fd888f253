//! `ClipPrimers` command implementation.
//!
//! Soft-clips the primer-covered ends of aligned amplicon reads. The input BAM is read
//! twice: the first pass computes the clipped alignment of every primary read, and the
//! second pass rewrites each record (and its mate fields) from those results.

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use ampclip_lib::bam_io::{create_bam_reader, create_bam_writer};
use ampclip_lib::handlers::{
    ExcludeUnmatchedHandler, ReadHandler, ReadPipeline, StatsHandler, TagHandler,
    TransformHandler, WriteHandler,
};
use ampclip_lib::header::add_pg_record;
use ampclip_lib::logging::OperationTimer;
use ampclip_lib::primers::PrimerPairRegistry;
use ampclip_lib::transform::build_read_transformations;
use ampclip_lib::validation::{validate_distinct_output, validate_file_exists, validate_threads};

use super::command::Command;
use crate::version::VERSION;

/// Soft-clips amplicon primers from aligned reads
#[derive(Parser, Debug)]
#[command(
    name = "ampclip",
    about = "\x1b[36mSoft-clip PCR primer sequence from aligned amplicon reads\x1b[0m",
    long_about = r#"
Soft-clips the primer-covered ends of reads from a targeted amplicon experiment.

Each primary read is matched to the first primer pair in the manifest, on the read's
chromosome, whose sense or antisense footprint contains the read's alignment start. Aligned
bases of the read that fall inside either primer footprint become soft clips and the alignment
start moves accordingly. No bases or qualities are removed from the read.

The manifest is tab-delimited with a header row and the columns `Customer TargetID`, `Chr`,
`Sense Start`, `Sense Sequence`, `Antisense Start` and `Antisense Sequence` (the spellings
`TargetID`, `Chromosome`, `SenseStart`, `SenseSequence`, `AntisenseStart` and
`AntisenseSequence` are also accepted). Start coordinates are 1-based.

Every record is tagged with:
  X0  primer pair matched by the read
  X1  original 1-based alignment start
  X2  original CIGAR
  X3  primer pair matched by the mate

Mate position, the MC tag (when present) and the template length (when non-zero) are updated
from the mate's clipped alignment. Reads that match no primer pair are dropped unless
--keep-unmatched is given. Secondary and supplementary records are never clipped or matched,
so they are also dropped by default, including supplementary pieces of matched reads.

The input BAM is read twice and may be in any order; the output keeps the input order.
"#
)]
pub struct ClipPrimers {
    /// Tab-delimited primer manifest
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Input BAM file
    #[arg(value_name = "INPUT_BAM")]
    pub input: PathBuf,

    /// Output BAM file
    #[arg(value_name = "OUTPUT_BAM")]
    pub output: PathBuf,

    /// Output file for per-primer-pair metrics
    #[arg(short = 'm', long = "metrics")]
    pub metrics: Option<PathBuf>,

    /// Output file for the 5'/3' clip length histogram
    #[arg(long = "clip-histogram")]
    pub clip_histogram: Option<PathBuf>,

    /// Write reads that match no primer pair instead of dropping them
    #[arg(long = "keep-unmatched", default_value = "false")]
    pub keep_unmatched: bool,

    /// Prefix added to manifest chromosome names that lack it (empty to disable)
    #[arg(long = "contig-prefix", default_value = "chr")]
    pub contig_prefix: String,

    /// Threads for BGZF compression and decompression
    #[arg(short = 't', long = "threads", default_value = "1")]
    pub threads: usize,
}

impl ClipPrimers {
    /// Builds the second-pass handler chain in its fixed order.
    fn handlers<'a>(
        &self,
        registry: &'a PrimerPairRegistry,
        writer: WriteHandler,
    ) -> Vec<Box<dyn ReadHandler + 'a>> {
        let stats = StatsHandler::new(registry)
            .with_metrics(self.metrics.clone())
            .with_clip_histogram(self.clip_histogram.clone());

        let mut handlers: Vec<Box<dyn ReadHandler + 'a>> = vec![Box::new(stats)];
        if !self.keep_unmatched {
            handlers.push(Box::new(ExcludeUnmatchedHandler::new()));
        }
        handlers.push(Box::new(TagHandler::new()));
        handlers.push(Box::new(TransformHandler::new()));
        handlers.push(Box::new(writer));
        handlers
    }
}

impl Command for ClipPrimers {
    fn execute(&self, command_line: &str) -> Result<()> {
        validate_file_exists(&self.manifest, "Primer manifest")?;
        validate_file_exists(&self.input, "Input BAM")?;
        validate_distinct_output(&self.input, &self.output)?;
        validate_threads(self.threads)?;

        info!("ClipPrimers");
        info!("  Manifest: {}", self.manifest.display());
        info!("  Input: {}", self.input.display());
        info!("  Output: {}", self.output.display());
        info!("  Keep unmatched: {}", self.keep_unmatched);
        info!("  Contig prefix: '{}'", self.contig_prefix);
        info!("  Threads: {}", self.threads);

        let registry = PrimerPairRegistry::from_manifest(&self.manifest, &self.contig_prefix)?;
        info!(
            "Loaded {} primer pairs on {} chromosomes",
            registry.len(),
            registry.chromosome_count()
        );

        let timer = OperationTimer::new("Building read transformations");
        let transformations = {
            let (mut reader, header) = create_bam_reader(&self.input, self.threads)?;
            build_read_transformations(reader.record_bufs(&header), &header, &registry)?
        };
        timer.log_completion(transformations.len() as u64);

        let (mut reader, header) = create_bam_reader(&self.input, self.threads)?;
        let output_header = add_pg_record(header.clone(), VERSION.as_str(), command_line)?;
        let writer = create_bam_writer(&self.output, &output_header, self.threads)?;

        let timer = OperationTimer::new("Clipping primers");
        let mut pipeline =
            ReadPipeline::new(self.handlers(&registry, WriteHandler::new(writer, output_header)));
        let summary = pipeline.run(reader.record_bufs(&header), &header, &transformations)?;
        timer.log_completion(summary.records);

        info!("Done.");
        Ok(())
    }
}
