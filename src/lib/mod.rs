#![deny(unsafe_code)]
// Clippy lint configuration for CI
// - cast_*: coordinate and count arithmetic casts between usize, i32, i64, u64 and f64
// - missing_*_doc: Documentation improvements tracked separately
// - module_name_repetitions: types like `PrimerPairRegistry` live in `primers`
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::redundant_closure_for_method_calls,
    clippy::uninlined_format_args
)]

//! # ampclip - soft-clipping of amplicon primers
//!
//! In targeted amplicon sequencing every read starts (and often ends) with primer
//! sequence that was synthesized rather than copied from the sample. This library
//! converts the primer-covered ends of aligned reads into soft clips so that variant
//! callers ignore them, without removing any bases from the reads.
//!
//! ## Overview
//!
//! ### Core Functionality
//!
//! - **[`primers`]** - Primer-pair footprints, the manifest reader and the read matcher
//! - **[`cigar`]** - Alignment model with boundary walks and soft-clip rebuilding
//! - **[`softclip`]** - Clips a matched pair's primers from one alignment
//! - **[`transform`]** - First pass: computes the new alignment of every primary read
//! - **[`handlers`]** - Second pass: statistics, exclusion, tagging, rewriting and output
//!
//! ### Utilities
//!
//! - **[`bam_io`]** - BAM file I/O helpers for reading and writing
//! - **[`header`]** - `@PG` record handling for output headers
//! - **[`read`]** - Read view and identity keys used for mate lookup
//! - **[`validation`]** - Input validation utilities for parameters and files
//! - **[`progress`]** - Progress tracking and logging
//! - **[`logging`]** - Logging helpers with number and duration formatting
//! - **[`metrics`]** - Metric rows and TSV writing
//! - **[`errors`]** - Error types
//! - **[`sam`]** - Record builders for tests and benchmarks
//!
//! ## Quick Start
//!
//! ```no_run
//! use ampclip_lib::bam_io::create_bam_reader;
//! use ampclip_lib::primers::PrimerPairRegistry;
//! use ampclip_lib::transform::build_read_transformations;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = PrimerPairRegistry::from_manifest(Path::new("manifest.txt"), "chr")?;
//! let (mut reader, header) = create_bam_reader("input.bam", 1)?;
//! let transformations = build_read_transformations(reader.record_bufs(&header), &header, &registry)?;
//! println!("{} reads transformed", transformations.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Clipping a single alignment
//!
//! ```
//! use ampclip_lib::cigar::{Alignment, format_cigar, parse_cigar};
//! use ampclip_lib::primers::{Interval, PrimerPairRegistry};
//! use ampclip_lib::read::Strand;
//! use ampclip_lib::softclip::softclip_primers;
//!
//! let mut registry = PrimerPairRegistry::new();
//! let pair = registry.register("amp1", "chr1", Interval::new(10, 30), Interval::new(200, 220)).unwrap();
//!
//! let alignment = Alignment::new(10, parse_cigar("50M").unwrap());
//! let clipped = softclip_primers(&alignment, Strand::Positive, 50, Some(pair)).unwrap();
//! assert_eq!(format_cigar(clipped.alignment.ops()), "20S30M");
//! assert_eq!(clipped.alignment.reference_start(), 30);
//! ```

pub mod bam_io;
pub mod cigar;
pub mod errors;
pub mod handlers;
pub mod header;
pub mod logging;
pub mod metrics;
pub mod primers;
pub mod progress;
pub mod read;
pub mod sam;
pub mod softclip;
pub mod transform;
pub mod validation;
