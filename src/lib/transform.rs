//! First pass: compute the primer-clipped alignment of every primary read.
//!
//! Transformations are stored by [`ReadKey`] so the second pass can look up both a read's
//! own transformation and its mate's, regardless of where the mate sits in the file.

use std::collections::hash_map::Entry;
use std::io;

use ahash::AHashMap;
use anyhow::{Context, Result};
use log::debug;
use noodles::sam::Header;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::cigar::{self, format_cigar};
use crate::errors::AmpclipError;
use crate::primers::{PrimerPair, PrimerPairRegistry};
use crate::progress::ProgressTracker;
use crate::read::{Read, ReadKey};
use crate::softclip::{ClipOutcome, softclip_primers};

/// The new alignment of one read plus the bookkeeping needed for statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTransformation<'r> {
    /// The matched primer pair, if any
    pub primer_pair: Option<&'r PrimerPair>,
    /// New 0-based reference start; `None` for unplaced reads
    pub reference_start: Option<usize>,
    /// New CIGAR operations
    pub ops: Vec<Op>,
    /// Query bases clipped at the read's 5' end
    pub five_prime_clip: usize,
    /// Query bases clipped at the read's 3' end
    pub three_prime_clip: usize,
    /// Classification of the clip
    pub outcome: ClipOutcome,
}

impl<'r> ReadTransformation<'r> {
    /// A transformation that leaves `read` as it is, with no matched pair.
    #[must_use]
    pub fn identity(read: &Read<'_>) -> Self {
        Self {
            primer_pair: None,
            reference_start: read.alignment_start(),
            ops: read.ops().to_vec(),
            five_prime_clip: 0,
            three_prime_clip: 0,
            outcome: ClipOutcome::NotMatched,
        }
    }

    /// Matches `read` against `registry` and soft-clips the primers of the matched pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmpclipError::InconsistentAlignment`] if the CIGAR does not agree with the
    /// read's sequence length.
    pub fn compute(
        read: &Read<'_>,
        registry: &'r PrimerPairRegistry,
    ) -> std::result::Result<Self, AmpclipError> {
        let Some(alignment) = read.alignment() else {
            return Ok(Self::identity(read));
        };
        let primer_pair = registry.match_read(read);
        let clip = softclip_primers(&alignment, read.strand(), read.read_length(), primer_pair)
            .map_err(|mismatch| AmpclipError::InconsistentAlignment {
                read_name: read.name().to_string(),
                cigar: format_cigar(read.ops()),
                cigar_length: mismatch.cigar_length,
                read_length: mismatch.read_length,
            })?;

        Ok(Self {
            primer_pair,
            reference_start: Some(clip.alignment.reference_start()),
            ops: clip.alignment.into_ops(),
            five_prime_clip: clip.five_prime_clip,
            three_prime_clip: clip.three_prime_clip,
            outcome: clip.outcome,
        })
    }

    /// True if a primer pair matched.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.primer_pair.is_some()
    }

    /// Identifier of the matched pair.
    #[must_use]
    pub fn pair_id(&self) -> Option<&'r str> {
        self.primer_pair.map(PrimerPair::id)
    }

    /// New 0-based exclusive reference end.
    #[must_use]
    pub fn reference_end(&self) -> Option<usize> {
        self.reference_start.map(|start| start + cigar::reference_length(&self.ops))
    }
}

/// Transformations of all primary reads, keyed by read identity.
pub type ReadTransformations<'r> = AHashMap<ReadKey, ReadTransformation<'r>>;

/// Reads every record once and computes the transformation of each primary read.
///
/// Secondary and supplementary records are skipped; they are never clipped.
///
/// # Errors
///
/// Returns an error if a record cannot be read, a CIGAR disagrees with its sequence, or two
/// primary records share the same identity key.
pub fn build_read_transformations<'r, I>(
    records: I,
    header: &Header,
    registry: &'r PrimerPairRegistry,
) -> Result<ReadTransformations<'r>>
where
    I: IntoIterator<Item = io::Result<RecordBuf>>,
{
    let mut transformations = ReadTransformations::default();
    let mut progress = ProgressTracker::new("Built transformations for");

    for result in records {
        let record = result.context("Failed to read BAM record")?;
        progress.record(1);
        let read = Read::new(&record, header);
        if !read.is_primary() {
            continue;
        }

        let transformation = ReadTransformation::compute(&read, registry)?;
        match transformations.entry(read.key()) {
            Entry::Occupied(entry) => {
                return Err(AmpclipError::DuplicateRead {
                    read_name: read.name().to_string(),
                    segment: format!("{:?} {:?}", entry.key().segment, entry.key().strand),
                }
                .into());
            }
            Entry::Vacant(entry) => {
                entry.insert(transformation);
            }
        }
    }

    progress.log_final();
    debug!("Computed {} read transformations", transformations.len());
    Ok(transformations)
}
