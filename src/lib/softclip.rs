//! Converts the primer-covered ends of an alignment into soft clips.
//!
//! In reference space the sense primer always bounds the left edge of an amplicon and
//! the antisense primer the right edge. The strand of the read only decides which of
//! the two clips is at its 5' end: the left clip for a positive-strand read, the right
//! clip for a negative-strand read.

use std::fmt;

use crate::cigar::Alignment;
use crate::primers::PrimerPair;
use crate::read::Strand;

/// What happened to a read's alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipOutcome {
    /// No primer pair matched, the alignment is unchanged
    NotMatched,
    /// At least one end was soft-clipped
    Clipped,
    /// A pair matched but the alignment does not overlap either primer
    NoOverlap,
    /// Clipping both primers would leave no aligned base, the alignment is unchanged
    WithinPrimers,
}

impl fmt::Display for ClipOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClipOutcome::NotMatched => "not matched",
            ClipOutcome::Clipped => "clipped",
            ClipOutcome::NoOverlap => "no overlap",
            ClipOutcome::WithinPrimers => "within primers",
        };
        f.write_str(s)
    }
}

/// The CIGAR consumes a different number of query bases than the read holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthMismatch {
    /// Query bases consumed by the CIGAR
    pub cigar_length: usize,
    /// Length of the stored sequence
    pub read_length: usize,
}

/// Output of [`softclip_primers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Softclip {
    /// The new alignment (the input alignment unless the outcome is `Clipped`)
    pub alignment: Alignment,
    /// Query bases newly clipped at the read's 5' end
    pub five_prime_clip: usize,
    /// Query bases newly clipped at the read's 3' end
    pub three_prime_clip: usize,
    /// Classification of the result
    pub outcome: ClipOutcome,
}

impl Softclip {
    fn unchanged(alignment: &Alignment, outcome: ClipOutcome) -> Self {
        Self { alignment: alignment.clone(), five_prime_clip: 0, three_prime_clip: 0, outcome }
    }
}

/// Reference bases to clip from the left and right edges of `[start, end)` for `pair`.
#[must_use]
pub fn clip_lengths(start: usize, end: usize, pair: &PrimerPair) -> (usize, usize) {
    let sense = pair.sense();
    let antisense = pair.antisense();
    let left = if sense.overlaps(start, end) { sense.end.min(end) - start } else { 0 };
    let right = if antisense.overlaps(start, end) { end - antisense.start.max(start) } else { 0 };
    (left, right)
}

/// Soft-clips the primer footprints of `pair` from `alignment`.
///
/// `read_length` is the length of the stored sequence; 0 skips the consistency check for
/// records without a sequence.
///
/// # Errors
///
/// Returns [`LengthMismatch`] if the CIGAR does not consume `read_length` query bases.
pub fn softclip_primers(
    alignment: &Alignment,
    strand: Strand,
    read_length: usize,
    pair: Option<&PrimerPair>,
) -> Result<Softclip, LengthMismatch> {
    let cigar_length = alignment.query_length();
    if read_length != 0 && cigar_length != read_length {
        return Err(LengthMismatch { cigar_length, read_length });
    }

    let Some(pair) = pair else {
        return Ok(Softclip::unchanged(alignment, ClipOutcome::NotMatched));
    };

    let (left, right) = clip_lengths(alignment.reference_start(), alignment.reference_end(), pair);
    if left == 0 && right == 0 {
        return Ok(Softclip::unchanged(alignment, ClipOutcome::NoOverlap));
    }

    let Some(clipped) = alignment.softclip(left, right) else {
        return Ok(Softclip::unchanged(alignment, ClipOutcome::WithinPrimers));
    };

    let (five_prime_clip, three_prime_clip) = match strand {
        Strand::Positive => (clipped.left.query, clipped.right.query),
        Strand::Negative => (clipped.right.query, clipped.left.query),
    };
    Ok(Softclip {
        alignment: clipped.alignment,
        five_prime_clip,
        three_prime_clip,
        outcome: ClipOutcome::Clipped,
    })
}
