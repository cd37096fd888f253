//! Alignment model: a CIGAR operation list anchored at a 0-based reference start.
//!
//! The model locates clip boundaries by walking the operations from either end and
//! rebuilds the operation list with the clipped regions collapsed into soft clips.
//! Rebuilding never changes the number of query bases, only how they are classified:
//!
//! - match operations (`M`, `=`, `X`) inside a clipped region become soft clip, and are
//!   split when the boundary falls inside them
//! - insertions inside a clipped region become soft clip
//! - deletions and skips inside a clipped region vanish, shifting the reference start
//! - an insertion, deletion or skip immediately after the last clipped reference base
//!   is absorbed into the clipped region, so no alignment starts or ends with an indel
//! - existing soft clips merge with the new clip, hard clips stay outermost

use std::fmt::Write as _;
use std::ops::Range;

use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;

use crate::errors::{AmpclipError, Result};

/// Returns true for operations that align a query base to a reference base (`M`, `=`, `X`).
#[must_use]
pub fn is_aligned(kind: Kind) -> bool {
    kind.consumes_read() && kind.consumes_reference()
}

/// Number of query bases consumed by `ops`.
#[must_use]
pub fn query_length(ops: &[Op]) -> usize {
    ops.iter().filter(|op| op.kind().consumes_read()).map(|op| op.len()).sum()
}

/// Number of reference bases consumed by `ops`.
#[must_use]
pub fn reference_length(ops: &[Op]) -> usize {
    ops.iter().filter(|op| op.kind().consumes_reference()).map(|op| op.len()).sum()
}

fn kind_char(kind: Kind) -> char {
    match kind {
        Kind::Match => 'M',
        Kind::Insertion => 'I',
        Kind::Deletion => 'D',
        Kind::Skip => 'N',
        Kind::SoftClip => 'S',
        Kind::HardClip => 'H',
        Kind::Pad => 'P',
        Kind::SequenceMatch => '=',
        Kind::SequenceMismatch => 'X',
    }
}

/// Formats operations as a SAM CIGAR string; an empty list formats as `*`.
#[must_use]
pub fn format_cigar(ops: &[Op]) -> String {
    if ops.is_empty() {
        return "*".to_string();
    }
    let mut out = String::with_capacity(ops.len() * 4);
    for op in ops {
        let _ = write!(out, "{}{}", op.len(), kind_char(op.kind()));
    }
    out
}

/// Parses a SAM CIGAR string; `*` and the empty string parse to no operations.
///
/// # Errors
///
/// Returns an error on unknown operations, missing lengths or a dangling length.
pub fn parse_cigar(cigar: &str) -> Result<Vec<Op>> {
    let invalid = |reason: &str| AmpclipError::InvalidCigar {
        cigar: cigar.to_string(),
        reason: reason.to_string(),
    };
    if cigar.is_empty() || cigar == "*" {
        return Ok(Vec::new());
    }

    let mut ops = Vec::new();
    let mut len: Option<usize> = None;
    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            let value =
                len.unwrap_or(0).checked_mul(10).and_then(|v| v.checked_add(digit as usize));
            len = Some(value.ok_or_else(|| invalid("operation length overflows"))?);
            continue;
        }
        let kind = match c {
            'M' => Kind::Match,
            'I' => Kind::Insertion,
            'D' => Kind::Deletion,
            'N' => Kind::Skip,
            'S' => Kind::SoftClip,
            'H' => Kind::HardClip,
            'P' => Kind::Pad,
            '=' => Kind::SequenceMatch,
            'X' => Kind::SequenceMismatch,
            _ => return Err(invalid(&format!("unknown operation '{c}'"))),
        };
        let op_len = len.take().ok_or_else(|| invalid(&format!("operation '{c}' has no length")))?;
        ops.push(Op::new(kind, op_len));
    }
    if len.is_some() {
        return Err(invalid("trailing length without an operation"));
    }
    Ok(ops)
}

/// Where a clipped region ends, as found by a boundary walk.
///
/// For a walk from the start, `op_offset` bases at the front of operation `op_index`
/// fall inside the clipped region; for a walk from the end, `op_offset` bases at its back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipBoundary {
    /// Index of the first operation (in walk direction) that is at least partly retained
    pub op_index: usize,
    /// Bases of that operation falling inside the clipped region
    pub op_offset: usize,
    /// Query bases inside the clipped region (excluding pre-existing clips)
    pub query_clipped: usize,
    /// Reference bases inside the clipped region
    pub reference_clipped: usize,
}

/// The bases removed from the aligned span at one edge by [`Alignment::softclip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeClip {
    /// Query bases newly soft-clipped
    pub query: usize,
    /// Reference bases no longer covered
    pub reference: usize,
}

/// Result of [`Alignment::softclip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Softclipped {
    /// The rebuilt alignment
    pub alignment: Alignment,
    /// Clip applied at the leftmost (lowest coordinate) edge
    pub left: EdgeClip,
    /// Clip applied at the rightmost edge
    pub right: EdgeClip,
}

/// An operation list plus the 0-based reference coordinate of its first aligned base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    reference_start: usize,
    ops: Vec<Op>,
}

impl Alignment {
    /// Creates an alignment from its 0-based reference start and operations.
    #[must_use]
    pub fn new(reference_start: usize, ops: Vec<Op>) -> Self {
        Self { reference_start, ops }
    }

    /// 0-based reference start.
    #[must_use]
    pub fn reference_start(&self) -> usize {
        self.reference_start
    }

    /// 0-based exclusive reference end.
    #[must_use]
    pub fn reference_end(&self) -> usize {
        self.reference_start + self.reference_length()
    }

    /// The CIGAR operations.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Consumes the alignment, returning its operations.
    #[must_use]
    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Reference bases consumed.
    #[must_use]
    pub fn reference_length(&self) -> usize {
        reference_length(&self.ops)
    }

    /// Query bases consumed (the read length implied by the CIGAR).
    #[must_use]
    pub fn query_length(&self) -> usize {
        query_length(&self.ops)
    }

    /// True if any operation aligns a query base to the reference.
    #[must_use]
    pub fn has_aligned_bases(&self) -> bool {
        self.ops.iter().any(|op| is_aligned(op.kind()) && op.len() > 0)
    }

    /// Range of operations between the leading and trailing clips.
    fn core_range(&self) -> Range<usize> {
        let is_clip = |op: &Op| matches!(op.kind(), Kind::SoftClip | Kind::HardClip);
        let start = self.ops.iter().take_while(|op| is_clip(op)).count();
        let trailing = self.ops[start..].iter().rev().take_while(|op| is_clip(op)).count();
        start..self.ops.len() - trailing
    }

    /// Locates the boundary after `reference_bases` reference bases, walking from the start.
    ///
    /// Returns `None` if the clipped region would swallow every aligned operation.
    #[must_use]
    pub fn locate_from_start(&self, reference_bases: usize) -> Option<ClipBoundary> {
        let core = self.core_range();
        if core.is_empty() {
            return None;
        }
        if reference_bases == 0 {
            return Some(ClipBoundary { op_index: core.start, ..ClipBoundary::default() });
        }
        walk(
            self.ops[core.clone()].iter().enumerate().map(|(i, op)| (core.start + i, op)),
            reference_bases,
        )
    }

    /// Locates the boundary `reference_bases` reference bases before the end.
    ///
    /// Returns `None` if the clipped region would swallow every aligned operation.
    #[must_use]
    pub fn locate_from_end(&self, reference_bases: usize) -> Option<ClipBoundary> {
        let core = self.core_range();
        if core.is_empty() {
            return None;
        }
        if reference_bases == 0 {
            return Some(ClipBoundary { op_index: core.end - 1, ..ClipBoundary::default() });
        }
        walk(
            self.ops[core.clone()].iter().enumerate().rev().map(|(i, op)| (core.start + i, op)),
            reference_bases,
        )
    }

    /// Soft-clips `left_reference` reference bases from the left edge and
    /// `right_reference` from the right edge.
    ///
    /// Returns `None` when the two clipped regions together leave no aligned base.
    #[must_use]
    pub fn softclip(&self, left_reference: usize, right_reference: usize) -> Option<Softclipped> {
        if !self.has_aligned_bases() {
            return None;
        }
        let core = self.core_range();
        let left = self.locate_from_start(left_reference)?;
        let right = self.locate_from_end(right_reference)?;
        if left.op_index > right.op_index {
            return None;
        }

        let mut ops = Vec::with_capacity(self.ops.len() + 2);
        let (lead_hard, lead_soft) = split_clips(&self.ops[..core.start]);
        let (trail_hard, trail_soft) = split_clips(&self.ops[core.end..]);

        ops.extend(lead_hard);
        ops.push(Op::new(Kind::SoftClip, lead_soft + left.query_clipped));
        if left.op_index == right.op_index {
            let op = self.ops[left.op_index];
            let len = op.len().checked_sub(left.op_offset + right.op_offset).filter(|&n| n > 0)?;
            ops.push(Op::new(op.kind(), len));
        } else {
            let first = self.ops[left.op_index];
            let last = self.ops[right.op_index];
            ops.push(Op::new(first.kind(), first.len() - left.op_offset));
            ops.extend_from_slice(&self.ops[left.op_index + 1..right.op_index]);
            ops.push(Op::new(last.kind(), last.len() - right.op_offset));
        }
        ops.push(Op::new(Kind::SoftClip, trail_soft + right.query_clipped));
        ops.extend(trail_hard);
        ops.retain(|op| op.len() > 0);

        let alignment = Alignment::new(self.reference_start + left.reference_clipped, ops);
        if !alignment.has_aligned_bases() {
            return None;
        }
        Some(Softclipped {
            alignment,
            left: EdgeClip { query: left.query_clipped, reference: left.reference_clipped },
            right: EdgeClip { query: right.query_clipped, reference: right.reference_clipped },
        })
    }
}

/// Splits edge clip operations into the hard clips (in order) and the total soft-clip length.
fn split_clips(ops: &[Op]) -> (Vec<Op>, usize) {
    let hard = ops.iter().filter(|op| op.kind() == Kind::HardClip).copied().collect();
    let soft = ops.iter().filter(|op| op.kind() == Kind::SoftClip).map(|op| op.len()).sum();
    (hard, soft)
}

/// Walks `ops` (already ordered in the walk direction) until `reference_bases` reference
/// bases are consumed and the next operation is an aligned one.
fn walk<'a>(
    ops: impl Iterator<Item = (usize, &'a Op)>,
    reference_bases: usize,
) -> Option<ClipBoundary> {
    let mut query_clipped = 0;
    let mut reference_clipped = 0;
    for (op_index, op) in ops {
        let (kind, len) = (op.kind(), op.len());
        if is_aligned(kind) {
            let remaining = reference_bases.saturating_sub(reference_clipped);
            if len > remaining {
                return Some(ClipBoundary {
                    op_index,
                    op_offset: remaining,
                    query_clipped: query_clipped + remaining,
                    reference_clipped: reference_clipped + remaining,
                });
            }
            query_clipped += len;
            reference_clipped += len;
        } else {
            if kind.consumes_read() {
                query_clipped += len;
            }
            if kind.consumes_reference() {
                reference_clipped += len;
            }
        }
    }
    None
}
