//! Applies the clipped alignment to a record and keeps its mate fields in step.

use anyhow::Result;
use log::info;
use noodles::core::Position;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;

use super::{Flow, ReadHandler};
use crate::cigar::format_cigar;
use crate::logging::format_count;
use crate::transform::ReadTransformation;

/// Rewrites position and CIGAR from the record's own transformation, and the mate
/// position, `MC` tag and template length from the mate's.
#[derive(Debug, Default)]
pub struct TransformHandler {
    changed: u64,
}

impl TransformHandler {
    /// Creates the handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records whose alignment was changed.
    #[must_use]
    pub fn changed(&self) -> u64 {
        self.changed
    }
}

/// Insert size between two alignments given as 1-based `(start, end, reverse)`, measured
/// between their 5' ends in the same way htsjdk does.
fn insert_size(own: (usize, usize, bool), mate: (usize, usize, bool)) -> Option<i32> {
    let five_prime = |(start, end, reverse): (usize, usize, bool)| {
        i64::try_from(if reverse { end } else { start }).ok()
    };
    let first = five_prime(own)?;
    let second = five_prime(mate)?;
    let adjustment = if second >= first { 1 } else { -1 };
    i32::try_from(second - first + adjustment).ok()
}

impl ReadHandler for TransformHandler {
    fn name(&self) -> &'static str {
        "alignment transform"
    }

    fn handle(
        &mut self,
        record: &mut RecordBuf,
        own: &ReadTransformation<'_>,
        mate: Option<&ReadTransformation<'_>>,
    ) -> Result<Flow> {
        let is_placed = !record.flags().is_unmapped() && record.alignment_start().is_some();
        if let (true, Some(start)) = (is_placed, own.reference_start) {
            let new_start = Position::new(start + 1);
            let changed = record.alignment_start() != new_start
                || record.cigar().as_ref() != own.ops.as_slice();
            if changed {
                self.changed += 1;
            }
            *record.alignment_start_mut() = new_start;
            *record.cigar_mut() = own.ops.iter().copied().collect();
        }

        let Some(mate) = mate else {
            return Ok(Flow::Continue);
        };
        let Some(mate_start) = mate.reference_start else {
            return Ok(Flow::Continue);
        };
        if record.mate_alignment_start().is_none() {
            return Ok(Flow::Continue);
        }

        *record.mate_alignment_start_mut() = Position::new(mate_start + 1);
        let mate_cigar = Tag::new(b'M', b'C');
        if record.data().get(&mate_cigar).is_some() {
            record.data_mut().insert(mate_cigar, Value::from(format_cigar(&mate.ops)));
        }

        let same_reference = record.reference_sequence_id().is_some()
            && record.reference_sequence_id() == record.mate_reference_sequence_id();
        if record.template_length() != 0 && is_placed && same_reference {
            let own_span = own.reference_start.zip(own.reference_end());
            let mate_span = mate.reference_start.zip(mate.reference_end());
            if let (Some((s, e)), Some((ms, me))) = (own_span, mate_span) {
                let flags = record.flags();
                let tlen = insert_size(
                    (s + 1, e, flags.is_reverse_complemented()),
                    (ms + 1, me, flags.is_mate_reverse_complemented()),
                );
                if let Some(tlen) = tlen {
                    *record.template_length_mut() = tlen;
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn end(&mut self) -> Result<()> {
        info!("Changed the alignment of {} records", format_count(self.changed));
        Ok(())
    }
}
