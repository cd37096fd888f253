//! Annotates each record with its primer-pair match and its original alignment.
//!
//! | Tag  | Type | Value                                            |
//! |------|------|--------------------------------------------------|
//! | `X0` | `Z`  | Matched primer pair (only when matched)          |
//! | `X1` | `i`  | Original 1-based alignment start                 |
//! | `X2` | `Z`  | Original CIGAR                                   |
//! | `X3` | `Z`  | Primer pair matched by the mate (when matched)   |
//!
//! Tags are written before the alignment is rewritten, so `X1` and `X2` always describe the
//! input record.

use anyhow::Result;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;

use super::{Flow, ReadHandler};
use crate::cigar::format_cigar;
use crate::transform::ReadTransformation;

/// Matched primer pair.
pub const PRIMER_PAIR_TAG: Tag = Tag::new(b'X', b'0');
/// Original 1-based alignment start.
pub const ORIGINAL_START_TAG: Tag = Tag::new(b'X', b'1');
/// Original CIGAR.
pub const ORIGINAL_CIGAR_TAG: Tag = Tag::new(b'X', b'2');
/// Primer pair matched by the mate.
pub const MATE_PRIMER_PAIR_TAG: Tag = Tag::new(b'X', b'3');

/// Adds the `X0`..`X3` tags.
#[derive(Debug, Default)]
pub struct TagHandler;

impl TagHandler {
    /// Creates the handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReadHandler for TagHandler {
    fn name(&self) -> &'static str {
        "tagging"
    }

    fn handle(
        &mut self,
        record: &mut RecordBuf,
        own: &ReadTransformation<'_>,
        mate: Option<&ReadTransformation<'_>>,
    ) -> Result<Flow> {
        let original_start = record.alignment_start().map(usize::from);
        let original_cigar = format_cigar(record.cigar().as_ref());
        let data = record.data_mut();

        if let Some(id) = own.pair_id() {
            data.insert(PRIMER_PAIR_TAG, Value::from(id));
        }
        if let Some(start) = original_start.and_then(|pos| i32::try_from(pos).ok()) {
            data.insert(ORIGINAL_START_TAG, Value::from(start));
        }
        data.insert(ORIGINAL_CIGAR_TAG, Value::from(original_cigar));
        if let Some(id) = mate.and_then(|m| m.pair_id()) {
            data.insert(MATE_PRIMER_PAIR_TAG, Value::from(id));
        }
        Ok(Flow::Continue)
    }
}
