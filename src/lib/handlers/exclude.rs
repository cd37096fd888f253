//! Drops reads that did not match a primer pair.

use anyhow::Result;
use log::info;
use noodles::sam::alignment::record_buf::RecordBuf;

use super::{Flow, ReadHandler};
use crate::logging::format_count;
use crate::transform::ReadTransformation;

/// Stops every read without a matched primer pair.
#[derive(Debug, Default)]
pub struct ExcludeUnmatchedHandler {
    excluded: u64,
}

impl ExcludeUnmatchedHandler {
    /// Creates the handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records excluded so far.
    #[must_use]
    pub fn excluded(&self) -> u64 {
        self.excluded
    }
}

impl ReadHandler for ExcludeUnmatchedHandler {
    fn name(&self) -> &'static str {
        "unmatched read exclusion"
    }

    fn handle(
        &mut self,
        _record: &mut RecordBuf,
        own: &ReadTransformation<'_>,
        _mate: Option<&ReadTransformation<'_>>,
    ) -> Result<Flow> {
        if own.is_matched() {
            Ok(Flow::Continue)
        } else {
            self.excluded += 1;
            Ok(Flow::Stop)
        }
    }

    fn end(&mut self) -> Result<()> {
        info!("Excluded {} records without a primer pair", format_count(self.excluded));
        Ok(())
    }
}
