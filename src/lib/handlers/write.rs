//! Writes records to the output BAM in the order they arrive.

use anyhow::{Context, Result};
use log::info;
use noodles::sam::Header;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record_buf::RecordBuf;

use super::{Flow, ReadHandler};
use crate::bam_io::BamWriter;
use crate::logging::format_count;
use crate::transform::ReadTransformation;

/// Final stage: writes every record it sees, then flushes the BGZF stream at the end.
pub struct WriteHandler {
    writer: Option<BamWriter>,
    header: Header,
    written: u64,
}

impl WriteHandler {
    /// Wraps a writer whose header has already been written.
    #[must_use]
    pub fn new(writer: BamWriter, header: Header) -> Self {
        Self { writer: Some(writer), header, written: 0 }
    }

    /// Records written so far.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl ReadHandler for WriteHandler {
    fn name(&self) -> &'static str {
        "BAM writer"
    }

    fn handle(
        &mut self,
        record: &mut RecordBuf,
        _own: &ReadTransformation<'_>,
        _mate: Option<&ReadTransformation<'_>>,
    ) -> Result<Flow> {
        let writer = self.writer.as_mut().context("BAM writer used after it was finished")?;
        writer
            .write_alignment_record(&self.header, &*record)
            .context("Failed to write BAM record")?;
        self.written += 1;
        Ok(Flow::Continue)
    }

    fn end(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.into_inner().finish().context("Failed to finish output BAM")?;
        }
        info!("Wrote {} records", format_count(self.written));
        Ok(())
    }
}
