//! Second pass: a fixed chain of handlers applied to every record in file order.
//!
//! Each record is passed to the handlers in order together with its own transformation
//! and, when present, its mate's. A handler returning [`Flow::Stop`] ends processing of
//! that record only; later records still go through the whole chain.
//!
//! - [`stats`] - Per-primer-pair statistics and metrics files
//! - [`exclude`] - Drops reads without a primer pair
//! - [`tag`] - Records the match and the original alignment in tags
//! - [`transform`] - Applies the new alignment and updates mate fields
//! - [`write`] - Writes records to the output BAM

pub mod exclude;
pub mod stats;
pub mod tag;
pub mod transform;
pub mod write;

use std::borrow::Cow;
use std::io;

use anyhow::{Context, Result};
use log::debug;
use noodles::sam::Header;
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::errors::AmpclipError;
use crate::progress::ProgressTracker;
use crate::read::Read;
use crate::transform::{ReadTransformation, ReadTransformations};

pub use exclude::ExcludeUnmatchedHandler;
pub use stats::StatsHandler;
pub use tag::TagHandler;
pub use transform::TransformHandler;
pub use write::WriteHandler;

/// Whether the remaining handlers should see the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Pass the record on to the next handler
    Continue,
    /// Stop processing this record
    Stop,
}

/// One stage of the second pass.
pub trait ReadHandler {
    /// Name used in log messages.
    fn name(&self) -> &'static str;

    /// Called once before the first record.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler cannot start.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Processes one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be processed; this aborts the run.
    fn handle(
        &mut self,
        record: &mut RecordBuf,
        own: &ReadTransformation<'_>,
        mate: Option<&ReadTransformation<'_>>,
    ) -> Result<Flow>;

    /// Called once after the last record.
    ///
    /// # Errors
    ///
    /// Returns an error if final output cannot be written.
    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Record counts from one run of a [`ReadPipeline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Records read
    pub records: u64,
    /// Records on which some handler returned [`Flow::Stop`]
    pub stopped: u64,
}

/// An ordered chain of [`ReadHandler`]s.
pub struct ReadPipeline<'a> {
    handlers: Vec<Box<dyn ReadHandler + 'a>>,
}

impl<'a> ReadPipeline<'a> {
    /// Creates a pipeline that runs `handlers` in the given order.
    #[must_use]
    pub fn new(handlers: Vec<Box<dyn ReadHandler + 'a>>) -> Self {
        Self { handlers }
    }

    /// Names of the handlers, in order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Streams `records` through every handler.
    ///
    /// Primary records must have a transformation in `transformations`; secondary and
    /// supplementary records get an identity transformation.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be read, a primary record has no transformation,
    /// or any handler fails.
    pub fn run<I>(
        &mut self,
        records: I,
        header: &Header,
        transformations: &ReadTransformations<'_>,
    ) -> Result<PipelineSummary>
    where
        I: IntoIterator<Item = io::Result<RecordBuf>>,
    {
        debug!("Running read handlers: {}", self.handler_names().join(", "));
        for handler in &mut self.handlers {
            handler.begin().with_context(|| format!("Failed to start {}", handler.name()))?;
        }

        let mut summary = PipelineSummary::default();
        let mut progress = ProgressTracker::new("Processed");
        for result in records {
            let mut record = result.context("Failed to read BAM record")?;
            summary.records += 1;
            progress.record(1);

            let (own, mate) = {
                let read = Read::new(&record, header);
                let own = if read.is_primary() {
                    let transformation = transformations.get(&read.key()).ok_or_else(|| {
                        AmpclipError::MissingTransformation { read_name: read.name().to_string() }
                    })?;
                    Cow::Borrowed(transformation)
                } else {
                    Cow::Owned(ReadTransformation::identity(&read))
                };
                let mate = read.mate_key().and_then(|key| transformations.get(&key));
                (own, mate)
            };

            for handler in &mut self.handlers {
                if handler.handle(&mut record, &own, mate)? == Flow::Stop {
                    summary.stopped += 1;
                    break;
                }
            }
        }
        progress.log_final();

        for handler in &mut self.handlers {
            handler.end().with_context(|| format!("Failed to finish {}", handler.name()))?;
        }
        Ok(summary)
    }
}
