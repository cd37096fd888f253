//! Collects per-primer-pair statistics, logs a summary and writes the metrics files.

use std::path::PathBuf;

use anyhow::Result;
use noodles::sam::alignment::record_buf::RecordBuf;

use super::{Flow, ReadHandler};
use crate::logging::log_primer_stats_summary;
use crate::metrics::primer::PrimerStats;
use crate::metrics::writer::write_metrics_auto;
use crate::primers::PrimerPairRegistry;
use crate::read::Strand;
use crate::transform::ReadTransformation;

/// Counts every primary read; never stops a record.
pub struct StatsHandler {
    stats: PrimerStats,
    metrics_path: Option<PathBuf>,
    histogram_path: Option<PathBuf>,
}

impl StatsHandler {
    /// Creates a handler with one row per pair in `registry`.
    #[must_use]
    pub fn new(registry: &PrimerPairRegistry) -> Self {
        Self { stats: PrimerStats::new(registry), metrics_path: None, histogram_path: None }
    }

    /// Writes the per-pair metrics to `path` at the end of the run.
    #[must_use]
    pub fn with_metrics(mut self, path: Option<PathBuf>) -> Self {
        self.metrics_path = path;
        self
    }

    /// Writes the clip-length histogram to `path` at the end of the run.
    #[must_use]
    pub fn with_clip_histogram(mut self, path: Option<PathBuf>) -> Self {
        self.histogram_path = path;
        self
    }

    /// Statistics gathered so far.
    #[must_use]
    pub fn stats(&self) -> &PrimerStats {
        &self.stats
    }
}

impl ReadHandler for StatsHandler {
    fn name(&self) -> &'static str {
        "statistics"
    }

    fn handle(
        &mut self,
        record: &mut RecordBuf,
        own: &ReadTransformation<'_>,
        mate: Option<&ReadTransformation<'_>>,
    ) -> Result<Flow> {
        let flags = record.flags();
        if !flags.is_secondary() && !flags.is_supplementary() {
            let strand =
                if flags.is_reverse_complemented() { Strand::Negative } else { Strand::Positive };
            self.stats.record(strand, own, mate);
        }
        Ok(Flow::Continue)
    }

    fn end(&mut self) -> Result<()> {
        log_primer_stats_summary(&self.stats);
        if let Some(path) = &self.metrics_path {
            write_metrics_auto(path, &self.stats.metrics())?;
        }
        if let Some(path) = &self.histogram_path {
            write_metrics_auto(path, &self.stats.clip_histogram())?;
        }
        Ok(())
    }
}
