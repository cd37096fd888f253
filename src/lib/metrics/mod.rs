//! Metrics collection and reporting for primer clipping.
//!
//! - [`primer`] - Per-primer-pair counts and clip-length histograms
//! - [`writer`] - Metrics file I/O utilities

pub mod primer;
pub mod writer;

use serde::{Deserialize, Serialize};

pub use primer::{ClipEnd, ClipLengthMetric, PrimerPairMetrics, PrimerStats};
pub use writer::{write_metrics, write_metrics_auto};

/// A metric type that can be serialized to TSV files.
pub trait Metric: Serialize + for<'de> Deserialize<'de> + Clone + Default {
    /// Human-readable name for this metric type.
    ///
    /// Used in error messages and logging when writing metrics files.
    fn metric_name() -> &'static str;
}
