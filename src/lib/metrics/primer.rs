//! Per-primer-pair statistics gathered while reads are written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Metric;
use crate::primers::PrimerPairRegistry;
use crate::read::Strand;
use crate::softclip::ClipOutcome;
use crate::transform::ReadTransformation;

/// Identifier used for the row that collects reads without a primer pair.
pub const UNMATCHED: &str = "unmatched";

/// Summary of the reads attributed to one primer pair.
///
/// Interval columns are 0-based half-open and left empty on the `unmatched` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimerPairMetrics {
    /// Primer pair identifier, or `unmatched`
    pub primer_pair: String,
    /// Chromosome of the pair
    pub chromosome: String,
    /// Start of the sense primer footprint
    pub sense_start: Option<usize>,
    /// End of the sense primer footprint
    pub sense_end: Option<usize>,
    /// Start of the antisense primer footprint
    pub antisense_start: Option<usize>,
    /// End of the antisense primer footprint
    pub antisense_end: Option<usize>,
    /// Primary reads attributed to the pair
    pub reads: u64,
    /// Reads aligned to the forward strand
    pub reads_positive_strand: u64,
    /// Reads aligned to the reverse strand
    pub reads_negative_strand: u64,
    /// Reads whose mate matched the same pair
    pub reads_mate_same_pair: u64,
    /// Reads with bases clipped at the 5' end
    pub reads_clipped_five_prime: u64,
    /// Reads with bases clipped at the 3' end
    pub reads_clipped_three_prime: u64,
    /// Total bases clipped at the 5' end
    pub bases_clipped_five_prime: u64,
    /// Total bases clipped at the 3' end
    pub bases_clipped_three_prime: u64,
    /// Mean 5' clip over all reads of the pair
    pub mean_five_prime_clip: f64,
    /// Mean 3' clip over all reads of the pair
    pub mean_three_prime_clip: f64,
    /// Reads left unclipped because they lie wholly within the primers
    pub reads_within_primers: u64,
}

impl PrimerPairMetrics {
    fn with_means(&self) -> Self {
        let mut row = self.clone();
        if row.reads > 0 {
            row.mean_five_prime_clip = row.bases_clipped_five_prime as f64 / row.reads as f64;
            row.mean_three_prime_clip = row.bases_clipped_three_prime as f64 / row.reads as f64;
        }
        row
    }

    fn count_strand(&mut self, strand: Strand) {
        self.reads += 1;
        match strand {
            Strand::Positive => self.reads_positive_strand += 1,
            Strand::Negative => self.reads_negative_strand += 1,
        }
    }
}

impl Metric for PrimerPairMetrics {
    fn metric_name() -> &'static str {
        "primer pair"
    }
}

/// Read end a clip length was measured at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipEnd {
    /// The 5' end of the read
    #[default]
    FivePrime,
    /// The 3' end of the read
    ThreePrime,
}

/// One bin of the clip-length histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipLengthMetric {
    /// Primer pair identifier
    pub primer_pair: String,
    /// Read end
    pub end: ClipEnd,
    /// Number of query bases clipped
    pub length: usize,
    /// Reads clipped by exactly `length` bases at `end`
    pub count: u64,
}

impl Metric for ClipLengthMetric {
    fn metric_name() -> &'static str {
        "clip length"
    }
}

/// Accumulates [`PrimerPairMetrics`] and clip-length histograms, one read at a time.
#[derive(Debug, Clone)]
pub struct PrimerStats {
    pairs: Vec<PrimerPairMetrics>,
    histograms: Vec<[BTreeMap<usize, u64>; 2]>,
    unmatched: PrimerPairMetrics,
    within_primers: u64,
}

impl PrimerStats {
    /// Creates empty statistics with one row per registered pair, in registration order.
    #[must_use]
    pub fn new(registry: &PrimerPairRegistry) -> Self {
        let pairs: Vec<_> = registry
            .iter()
            .map(|pair| PrimerPairMetrics {
                primer_pair: pair.id().to_string(),
                chromosome: pair.chromosome().to_string(),
                sense_start: Some(pair.sense().start),
                sense_end: Some(pair.sense().end),
                antisense_start: Some(pair.antisense().start),
                antisense_end: Some(pair.antisense().end),
                ..PrimerPairMetrics::default()
            })
            .collect();
        let histograms = vec![[BTreeMap::new(), BTreeMap::new()]; pairs.len()];
        let unmatched =
            PrimerPairMetrics { primer_pair: UNMATCHED.to_string(), ..Default::default() };
        Self { pairs, histograms, unmatched, within_primers: 0 }
    }

    /// Records one primary read given its own and its mate's transformation.
    pub fn record(
        &mut self,
        strand: Strand,
        own: &ReadTransformation<'_>,
        mate: Option<&ReadTransformation<'_>>,
    ) {
        let Some(pair) = own.primer_pair else {
            self.unmatched.count_strand(strand);
            return;
        };

        let row = &mut self.pairs[pair.index()];
        row.count_strand(strand);
        if mate.and_then(|m| m.primer_pair).is_some_and(|m| m.index() == pair.index()) {
            row.reads_mate_same_pair += 1;
        }
        if own.five_prime_clip > 0 {
            row.reads_clipped_five_prime += 1;
            row.bases_clipped_five_prime += own.five_prime_clip as u64;
        }
        if own.three_prime_clip > 0 {
            row.reads_clipped_three_prime += 1;
            row.bases_clipped_three_prime += own.three_prime_clip as u64;
        }
        if own.outcome == ClipOutcome::WithinPrimers {
            row.reads_within_primers += 1;
            self.within_primers += 1;
        }

        let [five, three] = &mut self.histograms[pair.index()];
        *five.entry(own.five_prime_clip).or_default() += 1;
        *three.entry(own.three_prime_clip).or_default() += 1;
    }

    /// Primary reads recorded.
    #[must_use]
    pub fn total_reads(&self) -> u64 {
        self.matched_reads() + self.unmatched_reads()
    }

    /// Primary reads attributed to a primer pair.
    #[must_use]
    pub fn matched_reads(&self) -> u64 {
        self.pairs.iter().map(|row| row.reads).sum()
    }

    /// Primary reads without a primer pair.
    #[must_use]
    pub fn unmatched_reads(&self) -> u64 {
        self.unmatched.reads
    }

    /// Matched reads left unclipped because they lie within the primers.
    #[must_use]
    pub fn within_primer_reads(&self) -> u64 {
        self.within_primers
    }

    /// Per-pair rows in registration order, with means filled in.
    pub fn pairs(&self) -> impl Iterator<Item = PrimerPairMetrics> + '_ {
        self.pairs.iter().map(PrimerPairMetrics::with_means)
    }

    /// All rows for the metrics file: every pair followed by the `unmatched` row.
    #[must_use]
    pub fn metrics(&self) -> Vec<PrimerPairMetrics> {
        self.pairs().chain(std::iter::once(self.unmatched.with_means())).collect()
    }

    /// Histogram rows ordered by pair, then end, then length.
    #[must_use]
    pub fn clip_histogram(&self) -> Vec<ClipLengthMetric> {
        let mut rows = Vec::new();
        for (row, histograms) in self.pairs.iter().zip(&self.histograms) {
            let ends = [ClipEnd::FivePrime, ClipEnd::ThreePrime];
            for (end, histogram) in ends.into_iter().zip(histograms) {
                rows.extend(histogram.iter().map(|(&length, &count)| ClipLengthMetric {
                    primer_pair: row.primer_pair.clone(),
                    end,
                    length,
                    count,
                }));
            }
        }
        rows
    }
}
