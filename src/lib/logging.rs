//! Logging helpers for formatted counts, rates and run summaries.

use std::time::{Duration, Instant};

use crate::metrics::primer::PrimerStats;

/// Formats a count with thousands separators.
///
/// # Examples
///
/// ```
/// use ampclip_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fraction (0.0-1.0) as a percentage with `decimals` places.
///
/// ```
/// use ampclip_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration as e.g. "45s", "2m 15s" or "1h 30m".
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let (mins, rem) = (secs / 60, secs % 60);
        if rem == 0 { format!("{mins}m") } else { format!("{mins}m {rem}s") }
    } else {
        let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a processing rate in records per second (or per minute when slow).
#[must_use]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} records/s", format_count(count));
    }
    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} records/s", format_count(rate as u64))
    } else {
        format!("{:.1} records/min", count as f64 / (secs / 60.0))
    }
}

/// Logs the per-primer-pair summary accumulated during the second pass.
///
/// Only pairs that matched at least one read are listed individually; the
/// number of silent pairs is reported as a single line.
pub fn log_primer_stats_summary(stats: &PrimerStats) {
    let total = stats.total_reads();
    let matched = stats.matched_reads();
    log::info!("Primer clipping summary:");
    log::info!("  Reads examined: {}", format_count(total));
    log::info!("  Reads matched to a primer pair: {}", format_count(matched));
    if total > 0 {
        log::info!("  Match rate: {}", format_percent(matched as f64 / total as f64, 2));
    }
    log::info!("  Reads without a primer pair: {}", format_count(stats.unmatched_reads()));
    log::info!(
        "  Reads lying wholly within primers (left unclipped): {}",
        format_count(stats.within_primer_reads())
    );

    let mut silent = 0usize;
    for pair in stats.pairs() {
        if pair.reads == 0 {
            silent += 1;
            continue;
        }
        log::info!(
            "  {} ({}): {} reads, {} mate-concordant, mean clip 5' {:.1} / 3' {:.1}",
            pair.primer_pair,
            pair.chromosome,
            format_count(pair.reads),
            format_count(pair.reads_mate_same_pair),
            pair.mean_five_prime_clip,
            pair.mean_three_prime_clip,
        );
    }
    if silent > 0 {
        log::warn!("  {silent} primer pair(s) matched no reads");
    }
}

/// Tracks the wall time of an operation and logs its completion with a rate.
///
/// ```no_run
/// use ampclip_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Building transformations");
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new timer and logs the start of the operation.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Logs the completion with record count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.start_time.elapsed();
        log::info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
