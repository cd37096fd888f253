//! Primer-pair definitions and the registry used to match reads to the amplicon they came from.
//!
//! Pairs are loaded from a tab-delimited manifest with a header row. Each row gives the
//! 1-based start and the sequence of both primers; the genomic footprints are derived as:
//!
//! - sense: `[SenseStart - 1, SenseStart - 1 + len(SenseSequence))`
//! - antisense: `[AntisenseStart - len(AntisenseSequence), AntisenseStart)`
//!
//! Once built, a [`PrimerPairRegistry`] is immutable and shared by reference.

use std::fmt;
use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use bstr::{BStr, BString, ByteSlice};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::AmpclipError;
use crate::read::Read;

/// A 0-based half-open interval on the forward strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    /// Start, inclusive
    pub start: usize,
    /// End, exclusive
    pub end: usize,
}

impl Interval {
    /// Creates a new interval.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the interval covers no bases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `position` lies within the interval.
    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position < self.end
    }

    /// True if the interval shares at least one base with `[start, end)`.
    #[must_use]
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// An amplicon: the footprints of its sense and antisense primers on one chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimerPair {
    index: usize,
    id: String,
    chromosome: BString,
    sense: Interval,
    antisense: Interval,
}

impl PrimerPair {
    /// Position of the pair in registration order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Identifier of the pair (the manifest target id).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Chromosome name, with any contig prefix applied.
    #[must_use]
    pub fn chromosome(&self) -> &BStr {
        self.chromosome.as_bstr()
    }

    /// Footprint of the forward-strand primer.
    #[must_use]
    pub fn sense(&self) -> Interval {
        self.sense
    }

    /// Footprint of the reverse-strand primer.
    #[must_use]
    pub fn antisense(&self) -> Interval {
        self.antisense
    }
}

/// One row of the primer manifest. Columns not named here are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    /// Identifier of the primer pair
    #[serde(rename = "Customer TargetID")]
    pub target_id: String,
    /// Chromosome name, possibly without the contig prefix
    #[serde(rename = "Chr")]
    pub chromosome: String,
    /// 1-based position of the first sense primer base
    #[serde(rename = "Sense Start")]
    pub sense_start: i64,
    /// Sense primer sequence
    #[serde(rename = "Sense Sequence")]
    pub sense_sequence: String,
    /// 1-based position of the last antisense primer base on the forward strand
    #[serde(rename = "Antisense Start")]
    pub antisense_start: i64,
    /// Antisense primer sequence
    #[serde(rename = "Antisense Sequence")]
    pub antisense_sequence: String,
}

/// Alternate manifest column names and the column each one stands for.
const COLUMN_ALIASES: [(&str, &str); 6] = [
    ("TargetID", "Customer TargetID"),
    ("Chromosome", "Chr"),
    ("SenseStart", "Sense Start"),
    ("SenseSequence", "Sense Sequence"),
    ("AntisenseStart", "Antisense Start"),
    ("AntisenseSequence", "Antisense Sequence"),
];

/// Maps a manifest header to the column names [`ManifestRow`] deserializes from.
///
/// An alternate name is only renamed when its canonical column is absent, so a header
/// carrying both spellings reads the canonical one.
fn canonical_header(header: &StringRecord) -> StringRecord {
    let present: Vec<&str> = header.iter().map(str::trim).collect();
    present
        .iter()
        .map(|&name| {
            COLUMN_ALIASES
                .iter()
                .find(|(alias, canonical)| *alias == name && !present.contains(canonical))
                .map_or(name, |(_, canonical)| *canonical)
        })
        .collect()
}

/// Reads every row of a tab-delimited manifest, accepting either spelling of each column.
fn read_manifest_rows(path: &Path) -> Result<Vec<ManifestRow>> {
    let mut reader = ReaderBuilder::new().delimiter(b'\t').trim(Trim::All).from_path(path)?;
    let header = canonical_header(reader.headers()?);
    reader.set_headers(header);
    let rows = reader.deserialize().collect::<std::result::Result<Vec<ManifestRow>, _>>()?;
    Ok(rows)
}

/// Converts a derived `[start, end)` into an interval, rejecting negative or empty ones.
///
/// A bound of `None` is one whose arithmetic overflowed; it is reported at the `i64`
/// limit in the direction of the overflow.
fn checked_interval(
    primer_pair: &str,
    side: &'static str,
    start: Option<i64>,
    end: Option<i64>,
) -> std::result::Result<Interval, AmpclipError> {
    let bounds = start.zip(end).map(|(s, e)| (usize::try_from(s), usize::try_from(e)));
    match bounds {
        Some((Ok(s), Ok(e))) if s < e => Ok(Interval::new(s, e)),
        _ => Err(AmpclipError::InvalidPrimerInterval {
            primer_pair: primer_pair.to_string(),
            side,
            start: start.unwrap_or(i64::MIN),
            end: end.unwrap_or(i64::MAX),
        }),
    }
}

/// Prepends `prefix` to `chromosome` unless it already starts with it.
#[must_use]
pub fn apply_contig_prefix(chromosome: &str, prefix: &str) -> String {
    if chromosome.starts_with(prefix) {
        chromosome.to_string()
    } else {
        format!("{prefix}{chromosome}")
    }
}

impl ManifestRow {
    /// Derives the sense and antisense footprints of this row.
    ///
    /// # Errors
    ///
    /// Returns an error if either footprint is negative or empty.
    pub fn intervals(&self) -> std::result::Result<(Interval, Interval), AmpclipError> {
        let sense_len = primer_len(&self.sense_sequence);
        let antisense_len = primer_len(&self.antisense_sequence);
        let sense_start = self.sense_start.checked_sub(1);
        let sense_end = sense_start.and_then(|start| start.checked_add(sense_len));
        let sense = checked_interval(&self.target_id, "sense", sense_start, sense_end)?;
        let antisense = checked_interval(
            &self.target_id,
            "antisense",
            self.antisense_start.checked_sub(antisense_len),
            Some(self.antisense_start),
        )?;
        Ok((sense, antisense))
    }
}

fn primer_len(sequence: &str) -> i64 {
    i64::try_from(sequence.trim().len()).unwrap_or(i64::MAX)
}

/// Lookup of primer pairs by chromosome, in registration order.
#[derive(Debug, Default)]
pub struct PrimerPairRegistry {
    pairs: Vec<PrimerPair>,
    by_chromosome: AHashMap<BString, Vec<usize>>,
}

impl PrimerPairRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primer pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmpclipError::InvalidPrimerInterval`] if either interval is empty.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        chromosome: impl Into<BString>,
        sense: Interval,
        antisense: Interval,
    ) -> std::result::Result<&PrimerPair, AmpclipError> {
        let id = id.into();
        for (side, interval) in [("sense", sense), ("antisense", antisense)] {
            if interval.is_empty() {
                return Err(AmpclipError::InvalidPrimerInterval {
                    primer_pair: id,
                    side,
                    start: i64::try_from(interval.start).unwrap_or(i64::MAX),
                    end: i64::try_from(interval.end).unwrap_or(i64::MAX),
                });
            }
        }

        let index = self.pairs.len();
        let pair = PrimerPair { index, id, chromosome: chromosome.into(), sense, antisense };
        self.by_chromosome.entry(pair.chromosome.clone()).or_default().push(index);
        self.pairs.push(pair);
        Ok(&self.pairs[index])
    }

    /// Builds a registry from a primer manifest.
    ///
    /// `contig_prefix` is prepended to every chromosome that does not already start with it;
    /// pass an empty string to use chromosome names as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, a row cannot be parsed, or a row
    /// describes a negative or empty primer footprint.
    pub fn from_manifest(path: &Path, contig_prefix: &str) -> Result<Self> {
        let rows = read_manifest_rows(path)
            .with_context(|| format!("Failed to read primer manifest: {}", path.display()))?;
        Self::from_rows(&rows, contig_prefix)
            .with_context(|| format!("Invalid primer manifest: {}", path.display()))
    }

    /// Builds a registry from already-parsed manifest rows.
    ///
    /// # Errors
    ///
    /// Returns an error if any row describes a negative or empty primer footprint.
    pub fn from_rows(rows: &[ManifestRow], contig_prefix: &str) -> Result<Self> {
        let mut registry = Self::new();
        for (i, row) in rows.iter().enumerate() {
            let (sense, antisense) =
                row.intervals().map_err(|e| AmpclipError::MalformedManifestRow {
                    row: i + 1,
                    primer_pair: row.target_id.clone(),
                    reason: e.to_string(),
                })?;
            if registry.get(&row.target_id).is_some() {
                warn!("Primer pair '{}' is defined more than once", row.target_id);
            }
            let chromosome = apply_contig_prefix(row.chromosome.trim(), contig_prefix);
            let pair = registry.register(row.target_id.clone(), chromosome, sense, antisense)?;
            debug!(
                "Registered primer pair {} on {}: sense {} antisense {}",
                pair.id(),
                pair.chromosome(),
                pair.sense(),
                pair.antisense()
            );
        }
        Ok(registry)
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if no pairs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PrimerPair> {
        self.pairs.iter()
    }

    /// First registered pair with identifier `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PrimerPair> {
        self.pairs.iter().find(|pair| pair.id == id)
    }

    /// Number of distinct chromosomes with at least one pair.
    #[must_use]
    pub fn chromosome_count(&self) -> usize {
        self.by_chromosome.len()
    }

    /// First registered pair on `chromosome` whose sense or antisense footprint contains
    /// the 0-based `position`.
    #[must_use]
    pub fn match_position(&self, chromosome: &[u8], position: usize) -> Option<&PrimerPair> {
        self.by_chromosome
            .get(chromosome.as_bstr())?
            .iter()
            .map(|&i| &self.pairs[i])
            .find(|pair| pair.sense.contains(position) || pair.antisense.contains(position))
    }

    /// The pair that generated `read`, matched on its alignment start.
    ///
    /// Unmapped reads and reads without a reference position never match.
    #[must_use]
    pub fn match_read(&self, read: &Read<'_>) -> Option<&PrimerPair> {
        let chromosome = read.chromosome()?;
        let start = read.alignment_start()?;
        self.match_position(chromosome, start)
    }
}
