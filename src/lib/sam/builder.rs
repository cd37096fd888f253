//! Builder for creating test SAM/BAM records, headers and files.
//!
//! ```rust
//! use ampclip_lib::sam::builder::RecordBuilder;
//!
//! let record = RecordBuilder::mapped_read()
//!     .name("read1")
//!     .cigar("10S40M")
//!     .alignment_start(101)
//!     .build();
//! assert_eq!(record.sequence().len(), 50);
//! ```

use anyhow::Result;
use bstr::BString;
use noodles::core::Position;
use noodles::sam::Header;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::MappingQuality;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::{QualityScores, RecordBuf, Sequence};
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::ReferenceSequence;
use std::num::NonZeroUsize;
use std::path::Path;

use crate::cigar::{parse_cigar, query_length};

/// Base quality assigned when none is given.
pub const DEFAULT_BASE_QUALITY: u8 = 30;

/// Builds a header with the given `(name, length)` reference sequences, in order.
///
/// # Panics
///
/// Panics if a reference length is zero.
#[must_use]
pub fn create_header(references: &[(&str, usize)]) -> Header {
    references
        .iter()
        .fold(Header::builder(), |builder, (name, len)| {
            let map = Map::<ReferenceSequence>::new(
                NonZeroUsize::new(*len).expect("reference length must be non-zero"),
            );
            builder.add_reference_sequence(BString::from(*name), map)
        })
        .build()
}

/// Writes `records` to a BAM file at `path` with `header`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_bam(path: &Path, header: &Header, records: &[RecordBuf]) -> Result<()> {
    let mut writer = noodles::bam::io::Writer::new(std::fs::File::create(path)?);
    writer.write_header(header)?;
    for record in records {
        writer.write_alignment_record(header, record)?;
    }
    writer.finish(header)?;
    Ok(())
}

/// Fluent builder for a single `RecordBuf`.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    name: Option<Vec<u8>>,
    flags: Flags,
    reference_sequence_id: Option<usize>,
    alignment_start: Option<usize>,
    mapping_quality: Option<u8>,
    cigar: Option<String>,
    sequence: Vec<u8>,
    tags: Vec<(Tag, Value)>,
    mate_reference_sequence_id: Option<usize>,
    mate_alignment_start: Option<usize>,
    template_length: Option<i32>,
}

impl RecordBuilder {
    /// Creates an empty builder (unplaced, no CIGAR).
    #[must_use]
    pub fn new() -> Self {
        Self { mapping_quality: Some(60), ..Self::default() }
    }

    /// Creates a builder for a read mapped to reference sequence 0.
    #[must_use]
    pub fn mapped_read() -> Self {
        Self { reference_sequence_id: Some(0), ..Self::new() }
    }

    /// Sets the read name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.as_bytes().to_vec());
        self
    }

    /// Sets the sequence. Without an explicit CIGAR, `{len}M` is used.
    #[must_use]
    pub fn sequence(mut self, seq: &str) -> Self {
        self.sequence = seq.as_bytes().to_vec();
        self
    }

    /// Sets all flags at once.
    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Marks the read as R1 (`true`) or R2 (`false`) of a pair.
    #[must_use]
    pub fn first_segment(mut self, is_first: bool) -> Self {
        self.flags.set(Flags::SEGMENTED, true);
        self.flags.set(Flags::FIRST_SEGMENT, is_first);
        self.flags.set(Flags::LAST_SEGMENT, !is_first);
        self
    }

    /// Sets the reverse complement flag.
    #[must_use]
    pub fn reverse_complement(mut self, reverse: bool) -> Self {
        self.flags.set(Flags::REVERSE_COMPLEMENTED, reverse);
        self
    }

    /// Sets the mate reverse complement flag.
    #[must_use]
    pub fn mate_reverse_complement(mut self, reverse: bool) -> Self {
        self.flags.set(Flags::MATE_REVERSE_COMPLEMENTED, reverse);
        self
    }

    /// Sets the unmapped flag.
    #[must_use]
    pub fn unmapped(mut self, unmapped: bool) -> Self {
        self.flags.set(Flags::UNMAPPED, unmapped);
        self
    }

    /// Sets the secondary alignment flag.
    #[must_use]
    pub fn secondary(mut self, secondary: bool) -> Self {
        self.flags.set(Flags::SECONDARY, secondary);
        self
    }

    /// Sets the supplementary alignment flag.
    #[must_use]
    pub fn supplementary(mut self, supplementary: bool) -> Self {
        self.flags.set(Flags::SUPPLEMENTARY, supplementary);
        self
    }

    /// Sets the reference sequence ID (0-based).
    #[must_use]
    pub fn reference_sequence_id(mut self, id: usize) -> Self {
        self.reference_sequence_id = Some(id);
        self
    }

    /// Sets the alignment start position (1-based).
    #[must_use]
    pub fn alignment_start(mut self, pos: usize) -> Self {
        self.alignment_start = Some(pos);
        self
    }

    /// Sets the mapping quality.
    #[must_use]
    pub fn mapping_quality(mut self, mapq: u8) -> Self {
        self.mapping_quality = Some(mapq);
        self
    }

    /// Sets the CIGAR string. Without an explicit sequence, one of matching length is generated.
    #[must_use]
    pub fn cigar(mut self, cigar: &str) -> Self {
        self.cigar = Some(cigar.to_string());
        self
    }

    /// Sets the mate reference sequence ID and 1-based alignment start.
    #[must_use]
    pub fn mate(mut self, reference_sequence_id: usize, alignment_start: usize) -> Self {
        self.mate_reference_sequence_id = Some(reference_sequence_id);
        self.mate_alignment_start = Some(alignment_start);
        self
    }

    /// Sets the template length (insert size).
    #[must_use]
    pub fn template_length(mut self, tlen: i32) -> Self {
        self.template_length = Some(tlen);
        self
    }

    /// Adds a SAM tag; tags that are not two characters long are ignored.
    #[must_use]
    pub fn tag<V: Into<Value>>(mut self, tag: &str, value: V) -> Self {
        if let [a, b] = tag.as_bytes() {
            self.tags.push((Tag::from([*a, *b]), value.into()));
        }
        self
    }

    /// Builds the `RecordBuf`.
    ///
    /// # Panics
    ///
    /// Panics on an invalid CIGAR string, a zero position or an invalid mapping quality.
    #[must_use]
    pub fn build(self) -> RecordBuf {
        let mut record = RecordBuf::default();

        if let Some(name) = self.name {
            *record.name_mut() = Some(name.into());
        }
        *record.flags_mut() = self.flags;
        *record.reference_sequence_id_mut() = self.reference_sequence_id;
        *record.alignment_start_mut() = self
            .alignment_start
            .map(|pos| Position::try_from(pos).expect("alignment_start must be >= 1"));
        *record.mate_reference_sequence_id_mut() = self.mate_reference_sequence_id;
        *record.mate_alignment_start_mut() = self
            .mate_alignment_start
            .map(|pos| Position::try_from(pos).expect("mate_alignment_start must be >= 1"));
        if let Some(tlen) = self.template_length {
            *record.template_length_mut() = tlen;
        }
        *record.mapping_quality_mut() = self
            .mapping_quality
            .map(|mapq| MappingQuality::try_from(mapq).expect("mapping_quality must be valid"));

        let (ops, sequence) = match (self.cigar, self.sequence.is_empty()) {
            (Some(cigar), true) => {
                let ops = parse_cigar(&cigar).expect("valid CIGAR");
                let sequence = b"ACGT".iter().copied().cycle().take(query_length(&ops)).collect();
                (ops, sequence)
            }
            (Some(cigar), false) => (parse_cigar(&cigar).expect("valid CIGAR"), self.sequence),
            (None, false) if self.reference_sequence_id.is_some() => {
                let cigar = format!("{}M", self.sequence.len());
                (parse_cigar(&cigar).expect("valid CIGAR"), self.sequence)
            }
            (None, _) => (Vec::new(), self.sequence),
        };

        *record.cigar_mut() = ops.into_iter().collect();
        let qualities = vec![DEFAULT_BASE_QUALITY; sequence.len()];
        *record.sequence_mut() = Sequence::from(sequence);
        *record.quality_scores_mut() = QualityScores::from(qualities);

        for (tag, value) in self.tags {
            record.data_mut().insert(tag, value);
        }

        record
    }
}
