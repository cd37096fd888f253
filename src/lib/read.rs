//! A lightweight view over one alignment record plus the keys used to pair it with its mate.

use std::fmt;

use bstr::{BStr, BString, ByteSlice};
use noodles::sam::Header;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::cigar::Alignment;

/// Which read of a template a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Not part of a paired template
    Unpaired,
    /// First read (R1)
    First,
    /// Last read (R2)
    Last,
}

impl Segment {
    fn from_flags(flags: Flags) -> Self {
        if !flags.is_segmented() {
            Segment::Unpaired
        } else if flags.is_first_segment() {
            Segment::First
        } else {
            Segment::Last
        }
    }

    /// The segment of the mate; `None` for unpaired reads.
    #[must_use]
    pub fn mate(self) -> Option<Segment> {
        match self {
            Segment::Unpaired => None,
            Segment::First => Some(Segment::Last),
            Segment::Last => Some(Segment::First),
        }
    }
}

/// Strand a read is aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    /// Forward strand
    Positive,
    /// Reverse strand
    Negative,
}

impl Strand {
    fn from_reverse(reverse: bool) -> Self {
        if reverse { Strand::Negative } else { Strand::Positive }
    }
}

/// Identity of a read within a file: name, segment and strand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadKey {
    /// Query name
    pub name: BString,
    /// Segment within the template
    pub segment: Segment,
    /// Strand of the alignment
    pub strand: Strand,
}

impl fmt::Display for ReadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {:?}", self.name, self.segment, self.strand)
    }
}

/// Read-only view of a record together with the header it was read with.
#[derive(Debug, Clone, Copy)]
pub struct Read<'a> {
    record: &'a RecordBuf,
    header: &'a Header,
}

impl<'a> Read<'a> {
    /// Wraps `record`, resolving reference names through `header`.
    #[must_use]
    pub fn new(record: &'a RecordBuf, header: &'a Header) -> Self {
        Self { record, header }
    }

    /// The underlying record.
    #[must_use]
    pub fn record(&self) -> &'a RecordBuf {
        self.record
    }

    /// Query name, or an empty name if the record has none.
    #[must_use]
    pub fn name(&self) -> &'a BStr {
        self.record.name().unwrap_or_else(|| b"".as_bstr())
    }

    /// Flags of the record.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.record.flags()
    }

    /// Segment within the template.
    #[must_use]
    pub fn segment(&self) -> Segment {
        Segment::from_flags(self.flags())
    }

    /// Strand of this alignment.
    #[must_use]
    pub fn strand(&self) -> Strand {
        Strand::from_reverse(self.flags().is_reverse_complemented())
    }

    /// True for records that are neither secondary nor supplementary.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        let flags = self.flags();
        !flags.is_secondary() && !flags.is_supplementary()
    }

    /// True if the read is mapped with a reference and a position.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        !self.flags().is_unmapped()
            && self.record.reference_sequence_id().is_some()
            && self.record.alignment_start().is_some()
    }

    /// Identity key of this read.
    #[must_use]
    pub fn key(&self) -> ReadKey {
        ReadKey { name: self.name().to_owned(), segment: self.segment(), strand: self.strand() }
    }

    /// Identity key of the mate, for paired reads.
    #[must_use]
    pub fn mate_key(&self) -> Option<ReadKey> {
        let segment = self.segment().mate()?;
        let strand = Strand::from_reverse(self.flags().is_mate_reverse_complemented());
        Some(ReadKey { name: self.name().to_owned(), segment, strand })
    }

    /// Name of the reference sequence the read is placed on.
    #[must_use]
    pub fn chromosome(&self) -> Option<&'a BStr> {
        if !self.is_placed() {
            return None;
        }
        let id = self.record.reference_sequence_id()?;
        self.header.reference_sequences().get_index(id).map(|(name, _)| name.as_bstr())
    }

    /// 0-based alignment start of a placed read.
    #[must_use]
    pub fn alignment_start(&self) -> Option<usize> {
        if !self.is_placed() {
            return None;
        }
        self.record.alignment_start().map(|pos| usize::from(pos) - 1)
    }

    /// Raw CIGAR operations.
    #[must_use]
    pub fn ops(&self) -> &'a [Op] {
        self.record.cigar().as_ref()
    }

    /// Reported read length (the stored sequence; 0 when the sequence is omitted).
    #[must_use]
    pub fn read_length(&self) -> usize {
        self.record.sequence().len()
    }

    /// The alignment of a placed read.
    #[must_use]
    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment_start().map(|start| Alignment::new(start, self.ops().to_vec()))
    }
}
