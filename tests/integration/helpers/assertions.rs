//! Assertion helpers for records written by ampclip.

#![allow(dead_code)]

use ampclip_lib::cigar::format_cigar;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;

/// Asserts the 1-based alignment start and CIGAR of a record.
///
/// # Panics
///
/// Panics if either differs.
pub fn assert_alignment(record: &RecordBuf, start: usize, cigar: &str) {
    assert_eq!(
        record.alignment_start().map(usize::from),
        Some(start),
        "alignment start mismatch for record {:?}",
        record.name()
    );
    assert_eq!(
        format_cigar(record.cigar().as_ref()),
        cigar,
        "CIGAR mismatch for record {:?}",
        record.name()
    );
}

/// Returns a string tag, or `None` if it is missing or not a string.
pub fn string_tag(record: &RecordBuf, tag: [u8; 2]) -> Option<String> {
    match record.data().get(&Tag::from(tag)) {
        Some(Value::String(s)) => Some(s.to_string()),
        _ => None,
    }
}

/// Asserts that a string tag has the expected value.
///
/// # Panics
///
/// Panics if the tag is missing or differs.
pub fn assert_string_tag(record: &RecordBuf, tag: [u8; 2], expected: &str) {
    assert_eq!(
        string_tag(record, tag).as_deref(),
        Some(expected),
        "{} tag mismatch for record {:?}",
        String::from_utf8_lossy(&tag),
        record.name()
    );
}

/// Asserts that the query length of a record's CIGAR equals its sequence length.
///
/// # Panics
///
/// Panics if they differ.
pub fn assert_consistent_length(record: &RecordBuf) {
    assert_eq!(
        ampclip_lib::cigar::query_length(record.cigar().as_ref()),
        record.sequence().len(),
        "CIGAR/sequence length mismatch for record {:?}",
        record.name()
    );
}
