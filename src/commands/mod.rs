//! CLI command implementations for ampclip.
//!
//! - [`clip_primers`] - Soft-clip primer sequence from amplicon reads

#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]

pub mod clip_primers;
pub mod command;
