//! SAM/BAM record utilities.
//!
//! - [`builder`] - Fluent construction of test records, headers and BAM files

pub mod builder;
