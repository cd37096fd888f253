//! Custom error types for ampclip operations.

use thiserror::Error;

/// Result type alias for ampclip operations
pub type Result<T> = std::result::Result<T, AmpclipError>;

/// Error type for ampclip operations
#[derive(Error, Debug)]
pub enum AmpclipError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "BAM", "primer manifest")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A primer footprint that is empty or inverted
    #[error("Invalid {side} interval [{start}, {end}) for primer pair '{primer_pair}'")]
    InvalidPrimerInterval {
        /// The primer pair identifier
        primer_pair: String,
        /// Which primer of the pair ("sense" or "antisense")
        side: &'static str,
        /// Interval start (0-based, inclusive)
        start: i64,
        /// Interval end (0-based, exclusive)
        end: i64,
    },

    /// A manifest row that cannot be turned into a primer pair
    #[error("Malformed manifest row {row} for primer pair '{primer_pair}': {reason}")]
    MalformedManifestRow {
        /// 1-based data row number (header excluded)
        row: usize,
        /// The primer pair identifier
        primer_pair: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A CIGAR string that cannot be parsed
    #[error("Invalid CIGAR '{cigar}': {reason}")]
    InvalidCigar {
        /// The offending CIGAR string
        cigar: String,
        /// Explanation of the problem
        reason: String,
    },

    /// CIGAR operations disagree with the read's sequence length
    #[error(
        "Alignment for read '{read_name}' is inconsistent: CIGAR {cigar} consumes {cigar_length} \
         query bases but the read has {read_length}"
    )]
    InconsistentAlignment {
        /// The read name
        read_name: String,
        /// The CIGAR string of the read
        cigar: String,
        /// Query bases consumed by the CIGAR
        cigar_length: usize,
        /// Length of the stored sequence
        read_length: usize,
    },

    /// Two primary alignments share the same identity key
    #[error("Duplicate primary alignment for read '{read_name}' ({segment})")]
    DuplicateRead {
        /// The read name
        read_name: String,
        /// Description of the segment and strand
        segment: String,
    },

    /// A primary read seen in the second pass had no transformation from the first
    #[error("No transformation was built for read '{read_name}'; was the input modified?")]
    MissingTransformation {
        /// The read name
        read_name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter() {
        let error = AmpclipError::InvalidParameter {
            parameter: "threads".to_string(),
            reason: "must be >= 1".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Invalid parameter 'threads'"));
        assert!(msg.contains("must be >= 1"));
    }

    #[test]
    fn test_invalid_file_format() {
        let error = AmpclipError::InvalidFileFormat {
            file_type: "primer manifest".to_string(),
            path: "/path/to/manifest.txt".to_string(),
            reason: "File does not exist".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Invalid primer manifest file"));
        assert!(msg.contains("File does not exist"));
    }

    #[test]
    fn test_invalid_primer_interval() {
        let error = AmpclipError::InvalidPrimerInterval {
            primer_pair: "amp1".to_string(),
            side: "sense",
            start: 10,
            end: 10,
        };
        assert_eq!(error.to_string(), "Invalid sense interval [10, 10) for primer pair 'amp1'");
    }

    #[test]
    fn test_inconsistent_alignment() {
        let error = AmpclipError::InconsistentAlignment {
            read_name: "q1".to_string(),
            cigar: "10M".to_string(),
            cigar_length: 10,
            read_length: 12,
        };
        let msg = error.to_string();
        assert!(msg.contains("'q1'"));
        assert!(msg.contains("consumes 10 query bases but the read has 12"));
    }

    #[test]
    fn test_missing_transformation() {
        let error = AmpclipError::MissingTransformation { read_name: "q9".to_string() };
        assert!(error.to_string().contains("'q9'"));
    }
}
