//! Input validation utilities with consistent, structured error messages.

use crate::errors::{AmpclipError, Result};
use std::path::Path;

/// Validate that a file exists
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use ampclip_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.bam", "Input BAM");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(AmpclipError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that the output path does not name one of the inputs.
///
/// The input BAM is read twice, so overwriting it mid-run would corrupt the second pass.
///
/// # Errors
/// Returns an error if `output` and `input` refer to the same path
pub fn validate_distinct_output<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(AmpclipError::InvalidParameter {
            parameter: "output".to_string(),
            reason: format!("output BAM must differ from input BAM '{}'", input.display()),
        });
    }
    Ok(())
}

/// Validate a BGZF worker thread count.
///
/// # Errors
/// Returns an error if `threads` is zero
pub fn validate_threads(threads: usize) -> Result<()> {
    if threads == 0 {
        return Err(AmpclipError::InvalidParameter {
            parameter: "threads".to_string(),
            reason: "must be >= 1".to_string(),
        });
    }
    Ok(())
}
