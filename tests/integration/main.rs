//! Integration tests for ampclip.
//!
//! These tests run the compiled `ampclip` binary end to end on small generated inputs.

mod helpers;
mod test_clip_primers_command;
mod test_error_paths;
