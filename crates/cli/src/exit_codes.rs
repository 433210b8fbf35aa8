//! CLI Exit Code Registry
//!
//! Single source of truth for all `insight` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args)                          |
//! | 3    | Invalid report config                               |
//! | 4    | Input data error (unparseable date, type mismatch)  |
//! | 5    | IO error (missing CSV, unwritable output)           |

use insight_recon::InsightError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// An input dataset could not be converted to its typed schema.
pub const EXIT_DATA: u8 = 4;

/// File could not be read or written.
pub const EXIT_IO: u8 = 5;

/// Map an engine error to its exit code.
pub fn insight_exit_code(err: &InsightError) -> u8 {
    match err {
        InsightError::ConfigParse(_) | InsightError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        InsightError::Io(_) => EXIT_IO,
        e if e.is_data_error() => EXIT_DATA,
        _ => EXIT_ERROR,
    }
}
