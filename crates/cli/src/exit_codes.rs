//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad args, nothing to do)            |
//! | 3    | Data file could not be parsed                    |
//! | 4    | Invalid product entry or position                |
//! | 5    | Edit script could not be read or applied         |
//! | 6    | File I/O error (images, output, settings)        |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Spreadsheet/CSV content is malformed or unreadable.
pub const EXIT_DATA_PARSE: u8 = 3;

/// Unknown product, position out of range, or a refused manual entry.
pub const EXIT_VALIDATION: u8 = 4;

/// Edit script is malformed or a step could not be applied.
pub const EXIT_SCRIPT: u8 = 5;

/// Reading images or writing output failed.
pub const EXIT_IO: u8 = 6;
