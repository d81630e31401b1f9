//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                      |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | CLI usage error (bad args, missing file)         |
//! | 3    | Invalid mapping config                           |
//! | 4    | Runtime error (file read, parse, write)          |
//! | 5    | Schema error (required column missing)           |
//! | 6    | Unmapped rows present (only with --strict)       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Mapping config failed to parse or validate.
pub const EXIT_MAP_INVALID_CONFIG: u8 = 3;

/// Runtime failure: input file unreadable, output unwritable.
pub const EXIT_MAP_RUNTIME: u8 = 4;

/// Required column missing from catalog or sales input.
pub const EXIT_MAP_SCHEMA: u8 = 5;

/// At least one sales row resolved to UNMAPPED under --strict.
pub const EXIT_MAP_UNMAPPED: u8 = 6;
