//! Exit codes for the qaagent CLI (spec §6): three codes, no finer-grained
//! reason taxonomy than `qaagent_common::error::ErrorKind` already carries.

/// Ran to completion.
pub const EXIT_SUCCESS: i32 = 0;

/// An unexpected, non-user-facing error occurred; see
/// [`qaagent_common::error::ErrorKind::exit_code`] for the classification
/// that produces this vs. [`EXIT_USAGE_ERROR`].
pub const EXIT_UNEXPECTED_ERROR: i32 = 1;

/// Bad arguments, a missing run, or a malformed config file.
pub const EXIT_USAGE_ERROR: i32 = 2;
