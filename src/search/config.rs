//! # Search Configuration Module
//!
//! Limits applied to table of contents searches.

/// Default number of search results
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Upper bound a caller may request
pub const MAX_RESULTS_LIMIT: usize = 500;

/// Compiled regex size cap, so hostile patterns fall back to substring search
pub const REGEX_SIZE_LIMIT: usize = 1 << 20;
