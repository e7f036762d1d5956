//! # Search Module
//!
//! Name search over the cached table of contents.
//!
//! Queries are case-insensitive regular expressions. A query that does not
//! compile is matched as a plain substring instead, so malformed patterns
//! never produce an error.
//!
//! ## Key Components
//!
//! - [`query`] - Matching and result formatting
//! - [`tools`] - MCP tool implementation for search
//! - [`config`] - Result limits

pub mod config;
pub mod query;
pub mod tools;

pub use query::{NameMatcher, search};
pub use tools::SearchTools;
