//! # Index Module
//!
//! Token-budget-aware textual views of the API table of contents.
//!
//! The summary points at per-module, enum, struct and delegate listings so a
//! client can drill down instead of reading the whole API at once. The legacy
//! flat index renders everything in a single document.
//!
//! ## Key Components
//!
//! - [`generator`] - Pure formatting functions over a table of contents
//! - [`resources`] - Resource URIs and their parsing
//! - [`tools`] - MCP tool and resource implementations for the views

pub mod generator;
pub mod resources;
pub mod tools;

pub use resources::ApiResource;
pub use tools::IndexTools;
