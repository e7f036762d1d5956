//! # Cache Module
//!
//! This module provides the tiered documentation cache for the Unreal Python API.
//!
//! The table of contents, the legacy flat index and per-class documents each
//! live in memory, on disk and (for class documents) in a running editor. A
//! lookup walks those tiers in order and back-fills the faster ones.
//!
//! ## Key Components
//!
//! - [`service`] - [`CacheManager`], which owns every tier and the invalidation policy
//! - [`storage`] - File layout and JSON file IO under the cache directory
//! - [`tiers`] - The [`tiers::Tier`] trait and the tiered lookup combinator
//! - [`types`] - Table of contents, class documents and overview types
//! - [`tools`] - MCP tool implementations for cache operations
//! - [`utils`] - Atomic writes and tolerant parsing
//! - [`outputs`] - Output types for cache operations

pub mod constants;
pub mod outputs;
pub mod service;
pub mod storage;
pub mod tiers;
pub mod tools;
pub mod types;
pub mod utils;

pub use service::CacheManager;
