//! # Remote Module
//!
//! Bridge to a running Unreal Editor instance.
//!
//! ## Key Components
//!
//! - [`executor`] - The [`RemoteExecutor`] contract and its error/output types
//! - [`command`] - Executor that delegates to an external helper process
//! - [`scripts`] - Python snippets used by the documentation fetches
//! - [`tools`] - MCP tool implementations for code execution and discovery

pub mod command;
pub mod executor;
pub mod scripts;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandExecutor, CommandLine};
pub use executor::{
    CommandResult, ExecutionOutput, OutputEntry, RemoteError, RemoteExecutor, RemoteInstance,
    extract_json_object,
};
