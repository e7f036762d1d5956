//! Output types for cache operations
//!
//! These types are used as the return values from cache tool methods.
//! They are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

use crate::cache::types::MemberDetail;

/// Explanatory error payload for lookups that found nothing
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ErrorOutput {
    pub error: String,
}

impl ErrorOutput {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from get_members_info
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MembersInfoOutput {
    pub class_name: String,
    /// Details in request order; members that could not be fetched are left out
    pub members: Vec<MemberDetail>,
    pub requested: usize,
}

impl MembersInfoOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from refresh_api_cache
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "status")]
pub enum RefreshOutput {
    #[serde(rename = "success")]
    Success { message: String, toc_entries: usize },
    #[serde(rename = "error")]
    Error { error: String },
}

impl RefreshOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutput::Success { .. })
    }
}

/// Serialize a found value as pretty JSON
pub fn pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
}
