use regex::{Regex, RegexBuilder};

use crate::cache::types::{EntryDescriptor, TableOfContents};
use crate::search::config::REGEX_SIZE_LIMIT;

/// How a query is matched against entry names
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Pattern(Regex),
    /// Lowercased needle, used when the query is not a valid regex
    Substring(String),
}

impl NameMatcher {
    pub fn new(query: &str) -> Self {
        match RegexBuilder::new(query)
            .case_insensitive(true)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
        {
            Ok(pattern) => Self::Pattern(pattern),
            Err(e) => {
                tracing::debug!("Query '{}' is not a regex ({}), matching as substring", query, e);
                Self::Substring(query.to_lowercase())
            }
        }
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Self::Pattern(pattern) => pattern.is_match(name),
            Self::Substring(needle) => name.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Search entry names in natural table of contents order
///
/// Categories and entries are visited in stored order, not sorted, and the
/// scan stops as soon as `max_results` matches have been collected.
pub fn search(toc: &TableOfContents, query: &str, max_results: usize) -> Vec<String> {
    let matcher = NameMatcher::new(query);

    toc.iter()
        .flat_map(|(category, entries)| {
            entries
                .iter()
                .map(move |(name, entry)| (category, name, entry))
        })
        .filter(|(_, name, _)| matcher.is_match(name))
        .take(max_results)
        .map(|(category, name, entry)| format_result(category.as_str(), name, entry))
        .collect()
}

fn format_result(category: &str, name: &str, entry: &EntryDescriptor) -> String {
    let counts: Vec<String> = [
        (entry.func.len(), "methods"),
        (entry.prop.len(), "props"),
        (entry.consts.len(), "consts"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, label)| format!("{count} {label}"))
    .collect();

    if counts.is_empty() {
        format!("[{category}] {name}")
    } else {
        format!("[{category}] {name} ({})", counts.join(", "))
    }
}
