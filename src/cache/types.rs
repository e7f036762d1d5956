//! Type definitions for the API documentation cache
//!
//! The engine reports its scripting surface as loosely shaped JSON. These
//! types pin that shape down once, at the storage boundary, so the rest of
//! the crate never pokes at raw `serde_json::Value`s.

use anyhow::{Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Module assigned to entries that do not report one
pub const DEFAULT_MODULE: &str = "Other";

/// Validate that a class or member name is a plain identifier.
///
/// Names end up both in file paths (`classes/<name>.json`) and inside the
/// Python snippets sent to the editor, so anything beyond `[A-Za-z0-9_]` is
/// rejected.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Name cannot be empty");
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!(
            "Invalid name '{}': only ASCII letters, digits and underscores are allowed",
            name
        );
    }

    Ok(())
}

/// Top-level table-of-contents category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Class,
    Enum,
    Struct,
    Delegate,
    Native,
    Function,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Class,
        Category::Enum,
        Category::Struct,
        Category::Delegate,
        Category::Native,
        Category::Function,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Class => "Class",
            Category::Enum => "Enum",
            Category::Struct => "Struct",
            Category::Delegate => "Delegate",
            Category::Native => "Native",
            Category::Function => "Function",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown category: {s}"))
    }
}

/// Member name lists for a single table-of-contents entry.
///
/// A missing list means the entry has no members of that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub func: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cls_func: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prop: Vec<String>,
    #[serde(rename = "const", default, skip_serializing_if = "Vec::is_empty")]
    pub consts: Vec<String>,
}

impl EntryDescriptor {
    /// Module name, falling back to [`DEFAULT_MODULE`]
    pub fn module_or_default(&self) -> &str {
        self.module.as_deref().unwrap_or(DEFAULT_MODULE)
    }
}

/// Entries of one category, in the order the engine reported them
pub type CategoryEntries = IndexMap<String, EntryDescriptor>;

/// The per-category, per-name member listing of the whole scripting API.
///
/// Category and entry order are preserved exactly as loaded; the search
/// engine relies on that natural order while the index views sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TableOfContents {
    categories: IndexMap<Category, CategoryEntries>,
}

impl TableOfContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, creating the category on first use
    pub fn insert(&mut self, category: Category, name: impl Into<String>, entry: EntryDescriptor) {
        self.categories
            .entry(category)
            .or_default()
            .insert(name.into(), entry);
    }

    /// Entries of a category; `None` when the category is absent
    pub fn entries(&self, category: Category) -> Option<&CategoryEntries> {
        self.categories.get(&category)
    }

    pub fn entry_count(&self, category: Category) -> usize {
        self.entries(category).map_or(0, |entries| entries.len())
    }

    pub fn get(&self, category: Category, name: &str) -> Option<&EntryDescriptor> {
        self.entries(category)?.get(name)
    }

    /// Categories in natural order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryEntries)> {
        self.categories
            .iter()
            .map(|(category, entries)| (*category, entries))
    }

    /// Sum of per-category entry counts
    pub fn total_entries(&self) -> usize {
        self.categories.values().map(|entries| entries.len()).sum()
    }
}

impl<'de> Deserialize<'de> for TableOfContents {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut toc = TableOfContents::new();

        for (key, value) in raw {
            let Ok(category) = key.parse::<Category>() else {
                tracing::debug!("Skipping unknown table-of-contents category '{}'", key);
                continue;
            };

            let serde_json::Value::Object(entries) = value else {
                tracing::warn!("Skipping category '{}': expected a mapping", key);
                continue;
            };

            let slot = toc.categories.entry(category).or_default();
            for (name, descriptor) in entries {
                let descriptor = serde_json::from_value(descriptor).unwrap_or_else(|e| {
                    tracing::warn!("Malformed descriptor for {}/{}: {}", key, name, e);
                    EntryDescriptor::default()
                });
                slot.insert(name, descriptor);
            }
        }

        Ok(toc)
    }
}

/// Summary written next to every table-of-contents save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub version: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub toc_entries: usize,
}

impl CacheMetadata {
    pub fn for_toc(toc: &TableOfContents) -> Self {
        Self {
            version: super::constants::CACHE_FORMAT_VERSION.to_string(),
            created_at: chrono::Utc::now(),
            toc_entries: toc.total_entries(),
        }
    }
}

/// Documentation for one member of a [`ClassDocument`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDoc {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMembers {
    #[serde(default)]
    pub methods: Vec<MemberDoc>,
    #[serde(default)]
    pub properties: Vec<MemberDoc>,
    #[serde(default)]
    pub constants: Vec<MemberDoc>,
}

/// Full documentation of a class, fetched lazily and persisted per name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDocument {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub is_class: bool,
    #[serde(default)]
    pub members: ClassMembers,
}

/// Docstring and base classes, the lightweight remote class query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBasicInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub bases: Vec<String>,
}

/// Member name lists for a class, straight from the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOverview {
    pub name: String,
    pub category: Category,
    pub module: Option<String>,
    pub methods: Vec<String>,
    pub class_methods: Vec<String>,
    pub properties: Vec<String>,
    pub constants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bases: Option<Vec<String>>,
}

impl ClassOverview {
    pub fn from_entry(name: &str, category: Category, entry: &EntryDescriptor) -> Self {
        Self {
            name: name.to_string(),
            category,
            module: entry.module.clone(),
            methods: entry.func.clone(),
            class_methods: entry.cls_func.clone(),
            properties: entry.prop.clone(),
            constants: entry.consts.clone(),
            doc: None,
            bases: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
    Constant,
}

/// Live documentation for a single member, never cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetail {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MemberKind,
    #[serde(default)]
    pub doc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("Actor").is_ok());
        assert!(validate_identifier("K2_SetActorLocation").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("../etc/passwd").is_err());
        assert!(validate_identifier("Actor\"); import os").is_err());
    }

    #[test]
    fn test_category_parse() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("Widget".parse::<Category>().is_err());
    }

    #[test]
    fn test_toc_preserves_natural_order() {
        let json = r#"{
            "Struct": {"Vector": {"prop": ["x", "y", "z"]}},
            "Class": {"Zeta": {}, "Actor": {"func": ["a"]}, "Mid": {}}
        }"#;
        let toc: TableOfContents = serde_json::from_str(json).unwrap();

        let categories: Vec<Category> = toc.iter().map(|(c, _)| c).collect();
        assert_eq!(categories, vec![Category::Struct, Category::Class]);

        let names: Vec<&str> = toc
            .entries(Category::Class)
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["Zeta", "Actor", "Mid"]);
        assert_eq!(toc.total_entries(), 4);
    }

    #[test]
    fn test_toc_coerces_bad_categories() {
        let json = r#"{
            "Class": {"Actor": {"func": ["a"], "module": "Engine"}},
            "Enum": 42,
            "Widget": {"Button": {}},
            "Native": {"Broken": {"func": "not a list"}}
        }"#;
        let toc: TableOfContents = serde_json::from_str(json).unwrap();

        assert!(toc.entries(Category::Enum).is_none());
        assert_eq!(toc.entry_count(Category::Class), 1);
        assert_eq!(
            toc.get(Category::Native, "Broken"),
            Some(&EntryDescriptor::default())
        );
        assert_eq!(
            toc.get(Category::Class, "Actor").unwrap().module_or_default(),
            "Engine"
        );
    }

    #[test]
    fn test_toc_rejects_non_mapping_document() {
        assert!(serde_json::from_str::<TableOfContents>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<TableOfContents>("not json").is_err());
    }

    #[test]
    fn test_descriptor_defaults() {
        let entry: EntryDescriptor = serde_json::from_str("{}").unwrap();
        assert_eq!(entry.module_or_default(), DEFAULT_MODULE);
        assert!(entry.func.is_empty());

        let entry: EntryDescriptor =
            serde_json::from_str(r#"{"const": ["A", "B"], "cls_func": ["make"]}"#).unwrap();
        assert_eq!(entry.consts, vec!["A", "B"]);
        assert_eq!(entry.cls_func, vec!["make"]);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"cls_func": ["make"], "const": ["A", "B"]}));
    }

    #[test]
    fn test_member_detail_shape() {
        let detail: MemberDetail = serde_json::from_str(
            r#"{"name": "get_actor_location", "type": "method", "doc": "Gets location", "signature": "(self)"}"#,
        )
        .unwrap();
        assert_eq!(detail.kind, MemberKind::Method);
        assert_eq!(detail.signature.as_deref(), Some("(self)"));
        assert!(detail.value.is_none());
    }
}
