//! Resource URIs served by the index
//!
//! Resources are idempotent reads keyed by a path-like URI under
//! `unreal-python://`.

use std::fmt;

pub const URI_SCHEME: &str = "unreal-python://";

/// Every readable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResource {
    Summary,
    Module(String),
    Enums,
    Structs,
    Delegates,
    /// Legacy single-document index
    FlatIndex,
    Class(String),
}

impl ApiResource {
    /// Parse a resource URI; `None` for anything unrecognised
    pub fn parse(uri: &str) -> Option<Self> {
        let path = uri.strip_prefix(URI_SCHEME)?;
        match path {
            "index/summary" => Some(Self::Summary),
            "index/enums" => Some(Self::Enums),
            "index/structs" => Some(Self::Structs),
            "index/delegates" => Some(Self::Delegates),
            "llms-index" => Some(Self::FlatIndex),
            _ => {
                if let Some(name) = path.strip_prefix("index/module/") {
                    non_empty(name).map(Self::Module)
                } else if let Some(name) = path.strip_prefix("class/") {
                    non_empty(name).map(Self::Class)
                } else {
                    None
                }
            }
        }
    }

    pub fn uri(&self) -> String {
        match self {
            Self::Summary => format!("{URI_SCHEME}index/summary"),
            Self::Module(name) => format!("{URI_SCHEME}index/module/{name}"),
            Self::Enums => format!("{URI_SCHEME}index/enums"),
            Self::Structs => format!("{URI_SCHEME}index/structs"),
            Self::Delegates => format!("{URI_SCHEME}index/delegates"),
            Self::FlatIndex => format!("{URI_SCHEME}llms-index"),
            Self::Class(name) => format!("{URI_SCHEME}class/{name}"),
        }
    }

    /// Resources with a fixed URI, in the order they are advertised
    pub fn listed() -> [(Self, &'static str, &'static str); 5] {
        [
            (
                Self::Summary,
                "API Summary",
                "Category counts and top modules (start here)",
            ),
            (Self::Enums, "Enums Index", "All enums with value counts"),
            (
                Self::Structs,
                "Structs Index",
                "All structs with property and method counts",
            ),
            (Self::Delegates, "Delegates Index", "All delegates"),
            (
                Self::FlatIndex,
                "Full API Index (legacy)",
                "Every class, enum, struct, delegate and function in one document",
            ),
        ]
    }

    /// URI templates for parameterised resources
    pub fn templates() -> [(String, &'static str, &'static str); 2] {
        [
            (
                format!("{URI_SCHEME}index/module/{{name}}"),
                "Module Index",
                "Classes of one module with method and property counts",
            ),
            (
                format!("{URI_SCHEME}class/{{name}}"),
                "Class Documentation",
                "Full documentation of one class, fetched from the editor on first use",
            ),
        ]
    }
}

impl fmt::Display for ApiResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

fn non_empty(name: &str) -> Option<String> {
    (!name.is_empty() && !name.contains('/')).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_uris() {
        assert_eq!(
            ApiResource::parse("unreal-python://index/summary"),
            Some(ApiResource::Summary)
        );
        assert_eq!(
            ApiResource::parse("unreal-python://index/module/Engine"),
            Some(ApiResource::Module("Engine".to_string()))
        );
        assert_eq!(
            ApiResource::parse("unreal-python://class/Actor"),
            Some(ApiResource::Class("Actor".to_string()))
        );
        assert_eq!(
            ApiResource::parse("unreal-python://llms-index"),
            Some(ApiResource::FlatIndex)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(ApiResource::parse("unreal-python://index/module/"), None);
        assert_eq!(ApiResource::parse("unreal-python://class/a/b"), None);
        assert_eq!(ApiResource::parse("file:///etc/passwd"), None);
        assert_eq!(ApiResource::parse("unreal-python://index/widgets"), None);
    }

    #[test]
    fn test_listed_uris_parse_back() {
        for (resource, _, _) in ApiResource::listed() {
            assert_eq!(ApiResource::parse(&resource.uri()), Some(resource));
        }
    }
}
