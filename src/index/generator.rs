//! Textual views over a [`TableOfContents`]
//!
//! Every function here is pure: the same table of contents (and date, where a
//! header carries one) always renders the same text. Entries are listed in
//! lexicographic order; only the module ranking keeps first-seen order for
//! ties.

use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::cache::types::{Category, CategoryEntries, EntryDescriptor, TableOfContents};

/// Module name to the sorted set of classes it contains, in first-seen order
pub type ModuleIndex = IndexMap<String, BTreeSet<String>>;

/// Number of modules listed in the summary
pub const SUMMARY_MODULE_LIMIT: usize = 30;

/// Number of module names suggested for an unknown module
pub const MODULE_SUGGESTION_LIMIT: usize = 10;

/// Returned by index views when no table of contents is cached
pub const UNINITIALIZED: &str = "Cache not initialized. Use refresh_api_cache tool first.";

const INIT_INSTRUCTIONS: &str = "> Status: Cache not initialized
> Action: Run `refresh_api_cache` tool with Unreal Editor running

## How to Initialize

1. Start Unreal Editor with a project
2. Enable Python Remote Execution in Editor Preferences > Plugins > Python
3. Use the `refresh_api_cache` tool to fetch and cache the API documentation
";

/// Summary shown before the cache has been populated
pub fn placeholder_summary() -> String {
    format!("# Unreal Python API Summary\n{INIT_INSTRUCTIONS}")
}

/// Flat index shown before the cache has been populated
pub fn placeholder_flat_index() -> String {
    format!(
        "# Unreal Python API\n{INIT_INSTRUCTIONS}
## Available Tools

- `refresh_api_cache`: Fetch API documentation from Unreal Editor
- `search_unreal_api`: Search the API index
- `get_class_overview`: Get class overview (member name lists, 1-3KB)
- `get_member_info`: Get detailed info for a specific member
- `get_members_info`: Get detailed info for multiple members (batch)
- `exec_unreal_python`: Execute Python code in Unreal Editor
- `list_unreal_instances`: List available Unreal Editor instances
"
    )
}

/// Group `Class` and `Native` entries by module
pub fn module_map(toc: &TableOfContents) -> ModuleIndex {
    let mut modules = ModuleIndex::new();

    for category in [Category::Class, Category::Native] {
        let Some(entries) = toc.entries(category) else {
            continue;
        };
        for (name, entry) in entries {
            modules
                .entry(entry.module_or_default().to_string())
                .or_default()
                .insert(name.clone());
        }
    }

    modules
}

/// Modules by descending class count; ties keep first-seen order
pub fn ranked_modules(modules: &ModuleIndex) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = modules
        .iter()
        .map(|(module, classes)| (module.as_str(), classes.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn sorted_entries(entries: Option<&CategoryEntries>) -> Vec<(&String, &EntryDescriptor)> {
    let mut sorted: Vec<_> = entries.into_iter().flatten().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
}

/// Lightweight overview: category counts, top modules, pointers
pub fn summary(toc: &TableOfContents, generated_on: NaiveDate) -> String {
    let mut lines = vec![
        "# Unreal Python API Summary".to_string(),
        format!("> Generated: {}", generated_on.format("%Y-%m-%d")),
        String::new(),
        "## Categories".to_string(),
        String::new(),
    ];

    for category in [
        Category::Class,
        Category::Struct,
        Category::Enum,
        Category::Delegate,
        Category::Function,
        Category::Native,
    ] {
        let count = toc.entry_count(category);
        if count > 0 {
            lines.push(format!("- {category}: {count} entries"));
        }
    }

    lines.push(String::new());
    lines.push("## Class Modules".to_string());
    lines.push(String::new());
    lines.push("Classes are organized by module. Use `unreal-python://index/module/{name}` to get classes for a specific module.".to_string());
    lines.push(String::new());

    let modules = module_map(toc);
    let ranked = ranked_modules(&modules);
    for (module, count) in ranked.iter().take(SUMMARY_MODULE_LIMIT) {
        lines.push(format!("- **{module}**: {count} classes"));
    }
    if ranked.len() > SUMMARY_MODULE_LIMIT {
        lines.push(format!(
            "- ... and {} more modules",
            ranked.len() - SUMMARY_MODULE_LIMIT
        ));
    }

    lines.extend(
        [
            "",
            "## Other Resources",
            "",
            "- `unreal-python://index/enums` - All enums",
            "- `unreal-python://index/structs` - All structs",
            "- `unreal-python://index/delegates` - All delegates",
            "",
            "## Tools",
            "",
            "- `search_unreal_api(query)` - Search by name",
            "- `get_class_overview(name)` - Get class overview (member name lists)",
            "- `get_member_info(class, member)` - Get detailed member documentation",
            "- `get_members_info(class, members)` - Batch get member documentation",
        ]
        .map(String::from),
    );

    lines.join("\n")
}

/// Classes of one module with method and property counts
pub fn module_detail(toc: &TableOfContents, module_name: &str) -> String {
    let modules = module_map(toc);
    let Some(classes) = modules.get(module_name) else {
        let mut available: Vec<&str> = modules.keys().map(String::as_str).collect();
        available.sort_unstable();
        available.truncate(MODULE_SUGGESTION_LIMIT);
        return format!(
            "Module '{module_name}' not found. Available modules include: {}...",
            available.join(", ")
        );
    };

    let mut lines = vec![
        format!("# {module_name} Module Classes"),
        format!("> {} classes", classes.len()),
        String::new(),
    ];

    for class_name in classes {
        // Native shadows Class when both define the same name
        let entry = toc
            .get(Category::Native, class_name)
            .or_else(|| toc.get(Category::Class, class_name));
        let (methods, properties) = entry.map_or((0, 0), |e| (e.func.len(), e.prop.len()));
        lines.push(format!(
            "- [{class_name}](/class/{class_name}): {methods} methods, {properties} properties"
        ));
    }

    lines.join("\n")
}

pub fn enum_index(toc: &TableOfContents) -> String {
    let enums = sorted_entries(toc.entries(Category::Enum));
    let mut lines = vec![
        "# Unreal Python Enums".to_string(),
        format!("> {} enums", enums.len()),
        String::new(),
    ];
    lines.extend(
        enums
            .into_iter()
            .map(|(name, entry)| format!("- {name}: {} values", entry.consts.len())),
    );
    lines.join("\n")
}

pub fn struct_index(toc: &TableOfContents) -> String {
    let structs = sorted_entries(toc.entries(Category::Struct));
    let mut lines = vec![
        "# Unreal Python Structs".to_string(),
        format!("> {} structs", structs.len()),
        String::new(),
    ];
    lines.extend(structs.into_iter().map(|(name, entry)| {
        let properties = entry.prop.len();
        match entry.func.len() {
            0 => format!("- {name}: {properties} properties"),
            methods => format!("- {name}: {properties} properties, {methods} methods"),
        }
    }));
    lines.join("\n")
}

pub fn delegate_index(toc: &TableOfContents) -> String {
    let delegates = sorted_entries(toc.entries(Category::Delegate));
    let mut lines = vec![
        "# Unreal Python Delegates".to_string(),
        format!("> {} delegates", delegates.len()),
        String::new(),
    ];
    lines.extend(delegates.into_iter().map(|(name, _)| format!("- {name}")));
    lines.join("\n")
}

/// Every module with its class count, largest first
pub fn module_listing(toc: &TableOfContents) -> String {
    let modules = module_map(toc);
    let mut lines = vec![
        format!("Available modules ({} total):", modules.len()),
        String::new(),
    ];
    lines.extend(
        ranked_modules(&modules)
            .into_iter()
            .map(|(module, count)| format!("  {module}: {count} classes")),
    );
    lines.join("\n")
}

/// The legacy single-document rendering of the whole table of contents
pub fn flat_index(toc: &TableOfContents, generated_on: NaiveDate) -> String {
    let mut lines = vec![
        "# Unreal Python API".to_string(),
        format!("> Generated: {}", generated_on.format("%Y-%m-%d")),
        String::new(),
    ];

    let sections: [(Category, &str, &str); 5] = [
        (Category::Class, "Classes", "class"),
        (Category::Enum, "Enums", "enum"),
        (Category::Struct, "Structs", "struct"),
        (Category::Delegate, "Delegates", "delegate"),
        (Category::Native, "Functions", "func"),
    ];

    for (category, heading, link) in sections {
        let entries = sorted_entries(toc.entries(category));
        if entries.is_empty() {
            continue;
        }

        lines.push(format!("## {heading}"));
        lines.push(String::new());
        for (name, entry) in entries {
            let counts = match category {
                Category::Class | Category::Struct => format!(
                    ": {} methods, {} properties",
                    entry.func.len(),
                    entry.prop.len()
                ),
                Category::Enum => format!(": {} values", entry.consts.len()),
                _ => String::new(),
            };
            lines.push(format!("- [{name}](/{link}/{name}){counts}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn entry(module: Option<&str>, func: &[&str], prop: &[&str]) -> EntryDescriptor {
        EntryDescriptor {
            module: module.map(String::from),
            func: func.iter().map(|s| s.to_string()).collect(),
            prop: prop.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample_toc() -> TableOfContents {
        let mut toc = TableOfContents::new();
        toc.insert(Category::Class, "StaticMeshActor", entry(Some("Engine"), &["a"], &[]));
        toc.insert(Category::Class, "Actor", entry(Some("Engine"), &["a", "b"], &["x"]));
        toc.insert(
            Category::Class,
            "EditorAssetLibrary",
            entry(Some("UnrealEd"), &["load"], &[]),
        );
        toc.insert(Category::Class, "Orphan", entry(None, &[], &[]));
        toc.insert(
            Category::Native,
            "Actor",
            entry(Some("Engine"), &["n1", "n2", "n3"], &["p1", "p2"]),
        );
        toc.insert(
            Category::Enum,
            "Color",
            EntryDescriptor {
                consts: vec!["RED".into(), "GREEN".into()],
                ..Default::default()
            },
        );
        toc.insert(Category::Enum, "Axis", EntryDescriptor::default());
        toc.insert(Category::Struct, "Vector", entry(None, &["length"], &["x", "y", "z"]));
        toc.insert(Category::Struct, "Rotator", entry(None, &[], &["pitch"]));
        toc.insert(Category::Delegate, "OnDone", EntryDescriptor::default());
        toc.insert(Category::Function, "log", EntryDescriptor::default());
        toc
    }

    #[test]
    fn test_module_map_groups_and_sorts() {
        let modules = module_map(&sample_toc());
        let keys: Vec<&str> = modules.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Engine", "UnrealEd", "Other"]);

        let engine: Vec<&str> = modules["Engine"].iter().map(String::as_str).collect();
        assert_eq!(engine, vec!["Actor", "StaticMeshActor"]);
    }

    #[test]
    fn test_ranked_modules_is_stable_on_ties() {
        let mut toc = TableOfContents::new();
        toc.insert(Category::Class, "A", entry(Some("Zed"), &[], &[]));
        toc.insert(Category::Class, "B", entry(Some("Alpha"), &[], &[]));
        toc.insert(Category::Class, "C", entry(Some("Big"), &[], &[]));
        toc.insert(Category::Class, "D", entry(Some("Big"), &[], &[]));

        let modules = module_map(&toc);
        let ranked = ranked_modules(&modules);
        assert_eq!(ranked, vec![("Big", 2), ("Zed", 1), ("Alpha", 1)]);
    }

    #[test]
    fn test_summary_counts_and_modules() {
        let summary = summary(&sample_toc(), date());
        assert!(summary.contains("> Generated: 2026-10-17"));
        assert!(summary.contains("- Class: 4 entries"));
        assert!(summary.contains("- Native: 1 entries"));
        assert!(summary.contains("- Function: 1 entries"));
        assert!(summary.contains("- **Engine**: 2 classes"));
        assert!(!summary.contains("more modules"));

        let class_pos = summary.find("- Class:").unwrap();
        let struct_pos = summary.find("- Struct:").unwrap();
        let enum_pos = summary.find("- Enum:").unwrap();
        assert!(class_pos < struct_pos && struct_pos < enum_pos);
    }

    #[test]
    fn test_summary_of_empty_toc() {
        let summary = summary(&TableOfContents::new(), date());
        assert!(!summary.contains("entries"));
        assert!(!summary.contains("- **"));
        assert!(summary.contains("## Categories"));
        assert!(summary.contains("## Class Modules"));
    }

    #[test]
    fn test_summary_truncates_modules() {
        let mut toc = TableOfContents::new();
        for i in 0..35 {
            toc.insert(
                Category::Class,
                format!("Class{i}"),
                entry(Some(&format!("Module{i:02}")), &[], &[]),
            );
        }
        let summary = summary(&toc, date());
        assert_eq!(summary.matches("- **Module").count(), SUMMARY_MODULE_LIMIT);
        assert!(summary.contains("- ... and 5 more modules"));
        // Ties keep first-seen order, so the last five are the ones dropped
        assert!(summary.contains("- **Module29**"));
        assert!(!summary.contains("- **Module30**"));
    }

    #[test]
    fn test_module_detail() {
        let detail = module_detail(&sample_toc(), "Engine");
        assert_eq!(
            detail,
            "# Engine Module Classes\n> 2 classes\n\n\
             - [Actor](/class/Actor): 3 methods, 2 properties\n\
             - [StaticMeshActor](/class/StaticMeshActor): 1 methods, 0 properties"
        );
    }

    #[test]
    fn test_module_detail_unknown_module() {
        let mut toc = TableOfContents::new();
        for i in 0..15 {
            toc.insert(
                Category::Class,
                format!("Class{i}"),
                entry(Some(&format!("M{i:02}")), &[], &[]),
            );
        }
        let detail = module_detail(&toc, "Missing");
        assert!(detail.starts_with("Module 'Missing' not found."));
        let listed = detail
            .split("include: ")
            .nth(1)
            .unwrap()
            .trim_end_matches("...");
        let names: Vec<&str> = listed.split(", ").collect();
        assert_eq!(names.len(), MODULE_SUGGESTION_LIMIT);
        assert_eq!(names.first(), Some(&"M00"));
        assert_eq!(names.last(), Some(&"M09"));
    }

    #[test]
    fn test_category_indexes() {
        let toc = sample_toc();
        assert_eq!(
            enum_index(&toc),
            "# Unreal Python Enums\n> 2 enums\n\n- Axis: 0 values\n- Color: 2 values"
        );
        assert_eq!(
            struct_index(&toc),
            "# Unreal Python Structs\n> 2 structs\n\n- Rotator: 1 properties\n- Vector: 3 properties, 1 methods"
        );
        assert_eq!(
            delegate_index(&toc),
            "# Unreal Python Delegates\n> 1 delegates\n\n- OnDone"
        );
        assert_eq!(
            delegate_index(&TableOfContents::new()),
            "# Unreal Python Delegates\n> 0 delegates\n"
        );
    }

    #[test]
    fn test_module_listing() {
        assert_eq!(
            module_listing(&sample_toc()),
            "Available modules (3 total):\n\n  Engine: 2 classes\n  UnrealEd: 1 classes\n  Other: 1 classes"
        );
    }

    #[test]
    fn test_flat_index() {
        let index = flat_index(&sample_toc(), date());
        let expected = "# Unreal Python API
> Generated: 2026-10-17

## Classes

- [Actor](/class/Actor): 2 methods, 1 properties
- [EditorAssetLibrary](/class/EditorAssetLibrary): 1 methods, 0 properties
- [Orphan](/class/Orphan): 0 methods, 0 properties
- [StaticMeshActor](/class/StaticMeshActor): 1 methods, 0 properties

## Enums

- [Axis](/enum/Axis): 0 values
- [Color](/enum/Color): 2 values

## Structs

- [Rotator](/struct/Rotator): 0 methods, 1 properties
- [Vector](/struct/Vector): 1 methods, 3 properties

## Delegates

- [OnDone](/delegate/OnDone)

## Functions

- [Actor](/func/Actor)
";
        assert_eq!(index, expected);
    }

    #[test]
    fn test_flat_index_omits_empty_categories() {
        let mut toc = TableOfContents::new();
        toc.insert(Category::Delegate, "OnDone", EntryDescriptor::default());
        toc.insert(Category::Class, "Empty", EntryDescriptor::default());

        let index = flat_index(&toc, date());
        assert!(index.contains("## Classes"));
        assert!(index.contains("## Delegates"));
        assert!(!index.contains("## Enums"));
        assert!(!index.contains("## Functions"));
    }

    #[test]
    fn test_placeholders() {
        assert!(placeholder_summary().contains("Cache not initialized"));
        let flat = placeholder_flat_index();
        assert!(flat.starts_with("# Unreal Python API\n> Status: Cache not initialized"));
        assert!(flat.contains("## Available Tools"));
    }
}
