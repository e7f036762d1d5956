//! Constants for cache file and directory names

/// Directory names
pub const CACHE_ROOT_DIR: &str = ".unreal-python-mcp";
pub const CACHE_DIR: &str = "cache";
pub const CLASSES_DIR: &str = "classes";

/// File names
pub const TOC_FILE: &str = "toc.json";
pub const METADATA_FILE: &str = "meta.json";
pub const FLAT_INDEX_FILE: &str = "llms.txt";

/// Version recorded in `meta.json`
pub const CACHE_FORMAT_VERSION: &str = "1.0";
