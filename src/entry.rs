use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// One file or directory as reported by the external data source.
///
/// Entries are replaced wholesale on every refresh; the core never mutates
/// their content fields, only wraps them with derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Slash-separated path, unique within its collection.
    pub key: String,
    pub is_directory: bool,
    #[serde(default)]
    pub is_favorite: bool,
    /// Size in bytes; 0 for directories.
    #[serde(default)]
    pub size: u64,
    /// Seconds since epoch.
    #[serde(default)]
    pub modified_at: i64,
    /// Linked collection this entry was merged from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_collection: Option<String>,
}

impl Entry {
    /// Create a directory entry. Used for synthesized intermediate
    /// directories and linked-collection roots.
    pub fn directory(key: String, modified_at: i64, source_collection: Option<String>) -> Self {
        Self {
            key,
            is_directory: true,
            is_favorite: false,
            size: 0,
            modified_at,
            source_collection,
        }
    }

    /// Return a copy of this entry with its key normalized.
    pub fn normalized(&self) -> Result<Self> {
        let mut entry = self.clone();
        entry.key = normalize_key(&self.key, self.is_directory)?;
        Ok(entry)
    }
}

/// Normalize a path key on ingest.
///
/// Leading/duplicate slashes are dropped, directory keys always carry a
/// trailing slash, file keys never do. Keys that reduce to nothing are an
/// input-contract violation.
pub fn normalize_key(raw: &str, is_directory: bool) -> Result<String> {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(IndexError::MalformedKey(raw.to_string()));
    }
    let mut key = segments.join("/");
    if is_directory {
        key.push('/');
    }
    Ok(key)
}

/// Split a normalized key into its non-empty path segments.
pub fn segments(key: &str) -> Vec<&str> {
    key.split('/').filter(|s| !s.is_empty()).collect()
}

/// Sort field for tree children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Alphabetical (case-insensitive), default.
    Name,
    /// By file size.
    Size,
    /// By modification time.
    Modified,
}

impl SortBy {
    /// Parse a sort field from a config string. Unknown strings fall back
    /// to name sort.
    pub fn from_config(s: &str) -> Self {
        match s {
            "size" => SortBy::Size,
            "modified" => SortBy::Modified,
            _ => SortBy::Name,
        }
    }

    /// Display label for the current sort.
    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Name => "Name",
            SortBy::Size => "Size",
            SortBy::Modified => "Modified",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// A user-selected sort order: field plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub by: SortBy,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            by: SortBy::Name,
            direction: SortDirection::Asc,
        }
    }
}
