use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::entry::{segments, Entry, SortBy, SortDirection, SortSpec};
use crate::error::{IndexError, Result};

/// Segment name pinned first within its group for collections that mark one
/// logical bucket as always-surfaced.
pub const PINNED_SEGMENT: &str = "untracked";

/// A position in the nested hierarchy.
///
/// Children are held in render order; the path of any reachable node is the
/// concatenation of segments from the root to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Last path component ("" for the root).
    pub segment: String,
    /// Attached entry. Synthesized intermediate directories get a placeholder
    /// directory entry stamped with the build time.
    pub entry: Option<Entry>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// An empty root, as produced by building a zero-entry snapshot.
    pub fn root() -> Self {
        Self {
            segment: String::new(),
            entry: None,
            children: Vec::new(),
        }
    }

    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            entry: None,
            children: Vec::new(),
        }
    }

    /// Whether this node is a directory (by entry, or implied by children).
    pub fn is_directory(&self) -> bool {
        self.entry
            .as_ref()
            .map(|e| e.is_directory)
            .unwrap_or_else(|| !self.children.is_empty())
    }

    /// Normalized key of this node, if an entry is attached.
    pub fn key(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.key.as_str())
    }

    /// Immediate child by segment.
    pub fn child(&self, segment: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.segment == segment)
    }

    /// Walk a normalized key's segments down from this node.
    pub fn find(&self, key: &str) -> Option<&TreeNode> {
        let mut node = self;
        for seg in segments(key) {
            node = node.child(seg)?;
        }
        Some(node)
    }

    /// Collect the keys of every node reachable below this one.
    pub fn collect_keys(&self) -> HashSet<String> {
        let mut keys = HashSet::new();
        self.collect_keys_into(&mut keys);
        keys
    }

    fn collect_keys_into(&self, keys: &mut HashSet<String>) {
        if let Some(entry) = &self.entry {
            keys.insert(entry.key.clone());
        }
        for child in &self.children {
            child.collect_keys_into(keys);
        }
    }

    fn insert(&mut self, entry: &Entry) {
        let segs = segments(&entry.key);
        Self::insert_at(self, &segs, entry);
    }

    fn insert_at(node: &mut TreeNode, segs: &[&str], entry: &Entry) {
        let seg = segs[0];
        let idx = match node.children.iter().position(|c| c.segment == seg) {
            Some(i) => i,
            None => {
                node.children.push(TreeNode::new(seg));
                node.children.len() - 1
            }
        };
        let child = &mut node.children[idx];
        if segs.len() == 1 {
            child.entry = Some(entry.clone());
        } else {
            Self::insert_at(child, &segs[1..], entry);
        }
    }

    /// Backfill synthesized intermediate nodes with placeholder directory
    /// entries. A node without an entry only exists because deeper paths pass
    /// through it, so it is always a directory.
    fn fill_placeholders(&mut self, prefix: &str, now: i64) {
        for child in &mut self.children {
            let path = format!("{}{}", prefix, child.segment);
            if child.entry.is_none() {
                child.entry = Some(Entry::directory(format!("{}/", path), now, None));
            }
            child.fill_placeholders(&format!("{}/", path), now);
        }
    }

    /// Sort children at every level: directory group before file group, then
    /// the selected field within each group. Stable, so ties keep input order.
    fn sort_recursive(&mut self, sort: SortSpec, pin_untracked: bool) {
        self.children
            .sort_by(|a, b| compare_children(a, b, sort, pin_untracked));
        for child in &mut self.children {
            child.sort_recursive(sort, pin_untracked);
        }
    }

    fn sort_size(&self) -> u64 {
        self.entry.as_ref().map(|e| e.size).unwrap_or(0)
    }

    fn sort_modified(&self) -> i64 {
        self.entry.as_ref().map(|e| e.modified_at).unwrap_or(0)
    }
}

fn compare_children(a: &TreeNode, b: &TreeNode, sort: SortSpec, pin_untracked: bool) -> Ordering {
    // Directory group always precedes the file group, regardless of field
    // or direction.
    let dir_cmp = b.is_directory().cmp(&a.is_directory());
    if dir_cmp != Ordering::Equal {
        return dir_cmp;
    }
    if pin_untracked {
        let a_pinned = a.segment == PINNED_SEGMENT;
        let b_pinned = b.segment == PINNED_SEGMENT;
        if a_pinned != b_pinned {
            return if a_pinned {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
    }
    let field = match sort.by {
        SortBy::Name => a
            .segment
            .to_lowercase()
            .cmp(&b.segment.to_lowercase()),
        SortBy::Size => a.sort_size().cmp(&b.sort_size()),
        SortBy::Modified => a.sort_modified().cmp(&b.sort_modified()),
    };
    match sort.direction {
        SortDirection::Asc => field,
        SortDirection::Desc => field.reverse(),
    }
}

/// Converts a flat entry list into a nested tree.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build a tree from a flat entry list.
    ///
    /// Entries are normalized on ingest; a malformed key or a file/directory
    /// collision at one path rejects the entire snapshot so callers can keep
    /// the previous tree. A non-empty `search` retains case-insensitive
    /// substring matches on the full key, widened to every ancestor of a
    /// match and everything under a matched directory.
    pub fn build(
        entries: &[Entry],
        search: &str,
        sort: SortSpec,
        pin_untracked: bool,
    ) -> Result<TreeNode> {
        let normalized = normalize_all(entries)?;
        validate(&normalized)?;
        let retained = apply_search(&normalized, search);

        let mut root = TreeNode::root();
        for entry in &retained {
            root.insert(entry);
        }
        root.fill_placeholders("", epoch_now());
        root.sort_recursive(sort, pin_untracked);
        Ok(root)
    }
}

/// Order-insensitive digest of a snapshot plus the active search filter.
/// Used to skip rebuilds when nothing changed.
pub fn content_hash(entries: &[Entry], search: &str) -> u64 {
    let mut combined: u64 = 0;
    for entry in entries {
        let mut hasher = DefaultHasher::new();
        entry.key.hash(&mut hasher);
        entry.is_directory.hash(&mut hasher);
        entry.is_favorite.hash(&mut hasher);
        entry.size.hash(&mut hasher);
        entry.modified_at.hash(&mut hasher);
        entry.source_collection.hash(&mut hasher);
        combined = combined.wrapping_add(hasher.finish());
    }
    let mut hasher = DefaultHasher::new();
    search.to_lowercase().hash(&mut hasher);
    combined ^ hasher.finish()
}

fn normalize_all(entries: &[Entry]) -> Result<Vec<Entry>> {
    entries.iter().map(Entry::normalized).collect()
}

/// Reject snapshots where one path is used as both a file and a directory,
/// including directories only implied by deeper keys.
fn validate(entries: &[Entry]) -> Result<()> {
    let mut kinds: HashMap<String, bool> = HashMap::new();
    for entry in entries {
        let path = entry.key.trim_end_matches('/').to_string();
        if let Some(prev) = kinds.insert(path.clone(), entry.is_directory) {
            if prev != entry.is_directory {
                return Err(IndexError::TypeConflict(path));
            }
        }
        let segs = segments(&entry.key);
        for i in 1..segs.len() {
            let ancestor = segs[..i].join("/");
            match kinds.get(&ancestor) {
                Some(false) => return Err(IndexError::TypeConflict(ancestor)),
                Some(true) => {}
                None => {
                    kinds.insert(ancestor, true);
                }
            }
        }
    }
    Ok(())
}

fn apply_search(entries: &[Entry], search: &str) -> Vec<Entry> {
    if search.is_empty() {
        return entries.to_vec();
    }
    let query = search.to_lowercase();
    let matched: Vec<&str> = entries
        .iter()
        .filter(|e| e.key.to_lowercase().contains(&query))
        .map(|e| e.key.as_str())
        .collect();
    let matched_dirs: Vec<&str> = matched
        .iter()
        .copied()
        .filter(|k| k.ends_with('/'))
        .collect();

    entries
        .iter()
        .filter(|e| {
            matched.contains(&e.key.as_str())
                || (e.is_directory && matched.iter().any(|m| m.starts_with(e.key.as_str())))
                || matched_dirs
                    .iter()
                    .any(|d| e.key.starts_with(d) && e.key != *d)
        })
        .cloned()
        .collect()
}

pub(crate) fn epoch_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
