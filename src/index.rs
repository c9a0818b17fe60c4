use std::collections::HashMap;

use tracing::{debug, error, info};

use crate::batch::{
    compute_deletion_set, dispatch, CompletionSender, MutationExecutor, MutationOutcome,
    MutationRequest, Operation, PathTarget,
};
use crate::entry::{normalize_key, Entry, SortBy, SortDirection, SortSpec};
use crate::error::Result;
use crate::selection::{MultiSelect, SelectionFlags, SelectionTracker};
use crate::tree::{content_hash, epoch_now, TreeBuilder, TreeNode};

/// Entries merged in from a linked external collection. Keys are prefixed
/// with `<name>/` on refresh.
#[derive(Debug, Clone)]
pub struct LinkedCollection {
    pub name: String,
    pub entries: Vec<Entry>,
}

/// Receives human-readable success/failure strings. How they are displayed
/// is the host's concern.
pub trait NotificationSink {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink that reports through `tracing`.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}

/// Flags saved before a mutation so a failure can revert them.
struct PendingMutation {
    operation: Operation,
    /// Keys named in the dispatched batch, for notification messages.
    batch_keys: Vec<String>,
    prior: Vec<(String, SelectionFlags)>,
}

/// Reconciles flat entry snapshots into a nested tree with per-key selection
/// state and batches selected paths into minimal mutation requests.
///
/// All methods run on the host's single logical event loop; mutation
/// completions arrive as [`MutationOutcome`] values fed to [`apply_outcome`].
///
/// [`apply_outcome`]: FileIndex::apply_outcome
pub struct FileIndex {
    entries: Vec<Entry>,
    tree: TreeNode,
    tracker: SelectionTracker,
    sort: SortSpec,
    search: String,
    pin_untracked: bool,
    verbose_notifications: bool,
    content_hash: u64,
    pending: HashMap<u64, PendingMutation>,
    next_batch_id: u64,
}

impl FileIndex {
    pub fn new(sort: SortSpec, pin_untracked: bool, verbose_notifications: bool) -> Self {
        Self {
            entries: Vec::new(),
            tree: TreeNode::root(),
            tracker: SelectionTracker::new(),
            sort,
            search: String::new(),
            pin_untracked,
            verbose_notifications,
            content_hash: 0,
            pending: HashMap::new(),
            next_batch_id: 0,
        }
    }

    /// Apply a fresh snapshot from the data source, merging linked
    /// collections under their name prefix. Rebuild and reconciliation are
    /// applied atomically per snapshot; a snapshot whose content hash matches
    /// the current one is skipped (returns `Ok(false)`). A malformed snapshot
    /// is rejected wholesale and the previous tree is kept.
    pub fn refresh(&mut self, primary: &[Entry], linked: &[LinkedCollection]) -> Result<bool> {
        let mut merged = Vec::with_capacity(primary.len());
        for entry in primary {
            merged.push(entry.normalized()?);
        }
        let now = epoch_now();
        for collection in linked {
            let root_key = normalize_key(&collection.name, true)?;
            if collection.entries.is_empty() {
                // The collection still surfaces as an (empty) directory.
                merged.push(Entry::directory(
                    root_key.clone(),
                    now,
                    Some(collection.name.clone()),
                ));
            }
            for entry in &collection.entries {
                let mut entry = entry.normalized()?;
                entry.key = format!("{root_key}{}", entry.key);
                entry.source_collection = Some(collection.name.clone());
                merged.push(entry);
            }
        }

        let hash = content_hash(&merged, &self.search);
        if hash == self.content_hash {
            debug!("snapshot unchanged, skipping rebuild");
            return Ok(false);
        }

        let tree = TreeBuilder::build(&merged, &self.search, self.sort, self.pin_untracked)?;
        self.tracker.reconcile(&tree.collect_keys());
        self.tree = tree;
        self.entries = merged;
        self.content_hash = hash;
        Ok(true)
    }

    /// Change the search filter and rebuild from the held snapshot.
    pub fn set_search(&mut self, search: &str) -> Result<()> {
        if self.search == search {
            return Ok(());
        }
        self.search = search.to_string();
        self.rebuild()
    }

    /// Select a sort field. Re-selecting the active field flips direction;
    /// a new field starts ascending.
    pub fn set_sort(&mut self, by: SortBy) -> Result<()> {
        if self.sort.by == by {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = SortSpec {
                by,
                direction: SortDirection::Asc,
            };
        }
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<()> {
        let tree = TreeBuilder::build(&self.entries, &self.search, self.sort, self.pin_untracked)?;
        self.tracker.reconcile(&tree.collect_keys());
        self.content_hash = content_hash(&self.entries, &self.search);
        self.tree = tree;
        Ok(())
    }

    // ── read-only snapshots for the rendering layer ──────────────────────

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn multi_select(&self) -> MultiSelect {
        self.tracker.multi_select()
    }

    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }

    // ── selection entry points ───────────────────────────────────────────

    pub fn set_selected(&mut self, key: &str, is_selected: bool) -> bool {
        self.tracker.set_selected(key, is_selected)
    }

    pub fn toggle_expanded(&mut self, key: &str) {
        if let Some(flags) = self.tracker.flags(key) {
            self.tracker.set_expanded(key, !flags.is_expanded);
        }
    }

    pub fn toggle_select_all(&mut self) {
        self.tracker.toggle_select_all();
    }

    pub fn set_adding_folder(&mut self, key: &str, open: bool) {
        self.tracker.set_adding_folder(key, open);
    }

    // ── mutation state machine ───────────────────────────────────────────

    /// Batch every selected path into one minimal delete request. Covered
    /// descendants are deselected rather than dispatched; the directory
    /// delete already removes them. Returns the batch id, or `None` when
    /// nothing is selected.
    pub fn request_delete_selected(
        &mut self,
        executor: &dyn MutationExecutor,
        completions: &CompletionSender,
    ) -> Option<u64> {
        let mut selected = self.tracker.selected_keys();
        if selected.is_empty() {
            return None;
        }
        selected.sort();
        let targets: Vec<PathTarget> = selected
            .iter()
            .map(|key| PathTarget {
                key: key.clone(),
                is_directory: key.ends_with('/'),
            })
            .collect();
        let batch = compute_deletion_set(&targets);

        let batch_dirs: Vec<&str> = batch
            .iter()
            .filter(|t| t.is_directory)
            .map(|t| t.key.as_str())
            .collect();
        let mut prior = Vec::new();
        for key in &selected {
            let in_batch = batch.iter().any(|t| &t.key == key);
            let covered = batch_dirs
                .iter()
                .any(|d| key.as_str() != *d && key.starts_with(d));
            if !(in_batch || covered) {
                continue;
            }
            if let Some(flags) = self.tracker.flags(key) {
                prior.push((key.clone(), flags));
                self.tracker.set_selected(key, false);
                self.tracker.set_incomplete(key, true);
            }
        }

        let batch_id = self.next_batch_id();
        let batch_keys: Vec<String> = batch.iter().map(|t| t.key.clone()).collect();
        self.pending.insert(
            batch_id,
            PendingMutation {
                operation: Operation::Delete,
                batch_keys: batch_keys.clone(),
                prior,
            },
        );
        dispatch(
            MutationRequest {
                batch_id,
                operation: Operation::Delete,
                targets: batch,
                new_key: None,
            },
            executor,
            completions,
        );
        Some(batch_id)
    }

    /// Move one path to a new key. A stale source key is a silent no-op.
    pub fn request_move(
        &mut self,
        key: &str,
        new_key: &str,
        executor: &dyn MutationExecutor,
        completions: &CompletionSender,
    ) -> Result<Option<u64>> {
        let Some(flags) = self.tracker.flags(key) else {
            return Ok(None);
        };
        let is_directory = key.ends_with('/');
        let new_key = normalize_key(new_key, is_directory)?;

        self.tracker.set_incomplete(key, true);
        let batch_id = self.next_batch_id();
        self.pending.insert(
            batch_id,
            PendingMutation {
                operation: Operation::Move,
                batch_keys: vec![key.to_string()],
                prior: vec![(key.to_string(), flags)],
            },
        );
        dispatch(
            MutationRequest {
                batch_id,
                operation: Operation::Move,
                targets: vec![PathTarget {
                    key: key.to_string(),
                    is_directory,
                }],
                new_key: Some(new_key),
            },
            executor,
            completions,
        );
        Ok(Some(batch_id))
    }

    /// Create a folder under `parent_key` ("" for the root). The parent's
    /// inline-add affordance stays open until the outcome arrives.
    pub fn request_create_folder(
        &mut self,
        parent_key: &str,
        name: &str,
        executor: &dyn MutationExecutor,
        completions: &CompletionSender,
    ) -> Result<Option<u64>> {
        let mut prior = Vec::new();
        if !parent_key.is_empty() {
            let Some(flags) = self.tracker.flags(parent_key) else {
                return Ok(None);
            };
            prior.push((parent_key.to_string(), flags));
            self.tracker.set_adding_folder(parent_key, true);
        }
        let key = normalize_key(&format!("{parent_key}{name}"), true)?;

        let batch_id = self.next_batch_id();
        self.pending.insert(
            batch_id,
            PendingMutation {
                operation: Operation::Create,
                batch_keys: vec![key.clone()],
                prior,
            },
        );
        dispatch(
            MutationRequest {
                batch_id,
                operation: Operation::Create,
                targets: vec![PathTarget {
                    key,
                    is_directory: true,
                }],
                new_key: None,
            },
            executor,
            completions,
        );
        Ok(Some(batch_id))
    }

    /// Toggle the favorite state of one path. Stale keys are silent no-ops.
    pub fn request_set_favorite(
        &mut self,
        key: &str,
        is_favorite: bool,
        executor: &dyn MutationExecutor,
        completions: &CompletionSender,
    ) -> Option<u64> {
        let flags = self.tracker.flags(key)?;
        let operation = if is_favorite {
            Operation::Favorite
        } else {
            Operation::Unfavorite
        };
        self.tracker.set_incomplete(key, true);

        let batch_id = self.next_batch_id();
        self.pending.insert(
            batch_id,
            PendingMutation {
                operation,
                batch_keys: vec![key.to_string()],
                prior: vec![(key.to_string(), flags)],
            },
        );
        dispatch(
            MutationRequest {
                batch_id,
                operation,
                targets: vec![PathTarget {
                    key: key.to_string(),
                    is_directory: key.ends_with('/'),
                }],
                new_key: None,
            },
            executor,
            completions,
        );
        Some(batch_id)
    }

    /// Fold a mutation completion back into selection state.
    ///
    /// Success clears the pending flags (the entries themselves are replaced
    /// by the next refresh); failure reverts to the recorded flags and
    /// reports to the sink. Failures always reach the sink; successes only
    /// when verbose notifications are enabled. Outcomes for unknown batches,
    /// or for keys a newer refresh already dropped, are no-ops.
    pub fn apply_outcome(&mut self, outcome: &MutationOutcome, sink: &dyn NotificationSink) {
        let Some(pending) = self.pending.remove(&outcome.batch_id) else {
            debug!(batch_id = outcome.batch_id, "outcome for unknown batch");
            return;
        };
        let keys = pending.batch_keys.join(" ");
        match &outcome.error {
            None => {
                for (key, _) in &pending.prior {
                    match pending.operation {
                        Operation::Create => self.tracker.set_adding_folder(key, false),
                        _ => {
                            self.tracker.set_selected(key, false);
                            self.tracker.set_incomplete(key, false);
                        }
                    }
                }
                if self.verbose_notifications {
                    sink.info(&format!("{} complete: {keys}", pending.operation));
                }
            }
            Some(err) => {
                for (key, flags) in &pending.prior {
                    self.tracker.restore(key, *flags);
                }
                sink.error(&format!(
                    "ERROR: could not {} {keys}: {err}",
                    pending.operation
                ));
            }
        }
    }

    fn next_batch_id(&mut self) -> u64 {
        self.next_batch_id += 1;
        self.next_batch_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    fn file(key: &str, size: u64, modified_at: i64) -> Entry {
        Entry {
            key: key.to_string(),
            is_directory: false,
            is_favorite: false,
            size,
            modified_at,
            source_collection: None,
        }
    }

    fn dir(key: &str, modified_at: i64) -> Entry {
        Entry::directory(key.to_string(), modified_at, None)
    }

    /// Executor that immediately reports the configured result.
    struct ImmediateExecutor {
        error: Option<String>,
    }

    impl MutationExecutor for ImmediateExecutor {
        fn execute(&self, request: MutationRequest, completions: CompletionSender) {
            let _ = completions.send(MutationOutcome {
                batch_id: request.batch_id,
                operation: request.operation,
                keys: request.targets.into_iter().map(|t| t.key).collect(),
                error: self.error.clone(),
            });
        }
    }

    #[derive(Default)]
    struct TestSink {
        infos: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl NotificationSink for TestSink {
        fn info(&self, message: &str) {
            self.infos.lock().unwrap().push(message.to_string());
        }

        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn index_with(entries: &[Entry]) -> FileIndex {
        let mut index = FileIndex::new(SortSpec::default(), false, true);
        index.refresh(entries, &[]).unwrap();
        index
    }

    #[test]
    fn refresh_builds_tree_and_seeds_selection() {
        let index = index_with(&[dir("input/", 100), file("input/data.csv", 2048, 200)]);
        assert!(index.tree().find("input/data.csv").is_some());
        assert!(index.selection().contains("input/"));
        assert_eq!(index.multi_select(), MultiSelect::None);
    }

    #[test]
    fn refresh_with_identical_snapshot_is_skipped() {
        let entries = [file("a.txt", 1, 1)];
        let mut index = index_with(&entries);
        assert!(!index.refresh(&entries, &[]).unwrap());
        let touched = [file("a.txt", 1, 2)];
        assert!(index.refresh(&touched, &[]).unwrap());
    }

    #[test]
    fn refresh_preserves_selection_for_surviving_keys() {
        let mut index = index_with(&[file("keep.txt", 1, 1), file("gone.txt", 1, 1)]);
        index.set_selected("keep.txt", true);
        index.set_selected("gone.txt", true);
        index.refresh(&[file("keep.txt", 1, 1)], &[]).unwrap();
        assert!(index.selection().flags("keep.txt").unwrap().is_selected);
        assert!(index.selection().flags("gone.txt").is_none());
        assert_eq!(index.multi_select(), MultiSelect::All);
    }

    #[test]
    fn malformed_snapshot_keeps_previous_tree() {
        let mut index = index_with(&[file("ok.txt", 1, 1)]);
        let err = index.refresh(&[file("", 1, 1)], &[]).unwrap_err();
        assert!(matches!(err, crate::error::IndexError::MalformedKey(_)));
        assert!(index.tree().find("ok.txt").is_some());
        assert!(index.selection().contains("ok.txt"));
    }

    #[test]
    fn linked_collections_are_merged_under_prefix() {
        let mut index = FileIndex::new(SortSpec::default(), false, true);
        let linked = [
            LinkedCollection {
                name: "climate-data".into(),
                entries: vec![file("raw/temps.csv", 9, 9)],
            },
            LinkedCollection {
                name: "empty-set".into(),
                entries: vec![],
            },
        ];
        index.refresh(&[file("notes.md", 1, 1)], &linked).unwrap();

        let merged = index.tree().find("climate-data/raw/temps.csv").unwrap();
        assert_eq!(
            merged.entry.as_ref().unwrap().source_collection.as_deref(),
            Some("climate-data")
        );
        // An empty linked collection still surfaces as a directory.
        let empty_root = index.tree().find("empty-set/").unwrap();
        assert!(empty_root.entry.as_ref().unwrap().is_directory);
    }

    #[test]
    fn set_sort_toggles_direction_on_same_field() {
        let mut index = index_with(&[file("a.txt", 1, 1), file("b.txt", 2, 2)]);
        index.set_sort(SortBy::Size).unwrap();
        assert_eq!(index.sort().by, SortBy::Size);
        assert_eq!(index.sort().direction, SortDirection::Asc);
        index.set_sort(SortBy::Size).unwrap();
        assert_eq!(index.sort().direction, SortDirection::Desc);
        index.set_sort(SortBy::Name).unwrap();
        assert_eq!(index.sort().direction, SortDirection::Asc);
    }

    #[test]
    fn search_narrows_then_restores() {
        let mut index = index_with(&[file("src/a.py", 1, 1), file("docs/readme.md", 1, 1)]);
        index.set_search("a.py").unwrap();
        assert!(index.tree().find("docs/readme.md").is_none());
        assert!(!index.selection().contains("docs/readme.md"));
        index.set_search("").unwrap();
        assert!(index.tree().find("docs/readme.md").is_some());
    }

    #[test]
    fn toggle_expanded_flips_flag() {
        let mut index = index_with(&[dir("a/", 1)]);
        index.toggle_expanded("a/");
        assert!(index.selection().flags("a/").unwrap().is_expanded);
        index.toggle_expanded("a/");
        assert!(!index.selection().flags("a/").unwrap().is_expanded);
    }

    #[tokio::test]
    async fn delete_selected_file_end_to_end() {
        let mut index = index_with(&[dir("input/", 100), file("input/data.csv", 2048, 200)]);
        index.set_selected("input/data.csv", true);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor { error: None };
        let batch_id = index.request_delete_selected(&executor, &tx).unwrap();

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.batch_id, batch_id);
        // No ancestor selected, so the file passes through unchanged.
        assert_eq!(outcome.keys, vec!["input/data.csv".to_string()]);

        let sink = TestSink::default();
        index.apply_outcome(&outcome, &sink);
        assert_eq!(index.pending_mutations(), 0);
        assert!(!index.selection().flags("input/data.csv").unwrap().is_selected);
        assert!(sink.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_batch_excludes_covered_descendants() {
        let mut index = index_with(&[
            dir("a/", 1),
            file("a/b.txt", 1, 1),
            file("e.txt", 1, 1),
        ]);
        index.set_selected("a/", true);
        index.set_selected("a/b.txt", true);
        index.set_selected("e.txt", true);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor { error: None };
        index.request_delete_selected(&executor, &tx).unwrap();

        let outcome = rx.recv().await.unwrap();
        assert_eq!(
            outcome.keys,
            vec!["a/".to_string(), "e.txt".to_string()]
        );
        // The covered descendant is deselected, not dispatched.
        assert!(!index.selection().flags("a/b.txt").unwrap().is_selected);
        assert_eq!(index.multi_select(), MultiSelect::None);
    }

    #[tokio::test]
    async fn quiet_mode_suppresses_success_but_not_failure() {
        let mut index = FileIndex::new(SortSpec::default(), false, false);
        index
            .refresh(&[file("a.txt", 1, 1), file("b.txt", 1, 1)], &[])
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = TestSink::default();

        index.set_selected("a.txt", true);
        index
            .request_delete_selected(&ImmediateExecutor { error: None }, &tx)
            .unwrap();
        let outcome = rx.recv().await.unwrap();
        index.apply_outcome(&outcome, &sink);
        assert!(sink.infos.lock().unwrap().is_empty());

        let failing = ImmediateExecutor {
            error: Some("backend unavailable".into()),
        };
        index.set_selected("b.txt", true);
        index.request_delete_selected(&failing, &tx).unwrap();
        let outcome = rx.recv().await.unwrap();
        index.apply_outcome(&outcome, &sink);
        assert_eq!(sink.errors.lock().unwrap().len(), 1);
        assert!(sink.infos.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_reverts_flags_and_reports() {
        let mut index = index_with(&[file("a.txt", 1, 1)]);
        index.set_selected("a.txt", true);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor {
            error: Some("backend unavailable".into()),
        };
        index.request_delete_selected(&executor, &tx).unwrap();
        let outcome = rx.recv().await.unwrap();

        let sink = TestSink::default();
        index.apply_outcome(&outcome, &sink);
        let flags = index.selection().flags("a.txt").unwrap();
        assert!(flags.is_selected);
        assert!(!flags.is_incomplete);
        let errors = sink.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("could not delete a.txt"));
        assert!(errors[0].contains("backend unavailable"));
    }

    #[tokio::test]
    async fn move_sets_incomplete_until_outcome() {
        let mut index = index_with(&[file("old.txt", 1, 1)]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor { error: None };
        index
            .request_move("old.txt", "renamed.txt", &executor, &tx)
            .unwrap()
            .unwrap();
        assert!(index.selection().flags("old.txt").unwrap().is_incomplete);

        let outcome = rx.recv().await.unwrap();
        index.apply_outcome(&outcome, &LogSink);
        assert!(!index.selection().flags("old.txt").unwrap().is_incomplete);
    }

    #[tokio::test]
    async fn move_of_stale_key_is_silent_noop() {
        let mut index = index_with(&[file("a.txt", 1, 1)]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor { error: None };
        let result = index
            .request_move("gone.txt", "x.txt", &executor, &tx)
            .unwrap();
        assert!(result.is_none());
        assert_eq!(index.pending_mutations(), 0);
    }

    #[tokio::test]
    async fn create_folder_tracks_adding_affordance() {
        let mut index = index_with(&[dir("a/", 1)]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor { error: None };
        index
            .request_create_folder("a/", "fresh", &executor, &tx)
            .unwrap()
            .unwrap();
        assert!(index.selection().flags("a/").unwrap().is_adding_folder);

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.keys, vec!["a/fresh/".to_string()]);
        index.apply_outcome(&outcome, &LogSink);
        assert!(!index.selection().flags("a/").unwrap().is_adding_folder);
    }

    #[tokio::test]
    async fn favorite_request_uses_matching_operation() {
        let mut index = index_with(&[file("a.txt", 1, 1)]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor { error: None };
        index
            .request_set_favorite("a.txt", true, &executor, &tx)
            .unwrap();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.operation, Operation::Favorite);
        index.apply_outcome(&outcome, &LogSink);
        assert!(!index.selection().flags("a.txt").unwrap().is_incomplete);
    }

    #[tokio::test]
    async fn outcome_after_refresh_dropped_target_is_noop() {
        let mut index = index_with(&[file("doomed.txt", 1, 1)]);
        index.set_selected("doomed.txt", true);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ImmediateExecutor { error: None };
        index.request_delete_selected(&executor, &tx).unwrap();
        let outcome = rx.recv().await.unwrap();

        // A newer refresh removes the key before the completion lands.
        index.refresh(&[file("other.txt", 1, 1)], &[]).unwrap();
        let sink = TestSink::default();
        index.apply_outcome(&outcome, &sink);
        assert!(index.selection().flags("doomed.txt").is_none());
        assert_eq!(index.pending_mutations(), 0);
    }

    #[test]
    fn outcome_for_unknown_batch_is_noop() {
        let mut index = index_with(&[file("a.txt", 1, 1)]);
        let sink = TestSink::default();
        index.apply_outcome(
            &MutationOutcome {
                batch_id: 999,
                operation: Operation::Delete,
                keys: vec![],
                error: None,
            },
            &sink,
        );
        assert!(sink.infos.lock().unwrap().is_empty());
        assert!(sink.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn independent_batches_do_not_interfere() {
        let mut index = index_with(&[file("a.txt", 1, 1), file("b.txt", 1, 1)]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let ok = ImmediateExecutor { error: None };
        let failing = ImmediateExecutor {
            error: Some("conflict".into()),
        };
        index
            .request_set_favorite("a.txt", true, &ok, &tx)
            .unwrap();
        index
            .request_move("b.txt", "c.txt", &failing, &tx)
            .unwrap()
            .unwrap();
        assert_eq!(index.pending_mutations(), 2);

        let sink = TestSink::default();
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        index.apply_outcome(&first, &sink);
        index.apply_outcome(&second, &sink);

        // The failed move reverted b.txt only; a.txt completed normally.
        assert!(!index.selection().flags("a.txt").unwrap().is_incomplete);
        assert!(!index.selection().flags("b.txt").unwrap().is_incomplete);
        assert_eq!(sink.errors.lock().unwrap().len(), 1);
        assert_eq!(sink.infos.lock().unwrap().len(), 1);
    }
}
