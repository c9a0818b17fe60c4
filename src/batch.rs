use std::fmt;

use tokio::sync::mpsc;
use tracing::debug;

/// One path destined for a mutation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTarget {
    /// Normalized key; directory keys carry a trailing slash.
    pub key: String,
    pub is_directory: bool,
}

/// Remote operation kinds the external executor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Move,
    Delete,
    Favorite,
    Unfavorite,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Move => "move",
            Operation::Delete => "delete",
            Operation::Favorite => "favorite",
            Operation::Unfavorite => "unfavorite",
        };
        f.write_str(name)
    }
}

/// A deduplicated batch handed to the executor in a single call.
#[derive(Debug, Clone)]
pub struct MutationRequest {
    pub batch_id: u64,
    pub operation: Operation,
    pub targets: Vec<PathTarget>,
    /// Destination key for move operations.
    pub new_key: Option<String>,
}

/// Completion of a dispatched batch. A non-null `error` is a failure; any
/// other result is success.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub batch_id: u64,
    pub operation: Operation,
    pub keys: Vec<String>,
    pub error: Option<String>,
}

/// Channel half the executor reports completions on.
pub type CompletionSender = mpsc::UnboundedSender<MutationOutcome>;

/// External mutation-execution collaborator. Implementations serialize the
/// request into whatever transport backs them and report the result on the
/// completion channel; the core never retries.
pub trait MutationExecutor {
    fn execute(&self, request: MutationRequest, completions: CompletionSender);
}

/// Hand a computed batch to the executor. Single attempt; the result arrives
/// asynchronously on `completions`.
pub fn dispatch(
    request: MutationRequest,
    executor: &dyn MutationExecutor,
    completions: &CompletionSender,
) {
    debug!(
        batch_id = request.batch_id,
        operation = %request.operation,
        targets = request.targets.len(),
        "dispatching mutation batch"
    );
    executor.execute(request, completions.clone());
}

/// Reduce a selected set to the minimal non-redundant deletion batch.
///
/// A key strictly under any selected directory is excluded: the directory
/// delete already covers it. Deleting the returned set produces the same end
/// state as deleting every originally-selected path, with no failing calls
/// on already-removed descendants.
pub fn compute_deletion_set(selected: &[PathTarget]) -> Vec<PathTarget> {
    let dir_keys: Vec<&str> = selected
        .iter()
        .filter(|t| t.is_directory)
        .map(|t| t.key.as_str())
        .collect();

    selected
        .iter()
        .filter(|t| {
            !dir_keys
                .iter()
                .any(|d| t.key.as_str() != *d && t.key.starts_with(d))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(key: &str, is_directory: bool) -> PathTarget {
        PathTarget {
            key: key.to_string(),
            is_directory,
        }
    }

    #[test]
    fn descendants_of_selected_directory_are_excluded() {
        let selected = [
            target("a/", true),
            target("a/b.txt", false),
            target("e.txt", false),
        ];
        let batch = compute_deletion_set(&selected);
        assert_eq!(batch, vec![target("a/", true), target("e.txt", false)]);
    }

    #[test]
    fn nested_selected_directory_is_excluded() {
        let selected = [target("a/", true), target("a/c/", true)];
        let batch = compute_deletion_set(&selected);
        assert_eq!(batch, vec![target("a/", true)]);
    }

    #[test]
    fn unrelated_directories_are_both_kept() {
        let selected = [target("a/", true), target("b/", true)];
        let batch = compute_deletion_set(&selected);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn sibling_with_directory_name_prefix_is_kept() {
        // "ab.txt" shares a string prefix with "a" but is not under "a/".
        let selected = [target("a/", true), target("ab.txt", false)];
        let batch = compute_deletion_set(&selected);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn single_file_passes_through_unchanged() {
        let selected = [target("input/data.csv", false)];
        let batch = compute_deletion_set(&selected);
        assert_eq!(batch, selected.to_vec());
    }

    #[test]
    fn empty_selection_yields_empty_batch() {
        assert!(compute_deletion_set(&[]).is_empty());
    }

    #[test]
    fn selected_files_alone_never_exclude_each_other() {
        let selected = [target("a/b.txt", false), target("a/b.txt.bak", false)];
        let batch = compute_deletion_set(&selected);
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn dispatch_forwards_request_once() {
        struct Recorder;
        impl MutationExecutor for Recorder {
            fn execute(&self, request: MutationRequest, completions: CompletionSender) {
                let _ = completions.send(MutationOutcome {
                    batch_id: request.batch_id,
                    operation: request.operation,
                    keys: request.targets.into_iter().map(|t| t.key).collect(),
                    error: None,
                });
            }
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = MutationRequest {
            batch_id: 7,
            operation: Operation::Delete,
            targets: vec![target("a/", true)],
            new_key: None,
        };
        dispatch(request, &Recorder, &tx);
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.batch_id, 7);
        assert_eq!(outcome.keys, vec!["a/".to_string()]);
        assert!(outcome.error.is_none());
    }
}
