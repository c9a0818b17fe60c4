//! Hierarchical file-index core for snapshot-driven file browsers.
//!
//! An external data source pushes flat entry lists (plus entries from linked
//! collections); the core rebuilds a nested tree, reconciles per-key
//! selection state against the new key set, and batches selected paths into
//! minimal mutation requests for an external executor. Rendering, transport,
//! and persistence stay outside.

pub mod batch;
pub mod config;
pub mod entry;
pub mod error;
pub mod event;
pub mod index;
pub mod selection;
pub mod tree;

pub use batch::{
    compute_deletion_set, dispatch, CompletionSender, MutationExecutor, MutationOutcome,
    MutationRequest, Operation, PathTarget,
};
pub use config::IndexConfig;
pub use entry::{Entry, SortBy, SortDirection, SortSpec};
pub use error::{IndexError, Result};
pub use event::{Event, EventHandler};
pub use index::{FileIndex, LinkedCollection, LogSink, NotificationSink};
pub use selection::{MultiSelect, SelectionFlags, SelectionTracker};
pub use tree::{content_hash, TreeBuilder, TreeNode};
