use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors surfaced by the index core.
#[derive(Debug, Error)]
pub enum IndexError {
    /// An entry key that is empty or reduces to nothing after normalization.
    #[error("malformed entry key: {0:?}")]
    MalformedKey(String),

    /// A file and a directory share the same path in one snapshot.
    #[error("path type conflict: {0:?} is used as both file and directory")]
    TypeConflict(String),

    /// I/O errors from snapshot or config loading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Snapshot JSON could not be parsed.
    #[error("snapshot parse error: {0}")]
    SnapshotParse(#[from] serde_json::Error),

    /// The event channel closed while a receiver was still waiting.
    #[error("event channel closed")]
    ChannelClosed,
}
