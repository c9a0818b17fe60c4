use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use file_index::{
    compute_deletion_set, Entry, FileIndex, IndexConfig, PathTarget, Result, SortBy, SortDirection,
    TreeNode,
};

/// Inspect a file-index snapshot: build the tree, apply search/sort, and
/// optionally compute a minimal deletion plan for selected keys.
#[derive(Parser, Debug)]
#[command(name = "fidx", version, about)]
struct Cli {
    /// JSON snapshot file: an array of entries.
    snapshot: PathBuf,

    /// Case-insensitive search filter.
    #[arg(long)]
    search: Option<String>,

    /// Sort field: name, size, modified (overrides config).
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending.
    #[arg(long)]
    desc: bool,

    /// Mark a key as selected (repeatable).
    #[arg(long = "select")]
    selected: Vec<String>,

    /// Print the minimal deletion set for the selected keys.
    #[arg(long)]
    delete_plan: bool,

    /// Config file path.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = IndexConfig::load(cli.config.as_deref())?;

    let mut sort = config.sort_spec();
    if let Some(field) = &cli.sort {
        sort.by = SortBy::from_config(field);
    }
    if cli.desc {
        sort.direction = SortDirection::Desc;
    }

    let raw = std::fs::read_to_string(&cli.snapshot)?;
    let entries: Vec<Entry> = serde_json::from_str(&raw)?;

    let mut index = FileIndex::new(sort, config.pin_untracked(), config.verbose_notifications());
    index.refresh(&entries, &[])?;
    if let Some(search) = &cli.search {
        index.set_search(search)?;
    }
    for key in &cli.selected {
        if !index.set_selected(key, true) {
            warn!(key = %key, "cannot select: key not present in tree");
        }
    }

    print_children(index.tree(), 0, &index);

    if cli.delete_plan {
        let mut selected = index.selection().selected_keys();
        selected.sort();
        let targets: Vec<PathTarget> = selected
            .into_iter()
            .map(|key| PathTarget {
                is_directory: key.ends_with('/'),
                key,
            })
            .collect();
        println!("\ndeletion plan:");
        for target in compute_deletion_set(&targets) {
            println!("  delete {}", target.key);
        }
    }
    Ok(())
}

fn print_children(node: &TreeNode, depth: usize, index: &FileIndex) {
    for child in &node.children {
        let marker = child
            .key()
            .and_then(|key| index.selection().flags(key))
            .map(|flags| if flags.is_selected { "* " } else { "  " })
            .unwrap_or("  ");
        let suffix = if child.is_directory() { "/" } else { "" };
        println!("{}{marker}{}{suffix}", "  ".repeat(depth), child.segment);
        print_children(child, depth + 1, index);
    }
}
