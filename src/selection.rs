use std::collections::{HashMap, HashSet};

/// Per-key UI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionFlags {
    pub is_selected: bool,
    /// Whether the node's children are shown.
    pub is_expanded: bool,
    /// True while an async operation on this node is pending. Advisory: the
    /// presentation layer is expected to disable edits while set.
    pub is_incomplete: bool,
    /// True while an inline "new folder" affordance is open at this node.
    pub is_adding_folder: bool,
}

/// Tri-state summary of all per-key selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiSelect {
    #[default]
    None,
    Partial,
    All,
}

/// Flat key-to-flags mapping with an aggregate tri-state indicator.
///
/// The mapping holds flags only for keys present in the latest tree;
/// `reconcile` drops stale keys and seeds new keys with all flags false.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    state: HashMap<String, SelectionFlags>,
    multi_select: MultiSelect,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile prior per-key state against a new key set: carry flags for
    /// surviving keys, drop removed keys, seed new keys unselected.
    pub fn reconcile(&mut self, new_keys: &HashSet<String>) {
        let mut next = HashMap::with_capacity(new_keys.len());
        for key in new_keys {
            let flags = self.state.get(key).copied().unwrap_or_default();
            next.insert(key.clone(), flags);
        }
        self.state = next;
        self.recompute_aggregate();
    }

    /// Set the selected flag for a key. Unknown (stale) keys are a silent
    /// no-op. Returns whether anything changed.
    pub fn set_selected(&mut self, key: &str, is_selected: bool) -> bool {
        match self.state.get_mut(key) {
            Some(flags) if flags.is_selected != is_selected => {
                flags.is_selected = is_selected;
                self.recompute_aggregate();
                true
            }
            _ => false,
        }
    }

    /// Explicit toggle-all: if the aggregate is `All`, clear every selection;
    /// otherwise select every key. Never lands on `Partial`.
    pub fn toggle_select_all(&mut self) {
        let select = self.multi_select != MultiSelect::All;
        for flags in self.state.values_mut() {
            flags.is_selected = select;
        }
        self.recompute_aggregate();
    }

    pub fn set_expanded(&mut self, key: &str, is_expanded: bool) {
        if let Some(flags) = self.state.get_mut(key) {
            flags.is_expanded = is_expanded;
        }
    }

    pub fn set_incomplete(&mut self, key: &str, is_incomplete: bool) {
        if let Some(flags) = self.state.get_mut(key) {
            flags.is_incomplete = is_incomplete;
        }
    }

    pub fn set_adding_folder(&mut self, key: &str, is_adding_folder: bool) {
        if let Some(flags) = self.state.get_mut(key) {
            flags.is_adding_folder = is_adding_folder;
        }
    }

    /// Replace a key's flags wholesale (used when reverting a failed
    /// mutation). Stale keys are ignored.
    pub fn restore(&mut self, key: &str, flags: SelectionFlags) {
        if let Some(slot) = self.state.get_mut(key) {
            *slot = flags;
        }
        self.recompute_aggregate();
    }

    pub fn flags(&self, key: &str) -> Option<SelectionFlags> {
        self.state.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.contains_key(key)
    }

    pub fn any_selected(&self) -> bool {
        self.state.values().any(|f| f.is_selected)
    }

    /// Keys currently selected, in no particular order.
    pub fn selected_keys(&self) -> Vec<String> {
        self.state
            .iter()
            .filter(|(_, f)| f.is_selected)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn multi_select(&self) -> MultiSelect {
        self.multi_select
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    fn recompute_aggregate(&mut self) {
        let total = self.state.len();
        let selected = self.state.values().filter(|f| f.is_selected).count();
        self.multi_select = if selected == 0 {
            MultiSelect::None
        } else if selected == total {
            MultiSelect::All
        } else {
            MultiSelect::Partial
        };
    }
}
