use crate::host::ProgressReporter;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-name load state; `Loaded` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ResourceState {
    /// Registered, not yet confirmed loaded.
    Pending,
    /// Loaded.
    Loaded,
}

/// Unique named resources and their load state, feeding the loading bar.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ResourceRegistry {
    entries: BTreeMap<String, ResourceState>,
}

impl ResourceRegistry {
    /// Register `name`. The first call counts it and reports one more resource;
    /// returns whether this was that first call.
    pub fn register(&mut self, name: &str, progress: &mut dyn ProgressReporter) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_owned(), ResourceState::Pending);
        progress.add_resource_count(1);
        tracing::debug!(name, total = self.entries.len(), "registered resource");
        true
    }

    /// Move `name` from pending to loaded and notify once. Unknown and already
    /// loaded names are ignored.
    pub fn mark_loaded(&mut self, name: &str, progress: &mut dyn ProgressReporter) -> bool {
        match self.entries.get_mut(name) {
            Some(state @ ResourceState::Pending) => {
                *state = ResourceState::Loaded;
                progress.notify_resource_loaded();
                true
            }
            _ => false,
        }
    }

    /// State of `name`, if registered.
    pub fn state(&self, name: &str) -> Option<ResourceState> {
        self.entries.get(name).copied()
    }

    /// Number of distinct registered names.
    pub fn registered(&self) -> usize {
        self.entries.len()
    }

    /// Names still pending.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, s)| **s == ResourceState::Pending)
            .map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resources/registry.rs"]
mod tests;
