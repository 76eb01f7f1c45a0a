use serde::{Deserialize, Serialize};

use crate::util::truncate_chars;

const MAX_HEADING_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub name: String,
    pub level: i64,
}

/// Active section path while scanning a document in order. Entry levels are
/// strictly increasing from bottom (root section) to top (most specific).
#[derive(Debug, Default)]
pub struct HierarchyStack {
    entries: Vec<HierarchyEntry>,
}

impl HierarchyStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A heading at `level` closes every open section at the same or a
    /// deeper level before opening its own.
    pub fn on_heading(&mut self, name: &str, level: i64) {
        while self
            .entries
            .last()
            .is_some_and(|entry| entry.level >= level)
        {
            self.entries.pop();
        }

        self.entries.push(HierarchyEntry {
            name: truncate_chars(name, MAX_HEADING_NAME_CHARS),
            level,
        });
    }

    pub fn current_path(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<&str>>()
            .join(" > ")
    }

    pub fn current_path_list(&self) -> Vec<HierarchyEntry> {
        self.entries.clone()
    }

    pub fn current_level(&self) -> Option<i64> {
        self.entries.last().map(|entry| entry.level)
    }
}
