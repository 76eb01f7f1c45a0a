use std::collections::HashMap;

use crate::model::StyleMapEntry;

/// Effective role of a paragraph style during segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRole {
    Heading(i64),
    Body,
    Ignored,
}

// Order matters: the first pattern contained in the lower-cased style name
// wins, so e.g. "Subtitle" resolves through "title" before "subtitle".
const HEADING_PATTERNS: &[(&str, i64)] = &[
    ("heading 1", 1),
    ("heading1", 1),
    ("rubrik 1", 1),
    ("titel", 1),
    ("title", 1),
    ("heading 2", 2),
    ("heading2", 2),
    ("rubrik 2", 2),
    ("subtitle", 2),
    ("heading 3", 3),
    ("heading3", 3),
    ("rubrik 3", 3),
    ("heading 4", 4),
    ("heading4", 4),
    ("rubrik 4", 4),
    ("heading 5", 5),
    ("heading5", 5),
    ("rubrik 5", 5),
    ("heading 6", 6),
    ("heading6", 6),
    ("rubrik 6", 6),
];

/// Advisory heading-level detection from a raw style name. Seeds the style
/// map a user may edit afterwards; segmentation never consults this
/// directly.
pub fn detect_heading_level(style_name: &str) -> Option<i64> {
    let lowered = style_name.to_lowercase();

    HEADING_PATTERNS
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, level)| *level)
}

/// Style-name to role mapping for one document. Styles without an entry are
/// body text.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    roles: HashMap<String, StyleRole>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[StyleMapEntry]) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.insert(entry.style_name.clone(), role_for_entry(entry));
        }
        map
    }

    /// Seed a map straight from the pattern detector, for callers that have
    /// no reviewed style map yet.
    pub fn detected<'a>(style_names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::new();
        for name in style_names {
            let role = match detect_heading_level(name) {
                Some(level) => StyleRole::Heading(level),
                None => StyleRole::Body,
            };
            map.insert(name.to_string(), role);
        }
        map
    }

    pub fn insert(&mut self, style_name: String, role: StyleRole) {
        self.roles.insert(style_name, role);
    }

    pub fn role(&self, style_name: &str) -> StyleRole {
        self.roles
            .get(style_name)
            .copied()
            .unwrap_or(StyleRole::Body)
    }
}

fn role_for_entry(entry: &StyleMapEntry) -> StyleRole {
    if entry.is_ignored {
        return StyleRole::Ignored;
    }

    match entry.heading_level {
        // Negative level is the caller-facing "never chunk this" sentinel.
        Some(level) if level < 0 => StyleRole::Ignored,
        Some(level) if level >= 1 => StyleRole::Heading(level),
        _ => StyleRole::Body,
    }
}
