use serde::{Deserialize, Serialize};

use crate::util::truncate_chars;

use super::hierarchy::HierarchyEntry;

const PREVIEW_CHARS: usize = 100;

/// Chunk row as loaded back from the store, input to tree reconstruction.
#[derive(Debug, Clone)]
pub struct ChunkTreeRow {
    pub id: i64,
    pub content: String,
    pub hierarchy: Vec<HierarchyEntry>,
    pub token_estimate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkPreview {
    pub id: i64,
    pub preview: String,
    pub token_estimate: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HierarchyTreeNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    pub children: Vec<HierarchyTreeNode>,
    pub chunks: Vec<ChunkPreview>,
}

/// Rebuild the navigable section tree from one document's chunk rows.
/// Chunks without hierarchy attach directly under the synthetic root.
/// Children are matched by name only, first-seen order — same-named
/// sections collapse into one node regardless of level, which existing
/// stored data relies on.
pub fn build_chunk_tree(rows: &[ChunkTreeRow]) -> HierarchyTreeNode {
    let mut root = HierarchyTreeNode {
        name: "root".to_string(),
        level: None,
        children: Vec::new(),
        chunks: Vec::new(),
    };

    for row in rows {
        let preview = ChunkPreview {
            id: row.id,
            preview: preview_text(&row.content),
            token_estimate: row.token_estimate,
        };

        if row.hierarchy.is_empty() {
            root.chunks.push(preview);
            continue;
        }

        let mut node = &mut root;
        for entry in &row.hierarchy {
            let index = match node
                .children
                .iter()
                .position(|child| child.name == entry.name)
            {
                Some(index) => index,
                None => {
                    node.children.push(HierarchyTreeNode {
                        name: entry.name.clone(),
                        level: Some(entry.level),
                        children: Vec::new(),
                        chunks: Vec::new(),
                    });
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }

        node.chunks.push(preview);
    }

    root
}

fn preview_text(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        format!("{}...", truncate_chars(content, PREVIEW_CHARS))
    } else {
        content.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct RawHierarchyEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    level: Option<i64>,
}

/// Lenient parse of a stored hierarchy JSON column. Missing or malformed
/// data degrades to an empty path (the chunk becomes an orphan) rather than
/// failing the request; entries keep legacy defaults for absent fields.
pub fn parse_hierarchy_entries(raw: Option<&str>) -> Vec<HierarchyEntry> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let entries: Vec<RawHierarchyEntry> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| HierarchyEntry {
            name: entry.name.unwrap_or_else(|| "Unknown".to_string()),
            level: entry.level.unwrap_or(position as i64 + 1),
        })
        .collect()
}
