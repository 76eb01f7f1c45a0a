mod audit;
mod builder;
mod hierarchy;
mod style;
mod tree;

pub use audit::{ChunkStats, HierarchySummary, chunk_stats, hierarchy_summary};
pub use builder::{ChunkBuilder, ChunkDraft, SegmentOptions, content_hash, estimate_tokens};
pub use hierarchy::{HierarchyEntry, HierarchyStack};
pub use style::{StyleMap, StyleRole, detect_heading_level};
pub use tree::{
    ChunkPreview, ChunkTreeRow, HierarchyTreeNode, build_chunk_tree, parse_hierarchy_entries,
};
