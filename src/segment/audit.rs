use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchySummary {
    pub total_chunks: usize,
    pub chunks_with_hierarchy: usize,
    pub chunks_without_hierarchy: usize,
}

/// How many of a document's chunks carry a section path. A high orphan
/// count usually means the style map marks no heading styles.
pub fn hierarchy_summary<S: AsRef<str>>(hierarchy_paths: &[S]) -> HierarchySummary {
    let total_chunks = hierarchy_paths.len();
    let chunks_with_hierarchy = hierarchy_paths
        .iter()
        .filter(|path| !path.as_ref().is_empty())
        .count();

    HierarchySummary {
        total_chunks,
        chunks_with_hierarchy,
        chunks_without_hierarchy: total_chunks - chunks_with_hierarchy,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub total_chunks: usize,
    pub total_tokens: i64,
    pub avg_tokens: i64,
    pub min_tokens: i64,
    pub max_tokens: i64,
}

pub fn chunk_stats(token_estimates: &[i64]) -> ChunkStats {
    if token_estimates.is_empty() {
        return ChunkStats {
            total_chunks: 0,
            total_tokens: 0,
            avg_tokens: 0,
            min_tokens: 0,
            max_tokens: 0,
        };
    }

    let total_tokens: i64 = token_estimates.iter().sum();

    ChunkStats {
        total_chunks: token_estimates.len(),
        total_tokens,
        avg_tokens: (total_tokens as f64 / token_estimates.len() as f64).round() as i64,
        min_tokens: token_estimates.iter().copied().min().unwrap_or(0),
        max_tokens: token_estimates.iter().copied().max().unwrap_or(0),
    }
}
