use serde::{Deserialize, Serialize};

/// Parsed document handed over by an external reader: ordered, non-empty
/// paragraphs with their style names. Empty/whitespace-only paragraphs are
/// already excluded upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedDocument {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub metadata: Option<DocumentMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub paragraph_count: Option<usize>,
    #[serde(default)]
    pub original_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
    #[serde(rename = "style")]
    pub style_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleMapManifest {
    pub manifest_version: u32,
    pub doc_id: String,
    pub generated_at: String,
    pub source_path: String,
    pub paragraph_count: usize,
    pub styles: Vec<StyleMapEntry>,
}

/// One row of the editable style map. `heading_level` of 1..6 marks a
/// heading style; a negative value is the caller-facing sentinel for
/// "ignore", same as `is_ignored`. Styles absent from the map are body text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleMapEntry {
    pub style_name: String,
    pub sample_text: String,
    pub occurrence_count: usize,
    pub heading_level: Option<i64>,
    #[serde(default)]
    pub is_ignored: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub document_path: String,
    pub style_map_path: Option<String>,
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestCounts {
    pub paragraph_count: usize,
    pub styles_seen: usize,
    pub chunks_inserted: usize,
    pub chunks_with_hierarchy: usize,
    pub chunks_without_hierarchy: usize,
    pub total_tokens: i64,
    pub avg_tokens: i64,
    pub min_tokens: i64,
    pub max_tokens: i64,
    pub docs_total: i64,
    pub chunks_total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub doc_id: String,
    pub source_sha256: String,
    pub max_chunk_tokens: usize,
    pub overlap_paragraphs: usize,
    pub paths: IngestPaths,
    pub counts: IngestCounts,
    pub warnings: Vec<String>,
}
