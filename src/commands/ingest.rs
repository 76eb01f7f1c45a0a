use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::{info, warn};

use crate::cli::IngestArgs;
use crate::commands::derive_doc_id;
use crate::db;
use crate::model::{
    IngestCounts, IngestPaths, IngestRunManifest, ParsedDocument, StyleMapManifest,
};
use crate::segment::{
    ChunkBuilder, ChunkDraft, SegmentOptions, StyleMap, chunk_stats, hierarchy_summary,
};
use crate::util::{
    ensure_directory, now_utc_string, read_json, sha256_file, utc_compact_string,
    write_json_pretty,
};

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let ingest_manifest_path = args.ingest_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "ingest_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| cache_root.join("docseg_index.sqlite"));

    let doc_id = derive_doc_id(&args.document_path, args.doc_id.as_deref())?;

    info!(
        cache_root = %cache_root.display(),
        run_id = %run_id,
        doc_id = %doc_id,
        "starting ingest"
    );

    // Reject a bad token budget before touching any input or the database.
    let builder = ChunkBuilder::new(SegmentOptions {
        max_chunk_tokens: args.max_chunk_tokens,
        overlap_paragraphs: args.overlap_paragraphs,
    })?;

    let document: ParsedDocument = read_json(&args.document_path)?;
    let source_sha256 = sha256_file(&args.document_path)?;

    let mut warnings = Vec::new();

    let declared_count = document
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.paragraph_count);
    if let Some(declared) = declared_count {
        if declared != document.paragraphs.len() {
            let message = format!(
                "document metadata declares {declared} paragraphs, found {}",
                document.paragraphs.len()
            );
            warn!(doc_id = %doc_id, "{message}");
            warnings.push(message);
        }
    }

    let styles = resolve_style_map(&args, &document, &doc_id, &mut warnings)?;

    let chunks = builder.segment(&document.paragraphs, &styles);

    let hierarchy_paths: Vec<&str> = chunks
        .iter()
        .map(|chunk| chunk.hierarchy_path.as_str())
        .collect();
    let summary = hierarchy_summary(&hierarchy_paths);

    let token_estimates: Vec<i64> = chunks
        .iter()
        .map(|chunk| chunk.token_estimate as i64)
        .collect();
    let stats = chunk_stats(&token_estimates);

    let styles_seen = document
        .paragraphs
        .iter()
        .map(|paragraph| paragraph.style_name.as_str())
        .collect::<HashSet<&str>>()
        .len();

    let original_name = document
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.original_name.clone())
        .unwrap_or_else(|| {
            args.document_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| doc_id.clone())
        });

    let mut connection = db::open_connection(&db_path)?;
    db::ensure_schema(&connection)?;

    replace_document_chunks(
        &mut connection,
        &doc_id,
        &original_name,
        &args.document_path,
        &source_sha256,
        document.paragraphs.len(),
        &chunks,
    )?;

    db::sync_fts_index(&connection)?;

    let docs_total = db::count_rows(&connection, "SELECT COUNT(*) FROM documents")?;
    let chunks_total = db::count_rows(&connection, "SELECT COUNT(*) FROM chunks")?;
    let updated_at = now_utc_string();

    let manifest = IngestRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        db_schema_version: db::DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at,
        command: render_ingest_command(&args),
        doc_id: doc_id.clone(),
        source_sha256,
        max_chunk_tokens: args.max_chunk_tokens,
        overlap_paragraphs: args.overlap_paragraphs,
        paths: IngestPaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            document_path: args.document_path.display().to_string(),
            style_map_path: args
                .style_map_path
                .as_ref()
                .map(|path| path.display().to_string()),
            db_path: db_path.display().to_string(),
        },
        counts: IngestCounts {
            paragraph_count: document.paragraphs.len(),
            styles_seen,
            chunks_inserted: chunks.len(),
            chunks_with_hierarchy: summary.chunks_with_hierarchy,
            chunks_without_hierarchy: summary.chunks_without_hierarchy,
            total_tokens: stats.total_tokens,
            avg_tokens: stats.avg_tokens,
            min_tokens: stats.min_tokens,
            max_tokens: stats.max_tokens,
            docs_total,
            chunks_total,
        },
        warnings,
    };

    write_json_pretty(&ingest_manifest_path, &manifest)?;

    info!(path = %ingest_manifest_path.display(), "wrote ingest run manifest");
    info!(
        doc_id = %doc_id,
        chunks = chunks.len(),
        with_hierarchy = summary.chunks_with_hierarchy,
        docs_total,
        chunks_total,
        "ingest completed"
    );

    Ok(())
}

fn resolve_style_map(
    args: &IngestArgs,
    document: &ParsedDocument,
    doc_id: &str,
    warnings: &mut Vec<String>,
) -> Result<StyleMap> {
    match &args.style_map_path {
        Some(path) => {
            let manifest: StyleMapManifest = read_json(path)?;

            if manifest.doc_id != doc_id {
                let message = format!(
                    "style map was generated for doc id {}, ingesting as {}",
                    manifest.doc_id, doc_id
                );
                warn!(path = %path.display(), "{message}");
                warnings.push(message);
            }

            info!(
                path = %path.display(),
                styles = manifest.styles.len(),
                "loaded style map manifest"
            );

            Ok(StyleMap::from_entries(&manifest.styles))
        }
        None => {
            let message =
                "no style map provided; heading roles auto-detected from style names".to_string();
            warn!("{message}");
            warnings.push(message);

            Ok(StyleMap::detected(
                document
                    .paragraphs
                    .iter()
                    .map(|paragraph| paragraph.style_name.as_str()),
            ))
        }
    }
}

fn replace_document_chunks(
    connection: &mut Connection,
    doc_id: &str,
    original_name: &str,
    source_path: &Path,
    source_sha256: &str,
    paragraph_count: usize,
    chunks: &[ChunkDraft],
) -> Result<()> {
    let tx = connection.transaction()?;

    tx.execute(
        "
        INSERT INTO documents(doc_id, original_name, source_path, sha256, paragraph_count, imported_at)
        VALUES(?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(doc_id) DO UPDATE SET
          original_name=excluded.original_name,
          source_path=excluded.source_path,
          sha256=excluded.sha256,
          paragraph_count=excluded.paragraph_count,
          imported_at=excluded.imported_at
        ",
        params![
            doc_id,
            original_name,
            source_path.display().to_string(),
            source_sha256,
            paragraph_count as i64,
            now_utc_string()
        ],
    )?;

    // Re-ingest replaces the document's chunk set wholesale.
    tx.execute("DELETE FROM chunks WHERE doc_id = ?1", params![doc_id])?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO chunks(
              doc_id, chunk_index, content, content_length, token_estimate,
              content_hash, hierarchy_path, hierarchy_json, hierarchy_level,
              paragraph_start, paragraph_end)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
        )?;

        for chunk in chunks {
            let hierarchy_json = if chunk.hierarchy.is_empty() {
                None
            } else {
                Some(
                    serde_json::to_string(&chunk.hierarchy)
                        .context("failed to serialize hierarchy entries")?,
                )
            };

            statement.execute(params![
                doc_id,
                chunk.chunk_index as i64,
                &chunk.content,
                chunk.content_length as i64,
                chunk.token_estimate as i64,
                &chunk.content_hash,
                &chunk.hierarchy_path,
                hierarchy_json,
                chunk.hierarchy_level,
                chunk.paragraph_start as i64,
                chunk.paragraph_end as i64,
            ])?;
        }
    }

    tx.commit()?;
    Ok(())
}

fn render_ingest_command(args: &IngestArgs) -> String {
    let mut parts = vec![
        "docseg ingest".to_string(),
        format!("--cache-root {}", args.cache_root.display()),
        format!("--document-path {}", args.document_path.display()),
    ];

    if let Some(doc_id) = &args.doc_id {
        parts.push(format!("--doc-id {doc_id}"));
    }
    if let Some(path) = &args.style_map_path {
        parts.push(format!("--style-map-path {}", path.display()));
    }

    parts.push(format!("--max-chunk-tokens {}", args.max_chunk_tokens));
    parts.push(format!("--overlap-paragraphs {}", args.overlap_paragraphs));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn render_ingest_command_includes_segmentation_flags() {
        let args = IngestArgs {
            cache_root: PathBuf::from(".cache/docseg"),
            document_path: PathBuf::from("incoming/handbook.json"),
            doc_id: Some("handbook".to_string()),
            style_map_path: Some(PathBuf::from("style_map_handbook.json")),
            db_path: None,
            ingest_manifest_path: None,
            max_chunk_tokens: 400,
            overlap_paragraphs: 2,
        };

        let command = render_ingest_command(&args);
        assert!(command.contains("--doc-id handbook"));
        assert!(command.contains("--style-map-path style_map_handbook.json"));
        assert!(command.contains("--max-chunk-tokens 400"));
        assert!(command.contains("--overlap-paragraphs 2"));
    }
}
