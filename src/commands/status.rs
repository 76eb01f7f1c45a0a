use anyhow::Result;
use rusqlite::{Connection, params};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::db;
use crate::segment::{chunk_stats, hierarchy_summary};

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("docseg_index.sqlite"));

    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let connection = db::open_connection(&db_path)?;
    let docs_total = db::count_rows(&connection, "SELECT COUNT(*) FROM documents").unwrap_or(0);
    let chunks_total = db::count_rows(&connection, "SELECT COUNT(*) FROM chunks").unwrap_or(0);

    info!(
        path = %db_path.display(),
        docs = docs_total,
        chunks = chunks_total,
        "database status"
    );

    list_documents(&connection)?;

    if let Some(doc_id) = &args.doc_id {
        report_document(&connection, doc_id)?;
    }

    Ok(())
}

fn list_documents(connection: &Connection) -> Result<()> {
    let mut statement = connection.prepare(
        "
        SELECT doc_id, original_name, paragraph_count, imported_at
        FROM documents
        ORDER BY doc_id
        ",
    )?;

    let mut rows = statement.query([])?;

    while let Some(row) = rows.next()? {
        let doc_id: String = row.get(0)?;
        let original_name: String = row.get(1)?;
        let paragraph_count: i64 = row.get(2)?;
        let imported_at: String = row.get(3)?;

        info!(
            doc_id = %doc_id,
            original_name = %original_name,
            paragraphs = paragraph_count,
            imported_at = %imported_at,
            "document"
        );
    }

    Ok(())
}

fn report_document(connection: &Connection, doc_id: &str) -> Result<()> {
    let mut statement = connection.prepare(
        "
        SELECT hierarchy_path, token_estimate
        FROM chunks
        WHERE doc_id = ?1
        ORDER BY chunk_index
        ",
    )?;

    let mut rows = statement.query(params![doc_id])?;
    let mut hierarchy_paths = Vec::new();
    let mut token_estimates = Vec::new();

    while let Some(row) = rows.next()? {
        hierarchy_paths.push(row.get::<_, String>(0)?);
        token_estimates.push(row.get::<_, i64>(1)?);
    }

    if hierarchy_paths.is_empty() {
        warn!(doc_id = %doc_id, "no chunks stored for document");
        return Ok(());
    }

    let summary = hierarchy_summary(&hierarchy_paths);
    let stats = chunk_stats(&token_estimates);

    info!(
        doc_id = %doc_id,
        total = summary.total_chunks,
        with_hierarchy = summary.chunks_with_hierarchy,
        without_hierarchy = summary.chunks_without_hierarchy,
        "hierarchy summary"
    );
    info!(
        doc_id = %doc_id,
        total_tokens = stats.total_tokens,
        avg_tokens = stats.avg_tokens,
        min_tokens = stats.min_tokens,
        max_tokens = stats.max_tokens,
        "chunk token stats"
    );

    Ok(())
}
