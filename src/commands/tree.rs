use std::io::{self, Write};

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::{info, warn};

use crate::cli::TreeArgs;
use crate::db;
use crate::segment::{ChunkTreeRow, build_chunk_tree, parse_hierarchy_entries};
use crate::util::write_json_pretty;

pub fn run(args: TreeArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("docseg_index.sqlite"));

    let connection = db::open_connection(&db_path)?;
    db::ensure_schema(&connection)?;

    let rows = load_chunk_rows(&connection, &args.doc_id)?;
    if rows.is_empty() {
        warn!(doc_id = %args.doc_id, "no chunks stored for document");
    }

    let tree = build_chunk_tree(&rows);

    match &args.out_path {
        Some(path) => {
            write_json_pretty(path, &tree)?;
            info!(path = %path.display(), chunks = rows.len(), "wrote hierarchy tree");
        }
        None => {
            let mut output = io::BufWriter::new(io::stdout().lock());
            serde_json::to_writer_pretty(&mut output, &tree)
                .context("failed to serialize hierarchy tree")?;
            writeln!(output)?;
            output.flush()?;
        }
    }

    Ok(())
}

fn load_chunk_rows(connection: &Connection, doc_id: &str) -> Result<Vec<ChunkTreeRow>> {
    let mut statement = connection.prepare(
        "
        SELECT id, content, hierarchy_json, token_estimate
        FROM chunks
        WHERE doc_id = ?1
        ORDER BY chunk_index
        ",
    )?;

    let mut rows = statement.query(params![doc_id])?;
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        let hierarchy_json: Option<String> = row.get(2)?;

        out.push(ChunkTreeRow {
            id: row.get(0)?,
            content: row.get(1)?,
            hierarchy: parse_hierarchy_entries(hierarchy_json.as_deref()),
            token_estimate: row.get(3)?,
        });
    }

    Ok(out)
}
