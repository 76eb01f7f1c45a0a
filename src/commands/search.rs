use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::info;

use crate::cli::SearchArgs;
use crate::db;

#[derive(Debug, Serialize)]
struct SearchResult {
    rank: usize,
    chunk_id: i64,
    doc_id: String,
    chunk_index: i64,
    hierarchy_path: String,
    token_estimate: i64,
    snippet: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    limit: usize,
    returned: usize,
    doc_id_filter: Option<String>,
    results: Vec<SearchResult>,
}

pub fn run(args: SearchArgs) -> Result<()> {
    let fts_query = to_fts_query(&args.query);
    if fts_query.is_empty() {
        bail!("query must contain at least one searchable token");
    }

    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("docseg_index.sqlite"));

    let connection = db::open_connection(&db_path)?;
    db::ensure_schema(&connection)?;

    let results = run_lexical_search(&connection, &fts_query, args.doc_id.as_deref(), args.limit)?;

    info!(query = %args.query, returned = results.len(), "search completed");

    if args.json {
        let response = SearchResponse {
            query: args.query.clone(),
            limit: args.limit,
            returned: results.len(),
            doc_id_filter: args.doc_id.clone(),
            results,
        };

        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize search results")?;
        writeln!(output)?;
        output.flush()?;
    } else {
        write_text_response(&args.query, &results)?;
    }

    Ok(())
}

fn run_lexical_search(
    connection: &Connection,
    fts_query: &str,
    doc_id_filter: Option<&str>,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    let mut statement = connection.prepare(
        "
        SELECT
          c.id,
          c.doc_id,
          c.chunk_index,
          c.hierarchy_path,
          c.token_estimate,
          snippet(chunks_fts, 2, '[', ']', ' ... ', 18)
        FROM chunks_fts
        JOIN chunks c ON c.id = chunks_fts.rowid
        WHERE
          chunks_fts MATCH ?1
          AND (?2 IS NULL OR c.doc_id = ?2)
        ORDER BY bm25(chunks_fts) ASC
        LIMIT ?3
        ",
    )?;

    let mut rows = statement.query(params![fts_query, doc_id_filter, limit as i64])?;
    let mut out = Vec::new();
    let mut rank = 0_usize;

    while let Some(row) = rows.next()? {
        rank += 1;
        out.push(SearchResult {
            rank,
            chunk_id: row.get(0)?,
            doc_id: row.get(1)?,
            chunk_index: row.get(2)?,
            hierarchy_path: row.get(3)?,
            token_estimate: row.get(4)?,
            snippet: row.get(5)?,
        });
    }

    Ok(out)
}

fn write_text_response(query: &str, results: &[SearchResult]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Query: {query}")?;
    writeln!(output, "Results: {}", results.len())?;

    for result in results {
        let section = if result.hierarchy_path.is_empty() {
            "(no section)"
        } else {
            &result.hierarchy_path
        };

        writeln!(
            output,
            "{}.\t{}\tchunk {}\t{}",
            result.rank, result.doc_id, result.chunk_index, section
        )?;
        writeln!(
            output,
            "\ttokens={} chunk_id={}",
            result.token_estimate, result.chunk_id
        )?;
        writeln!(output, "\tsnippet: {}", result.snippet)?;
    }

    output.flush()?;
    Ok(())
}

fn to_fts_query(query_text: &str) -> String {
    query_text
        .split_whitespace()
        .filter(|token| !token.trim().is_empty())
        .map(|token| format!("\"{}\"", token.replace('"', "")))
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_fts_query_quotes_each_token() {
        assert_eq!(to_fts_query("vacation policy"), "\"vacation\" \"policy\"");
        assert_eq!(to_fts_query("  spaced   out  "), "\"spaced\" \"out\"");
        assert_eq!(to_fts_query(""), "");
    }
}
