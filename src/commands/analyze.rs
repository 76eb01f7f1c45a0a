use std::collections::HashMap;

use anyhow::Result;
use tracing::info;

use crate::cli::AnalyzeArgs;
use crate::commands::derive_doc_id;
use crate::model::{ParsedDocument, StyleMapEntry, StyleMapManifest};
use crate::segment::detect_heading_level;
use crate::util::{ensure_directory, now_utc_string, read_json, truncate_chars, write_json_pretty};

const SAMPLE_TEXT_CHARS: usize = 200;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let doc_id = derive_doc_id(&args.document_path, args.doc_id.as_deref())?;
    let document: ParsedDocument = read_json(&args.document_path)?;

    info!(
        doc_id = %doc_id,
        path = %args.document_path.display(),
        paragraphs = document.paragraphs.len(),
        "analyzing document styles"
    );

    let styles = collect_style_entries(&document);

    let style_map_path = args
        .style_map_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join(format!("style_map_{doc_id}.json")));

    let manifest = StyleMapManifest {
        manifest_version: 1,
        doc_id,
        generated_at: now_utc_string(),
        source_path: args.document_path.display().to_string(),
        paragraph_count: document.paragraphs.len(),
        styles,
    };

    write_json_pretty(&style_map_path, &manifest)?;

    info!(
        path = %style_map_path.display(),
        styles = manifest.styles.len(),
        "wrote style map manifest"
    );

    Ok(())
}

/// One entry per style, seeded with the detector's heading level and the
/// first occurrence as sample text. Edit the written manifest to override
/// roles before ingest.
fn collect_style_entries(document: &ParsedDocument) -> Vec<StyleMapEntry> {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut entries: HashMap<&str, StyleMapEntry> = HashMap::new();

    for paragraph in &document.paragraphs {
        let style_name = paragraph.style_name.as_str();

        if let Some(entry) = entries.get_mut(style_name) {
            entry.occurrence_count += 1;
            continue;
        }

        first_seen.push(style_name);
        entries.insert(
            style_name,
            StyleMapEntry {
                style_name: style_name.to_string(),
                sample_text: truncate_chars(&paragraph.text, SAMPLE_TEXT_CHARS),
                occurrence_count: 1,
                heading_level: detect_heading_level(style_name),
                is_ignored: false,
            },
        );
    }

    let mut styles: Vec<StyleMapEntry> = first_seen
        .into_iter()
        .filter_map(|name| entries.remove(name))
        .collect();

    // Stable sort keeps first-seen order for styles with equal counts.
    styles.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
    styles
}

#[cfg(test)]
mod tests {
    use crate::model::Paragraph;

    use super::*;

    fn document(paragraphs: Vec<Paragraph>) -> ParsedDocument {
        ParsedDocument {
            paragraphs,
            metadata: None,
        }
    }

    fn paragraph(index: usize, text: &str, style: &str) -> Paragraph {
        Paragraph {
            index,
            text: text.to_string(),
            style_name: style.to_string(),
        }
    }

    #[test]
    fn collect_style_entries_counts_and_seeds_levels() {
        let document = document(vec![
            paragraph(0, "Introduction", "Heading 1"),
            paragraph(1, "first body paragraph", "Normal"),
            paragraph(2, "second body paragraph", "Normal"),
            paragraph(3, "third body paragraph", "Normal"),
            paragraph(4, "Background", "Heading 1"),
        ]);

        let styles = collect_style_entries(&document);

        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].style_name, "Normal");
        assert_eq!(styles[0].occurrence_count, 3);
        assert_eq!(styles[0].heading_level, None);
        assert_eq!(styles[0].sample_text, "first body paragraph");

        assert_eq!(styles[1].style_name, "Heading 1");
        assert_eq!(styles[1].occurrence_count, 2);
        assert_eq!(styles[1].heading_level, Some(1));
        assert_eq!(styles[1].sample_text, "Introduction");
        assert!(!styles[1].is_ignored);
    }
}
