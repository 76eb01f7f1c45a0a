use std::path::Path;

use anyhow::{Result, bail};

pub mod analyze;
pub mod ingest;
pub mod search;
pub mod status;
pub mod tree;

/// Stable document identifier: explicit override or the document file stem,
/// lower-cased with non-alphanumerics folded to dashes.
pub(crate) fn derive_doc_id(document_path: &Path, explicit: Option<&str>) -> Result<String> {
    let raw = match explicit {
        Some(doc_id) => doc_id.to_string(),
        None => match document_path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem.to_string(),
            None => bail!(
                "cannot derive a doc id from {}",
                document_path.display()
            ),
        },
    };

    let sanitized = sanitize_doc_id(&raw);
    if sanitized.is_empty() {
        bail!("doc id must contain at least one alphanumeric character: {raw:?}");
    }

    Ok(sanitized)
}

fn sanitize_doc_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for ch in raw.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn derive_doc_id_uses_file_stem() {
        let path = PathBuf::from("incoming/Employee Handbook 2025.json");
        let doc_id = derive_doc_id(&path, None).unwrap();
        assert_eq!(doc_id, "employee-handbook-2025");
    }

    #[test]
    fn derive_doc_id_prefers_explicit_value() {
        let path = PathBuf::from("incoming/whatever.json");
        let doc_id = derive_doc_id(&path, Some("Handbook v2")).unwrap();
        assert_eq!(doc_id, "handbook-v2");
    }

    #[test]
    fn derive_doc_id_rejects_empty_identifiers() {
        let path = PathBuf::from("incoming/whatever.json");
        assert!(derive_doc_id(&path, Some("---")).is_err());
    }
}
