use anyhow::{Result, bail};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::Paragraph;

use super::hierarchy::{HierarchyEntry, HierarchyStack};
use super::style::{StyleMap, StyleRole};

/// Crude token approximation (~4 characters per token). Deliberately not a
/// real tokenizer; swap via `ChunkBuilder::with_estimator` when one is
/// needed.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Stable 16-hex-char fingerprint of chunk content, a pure function of the
/// text. Used downstream for change detection and dedup.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{digest:x}")[..16].to_string()
}

#[derive(Debug, Clone)]
pub struct SegmentOptions {
    pub max_chunk_tokens: usize,
    pub overlap_paragraphs: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            max_chunk_tokens: 500,
            overlap_paragraphs: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkDraft {
    pub chunk_index: usize,
    pub content: String,
    pub content_length: usize,
    pub token_estimate: usize,
    pub hierarchy_path: String,
    pub hierarchy: Vec<HierarchyEntry>,
    pub hierarchy_level: Option<i64>,
    pub paragraph_start: usize,
    pub paragraph_end: usize,
    pub content_hash: String,
}

/// Splits an ordered paragraph sequence into hierarchy-tagged, size-bounded
/// chunks. One instance per call site; each `segment` call owns fresh scan
/// state.
pub struct ChunkBuilder {
    options: SegmentOptions,
    estimator: fn(&str) -> usize,
}

impl ChunkBuilder {
    pub fn new(options: SegmentOptions) -> Result<Self> {
        if options.max_chunk_tokens == 0 {
            bail!("max_chunk_tokens must be greater than zero");
        }

        Ok(Self {
            options,
            estimator: estimate_tokens,
        })
    }

    pub fn with_estimator(mut self, estimator: fn(&str) -> usize) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn segment(&self, paragraphs: &[Paragraph], styles: &StyleMap) -> Vec<ChunkDraft> {
        let mut chunks = Vec::new();
        let mut hierarchy = HierarchyStack::new();
        let mut pending: Vec<&Paragraph> = Vec::new();
        let mut pending_start = 0_usize;

        for (position, paragraph) in paragraphs.iter().enumerate() {
            match styles.role(&paragraph.style_name) {
                StyleRole::Ignored => continue,
                StyleRole::Heading(level) => {
                    // Body accumulated so far belongs to the section that was
                    // open before this heading.
                    self.flush(
                        &mut chunks,
                        &mut pending,
                        pending_start,
                        paragraph.index.saturating_sub(1),
                        &hierarchy,
                    );

                    hierarchy.on_heading(&paragraph.text, level);
                    pending_start = paragraph.index;
                    pending.push(paragraph);
                }
                StyleRole::Body => {
                    if pending.is_empty() {
                        pending_start = paragraph.index;
                    }
                    pending.push(paragraph);

                    let joined = join_paragraphs(&pending);
                    if (self.estimator)(&joined) > self.options.max_chunk_tokens {
                        self.flush(
                            &mut chunks,
                            &mut pending,
                            pending_start,
                            paragraph.index,
                            &hierarchy,
                        );

                        // Reseed with trailing body paragraphs from the
                        // window ending at this position; headings and
                        // ignored styles never re-enter.
                        if self.options.overlap_paragraphs > 0 {
                            let window_start =
                                (position + 1).saturating_sub(self.options.overlap_paragraphs);
                            for offset in window_start..=position {
                                let candidate = &paragraphs[offset];
                                if styles.role(&candidate.style_name) == StyleRole::Body {
                                    if pending.is_empty() {
                                        pending_start = candidate.index;
                                    }
                                    pending.push(candidate);
                                }
                            }
                        }
                    }
                }
            }
        }

        if !pending.is_empty() {
            self.flush(
                &mut chunks,
                &mut pending,
                pending_start,
                paragraphs[paragraphs.len() - 1].index,
                &hierarchy,
            );
        }

        chunks
    }

    fn flush(
        &self,
        chunks: &mut Vec<ChunkDraft>,
        pending: &mut Vec<&Paragraph>,
        paragraph_start: usize,
        paragraph_end: usize,
        hierarchy: &HierarchyStack,
    ) {
        if pending.is_empty() {
            return;
        }

        let content = join_paragraphs(pending);
        chunks.push(ChunkDraft {
            chunk_index: chunks.len(),
            content_length: content.chars().count(),
            token_estimate: (self.estimator)(&content),
            hierarchy_path: hierarchy.current_path(),
            hierarchy: hierarchy.current_path_list(),
            hierarchy_level: hierarchy.current_level(),
            paragraph_start,
            paragraph_end,
            content_hash: content_hash(&content),
            content,
        });

        pending.clear();
    }
}

fn join_paragraphs(paragraphs: &[&Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|paragraph| paragraph.text.as_str())
        .collect::<Vec<&str>>()
        .join("\n\n")
}
