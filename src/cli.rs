use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "docseg",
    version,
    about = "Local structured-document segmentation and chunk index tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Analyze(AnalyzeArgs),
    Ingest(IngestArgs),
    Tree(TreeArgs),
    Search(SearchArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(long, default_value = ".cache/docseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub document_path: PathBuf,

    #[arg(long)]
    pub doc_id: Option<String>,

    #[arg(long)]
    pub style_map_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = ".cache/docseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub document_path: PathBuf,

    #[arg(long)]
    pub doc_id: Option<String>,

    #[arg(long)]
    pub style_map_path: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub ingest_manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = 500)]
    pub max_chunk_tokens: usize,

    #[arg(long, default_value_t = 1)]
    pub overlap_paragraphs: usize,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[arg(long, default_value = ".cache/docseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub doc_id: String,

    #[arg(long)]
    pub out_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long, default_value = ".cache/docseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub query: String,

    #[arg(long)]
    pub doc_id: Option<String>,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/docseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub doc_id: Option<String>,
}
