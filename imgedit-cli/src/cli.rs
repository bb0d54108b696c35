// ABOUTME: CLI argument definitions for the imgedit test harness
// ABOUTME: Defines the image-delivery modes and editing parameters using clap derive macros

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How the source image reaches the remote worker.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Pass a remote image URL through to the handler
    Url,
    /// Embed the local file as base64 in the request body
    Inline,
    /// Upload the local file to the shared network volume first
    Storage,
}

#[derive(Parser, Debug)]
#[command(name = "imgedit")]
#[command(about = "Test harness for a synchronous image-edit inference endpoint", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Image-delivery mode
    #[arg(long, value_enum, default_value = "url")]
    pub mode: Mode,

    /// Source image URL for url mode (falls back to TEST_IMAGE_URL)
    #[arg(long)]
    pub image_url: Option<String>,

    /// Local source image for inline/storage modes
    #[arg(long, value_name = "FILE")]
    pub image_file: Option<PathBuf>,

    /// Pre-built request document: the raw input object or {"input": {...}}
    #[arg(long, short = 'j', value_name = "FILE", conflicts_with = "all")]
    pub json: Option<PathBuf>,

    /// Run the inline and storage pipelines back-to-back on --image-file
    #[arg(long)]
    pub all: bool,

    /// Editing prompt
    #[arg(long, default_value = "add watercolor style, soft pastel tones")]
    pub prompt: String,

    /// Seed
    #[arg(long, default_value_t = 12345)]
    pub seed: i64,

    /// Output width
    #[arg(long, default_value_t = 768, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Output height
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Client wait in seconds; also drives the server-side hold duration
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Save path for the decoded result image
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
}
