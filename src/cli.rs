use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_stdin::FileOrStdin;

/// Keeps an AppStream metainfo releases file in sync with a project's GitHub releases
///
/// Releases are fetched through the `gh` CLI, which must be installed and authenticated
#[derive(Parser)]
#[cfg_attr(debug_assertions, derive(Debug))]
#[command(
    author,
    version,
    verbatim_doc_comment,
    infer_subcommands = true,
    subcommand_required = true,
    after_long_help = include_str!("_examples/cli.txt")
)]
pub struct Cli {
    /// Path of an alternative configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Command to be executed
    #[command(name = "command", subcommand)]
    pub process: CliProcess,
}

#[derive(Subcommand)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum CliProcess {
    /// Synchronizes the metainfo releases document with the published releases
    #[command(after_long_help = include_str!("_examples/sync.txt"))]
    Sync(SyncProcess),

    /// Renders release notes into a sanitized metainfo description fragment
    #[command(after_long_help = include_str!("_examples/render.txt"))]
    Render(RenderProcess),
}

/// Synchronizes the metainfo releases document with the published releases
#[derive(Args, Debug)]
pub struct SyncProcess {
    /// Path of the metainfo releases document to update
    ///
    /// Defaults to the configured path or, when not set, to the document deployed two directories above the
    /// executable
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// GitHub repository to fetch releases from, in `owner/name` form
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Maximum number of releases to fetch from the listing
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Print the updated document to stdout instead of writing the file
    #[arg(long)]
    pub dry_run: bool,
}

/// Renders release notes into a sanitized metainfo description fragment
#[derive(Args, Debug)]
pub struct RenderProcess {
    /// Markdown release notes to render (reads from stdin if '-')
    #[arg(default_value = "-")]
    pub input: FileOrStdin,
}
