//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Extract, enrich, translate and summarize a scholarly PDF.
///
/// The document is parsed by GROBID, its DOI is validated (or recovered from
/// the text or by title search), Crossref metadata is merged in, and the
/// abstract is translated and summarized.
#[derive(Parser, Debug)]
#[command(name = "summarize-papers")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the paper PDF
    #[arg(long, value_name = "PATH")]
    pub pdf: PathBuf,

    /// Print the final record as JSON and enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file path (defaults to $XDG_CONFIG_HOME/summarize-papers/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GROBID service base URL
    #[arg(long, value_name = "URL")]
    pub grobid_url: Option<String>,

    /// Crossref API base URL
    #[arg(long, value_name = "URL")]
    pub crossref_url: Option<String>,

    /// Contact e-mail sent to Crossref
    #[arg(long, value_name = "EMAIL")]
    pub mailto: Option<String>,
}
