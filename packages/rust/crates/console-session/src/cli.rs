use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "console-replay")]
#[command(
    about = "Replay a JSON-lines capture of console notifications and print the ordered console."
)]
pub(crate) struct Cli {
    /// JSON-lines file of inbound notifications (one per line).
    pub(crate) input: PathBuf,

    /// Override config directory (replaces `PRJ_CONFIG_HOME`).
    #[arg(long)]
    pub(crate) conf: Option<PathBuf>,

    /// Run a search after ingestion and mark the matches.
    #[arg(long)]
    pub(crate) search: Option<String>,

    /// Debug logging for the console crates.
    #[arg(long, short)]
    pub(crate) verbose: bool,
}
