pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resshare")]
#[command(about = "Per-user file storage with live, reference-based sharing")]
pub struct Args {
    /// Path to the resshare config directory (defaults to ~/.resshare)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// User to act as
    #[arg(long, global = true, env = "RESSHARE_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
