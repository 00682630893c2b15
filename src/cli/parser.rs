use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "groomba")]
#[command(about = "Archive stale branches on a git remote")]
#[command(
    version,
    long_about = "Moves every remote branch whose last commit is older than the configured threshold to an archive prefix, then deletes the original"
)]
pub struct Cli {
    /// Repository to groom (any directory inside the working tree)
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Directory searched for .groomba.yaml, .groomba.yml or .groomba.json
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,

    /// Report what would be moved without pushing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
