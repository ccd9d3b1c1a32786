use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "stats-scanner",
    about = "Count unique visitors per path and day/month from web-server access logs",
    version,
    long_about = None
)]
pub struct Args {
    /// Access log files to scan (.bz2 and .gz are decompressed first)
    pub files: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of sources to scan concurrently
    #[arg(short, long)]
    pub workers: Option<usize>,
}
