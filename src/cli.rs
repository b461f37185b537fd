use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "podserve")]
#[command(author, version, about = "Serve a directory of audio files as a podcast")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the feed and the media files
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port on which to serve content
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to serve
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Base URL with which to prefix all podcast entries (should include protocol)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Scan the directory once and print the feed to stdout
    Feed {
        /// Directory to scan
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Base URL with which to prefix all podcast entries
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
