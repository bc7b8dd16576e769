use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "burnpad")]
#[command(version, about = "Self-destructing notes: share text once, or for a day", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "BURNPAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding note files (overrides configuration)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create a note and print its URL
    #[command(alias = "n")]
    Create {
        /// Note text (read from stdin when omitted)
        text: Option<String>,

        /// Delete the note after its first read
        #[arg(short, long)]
        read_once: bool,
    },

    /// Print a note's content, burning it if it is read-once
    #[command(alias = "r")]
    Read {
        /// Note id, or a full note URL
        id: String,
    },

    /// Remove expired notes and leftovers from interrupted operations
    Sweep,
}
