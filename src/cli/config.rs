// CLI configuration
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// id3lens - ID3 tag inspection tool
#[derive(Parser, Debug)]
#[command(name = "id3lens")]
#[command(about = "Inspect ID3 tags and extract embedded cover art", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Pretty,
    /// One JSON document per file
    Json,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every frame id the decoder recognises
    Frames,

    /// Read tags from audio file(s)
    Read {
        /// Audio file path(s) or glob patterns
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export embedded cover art
    Cover {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file or directory (defaults to the audio file's stem in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect which tag versions a file carries
    Detect {
        /// Audio file path(s) or glob patterns
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },
}
