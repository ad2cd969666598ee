//! CLI module for tubenotes.

pub mod commands;
mod output;

pub use output::{mask_secret, Output};

use crate::config::NoteMode;
use clap::{Parser, Subcommand};

/// tubenotes - YouTube discovery, transcripts and LLM notes
///
/// Without a subcommand, runs the pipeline: optional discovery into the playlist, transcript
/// ingestion from the playlist, then note generation for everything staged.
#[derive(Parser, Debug)]
#[command(name = "tubenotes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Search for videos and add them to the playlist
    #[arg(long, num_args = 1..)]
    pub discover: Option<Vec<String>>,

    /// Only keep results containing this text (first word is used)
    #[arg(long, num_args = 1..)]
    pub include: Option<Vec<String>>,

    /// Drop results containing this text (first word is used)
    #[arg(long, num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// Number of videos to discover
    #[arg(long)]
    pub num: Option<usize>,

    /// Enable roast mode (prints a banner and exits)
    #[arg(long)]
    pub roast: bool,

    /// Note mode for this run (summarize, roast)
    #[arg(long)]
    pub mode: Option<NoteMode>,

    /// Ingest the latest upload of this channel before draining the playlist
    #[arg(long, value_name = "CHANNEL_ID")]
    pub latest: Option<String>,

    /// Roast the latest upload of ROAST_CHANNEL_ID
    #[arg(long)]
    pub roast_channel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The discovery prompt: every `--discover` word joined by spaces.
    pub fn discover_prompt(&self) -> Option<String> {
        self.discover
            .as_ref()
            .filter(|words| !words.is_empty())
            .map(|words| words.join(" "))
    }

    pub fn include_text(&self) -> Option<String> {
        first_word(&self.include)
    }

    pub fn exclude_text(&self) -> Option<String> {
        first_word(&self.exclude)
    }

    /// Log level for the `tubenotes` target. `-v` flags win over the configured level.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => match configured {
                "trace" | "debug" | "info" | "warn" | "error" => configured,
                _ => "warn",
            },
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn first_word(words: &Option<Vec<String>>) -> Option<String> {
    words.as_ref().and_then(|w| w.first()).cloned()
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check credentials, files and directories
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default config file if none exists
    Init,
}
