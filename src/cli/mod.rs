//! CLI module for subtrans.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// subtrans - Subtitle Translation Pipeline
///
/// Chunks a subtitle transcript, translates every chunk with an OpenAI chat
/// model, keeps progress in SQLite and exports the translations.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline on the first subtitle file in the working directory
    Run,

    /// Chunk the subtitle file and store the chunks without translating
    Ingest,

    /// Translate pending chunks and export (resumes an interrupted run)
    Translate,

    /// Write all translations to the export file
    Export,

    /// Show chunk counts and the first rows of the store
    Status,

    /// Download YouTube captions into a subtitle file
    Fetch {
        /// YouTube URL or video ID
        video: String,

        /// Caption languages in order of preference (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        languages: Option<Vec<String>>,

        /// Prefix each line with [HH:MM:SS]
        #[arg(short, long)]
        timecode: bool,
    },

    /// Serve the translated pairs as an HTML table
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Rebuild the search index from translated chunks
    Index,

    /// Search translated chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.3")]
        min_score: f32,
    },

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

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_languages() {
        let cli = Cli::parse_from(["subtrans", "fetch", "zduSFxRajkE", "-l", "en,ko", "-t"]);
        match cli.command {
            Commands::Fetch { video, languages, timecode } => {
                assert_eq!(video, "zduSFxRajkE");
                assert_eq!(languages, Some(vec!["en".to_string(), "ko".to_string()]));
                assert!(timecode);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["subtrans", "run", "-vv", "--config", "c.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("c.toml"));
        assert!(matches!(cli.command, Commands::Run));
    }
}
