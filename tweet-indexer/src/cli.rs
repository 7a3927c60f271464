//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;

/// Default number of list-mode workers.
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "tweet-indexer")]
#[command(about = "Fetch tweets incrementally and index them into OpenSearch", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// OpenSearch URL (overrides OPENSEARCH_URL)
    #[arg(long, global = true)]
    pub opensearch_url: Option<String>,

    /// Index name (overrides TWEET_INDEX)
    #[arg(short, long, global = true)]
    pub index: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Index the latest page of a user's timeline
    User {
        /// Numeric user id or handle
        target: String,
    },
    /// Write the latest page of a user's timeline to a file
    UserToFile {
        /// Numeric user id or handle
        target: String,
        /// Output path prefix; a timestamp and `.txt` are appended
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Index tweets matching a search term newer than the newest indexed one
    Term {
        term: String,
    },
    /// Write tweets matching a search term newer than the checkpoint to a file
    TermToFile {
        term: String,
        /// Output path prefix; a timestamp and `.txt` are appended
        #[arg(short, long)]
        path: PathBuf,
        /// Checkpoint file holding the newest fetched id
        #[arg(short = 'q', long)]
        checkpoint: PathBuf,
    },
    /// Index the latest page of every user in a target list
    List {
        /// Target list file (overrides TARGET_LIST_PATH)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Number of parallel workers
        #[arg(short = 'j', long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
    },
    /// Upload every `.txt` bulk file in a directory
    Upload {
        /// Directory holding bulk files
        #[arg(short, long)]
        path: PathBuf,
    },
}

impl Cli {
    /// Apply command-line overrides on top of environment settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.opensearch_url {
            settings.opensearch_url = url.clone();
        }
        if let Some(index) = &self.index {
            settings.index = Some(index.clone());
        }
        if let Commands::List { path: Some(path), .. } = &self.command {
            settings.target_list_path = Some(path.clone());
        }
    }

    /// Whether the command writes to the search index.
    pub fn needs_store(&self) -> bool {
        matches!(
            self.command,
            Commands::User { .. } | Commands::Term { .. } | Commands::List { .. } | Commands::Upload { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings::from_lookup(|_| None)
    }

    #[test]
    fn test_parse_term_to_file() {
        let cli = Cli::try_parse_from([
            "tweet-indexer",
            "term-to-file",
            "rustlang",
            "-p",
            "/data/rust",
            "-q",
            "/data/rust.checkpoint",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Commands::TermToFile {
                term: "rustlang".to_string(),
                path: PathBuf::from("/data/rust"),
                checkpoint: PathBuf::from("/data/rust.checkpoint"),
            }
        );
        assert!(!cli.needs_store());
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["tweet-indexer", "list", "--index", "tweets"]).unwrap();

        assert_eq!(
            cli.command,
            Commands::List {
                path: None,
                workers: DEFAULT_WORKERS
            }
        );
        assert!(cli.needs_store());
    }

    #[test]
    fn test_global_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "tweet-indexer",
            "list",
            "-j",
            "8",
            "-p",
            "/tmp/users.txt",
            "--index",
            "tweets",
            "--opensearch-url",
            "http://search:9200",
        ])
        .unwrap();

        let mut settings = base_settings();
        cli.apply(&mut settings);

        assert_eq!(settings.index.as_deref(), Some("tweets"));
        assert_eq!(settings.opensearch_url, "http://search:9200");
        assert_eq!(settings.target_list_path, Some(PathBuf::from("/tmp/users.txt")));
    }

    #[test]
    fn test_term_to_file_requires_checkpoint() {
        assert!(Cli::try_parse_from(["tweet-indexer", "term-to-file", "rust", "-p", "/tmp/out"]).is_err());
    }
}
