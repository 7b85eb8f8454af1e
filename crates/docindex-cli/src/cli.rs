//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Regenerate the index described by ./docindex.toml
//! docindex build
//!
//! # Fail in CI when the committed index is stale
//! docindex build --check
//!
//! # Inspect an existing index
//! docindex check build/search_index.js
//! docindex search contract --category method -f json
//! docindex stats build/search_index.js
//! ```

use clap::{Parser, Subcommand};
use docindex_core::{Category, PROJECT_CONFIG_FILE, SearchMode};
use std::path::PathBuf;

use crate::output::OutputFormat;

const DEFAULT_INDEX: &str = "build/search_index.js";

#[derive(Parser, Clone, Debug)]
#[command(name = "docindex")]
#[command(version)]
#[command(about = "docindex - Build, check and search Documenter search indexes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logging
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Build the search index from a documentation project
    Build {
        /// Project configuration file
        #[arg(short = 'c', long, default_value = PROJECT_CONFIG_FILE)]
        config: PathBuf,

        /// Compare with the existing output instead of writing it
        #[arg(long, conflicts_with = "stdout")]
        check: bool,

        /// Print the index instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Validate an index file
    Check {
        /// Index file to validate
        #[arg(default_value = DEFAULT_INDEX)]
        file: PathBuf,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search an index file
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Index file to search
        #[arg(short = 'i', long = "index", default_value = DEFAULT_INDEX)]
        index: PathBuf,

        /// Matching strategy (defaults to the user config, else substring)
        #[arg(short = 'm', long, value_parser = parse_mode)]
        mode: Option<SearchMode>,

        /// Only return records of this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,

        /// Maximum number of results (defaults to the user config, else 10)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Summarize an index file
    Stats {
        /// Index file to summarize
        #[arg(default_value = DEFAULT_INDEX)]
        file: PathBuf,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Re-serialize an index file canonically
    Fmt {
        /// Index file to format
        file: PathBuf,

        /// Rewrite the file in place instead of printing it
        #[arg(short = 'w', long)]
        write: bool,
    },
}

impl Commands {
    /// Output format of commands that have one.
    pub const fn format(&self) -> Option<OutputFormat> {
        match self {
            Self::Check { format, .. } | Self::Search { format, .. } | Self::Stats { format, .. } => {
                Some(*format)
            },
            Self::Build { .. } | Self::Fmt { .. } => None,
        }
    }
}

fn parse_mode(value: &str) -> Result<SearchMode, String> {
    value.parse()
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse()
}
