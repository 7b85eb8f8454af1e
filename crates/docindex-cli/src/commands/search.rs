//! Search command implementation

use anyhow::{Context, Result};
use docindex_core::{
    Category, SearchMode, SearchQuery, Searcher, UserConfig, read_index,
};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::Outcome;
use crate::output::{OutputFormat, print_hits, print_json_items};

#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub query: String,
    pub index: PathBuf,
    pub mode: Option<SearchMode>,
    pub category: Option<Category>,
    pub limit: Option<usize>,
    pub format: OutputFormat,
}

pub fn execute(args: &SearchArgs) -> Result<Outcome> {
    let defaults = match UserConfig::load() {
        Ok(config) => config.search,
        Err(e) => {
            warn!("Ignoring user config: {e}");
            UserConfig::default().search
        },
    };

    let index = read_index(&args.index)
        .with_context(|| format!("Failed to load {}", args.index.display()))?;

    let query = SearchQuery::new(args.query.clone())
        .with_mode(args.mode.unwrap_or(defaults.mode))
        .with_category(args.category)
        .with_limit(args.limit.unwrap_or(defaults.limit));
    debug!("Searching {} records with {:?}", index.len(), query);

    let hits = Searcher::new(&index).search(&query)?;

    match args.format {
        OutputFormat::Text => print_hits(&hits, &query.text),
        OutputFormat::Json | OutputFormat::Jsonl => print_json_items(&hits, args.format)?,
    }

    Ok(Outcome::Clean)
}
