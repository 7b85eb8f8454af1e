//! Index statistics command implementation

use anyhow::{Context, Result};
use docindex_core::{IndexStats, checksum, read_index, render_index};
use serde::Serialize;
use std::path::Path;

use super::Outcome;
use crate::output::{OutputFormat, print_stats};

#[derive(Debug, Serialize)]
struct StatsOutput {
    file: String,
    checksum: String,
    #[serde(flatten)]
    stats: IndexStats,
}

pub fn execute(file: &Path, format: OutputFormat) -> Result<Outcome> {
    let index = read_index(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let stats = IndexStats::from_index(&index);

    match format {
        OutputFormat::Text => print_stats(file, &stats),
        OutputFormat::Json | OutputFormat::Jsonl => {
            let output = StatsOutput {
                file: file.display().to_string(),
                checksum: checksum(&render_index(&index)?),
                stats,
            };
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", serde_json::to_string(&output)?);
            }
        },
    }

    Ok(Outcome::Clean)
}
