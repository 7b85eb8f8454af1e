//! Fmt command - canonical re-serialization of an index file

use anyhow::{Context, Result};
use colored::Colorize;
use docindex_core::storage::write_atomic;
use docindex_core::{parse_index, render_index};
use std::fs;
use std::path::Path;

use super::Outcome;

pub fn execute(file: &Path, write: bool) -> Result<Outcome> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let index =
        parse_index(&content).with_context(|| format!("{} is not a search index", file.display()))?;
    let rendered = render_index(&index)?;

    if !write {
        print!("{rendered}");
        return Ok(Outcome::Clean);
    }

    if rendered == content {
        println!("{} already formatted", file.display());
    } else {
        write_atomic(file, &rendered)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        println!("{} Formatted {}", "✓".green(), file.display());
    }
    Ok(Outcome::Clean)
}
