//! Check command - validate an index file

use anyhow::{Context, Result};
use docindex_core::{is_canonical, parse_index, validate_index};
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::Outcome;
use crate::output::{OutputFormat, print_report};

#[derive(Debug, Serialize)]
struct CheckResult<'a> {
    file: String,
    ok: bool,
    canonical: bool,
    records: usize,
    errors: usize,
    warnings: usize,
    diagnostics: &'a [docindex_core::Diagnostic],
}

pub fn execute(file: &Path, format: OutputFormat) -> Result<Outcome> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let index =
        parse_index(&content).with_context(|| format!("{} is not a search index", file.display()))?;

    let report = validate_index(&index);
    let canonical = is_canonical(&content)?;

    match format {
        OutputFormat::Text => print_report(file, &report, canonical),
        OutputFormat::Json | OutputFormat::Jsonl => {
            let result = CheckResult {
                file: file.display().to_string(),
                ok: report.is_ok(),
                canonical,
                records: report.records,
                errors: report.error_count(),
                warnings: report.warning_count(),
                diagnostics: &report.diagnostics,
            };
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", serde_json::to_string(&result)?);
            }
        },
    }

    Ok(if report.is_ok() {
        Outcome::Clean
    } else {
        Outcome::Problems
    })
}
