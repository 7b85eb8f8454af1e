//! Build command - regenerate the search index of a documentation project

use anyhow::{Context, Result, bail};
use colored::Colorize;
use docindex_core::storage::write_atomic;
use docindex_core::{
    Diagnostic, DiagnosticSeverity, IndexBuilder, ProjectConfig, is_up_to_date, render_index,
    validate_index,
};
use std::path::Path;
use tracing::{error, info, warn};

use super::Outcome;

pub fn execute(config_path: &Path, check: bool, stdout: bool) -> Result<Outcome> {
    let config = ProjectConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    // Build diagnostics are logged as they are found.
    let output = IndexBuilder::new(&config)?
        .build()
        .context("Build failed")?;

    let report = validate_index(&output.index);
    log_diagnostics(&report.diagnostics);
    if !report.is_ok() {
        bail!(
            "Generated index has {} validation errors; nothing was written",
            report.error_count()
        );
    }

    let rendered = render_index(&output.index)?;
    let output_path = config.output_path();

    if stdout {
        print!("{rendered}");
        return Ok(Outcome::Clean);
    }

    if check {
        if is_up_to_date(&output_path, &rendered)? {
            println!("{} {} is up to date", "✓".green(), output_path.display());
            return Ok(Outcome::Clean);
        }
        eprintln!(
            "{} {} is out of date (run `docindex build`)",
            "✗".red(),
            output_path.display()
        );
        return Ok(Outcome::Problems);
    }

    write_atomic(&output_path, &rendered)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!("Wrote {}", output_path.display());

    println!(
        "{} Wrote {} records from {} pages to {}",
        "✓".green(),
        output.index.len(),
        output.pages,
        output_path.display()
    );
    Ok(Outcome::Clean)
}

fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let message = match diagnostic.record {
            Some(record) => format!("record {record}: {}", diagnostic.message),
            None => diagnostic.message.clone(),
        };
        match diagnostic.severity {
            DiagnosticSeverity::Error => error!("{message}"),
            DiagnosticSeverity::Warn => warn!("{message}"),
            DiagnosticSeverity::Info => info!("{message}"),
        }
    }
}
