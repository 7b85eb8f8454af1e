//! Text output formatting

use colored::Colorize;
use docindex_core::{
    Category, Diagnostic, DiagnosticSeverity, IndexStats, SearchHit, ValidationReport,
};
use std::path::Path;

fn category_label(category: Category) -> String {
    let label = format!("{:<7}", category.as_str());
    match category {
        Category::Section => label.cyan().to_string(),
        Category::Page => label.bright_black().to_string(),
        Category::Type => label.magenta().to_string(),
        Category::Method => label.yellow().to_string(),
    }
}

/// Print search hits in ranked, colorized blocks.
pub fn print_hits(hits: &[SearchHit], query: &str) {
    if hits.is_empty() {
        println!("No results found for '{query}'");
        return;
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "◆ Rank {} ─ Score {}",
            rank + 1,
            format!("{:.2}", hit.score).bright_blue()
        );
        println!("  {} {}", category_label(hit.category), hit.title.bold());

        let location = if hit.location.is_empty() {
            "(site root)"
        } else {
            hit.location.as_str()
        };
        println!("  {} › {}", hit.page.green(), location.bright_black());

        if !hit.snippet.is_empty() && hit.snippet != hit.title {
            println!("  {}", hit.snippet.replace('\n', " "));
        }
        println!();
    }
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let tag = match diagnostic.severity {
        DiagnosticSeverity::Error => "error".red().bold(),
        DiagnosticSeverity::Warn => "warn".yellow().bold(),
        DiagnosticSeverity::Info => "info".blue().bold(),
    };
    match diagnostic.record {
        Some(record) => println!("  {tag} record {record}: {}", diagnostic.message),
        None => println!("  {tag} {}", diagnostic.message),
    }
}

/// Print a validation report for `path`.
pub fn print_report(path: &Path, report: &ValidationReport, canonical: bool) {
    for diagnostic in &report.diagnostics {
        print_diagnostic(diagnostic);
    }
    if !canonical {
        println!(
            "  {} file is not canonically formatted (run `docindex fmt --write`)",
            "warn".yellow().bold()
        );
    }

    let status = if report.is_ok() {
        "✓".green()
    } else {
        "✗".red()
    };
    println!(
        "{status} {}: {} records, {} errors, {} warnings",
        path.display(),
        report.records,
        report.error_count(),
        report.warning_count()
    );
}

/// Print index statistics.
pub fn print_stats(path: &Path, stats: &IndexStats) {
    println!("{}", path.display().to_string().bold());
    println!("  Variable:   {}", stats.variable);
    println!("  Records:    {}", stats.records);
    println!("  Anchors:    {}", stats.anchors);
    println!("  Text bytes: {}", stats.text_bytes);
    println!();
    println!("{}", "Categories".bold());
    for (category, count) in &stats.categories {
        println!("  {} {count:>5}", category_label(*category));
    }
    println!();
    println!("{}", "Pages".bold());
    for page in &stats.pages {
        let location = if page.location.is_empty() {
            "(site root)"
        } else {
            page.location.as_str()
        };
        println!(
            "  {:<30} {:<20} {:>5}",
            page.page,
            location.bright_black(),
            page.records
        );
    }
}
