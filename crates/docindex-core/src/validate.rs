//! Data-integrity checks for a search index.
//!
//! Checks run per record and never stop at the first problem, so one pass
//! reports everything wrong with a file.

use crate::{Category, Diagnostic, DiagnosticSeverity, SearchIndex, SearchRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

#[allow(clippy::expect_used)]
static BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://docs.invalid/").expect("base URL is valid"));

/// Outcome of validating an index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Number of records checked.
    pub records: usize,
    /// Findings in record order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// No error-level diagnostics.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticSeverity::Error)
    }

    /// Number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count(DiagnosticSeverity::Warn)
    }

    fn count(&self, severity: DiagnosticSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Validate every record of `index`.
pub fn validate_index(index: &SearchIndex) -> ValidationReport {
    let mut diagnostics = Vec::new();
    let mut first_seen: HashMap<(&str, Category), usize> = HashMap::new();

    for (ordinal, record) in index.iter().enumerate() {
        if let Err(message) = check_location(&record.location, record.category) {
            diagnostics.push(Diagnostic::error(
                format!("invalid location {:?}: {message}", record.location),
                Some(ordinal),
            ));
        }

        check_fields(record, ordinal, &mut diagnostics);

        // Many prose blocks share their page's location; anchors must not repeat.
        if record.category != Category::Page {
            if let Some(first) = first_seen.insert((record.location.as_str(), record.category), ordinal)
            {
                diagnostics.push(Diagnostic::error(
                    format!(
                        "duplicate {} anchor {:?} (first used by record {first})",
                        record.category, record.location
                    ),
                    Some(ordinal),
                ));
            }
        }
    }

    ValidationReport {
        records: index.len(),
        diagnostics,
    }
}

fn check_fields(record: &SearchRecord, ordinal: usize, diagnostics: &mut Vec<Diagnostic>) {
    if record.page.trim().is_empty() {
        diagnostics.push(Diagnostic::error("empty page name", Some(ordinal)));
    }
    if record.title.trim().is_empty() {
        diagnostics.push(Diagnostic::warn("empty title", Some(ordinal)));
    }

    match record.category {
        Category::Section => {
            if record.anchor().is_none() {
                diagnostics.push(Diagnostic::error(
                    format!("section {:?} has no anchor", record.title),
                    Some(ordinal),
                ));
            }
            if !record.text.is_empty() {
                diagnostics.push(Diagnostic::warn(
                    format!("section {:?} carries text", record.title),
                    Some(ordinal),
                ));
            }
        },
        Category::Type | Category::Method => {
            if record.anchor().is_none() {
                diagnostics.push(Diagnostic::error(
                    format!("{} {:?} has no anchor", record.category, record.title),
                    Some(ordinal),
                ));
            }
        },
        Category::Page => {},
    }
}

/// Check that `location` is a well-formed relative URL fragment.
///
/// The empty location is the site root and only allowed for `page` records.
pub fn check_location(location: &str, category: Category) -> std::result::Result<(), String> {
    if location.is_empty() {
        return if category == Category::Page {
            Ok(())
        } else {
            Err(format!("{category} records need a non-empty location"))
        };
    }

    if location.chars().any(char::is_control) {
        return Err("contains control characters".into());
    }

    let (path, fragment) = match location.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (location, None),
    };

    if path.starts_with('/') || path.starts_with('\\') {
        return Err("must be relative, not rooted".into());
    }
    if let Some(colon) = path.find(':') {
        if !path[..colon].contains('/') {
            return Err("must be relative, found a URL scheme".into());
        }
    }
    if path.chars().any(char::is_whitespace) {
        return Err("page path contains whitespace".into());
    }
    if !path.is_empty() && !path.ends_with('/') && !path.ends_with(".html") {
        return Err("page path must end with '/' or '.html'".into());
    }
    if fragment.is_some_and(str::is_empty) {
        return Err("empty anchor after '#'".into());
    }

    BASE_URL
        .join(location)
        .map(|_| ())
        .map_err(|e| format!("not a valid relative URL: {e}"))
}
