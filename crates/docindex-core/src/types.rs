use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// JavaScript variable the generated index is bound to.
pub const DEFAULT_VARIABLE: &str = "documenterSearchIndex";

/// Classification of the documentation block a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A heading inside a page.
    Section,
    /// Prose, code or directive content of a page.
    Page,
    /// Docstring of a type.
    Type,
    /// Docstring of a method signature.
    Method,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Self; 4] = [Self::Section, Self::Page, Self::Type, Self::Method];

    /// Wire name of the category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Page => "page",
            Self::Type => "type",
            Self::Method => "method",
        }
    }

    /// Whether the category belongs to an API docstring.
    pub const fn is_docstring(self) -> bool {
        matches!(self, Self::Type | Self::Method)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown category '{s}' (expected section, page, type or method)")
            })
    }
}

/// One entry of the search index.
///
/// Field order here is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchRecord {
    /// Relative URL of the page, with an optional `#anchor`.
    pub location: String,
    /// Human-readable page name.
    pub page: String,
    /// Section or binding title.
    pub title: String,
    /// Plain text of the block; empty for sections.
    pub text: String,
    /// Kind of block.
    pub category: Category,
}

impl SearchRecord {
    /// The `#fragment` part of the location, without the `#`.
    pub fn anchor(&self) -> Option<&str> {
        self.location.split_once('#').map(|(_, fragment)| fragment)
    }

    /// The page part of the location (everything before `#`).
    pub fn page_path(&self) -> &str {
        self.location
            .split_once('#')
            .map_or(self.location.as_str(), |(path, _)| path)
    }
}

/// An ordered collection of search records bound to a JavaScript variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndex {
    variable: String,
    docs: Vec<SearchRecord>,
}

impl SearchIndex {
    /// Create an index bound to [`DEFAULT_VARIABLE`].
    pub fn new(docs: Vec<SearchRecord>) -> Self {
        Self::with_variable(DEFAULT_VARIABLE, docs)
    }

    /// Create an index bound to a custom variable name.
    pub fn with_variable(variable: impl Into<String>, docs: Vec<SearchRecord>) -> Self {
        Self {
            variable: variable.into(),
            docs,
        }
    }

    /// Variable name used when rendering.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Records in index order.
    pub fn records(&self) -> &[SearchRecord] {
        &self.docs
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, SearchRecord> {
        self.docs.iter()
    }

    /// Consume the index and return its records.
    pub fn into_records(self) -> Vec<SearchRecord> {
        self.docs
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = &'a SearchRecord;
    type IntoIter = std::slice::Iter<'a, SearchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

/// A finding from validation or from the index build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the finding is.
    pub severity: DiagnosticSeverity,
    /// Human-readable description.
    pub message: String,
    /// Ordinal of the offending record, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
}

impl Diagnostic {
    /// Error-level diagnostic.
    pub fn error(message: impl Into<String>, record: Option<usize>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            record,
        }
    }

    /// Warning-level diagnostic.
    pub fn warn(message: impl Into<String>, record: Option<usize>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warn,
            message: message.into(),
            record,
        }
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// The index or build is invalid.
    Error,
    /// Suspicious but usable.
    Warn,
    /// Informational only.
    Info,
}

/// A block of a parsed markdown page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBlock {
    /// ATX or setext heading.
    Heading {
        /// Heading level, 1 to 6.
        level: usize,
        /// Heading text with inline markup stripped.
        text: String,
    },
    /// Paragraph, list, block quote or table reduced to plain text.
    Prose {
        /// Plain text of the block.
        text: String,
    },
    /// Ordinary fenced or indented code block.
    Code {
        /// Fence info string; empty for indented code.
        info: String,
        /// Code without the fence lines.
        body: String,
    },
    /// Fenced block whose info string is a directive such as `@docs`.
    Directive {
        /// Which directive the fence names.
        kind: Directive,
        /// Lines between the fences.
        body: String,
    },
}

/// Documenter-style directive blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `@meta`, page-level settings such as `CurrentModule`.
    Meta,
    /// `@docs`, explicit docstring references.
    Docs,
    /// `@autodocs`, every docstring of the listed modules.
    Autodocs,
    /// `@contents`
    Contents,
    /// `@index`
    Index,
    /// `@example`
    Example,
    /// `@repl`
    Repl,
    /// `@setup`
    Setup,
    /// `@eval`
    Eval,
}

impl Directive {
    /// Recognise a fenced block info string such as `@docs` or `@example foo`.
    pub fn from_info(info: &str) -> Option<Self> {
        let word = info.split_whitespace().next()?;
        let directive = match word {
            "@meta" => Self::Meta,
            "@docs" => Self::Docs,
            "@autodocs" => Self::Autodocs,
            "@contents" => Self::Contents,
            "@index" => Self::Index,
            "@example" => Self::Example,
            "@repl" => Self::Repl,
            "@setup" => Self::Setup,
            "@eval" => Self::Eval,
            _ => return None,
        };
        Some(directive)
    }
}

/// A search result pointing back into the documentation site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page location plus anchor.
    pub location: String,
    /// Page title.
    pub page: String,
    /// Record title.
    pub title: String,
    /// Record category.
    pub category: Category,
    /// Text around the match.
    pub snippet: String,
    /// Relevance; higher is better.
    pub score: f32,
    /// Position of the record in the index.
    pub ordinal: usize,
}
