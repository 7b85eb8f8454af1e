//! Error types and handling for docindex-core operations.
//!
//! Every fallible operation in the library returns [`Result<T>`]. Errors are
//! grouped into categories (see [`Error::category`]) so the CLI can report
//! them consistently and pick exit codes.
//!
//! ```rust
//! use docindex_core::{Error, parse_index};
//!
//! match parse_index("not an index") {
//!     Ok(index) => println!("{} records", index.len()),
//!     Err(Error::Parse(msg)) => eprintln!("bad index file: {msg}"),
//!     Err(e) => eprintln!("{}: {e}", e.category()),
//! }
//! ```

use thiserror::Error;

/// The main error type for docindex-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Reading documentation pages, the docstring catalog, or writing the
    /// generated index file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input could not be parsed.
    ///
    /// Covers malformed index files (missing `docs` key, wrong wrapper) and
    /// markdown pages tree-sitter refuses to parse.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Project or user configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A referenced page or file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A `@docs` reference did not resolve to any docstring.
    ///
    /// The build stops instead of emitting a partially populated index.
    #[error("Unresolved reference '{reference}' in {page}")]
    UnresolvedReference {
        /// The reference as written in the page.
        reference: String,
        /// Source path of the page containing the reference.
        page: String,
    },

    /// The index failed data-integrity validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Full-text index operation failed.
    #[error("Index error: {0}")]
    Index(String),

    /// The search query cannot be executed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tantivy::TantivyError> for Error {
    fn from(err: tantivy::TantivyError) -> Self {
        Self::Index(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string.
    ///
    /// - `"io"` - File system operations
    /// - `"parse"` - Index file or markdown parsing
    /// - `"config"` - Configuration files and values
    /// - `"not_found"` - Missing pages or files
    /// - `"reference"` - Unresolved `@docs` references
    /// - `"validation"` - Data-integrity failures
    /// - `"index"` - Full-text index operations
    /// - `"query"` - Search query problems
    /// - `"serialization"` - JSON/TOML conversion
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::UnresolvedReference { .. } => "reference",
            Self::Validation(_) => "validation",
            Self::Index(_) => "index",
            Self::InvalidQuery(_) => "query",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether the error comes from user-supplied content rather than the
    /// environment.
    ///
    /// Content errors are fixed by editing the documentation sources or the
    /// index file; the rest are usually permissions, paths or disk problems.
    #[must_use]
    pub const fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::UnresolvedReference { .. }
                | Self::Validation(_)
                | Self::InvalidQuery(_)
                | Self::Serialization(_)
        )
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
