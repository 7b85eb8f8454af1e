//! # docindex-core
//!
//! Reading, writing, validating and searching Documenter-style
//! `search_index.js` files, and building them from a tree of Markdown pages.
//!
//! ## Architecture
//!
//! - **Format**: the `var name = {"docs": [...]}` codec, byte-stable on output
//! - **Validation**: per-record integrity checks that collect every problem
//! - **Building**: tree-sitter page parsing, anchor generation and docstring
//!   expansion into ordered records
//! - **Search**: substring, full-text (Tantivy) and fuzzy queries over records
//!
//! ## Quick Start
//!
//! ```rust
//! use docindex_core::{Category, parse_index, render_index, validate_index};
//!
//! let input = r##"var documenterSearchIndex = {"docs":
//! [{"location":"#Features","page":"Home","title":"Features","text":"","category":"section"}]
//! }
//! "##;
//!
//! let index = parse_index(input)?;
//! assert_eq!(index.records()[0].category, Category::Section);
//! assert!(validate_index(&index).is_ok());
//! assert_eq!(render_index(&index)?, input);
//! # Ok::<(), docindex_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`]:
//!
//! ```rust
//! use docindex_core::{Error, parse_index};
//!
//! match parse_index("not an index") {
//!     Ok(index) => println!("{} records", index.len()),
//!     Err(Error::Parse(msg)) => eprintln!("Parse error: {msg}"),
//!     Err(e) => eprintln!("{} error: {e}", e.category()),
//! }
//! ```

/// Anchor slugs and page locations
pub mod anchor;
/// Markdown pages to search records
pub mod builder;
/// Docstring catalog used by `@docs` and `@autodocs`
pub mod catalog;
/// Project and user configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// The `search_index.js` codec
pub mod format;
/// Tree-sitter based page parser
pub mod parser;
/// Query execution over a loaded index
pub mod search;
/// Index summaries
pub mod stats;
/// Reading and atomically writing index files
pub mod storage;
/// Markdown inline stripping and search normalization
pub mod text;
/// Core data types
pub mod types;
/// Index integrity checks
pub mod validate;

pub use builder::{BuildOutput, IndexBuilder, PageSource};
pub use catalog::{Docstring, DocstringCatalog};
pub use config::{PROJECT_CONFIG_FILE, PageEntry, ProjectConfig, SiteConfig, UserConfig};
pub use error::{Error, Result};
pub use format::{checksum, is_canonical, parse_index, render_index, render_json};
pub use parser::{PageParser, ParsedPage};
pub use search::{SearchMode, SearchQuery, Searcher};
pub use stats::{IndexStats, PageStats};
pub use storage::{is_up_to_date, read_index, write_index};
pub use types::*;
pub use validate::{ValidationReport, validate_index};
