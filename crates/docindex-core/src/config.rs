//! Configuration for index builds and for search defaults.
//!
//! Two files are involved:
//!
//! 1. **Project config** (`docindex.toml`, next to the documentation sources):
//!    where pages live, their order and titles, where the index is written.
//! 2. **User config** (`config.toml` in the platform config directory): defaults
//!    for interactive searching.
//!
//! ## Example project config
//!
//! ```toml
//! [site]
//! source = "src"
//! output = "build/search_index.js"
//! variable = "documenterSearchIndex"
//! pretty_urls = true
//! docstrings = "docstrings.toml"
//!
//! [[pages]]
//! title = "Home"
//! path = "index.md"
//!
//! [[pages]]
//! title = "Tensor Networks"
//! path = "tensors.md"
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.
//! `DOCINDEX_SOURCE` and `DOCINDEX_OUTPUT` override `site.source` and
//! `site.output`.

use crate::format::is_identifier;
use crate::search::SearchMode;
use crate::{DEFAULT_VARIABLE, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// File name looked up when no config path is given.
pub const PROJECT_CONFIG_FILE: &str = "docindex.toml";

/// Project configuration for one documentation site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Pages in navigation order. Empty means "every markdown file".
    #[serde(default)]
    pub pages: Vec<PageEntry>,

    /// Directory the config was loaded from; relative paths hang off it.
    #[serde(skip)]
    root: PathBuf,
}

/// The `[site]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the markdown pages.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Where the generated index file is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// JavaScript variable the index is assigned to.
    #[serde(default = "default_variable")]
    pub variable: String,

    /// Directory-style page URLs (`mps/`) instead of `mps.html`.
    #[serde(default = "default_true")]
    pub pretty_urls: bool,

    /// Optional docstring catalog referenced by `@docs` blocks.
    #[serde(default)]
    pub docstrings: Option<PathBuf>,
}

/// One `[[pages]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageEntry {
    /// Display name; the first heading is used when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Markdown file relative to the source directory.
    pub path: String,
}

fn default_source() -> PathBuf {
    PathBuf::from("src")
}

fn default_output() -> PathBuf {
    PathBuf::from("build").join("search_index.js")
}

fn default_variable() -> String {
    DEFAULT_VARIABLE.to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            variable: default_variable(),
            pretty_urls: true,
            docstrings: None,
        }
    }
}

impl ProjectConfig {
    /// Defaults rooted at `root`, as if an empty config file lived there.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        Self {
            site: SiteConfig::default(),
            pages: Vec::new(),
            root: root.into(),
        }
    }

    /// Load a project config file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "project config {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        let root = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let mut config = Self::from_toml_str(&content, root)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse config text; `root` anchors relative paths.
    pub fn from_toml_str(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.root = root.into();
        config.validate()?;
        Ok(config)
    }

    /// Apply `DOCINDEX_SOURCE` / `DOCINDEX_OUTPUT` from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup("DOCINDEX_SOURCE").filter(|v| !v.trim().is_empty()) {
            self.site.source = PathBuf::from(source);
        }
        if let Some(output) = lookup("DOCINDEX_OUTPUT").filter(|v| !v.trim().is_empty()) {
            self.site.output = PathBuf::from(output);
        }
    }

    fn validate(&self) -> Result<()> {
        if !is_identifier(&self.site.variable) {
            return Err(Error::Config(format!(
                "site.variable '{}' is not a valid JavaScript identifier",
                self.site.variable
            )));
        }

        for page in &self.pages {
            let path = Path::new(&page.path);
            if path.is_absolute()
                || path
                    .components()
                    .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
            {
                return Err(Error::Config(format!(
                    "page path '{}' must be relative to the source directory",
                    page.path
                )));
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                return Err(Error::Config(format!(
                    "page path '{}' is not a markdown file",
                    page.path
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for page in &self.pages {
            if !seen.insert(page.path.as_str()) {
                return Err(Error::Config(format!("page '{}' listed twice", page.path)));
            }
        }

        Ok(())
    }

    /// Directory the config was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Markdown source directory, relative to the project root.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.site.source)
    }

    /// Where the index is written.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.site.output)
    }

    /// Docstring catalog path, if one is configured.
    pub fn docstrings_path(&self) -> Option<PathBuf> {
        self.site.docstrings.as_ref().map(|path| self.root.join(path))
    }
}

/// User-level preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Search preferences.
    #[serde(default)]
    pub search: SearchDefaults,
}

/// Defaults for `docindex search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaults {
    /// Maximum number of hits.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Matching strategy.
    #[serde(default)]
    pub mode: SearchMode,
}

const fn default_limit() -> usize {
    10
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            mode: SearchMode::default(),
        }
    }
}

impl UserConfig {
    /// Load user preferences, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// `$DOCINDEX_CONFIG_DIR/config.toml`, else the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os("DOCINDEX_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.toml"));
        }

        directories::ProjectDirs::from("dev", "docindex", "docindex")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ProjectConfig::from_toml_str("", "/docs").unwrap();

        assert_eq!(config.source_dir(), PathBuf::from("/docs/src"));
        assert_eq!(
            config.output_path(),
            PathBuf::from("/docs/build/search_index.js")
        );
        assert_eq!(config.site.variable, DEFAULT_VARIABLE);
        assert!(config.site.pretty_urls);
        assert!(config.pages.is_empty());
        assert!(config.docstrings_path().is_none());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [site]
            source = "pages"
            output = "out/index.js"
            variable = "siteSearch"
            pretty_urls = false
            docstrings = "api.toml"

            [[pages]]
            title = "Home"
            path = "index.md"

            [[pages]]
            path = "guide/mps.md"
        "#;

        let config = ProjectConfig::from_toml_str(toml, "/proj").unwrap();

        assert_eq!(config.source_dir(), PathBuf::from("/proj/pages"));
        assert_eq!(config.output_path(), PathBuf::from("/proj/out/index.js"));
        assert_eq!(config.docstrings_path(), Some(PathBuf::from("/proj/api.toml")));
        assert!(!config.site.pretty_urls);
        assert_eq!(config.pages.len(), 2);
        assert_eq!(config.pages[0].title.as_deref(), Some("Home"));
        assert_eq!(config.pages[1].title, None);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let cases = [
            "[site]\nvariable = \"not-valid\"",
            "[[pages]]\npath = \"../escape.md\"",
            "[[pages]]\npath = \"/abs.md\"",
            "[[pages]]\npath = \"notes.txt\"",
            "[[pages]]\npath = \"a.md\"\n[[pages]]\npath = \"a.md\"",
            "[site]\nunknown = 1",
            "[site\n",
        ];

        for case in cases {
            let result = ProjectConfig::from_toml_str(case, "/x");
            assert!(
                matches!(result, Err(Error::Config(_))),
                "expected config error for {case:?}"
            );
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ProjectConfig::rooted_at("/docs");
        config.apply_env_overrides(|key| match key {
            "DOCINDEX_SOURCE" => Some("content".to_string()),
            "DOCINDEX_OUTPUT" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.source_dir(), PathBuf::from("/docs/content"));
        assert_eq!(
            config.output_path(),
            PathBuf::from("/docs/build/search_index.js")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "[site]\nsource = \"md\"\n").unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.root(), dir.path());
        assert!(config.source_dir().ends_with("md"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ProjectConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_user_config_parses_search_defaults() {
        let config: UserConfig = toml::from_str("[search]\nlimit = 25\nmode = \"token\"\n").unwrap();
        assert_eq!(config.search.limit, 25);
        assert_eq!(config.search.mode, SearchMode::Token);

        let empty: UserConfig = toml::from_str("").unwrap();
        assert_eq!(empty.search.limit, 10);
        assert_eq!(empty.search.mode, SearchMode::Substring);
    }
}
