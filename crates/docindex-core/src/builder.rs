//! Regenerates the search index from documentation sources.
//!
//! Pages are processed in navigation order. Within a page every block becomes
//! one record:
//!
//! - headings become `section` records anchored at the slugified heading,
//! - prose, code and directive blocks become `page` records at the page URL,
//! - every docstring pulled in by `@docs` / `@autodocs` becomes a `type` or
//!   `method` record anchored at its binding.
//!
//! The build is all-or-nothing: an unresolved `@docs` reference or a missing
//! page aborts it before anything is written.

use crate::anchor::{
    AnchorRegistry, docstring_anchor, location_with_anchor, page_location, slugify,
};
use crate::catalog::DocstringCatalog;
use crate::config::ProjectConfig;
use crate::parser::PageParser;
use crate::{
    Category, Diagnostic, Directive, Error, PageBlock, Result, SearchIndex, SearchRecord,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A page scheduled for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    /// Path relative to the source directory, with `/` separators.
    pub path: String,
    /// Configured title, if any.
    pub title: Option<String>,
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildOutput {
    /// Records in page order.
    pub index: SearchIndex,
    /// Warnings collected while building.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of pages read.
    pub pages: usize,
}

/// Builds a [`SearchIndex`] for one project.
pub struct IndexBuilder<'a> {
    config: &'a ProjectConfig,
    catalog: DocstringCatalog,
    parser: PageParser,
}

struct PageState<'p> {
    source: &'p str,
    location: String,
    title: String,
    anchors: AnchorRegistry,
    current_module: Option<String>,
}

impl<'a> IndexBuilder<'a> {
    /// Create a builder, loading the docstring catalog the config points at.
    pub fn new(config: &'a ProjectConfig) -> Result<Self> {
        let catalog = match config.docstrings_path() {
            Some(path) => DocstringCatalog::load(&path)?,
            None => DocstringCatalog::default(),
        };
        Ok(Self {
            config,
            catalog,
            parser: PageParser::new()?,
        })
    }

    /// Replace the docstring catalog.
    pub fn with_catalog(mut self, catalog: DocstringCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Configured pages, or every markdown file under the source directory.
    pub fn resolve_pages(&self) -> Result<Vec<PageSource>> {
        let source_dir = self.config.source_dir();
        if !source_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "source directory {}",
                source_dir.display()
            )));
        }

        if !self.config.pages.is_empty() {
            return Ok(self
                .config
                .pages
                .iter()
                .map(|page| PageSource {
                    path: page.path.replace('\\', "/"),
                    title: page.title.clone(),
                })
                .collect());
        }

        let mut found = Vec::new();
        collect_markdown(&source_dir, &source_dir, &mut found)?;
        found.sort_by(|a, b| {
            (a != "index.md")
                .cmp(&(b != "index.md"))
                .then_with(|| a.cmp(b))
        });

        debug!("Discovered {} pages in {}", found.len(), source_dir.display());

        Ok(found
            .into_iter()
            .map(|path| PageSource { path, title: None })
            .collect())
    }

    /// Run the build.
    pub fn build(&mut self) -> Result<BuildOutput> {
        let started = Instant::now();
        let pages = self.resolve_pages()?;
        let source_dir = self.config.source_dir();

        let mut records = Vec::new();
        let mut diagnostics = Vec::new();
        let mut emitted = HashSet::new();

        for page in &pages {
            let file = source_dir.join(&page.path);
            if !file.is_file() {
                return Err(Error::NotFound(format!(
                    "page {} ({})",
                    page.path,
                    file.display()
                )));
            }

            let markdown = fs::read_to_string(&file)?;
            let before = records.len();
            self.build_page(page, &markdown, &mut emitted, &mut records, &mut diagnostics)?;
            debug!("{}: {} records", page.path, records.len() - before);
        }

        info!(
            "Built {} records from {} pages in {:.2}ms",
            records.len(),
            pages.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(BuildOutput {
            index: SearchIndex::with_variable(self.config.site.variable.clone(), records),
            diagnostics,
            pages: pages.len(),
        })
    }

    /// Append the records of one page.
    pub fn build_page(
        &mut self,
        page: &PageSource,
        markdown: &str,
        emitted: &mut HashSet<usize>,
        records: &mut Vec<SearchRecord>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        let parsed = self.parser.parse(markdown)?;
        for diagnostic in parsed.diagnostics.iter().cloned() {
            report(
                diagnostics,
                Diagnostic {
                    message: format!("{}: {}", page.path, diagnostic.message),
                    ..diagnostic
                },
            );
        }

        let title = page
            .title
            .clone()
            .or_else(|| parsed.first_heading().map(str::to_string))
            .unwrap_or_else(|| file_stem(&page.path));

        let mut state = PageState {
            source: &page.path,
            location: page_location(&page.path, self.config.site.pretty_urls),
            title,
            anchors: AnchorRegistry::new(),
            current_module: None,
        };

        for block in parsed.blocks {
            match block {
                PageBlock::Heading { text, .. } => {
                    let slug = slugify(&text);
                    if slug.is_empty() {
                        report(
                            diagnostics,
                            Diagnostic::warn(
                                format!("{}: heading {text:?} has no usable anchor", page.path),
                                None,
                            ),
                        );
                        continue;
                    }
                    let anchor = state.anchors.register(&slug);
                    records.push(SearchRecord {
                        location: location_with_anchor(&state.location, &anchor),
                        page: state.title.clone(),
                        title: text,
                        text: String::new(),
                        category: Category::Section,
                    });
                },
                PageBlock::Prose { text } | PageBlock::Code { body: text, .. } => {
                    records.push(page_record(&state, text));
                },
                PageBlock::Directive { kind, body } => {
                    records.push(page_record(&state, body.clone()));
                    self.apply_directive(kind, &body, &mut state, emitted, records, diagnostics)?;
                },
            }
        }

        Ok(())
    }

    fn apply_directive(
        &self,
        kind: Directive,
        body: &str,
        state: &mut PageState<'_>,
        emitted: &mut HashSet<usize>,
        records: &mut Vec<SearchRecord>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        match kind {
            Directive::Meta => {
                if let Some(module) = assignment(body, "CurrentModule") {
                    debug!("{}: CurrentModule = {}", state.source, module);
                    state.current_module = Some(module.to_string());
                }
            },
            Directive::Docs => {
                for line in body.lines().map(str::trim) {
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let matches = self
                        .catalog
                        .resolve(line, state.current_module.as_deref());
                    if matches.is_empty() {
                        return Err(Error::UnresolvedReference {
                            reference: line.to_string(),
                            page: state.source.to_string(),
                        });
                    }
                    for idx in matches {
                        self.emit_docstring(idx, state, emitted, records, diagnostics);
                    }
                }
            },
            Directive::Autodocs => {
                let modules = assignment(body, "Modules")
                    .map(parse_list)
                    .unwrap_or_default();
                for idx in self.catalog.in_modules(&modules) {
                    if !emitted.contains(&idx) {
                        self.emit_docstring(idx, state, emitted, records, diagnostics);
                    }
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn emit_docstring(
        &self,
        idx: usize,
        state: &mut PageState<'_>,
        emitted: &mut HashSet<usize>,
        records: &mut Vec<SearchRecord>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(doc) = self.catalog.get(idx) else {
            return;
        };

        if !emitted.insert(idx) {
            report(
                diagnostics,
                Diagnostic::warn(
                    format!(
                        "{}: docstring {} already included, skipping",
                        state.source, doc.binding
                    ),
                    None,
                ),
            );
            return;
        }

        let anchor = state
            .anchors
            .register(&docstring_anchor(&doc.binding, doc.signature.as_deref()));
        records.push(SearchRecord {
            location: location_with_anchor(&state.location, &anchor),
            page: state.title.clone(),
            title: doc.binding.clone(),
            text: doc.text.clone(),
            category: doc.kind,
        });
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!("{}", diagnostic.message);
    diagnostics.push(diagnostic);
}

fn page_record(state: &PageState<'_>, text: String) -> SearchRecord {
    SearchRecord {
        location: state.location.clone(),
        page: state.title.clone(),
        title: state.title.clone(),
        text,
        category: Category::Page,
    }
}

/// Value of `key = value` inside a directive body.
fn assignment<'b>(body: &'b str, key: &str) -> Option<&'b str> {
    body.lines().find_map(|line| {
        let (lhs, rhs) = line.split_once('=')?;
        (lhs.trim() == key).then(|| rhs.trim())
    })
}

/// `[A, B]` or `A, B` into `["A", "B"]`.
fn parse_list(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches('"').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}

fn collect_markdown(root: &Path, dir: &Path, found: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Symlinked directories are not descended into, so link cycles terminate.
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_markdown(root, &path, found)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("md")
            && (file_type.is_file() || path.is_file())
        {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let joined = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            found.push(joined);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::PageEntry;
    use crate::{render_index, validate_index};
    use tempfile::TempDir;

    const CATALOG: &str = r#"
[[docstring]]
binding = "Qaintensor.Tensor"
kind = "type"
text = "Tensor\n\nStores tensor data"

[[docstring]]
binding = "Qaintensor.contract"
kind = "method"
signature = "Tuple{TensorNetwork}"
text = "contract(net::TensorNetwork; optimize=false)\n\nFully contract a given TensorNetwork."

[[docstring]]
binding = "Qaintensor.MPS"
kind = "method"
signature = "Tuple{AbstractArray{Complex{Float64},1}}"
text = "MPS(ψ::AbstractVector{ComplexF64})\n\nConvert a vector ψ into a MPS."
"#;

    const INDEX_MD: &str = "# Qaintensor.jl Documentation\n\n## Features\n\nQaintensor.jl converts circuits into tensor networks.\n\n## Index\n\n```@index\n```\n";

    const TENSORS_MD: &str = "# Tensor Networks\n\n```@meta\nCurrentModule = Qaintensor\n```\n\n## Tensors\n\nThe basic building block is a `Tensor`.\n\n```@docs\nTensor\n```\n\n## Contractions\n\n```@docs\ncontract(net::TensorNetwork; optimize=false)\n```\n";

    fn project(pages: &[(&str, &str)], config_toml: &str) -> (TempDir, ProjectConfig) {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        for (path, content) in pages {
            let file = src.join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, content).unwrap();
        }
        fs::write(dir.path().join("docstrings.toml"), CATALOG).unwrap();
        let config = ProjectConfig::from_toml_str(config_toml, dir.path()).unwrap();
        (dir, config)
    }

    const CONFIG: &str = r#"
[site]
docstrings = "docstrings.toml"

[[pages]]
title = "Tensor Networks"
path = "tensors.md"

[[pages]]
title = "Home"
path = "index.md"
"#;

    fn build(config: &ProjectConfig) -> BuildOutput {
        IndexBuilder::new(config).unwrap().build().unwrap()
    }

    #[test]
    fn test_build_emits_records_in_page_order() {
        let (_dir, config) = project(&[("index.md", INDEX_MD), ("tensors.md", TENSORS_MD)], CONFIG);

        let output = build(&config);
        let records = output.index.records();
        let summary: Vec<(&str, &str, Category)> = records
            .iter()
            .map(|r| (r.location.as_str(), r.title.as_str(), r.category))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("tensors/#Tensor-Networks", "Tensor Networks", Category::Section),
                ("tensors/", "Tensor Networks", Category::Page),
                ("tensors/#Tensors", "Tensors", Category::Section),
                ("tensors/", "Tensor Networks", Category::Page),
                ("tensors/", "Tensor Networks", Category::Page),
                ("tensors/#Qaintensor.Tensor", "Qaintensor.Tensor", Category::Type),
                ("tensors/#Contractions", "Contractions", Category::Section),
                ("tensors/", "Tensor Networks", Category::Page),
                (
                    "tensors/#Qaintensor.contract-Tuple{TensorNetwork}",
                    "Qaintensor.contract",
                    Category::Method
                ),
                ("#Qaintensor.jl-Documentation", "Qaintensor.jl Documentation", Category::Section),
                ("#Features", "Features", Category::Section),
                ("", "Home", Category::Page),
                ("#Index", "Index", Category::Section),
                ("", "Home", Category::Page),
            ]
        );
        assert_eq!(output.pages, 2);
        assert_eq!(records[1].text, "CurrentModule = Qaintensor");
        assert_eq!(records[3].text, "The basic building block is a Tensor.");
        assert_eq!(records[5].text, "Tensor\n\nStores tensor data");
        assert_eq!(records[13].text, "");
        assert!(records.iter().all(|r| !r.page.is_empty()));
        assert!(validate_index(&output.index).is_ok());
    }

    #[test]
    fn test_build_is_idempotent() {
        let (_dir, config) = project(&[("index.md", INDEX_MD), ("tensors.md", TENSORS_MD)], CONFIG);

        let first = render_index(&build(&config).index).unwrap();
        let second = render_index(&build(&config).index).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_unresolved_reference_fails_build() {
        let page = "# API\n\n```@meta\nCurrentModule = Qaintensor\n```\n\n```@docs\napply_MPO\n```\n";
        let (_dir, config) = project(
            &[("api.md", page)],
            "[site]\ndocstrings = \"docstrings.toml\"\n",
        );

        let result = IndexBuilder::new(&config).unwrap().build();

        match result {
            Err(Error::UnresolvedReference { reference, page }) => {
                assert_eq!(reference, "apply_MPO");
                assert_eq!(page, "api.md");
            },
            other => panic!("expected unresolved reference, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_page_fails_build() {
        let (_dir, config) = project(
            &[("index.md", INDEX_MD)],
            "[[pages]]\npath = \"index.md\"\n[[pages]]\npath = \"gone.md\"\n",
        );

        let result = IndexBuilder::new(&config).unwrap().build();
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_missing_catalog_fails() {
        let (_dir, config) = project(&[("index.md", INDEX_MD)], "[site]\ndocstrings = \"nope.toml\"\n");

        assert!(matches!(IndexBuilder::new(&config), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_discovers_pages_with_index_first() {
        let (_dir, config) = project(
            &[
                ("mps.md", "# MPS Representation\n\nText.\n"),
                ("index.md", "# Home page\n"),
                ("guide/intro.md", "Intro text without heading.\n"),
            ],
            "",
        );

        let builder = IndexBuilder::new(&config).unwrap();
        let pages: Vec<String> = builder
            .resolve_pages()
            .unwrap()
            .into_iter()
            .map(|p| p.path)
            .collect();
        assert_eq!(pages, vec!["index.md", "guide/intro.md", "mps.md"]);

        let output = build(&config);
        let intro = output
            .index
            .iter()
            .find(|r| r.location == "guide/intro/")
            .unwrap();
        assert_eq!(intro.page, "intro");
        assert_eq!(intro.text, "Intro text without heading.");

        let mps = output.index.iter().find(|r| r.location == "mps/").unwrap();
        assert_eq!(mps.page, "MPS Representation");
    }

    #[cfg(unix)]
    #[test]
    fn test_discovery_skips_symlinked_directories() {
        let (dir, config) = project(
            &[("index.md", "# Home
"), ("guide/intro.md", "Intro.
")],
            "",
        );
        let src = dir.path().join("src");
        std::os::unix::fs::symlink(&src, src.join("guide").join("loop")).unwrap();

        let pages: Vec<String> = IndexBuilder::new(&config)
            .unwrap()
            .resolve_pages()
            .unwrap()
            .into_iter()
            .map(|p| p.path)
            .collect();

        assert_eq!(pages, vec!["index.md", "guide/intro.md"]);
    }

    #[test]
    fn test_duplicate_headings_get_numbered_anchors() {
        let (_dir, config) = project(
            &[("index.md", "# Home\n\n## Example\n\n## Example\n\n## Example\n")],
            "",
        );

        let output = build(&config);
        let anchors: Vec<&str> = output.index.iter().filter_map(SearchRecord::anchor).collect();

        assert_eq!(anchors, vec!["Home", "Example", "Example-2", "Example-3"]);
        assert!(validate_index(&output.index).is_ok());
    }

    #[test]
    fn test_repeated_docstring_is_skipped_with_warning() {
        let page = "# API\n\n```@meta\nCurrentModule = Qaintensor\n```\n\n```@docs\nTensor\nTensor\n```\n";
        let (_dir, config) = project(
            &[("api.md", page)],
            "[site]\ndocstrings = \"docstrings.toml\"\n",
        );

        let output = build(&config);

        let types = output
            .index
            .iter()
            .filter(|r| r.category == Category::Type)
            .count();
        assert_eq!(types, 1);
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0].message.contains("already included"));
    }

    #[test]
    fn test_autodocs_pulls_remaining_module_docstrings() {
        let page = "# API\n\n```@meta\nCurrentModule = Qaintensor\n```\n\n```@docs\nTensor\n```\n\n```@autodocs\nModules = [Qaintensor]\n```\n";
        let (_dir, config) = project(
            &[("api.md", page)],
            "[site]\ndocstrings = \"docstrings.toml\"\n",
        );

        let output = build(&config);
        let titles: Vec<&str> = output
            .index
            .iter()
            .filter(|r| r.category.is_docstring())
            .map(|r| r.title.as_str())
            .collect();

        assert_eq!(
            titles,
            vec!["Qaintensor.Tensor", "Qaintensor.contract", "Qaintensor.MPS"]
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_plain_urls_and_custom_variable() {
        let (_dir, config) = project(
            &[("mps.md", "# MPS\n\nText.\n")],
            "[site]\npretty_urls = false\nvariable = \"siteIndex\"\n",
        );

        let output = build(&config);

        assert_eq!(output.index.variable(), "siteIndex");
        assert_eq!(output.index.records()[0].location, "mps.html#MPS");
        assert_eq!(output.index.records()[1].location, "mps.html");
    }

    #[test]
    fn test_configured_page_entry_without_title_uses_heading() {
        let mut config = ProjectConfig::rooted_at("/unused");
        config.pages.push(PageEntry {
            title: None,
            path: "x.md".to_string(),
        });
        let mut builder = IndexBuilder::new(&config).unwrap();
        let mut records = Vec::new();
        let mut diagnostics = Vec::new();

        builder
            .build_page(
                &PageSource {
                    path: "x.md".to_string(),
                    title: None,
                },
                "Intro.\n\n# Real Title\n",
                &mut HashSet::new(),
                &mut records,
                &mut diagnostics,
            )
            .unwrap();

        assert_eq!(records[0].page, "Real Title");
        assert_eq!(records[0].category, Category::Page);
    }

    #[test]
    fn test_assignment_and_list_helpers() {
        assert_eq!(assignment("CurrentModule = Qaintensor", "CurrentModule"), Some("Qaintensor"));
        assert_eq!(assignment("DocTestSetup = x", "CurrentModule"), None);
        assert_eq!(parse_list("[Qaintensor, Qaintessent]"), vec!["Qaintensor", "Qaintessent"]);
        assert_eq!(parse_list("[]"), Vec::<String>::new());
    }
}
