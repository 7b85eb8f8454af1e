//! Anchors and page locations for generated records.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));
#[allow(clippy::expect_used)]
static LEADING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("leading digits regex is valid"));
#[allow(clippy::expect_used)]
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{P}\d\-]+").expect("slug charset regex is valid"));
#[allow(clippy::expect_used)]
static DASH_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("dash run regex is valid"));

/// Turn a heading into an anchor, the way the documentation site links headings.
///
/// `"Qaintensor.jl Documentation"` becomes `"Qaintensor.jl-Documentation"`.
pub fn slugify(title: &str) -> String {
    let s = WHITESPACE_RE.replace_all(title.trim(), "-");
    let s = LEADING_DIGITS_RE.replace(&s, "");
    let s = s.replace('&', "-and-");
    let s = DISALLOWED_RE.replace_all(&s, "");
    let s = DASH_RUN_RE.replace_all(&s, "-");
    s.trim_matches('-').to_string()
}

/// Anchor for a docstring of `binding`, optionally narrowed to one signature.
pub fn docstring_anchor(binding: &str, signature: Option<&str>) -> String {
    match signature.map(str::trim).filter(|s| !s.is_empty()) {
        Some(signature) => format!("{binding}-{signature}"),
        None => binding.to_string(),
    }
}

/// Hands out unique anchors within one page.
///
/// The first use of an anchor is returned unchanged; repeats get `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    seen: HashMap<String, usize>,
}

impl AnchorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `anchor` (or the next free numbered variant) and return it.
    pub fn register(&mut self, anchor: &str) -> String {
        let count = self.seen.entry(anchor.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return anchor.to_string();
        }

        let mut n = *count;
        loop {
            let candidate = format!("{anchor}-{n}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 1);
                if let Some(count) = self.seen.get_mut(anchor) {
                    *count = n;
                }
                return candidate;
            }
            n += 1;
        }
    }

    /// Whether `anchor` has been handed out already.
    pub fn contains(&self, anchor: &str) -> bool {
        self.seen.contains_key(anchor)
    }
}

/// Relative URL of the page generated from a source path such as `mps.md`.
///
/// With pretty URLs every page is a directory (`mps/`) and the root
/// `index.md` is the empty location; otherwise pages are `.html` files.
pub fn page_location(source_path: &str, pretty_urls: bool) -> String {
    let normalized = source_path.replace('\\', "/");
    let normalized = normalized.trim_start_matches("./");
    let stem = normalized.strip_suffix(".md").unwrap_or(normalized);

    if !pretty_urls {
        return format!("{stem}.html");
    }

    if stem == "index" {
        String::new()
    } else if let Some(dir) = stem.strip_suffix("/index") {
        format!("{dir}/")
    } else {
        format!("{stem}/")
    }
}

/// Join a page location and an anchor.
pub fn location_with_anchor(page: &str, anchor: &str) -> String {
    format!("{page}#{anchor}")
}
