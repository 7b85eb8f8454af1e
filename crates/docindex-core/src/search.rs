//! Searching a loaded index.
//!
//! Three modes are supported:
//!
//! - **Substring** (default): normalized, case- and accent-insensitive
//!   substring match over title, page and text. This is what the site's own
//!   search box does.
//! - **Token**: full-text query over an in-memory Tantivy index, with the
//!   usual query syntax (`mps AND contract`, `"tensor network"`).
//! - **Fuzzy**: skim-style fuzzy match, mostly useful for API names.
//!
//! Hits are ordered by score; equal scores keep index order.

use crate::text::normalize_for_search;
use crate::{Category, Error, Result, SearchHit, SearchIndex};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, STORED, STRING, Schema, TEXT, Value};
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument, doc};
use tracing::debug;

const TITLE_WEIGHT: f32 = 3.0;
const PAGE_WEIGHT: f32 = 1.5;
const TEXT_WEIGHT: f32 = 1.0;
const SNIPPET_LEN: usize = 100;

/// How query text is matched against records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case- and accent-insensitive substring match with field weights.
    #[default]
    Substring,
    /// Tokenized full-text match through an in-memory tantivy index.
    Token,
    /// Fuzzy match on titles.
    Fuzzy,
}

impl SearchMode {
    /// Lowercase name used on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Token => "token",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "token" => Ok(Self::Token),
            "fuzzy" => Ok(Self::Fuzzy),
            other => Err(format!(
                "unknown search mode '{other}' (expected substring, token or fuzzy)"
            )),
        }
    }
}

/// What to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Query text.
    pub text: String,
    /// Matching strategy.
    pub mode: SearchMode,
    /// Only return records of this category.
    pub category: Option<Category>,
    /// Maximum number of hits.
    pub limit: usize,
}

impl SearchQuery {
    /// Substring query with the default limit of 10.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: SearchMode::default(),
            category: None,
            limit: 10,
        }
    }

    /// Set the matching strategy.
    #[must_use]
    pub const fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Restrict hits to one category.
    #[must_use]
    pub const fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    /// Cap the number of hits.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

struct NormalizedRecord {
    title: String,
    page: String,
    text: String,
}

/// Runs queries against one index.
pub struct Searcher<'a> {
    index: &'a SearchIndex,
    normalized: Vec<NormalizedRecord>,
    fulltext: Option<FullTextIndex>,
}

impl<'a> Searcher<'a> {
    /// Prepare a searcher. The full-text index is built on first use.
    pub fn new(index: &'a SearchIndex) -> Self {
        let normalized = index
            .iter()
            .map(|record| NormalizedRecord {
                title: normalize_for_search(&record.title),
                page: normalize_for_search(&record.page),
                text: normalize_for_search(&record.text),
            })
            .collect();

        Self {
            index,
            normalized,
            fulltext: None,
        }
    }

    /// Run a query, best hits first.
    pub fn search(&mut self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        if query.text.trim().is_empty() {
            return Err(Error::InvalidQuery("query is empty".into()));
        }
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let mut hits = match query.mode {
            SearchMode::Substring => self.search_substring(query)?,
            SearchMode::Token => self.search_token(query)?,
            SearchMode::Fuzzy => self.search_fuzzy(query),
        };

        // Stable sort keeps index order between equal scores.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.limit);

        debug!(
            "Found {} hits for '{}' ({}) in {:.2}ms",
            hits.len(),
            query.text,
            query.mode,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(hits)
    }

    fn candidates(&self, category: Option<Category>) -> impl Iterator<Item = usize> + '_ {
        self.index
            .iter()
            .enumerate()
            .filter(move |(_, record)| category.is_none_or(|c| record.category == c))
            .map(|(ordinal, _)| ordinal)
    }

    fn search_substring(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let needle = normalize_for_search(&query.text);
        if needle.is_empty() {
            return Err(Error::InvalidQuery(format!(
                "'{}' has nothing searchable",
                query.text
            )));
        }

        let mut hits = Vec::new();
        for ordinal in self.candidates(query.category) {
            let fields = &self.normalized[ordinal];
            let mut score = 0.0_f32;
            if fields.title.contains(&needle) {
                score = score.max(TITLE_WEIGHT);
                if fields.title == needle {
                    score += 1.0;
                }
            }
            if fields.page.contains(&needle) {
                score = score.max(PAGE_WEIGHT);
            }
            if fields.text.contains(&needle) {
                score = score.max(TEXT_WEIGHT);
            }
            if score > 0.0 {
                hits.push(self.hit(ordinal, score, &query.text));
            }
        }
        Ok(hits)
    }

    fn search_fuzzy(&self, query: &SearchQuery) -> Vec<SearchHit> {
        let matcher = SkimMatcherV2::default();
        let pattern = query.text.trim().to_lowercase();

        let mut hits = Vec::new();
        for ordinal in self.candidates(query.category) {
            let record = &self.index.records()[ordinal];
            let mut best = 0_i64;

            if let Some(score) = matcher.fuzzy_match(&record.title.to_lowercase(), &pattern) {
                best = best.max(score);
            }
            // Page names and body text count for less than titles.
            if let Some(score) = matcher.fuzzy_match(&record.page.to_lowercase(), &pattern) {
                best = best.max(score / 2);
            }

            if best > 0 {
                #[allow(clippy::cast_precision_loss)]
                hits.push(self.hit(ordinal, best as f32, &query.text));
            }
        }
        hits
    }

    fn search_token(&mut self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        if self.fulltext.is_none() {
            self.fulltext = Some(FullTextIndex::build(self.index)?);
        }
        let Some(fulltext) = self.fulltext.as_ref() else {
            return Ok(Vec::new());
        };

        let scored = fulltext.search(&query.text, query.category, query.limit)?;
        Ok(scored
            .into_iter()
            .map(|(ordinal, score)| self.hit(ordinal, score, &query.text))
            .collect())
    }

    fn hit(&self, ordinal: usize, score: f32, query: &str) -> SearchHit {
        let record = &self.index.records()[ordinal];
        let source = if record.text.is_empty() {
            &record.title
        } else {
            &record.text
        };

        SearchHit {
            location: record.location.clone(),
            page: record.page.clone(),
            title: record.title.clone(),
            category: record.category,
            snippet: extract_snippet(source, query, SNIPPET_LEN),
            score,
            ordinal,
        }
    }
}

/// In-memory Tantivy index over the records of a [`SearchIndex`].
pub struct FullTextIndex {
    index: Index,
    reader: IndexReader,
    title_field: Field,
    page_field: Field,
    text_field: Field,
    ordinal_field: Field,
}

impl FullTextIndex {
    /// Index every record in RAM.
    pub fn build(search_index: &SearchIndex) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let title_field = schema_builder.add_text_field("title", TEXT);
        let page_field = schema_builder.add_text_field("page", TEXT);
        let text_field = schema_builder.add_text_field("text", TEXT);
        let category_field = schema_builder.add_text_field("category", STRING);
        let ordinal_field = schema_builder.add_u64_field("ordinal", STORED);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, 20_000_000)
            .map_err(|e| Error::Index(format!("Failed to create writer: {e}")))?;

        for (ordinal, record) in search_index.iter().enumerate() {
            writer
                .add_document(doc!(
                    title_field => record.title.as_str(),
                    page_field => record.page.as_str(),
                    text_field => record.text.as_str(),
                    category_field => record.category.as_str(),
                    ordinal_field => ordinal as u64,
                ))
                .map_err(|e| Error::Index(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| Error::Index(format!("Failed to commit: {e}")))?;

        let reader = index
            .reader()
            .map_err(|e| Error::Index(format!("Failed to create reader: {e}")))?;

        debug!("Built full-text index over {} records", search_index.len());

        Ok(Self {
            index,
            reader,
            title_field,
            page_field,
            text_field,
            ordinal_field,
        })
    }

    /// Matching record ordinals with their scores, best first.
    pub fn search(
        &self,
        query_str: &str,
        category: Option<Category>,
        limit: usize,
    ) -> Result<Vec<(usize, f32)>> {
        let searcher = self.reader.searcher();

        let mut query_parser = QueryParser::for_index(
            &self.index,
            vec![self.title_field, self.page_field, self.text_field],
        );
        query_parser.set_field_boost(self.title_field, TITLE_WEIGHT);
        query_parser.set_field_boost(self.page_field, PAGE_WEIGHT);

        let sanitized = escape_query(query_str);
        let full_query = match category {
            // Category names are fixed words, safe to splice in.
            Some(category) => format!("category:{} AND ({sanitized})", category.as_str()),
            None => sanitized,
        };

        let query = query_parser
            .parse_query(&full_query)
            .map_err(|e| Error::InvalidQuery(format!("Failed to parse query: {e}")))?;

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| Error::Index(format!("Search failed: {e}")))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::Index(format!("Failed to retrieve doc: {e}")))?;
            let ordinal = doc
                .get_first(self.ordinal_field)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| Error::Index("Stored ordinal missing".into()))?;
            let ordinal = usize::try_from(ordinal)
                .map_err(|_| Error::Index("Stored ordinal out of range".into()))?;
            results.push((ordinal, score));
        }
        Ok(results)
    }
}

fn escape_query(query: &str) -> String {
    let needs_escaping = query.chars().any(|c| {
        matches!(
            c,
            '\\' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '~' | ':' | '!'
        )
    });
    if !needs_escaping {
        return query.to_string();
    }

    let mut sanitized = String::with_capacity(query.len() * 2);
    for ch in query.chars() {
        match ch {
            '\\' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '~' | ':' | '!' => {
                sanitized.push('\\');
                sanitized.push(ch);
            },
            _ => sanitized.push(ch),
        }
    }
    sanitized
}

/// A window of `content` around the first case-insensitive match of `query`.
pub fn extract_snippet(content: &str, query: &str, max_len: usize) -> String {
    let query_lower = query.trim().to_lowercase();
    let content_lower = content.to_lowercase();

    // Lowercasing can change byte lengths; only trust positions that line up.
    let position = (!query_lower.is_empty() && content_lower.len() == content.len())
        .then(|| content_lower.find(&query_lower))
        .flatten();

    if let Some(pos) = position {
        let context_before = 50;
        let context_after = 50;

        let byte_start = pos.saturating_sub(context_before);
        let byte_end = (pos + query_lower.len() + context_after).min(content.len());

        let start = if byte_start == 0 {
            0
        } else {
            content
                .char_indices()
                .take_while(|(i, _)| *i <= byte_start)
                .last()
                .map_or(0, |(i, _)| i)
        };

        let end = content
            .char_indices()
            .find(|(i, _)| *i >= byte_end)
            .map_or(content.len(), |(i, _)| i);

        let mut snippet = String::with_capacity(end - start + 6);
        if start > 0 {
            snippet.push_str("...");
        }
        snippet.push_str(&content[start..end]);
        if end < content.len() {
            snippet.push_str("...");
        }
        return snippet;
    }

    if content.len() <= max_len {
        content.to_string()
    } else {
        let boundary = content
            .char_indices()
            .take_while(|(i, _)| *i < max_len)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());

        if boundary == 0 {
            String::from("...")
        } else {
            format!("{}...", &content[..boundary])
        }
    }
}
