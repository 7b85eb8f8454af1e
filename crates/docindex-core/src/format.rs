//! Reading and writing the search index file format.
//!
//! The file is a JavaScript assignment of a JSON object with a single `docs`
//! key:
//!
//! ```text
//! var documenterSearchIndex = {"docs":
//! [{"location":"...","page":"...","title":"...","text":"...","category":"section"}, ...]
//! }
//! ```
//!
//! [`render_index`] is deterministic: the same records always produce the same
//! bytes, which is what makes rebuilds comparable by checksum.

use crate::{DEFAULT_VARIABLE, Error, Result, SearchIndex, SearchRecord};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    docs: Vec<SearchRecord>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    docs: &'a [SearchRecord],
}

const DECLARATION_KEYWORDS: [&str; 3] = ["var", "let", "const"];

/// Parse an index file.
///
/// Accepts `var|let|const <ident> = <json>` with an optional trailing `;`, or a
/// bare JSON object, in which case the default variable name is assumed.
pub fn parse_index(input: &str) -> Result<SearchIndex> {
    let trimmed = input.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(Error::Parse("index file is empty".into()));
    }

    let (variable, body) = split_assignment(trimmed)?;
    let body = body.trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| Error::Parse(format!("invalid index body: {e}")))?;

    debug!(
        "Parsed {} records bound to '{}'",
        envelope.docs.len(),
        variable
    );

    Ok(SearchIndex::with_variable(variable, envelope.docs))
}

fn split_assignment(input: &str) -> Result<(String, &str)> {
    if input.starts_with('{') {
        return Ok((DEFAULT_VARIABLE.to_string(), input));
    }

    let rest = DECLARATION_KEYWORDS
        .iter()
        .find_map(|keyword| {
            input
                .strip_prefix(keyword)
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .unwrap_or(input);

    let (name, body) = rest
        .split_once('=')
        .ok_or_else(|| Error::Parse("expected `var <name> = {...}` or a JSON object".into()))?;
    let name = name.trim();

    if !is_identifier(name) {
        return Err(Error::Parse(format!(
            "'{name}' is not a valid JavaScript identifier"
        )));
    }

    Ok((name.to_string(), body))
}

/// Whether `name` is a plain JavaScript identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Render an index in canonical form.
pub fn render_index(index: &SearchIndex) -> Result<String> {
    if !is_identifier(index.variable()) {
        return Err(Error::Serialization(format!(
            "'{}' is not a valid JavaScript identifier",
            index.variable()
        )));
    }

    let docs = serde_json::to_string(index.records())?;
    let mut out = String::with_capacity(docs.len() + index.variable().len() + 24);
    out.push_str("var ");
    out.push_str(index.variable());
    out.push_str(" = {\"docs\":\n");
    out.push_str(&docs);
    out.push_str("\n}\n");
    Ok(out)
}

/// Render only the JSON object (`{"docs":[...]}`), without the assignment.
pub fn render_json(index: &SearchIndex) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        docs: index.records(),
    })?)
}

/// Whether `input` is already in canonical form.
pub fn is_canonical(input: &str) -> Result<bool> {
    let index = parse_index(input)?;
    Ok(render_index(&index)? == input)
}

/// Base64 SHA-256 digest of rendered index content.
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    STANDARD.encode(hasher.finalize())
}
