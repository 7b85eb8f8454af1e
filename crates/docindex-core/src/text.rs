//! Plain-text reduction of inline markdown and search normalization.

use html_escape::decode_html_entities;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Reduce inline markdown to the text a reader sees.
///
/// - Links and images (`[Label](url)`, `![alt](src)`) become their label
/// - Inline HTML anchors (`<a id="x"></a>`) are removed
/// - Code span backticks and `*` emphasis markers are dropped
/// - HTML entities are decoded
/// - Soft line breaks become single spaces; spacing inside a line is kept
pub fn plain_text(raw: &str) -> String {
    let stripped = strip_inline_markup(raw);
    let decoded = decode_html_entities(&stripped);
    join_lines(&decoded)
}

/// Join lines with single spaces, trimming each line's ends.
///
/// Blank lines are dropped. Whitespace inside a line is left as written.
fn join_lines(input: &str) -> String {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_inline_markup(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'!' if bytes.get(i + 1) == Some(&b'[') => {
                if let Some((label_end, link_end)) = find_markdown_link(bytes, i + 1) {
                    output.push_str(&strip_inline_markup(&input[i + 2..label_end]));
                    i = link_end + 1;
                    continue;
                }
                output.push('!');
                i += 1;
            },
            b'[' => {
                if let Some((label_end, link_end)) = find_markdown_link(bytes, i) {
                    output.push_str(&strip_inline_markup(&input[i + 1..label_end]));
                    i = link_end + 1;
                    continue;
                }
                output.push('[');
                i += 1;
            },
            b'<' => {
                if let Some(next_gt) = memchr::memchr(b'>', &bytes[i + 1..]).map(|pos| pos + i + 1)
                {
                    let tag = input[i + 1..next_gt].trim().to_ascii_lowercase();
                    if tag.starts_with("a ") || tag == "a" || tag.starts_with("/a") {
                        i = next_gt + 1;
                        continue;
                    }
                }
                output.push('<');
                i += 1;
            },
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => {
                output.push(char::from(bytes[i + 1]));
                i += 2;
            },
            b'`' | b'*' => i += 1,
            _ => {
                // Copy the whole UTF-8 sequence starting here.
                let ch_len = utf8_len(bytes[i]);
                let end = (i + ch_len).min(bytes.len());
                output.push_str(&input[i..end]);
                i = end;
            },
        }
    }

    output
}

const fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

fn find_markdown_link(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 2,
            b']' => {
                if idx + 1 < bytes.len() && bytes[idx + 1] == b'(' {
                    if let Some(close_paren) = find_matching_paren(bytes, idx + 2) {
                        return Some((idx, close_paren));
                    }
                }
                return None;
            },
            _ => idx += 1,
        }
    }
    None
}

fn find_matching_paren(bytes: &[u8], mut pos: usize) -> Option<usize> {
    let mut depth = 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
                pos += 1;
            },
            _ => pos += 1,
        }
    }
    None
}

/// Lowercase, strip diacritics, and turn separators into single spaces.
///
/// Used on both sides of a substring search so that `"mps representation"`
/// finds `"MPS-Representation"` and `"uber"` finds `"Über"`.
pub fn normalize_for_search(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut prev_was_space = true;

    for ch in text.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }

        for lower in ch.to_lowercase() {
            if lower.is_alphanumeric() {
                normalized.push(lower);
                prev_was_space = false;
            } else {
                push_space(&mut normalized, &mut prev_was_space);
            }
        }
    }

    normalized.trim_end().to_string()
}

fn push_space(normalized: &mut String, prev_was_space: &mut bool) {
    if !*prev_was_space && !normalized.is_empty() {
        normalized.push(' ');
        *prev_was_space = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_links_and_code() {
        assert_eq!(
            plain_text("MPS objects can be contracted via the `contract` function (see [TensorNetwork Contractions](@ref))."),
            "MPS objects can be contracted via the contract function (see TensorNetwork Contractions)."
        );
    }

    #[test]
    fn test_plain_text_joins_lines() {
        assert_eq!(
            plain_text("The basic building block\nof any *GeneralTensorNetwork*\n  is a **Tensor**."),
            "The basic building block of any GeneralTensorNetwork is a Tensor."
        );
    }

    #[test]
    fn test_plain_text_keeps_interior_spacing() {
        assert_eq!(
            plain_text("an extension to the  digital quantum\n   circuit toolbox  "),
            "an extension to the  digital quantum circuit toolbox"
        );
        assert_eq!(join_lines("  first\n\n second \r\nthird"), "first second third");
    }

    #[test]
    fn test_plain_text_images_anchors_entities() {
        assert_eq!(plain_text("![circuit diagram](img/c.png) shown"), "circuit diagram shown");
        assert_eq!(plain_text("<a id=\"top\"></a>Intro"), "Intro");
        assert_eq!(plain_text("A &amp; B"), "A & B");
        assert_eq!(plain_text("a < b"), "a < b");
    }

    #[test]
    fn test_plain_text_keeps_underscores_and_unicode() {
        assert_eq!(
            plain_text("`apply_MPO(ψ::TensorNetwork, mpo::MPO)`"),
            "apply_MPO(ψ::TensorNetwork, mpo::MPO)"
        );
        assert_eq!(plain_text(r"escaped \* star"), "escaped * star");
    }

    #[test]
    fn test_plain_text_unmatched_brackets() {
        assert_eq!(plain_text("array[1] and [note]"), "array[1] and [note]");
        assert_eq!(plain_text("Wow!"), "Wow!");
    }

    #[test]
    fn test_normalize_for_search() {
        assert_eq!(normalize_for_search("MPS-Representation"), "mps representation");
        assert_eq!(normalize_for_search("Über  States!"), "uber states");
        assert_eq!(normalize_for_search("Qaintensor.MPO"), "qaintensor mpo");
        assert_eq!(normalize_for_search("ψ::AbstractVector"), "ψ abstractvector");
        assert_eq!(normalize_for_search("  "), "");
    }
}
