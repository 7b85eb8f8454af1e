use crate::text::plain_text;
use crate::{Diagnostic, Directive, Error, PageBlock, Result};
use tree_sitter::{Node, Parser};
use tracing::debug;

/// Tree-sitter based parser turning one markdown page into [`PageBlock`]s.
pub struct PageParser {
    parser: Parser,
}

impl PageParser {
    /// Create a parser with the markdown grammar loaded.
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_md::LANGUAGE.into())
            .map_err(|e| Error::Parse(format!("Failed to set language: {e}")))?;

        Ok(Self { parser })
    }

    /// Split a page into blocks.
    pub fn parse(&mut self, text: &str) -> Result<ParsedPage> {
        let tree = self
            .parser
            .parse(text, None)
            .ok_or_else(|| Error::Parse("Failed to parse markdown".into()))?;

        let root = tree.root_node();
        let mut diagnostics = Vec::new();
        let mut blocks = Vec::new();

        if root.has_error() {
            diagnostics.push(Diagnostic::warn(
                "Parse tree contains errors, some blocks may be missing",
                None,
            ));
        }

        collect_blocks(root, text, &mut blocks);

        debug!("Parsed {} blocks", blocks.len());

        Ok(ParsedPage {
            blocks,
            diagnostics,
        })
    }
}

/// Blocks of one page plus anything odd the parser noticed.
pub struct ParsedPage {
    /// Blocks in document order.
    pub blocks: Vec<PageBlock>,
    /// Parse problems, such as syntax errors in the tree.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedPage {
    /// Text of the first heading, used when a page has no configured title.
    pub fn first_heading(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            PageBlock::Heading { text, .. } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
    }
}

fn collect_blocks(node: Node, text: &str, blocks: &mut Vec<PageBlock>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "section" | "document" => collect_blocks(child, text, blocks),
            "atx_heading" => blocks.push(PageBlock::Heading {
                level: atx_level(child),
                text: atx_text(child, text),
            }),
            "setext_heading" => blocks.push(setext_heading(child, text)),
            "paragraph" | "list" | "block_quote" | "pipe_table" => {
                let prose = prose_text(&text[child.byte_range()], child.kind());
                if !prose.is_empty() {
                    blocks.push(PageBlock::Prose { text: prose });
                }
            },
            "fenced_code_block" => blocks.push(fenced_block(child, text)),
            "indented_code_block" => blocks.push(PageBlock::Code {
                info: String::new(),
                body: dedent(&text[child.byte_range()]),
            }),
            other => debug!("Skipping {} block", other),
        }
    }
}

fn atx_level(node: Node) -> usize {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "atx_h1_marker" => return 1,
            "atx_h2_marker" => return 2,
            "atx_h3_marker" => return 3,
            "atx_h4_marker" => return 4,
            "atx_h5_marker" => return 5,
            "atx_h6_marker" => return 6,
            _ => {},
        }
    }
    1
}

fn atx_text(node: Node, text: &str) -> String {
    if let Some(content) = node.child_by_field_name("heading_content") {
        return plain_text(&text[content.byte_range()]);
    }

    let full_text = &text[node.byte_range()];
    plain_text(full_text.trim().trim_start_matches('#').trim_end_matches('#'))
}

fn setext_heading(node: Node, text: &str) -> PageBlock {
    let mut level = 1;
    let mut heading = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "setext_h2_underline" => level = 2,
            "paragraph" => heading = plain_text(&text[child.byte_range()]),
            _ => {},
        }
    }
    PageBlock::Heading {
        level,
        text: heading,
    }
}

fn fenced_block(node: Node, text: &str) -> PageBlock {
    let mut info = String::new();
    let mut body = "";
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "info_string" => info = text[child.byte_range()].trim().to_string(),
            "code_fence_content" => body = &text[child.byte_range()],
            _ => {},
        }
    }

    let body = body.trim_end_matches(['\n', '\r']).to_string();
    match Directive::from_info(&info) {
        Some(kind) => PageBlock::Directive { kind, body },
        None => PageBlock::Code { info, body },
    }
}

fn dedent(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            let indent = line.len() - line.trim_start_matches(' ').len();
            &line[indent.min(4)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Plain text of a paragraph, list, quote or table.
fn prose_text(raw: &str, kind: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .filter(|line| kind != "pipe_table" || !is_table_delimiter(line))
        .map(|line| {
            let line = strip_quote_markers(line);
            let line = strip_list_marker(line);
            if kind == "pipe_table" {
                line.split('|')
                    .map(str::trim)
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            } else {
                line.to_string()
            }
        })
        .collect();

    plain_text(&lines.join("\n"))
}

fn strip_quote_markers(line: &str) -> &str {
    let mut rest = line.trim_start();
    while let Some(stripped) = rest.strip_prefix('>') {
        rest = stripped.trim_start();
    }
    rest
}

fn strip_list_marker(line: &str) -> &str {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && digits <= 9 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }
    line
}

fn is_table_delimiter(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}
