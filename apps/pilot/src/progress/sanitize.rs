//! Converts generated guidance into plain-text blocks.
//!
//! Guidance arrives as HTML or markdown-ish text from the remote model. None of it is
//! passed on as markup: tags are consumed for structure only and every block is plain text.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::advisor_client::strip_code_fences;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum GuidanceBlock {
    Heading(String),
    Bullet(String),
    Paragraph(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum BlockKind {
    Heading,
    Bullet,
    #[default]
    Flow,
}

fn dropped_regions() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
            .expect("static regex")
    })
}

fn tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("static regex")
    })
}

fn numeric_entity() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("static regex"))
}

fn numbered_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}[.)]\s+").expect("static regex"))
}

pub fn sanitize_guidance(raw: &str) -> Vec<GuidanceBlock> {
    let cleaned = dropped_regions().replace_all(strip_code_fences(raw), "");

    let mut builder = BlockBuilder::default();
    let mut last = 0;
    for caps in tag().captures_iter(&cleaned) {
        let Some(whole) = caps.get(0) else { continue };
        builder.push_text(&cleaned[last..whole.start()]);
        last = whole.end();

        let closing = caps.get(1).map(|m| m.as_str() == "/").unwrap_or(false);
        let name = caps
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();

        match name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                builder.flush();
                builder.kind = if closing { BlockKind::Flow } else { BlockKind::Heading };
            }
            "li" => {
                builder.flush();
                builder.kind = if closing { BlockKind::Flow } else { BlockKind::Bullet };
            }
            "p" | "div" | "br" | "ul" | "ol" | "section" | "article" | "table" | "tr"
            | "hr" | "blockquote" => builder.flush(),
            _ => {}
        }
    }
    builder.push_text(&cleaned[last..]);
    builder.flush();
    builder.blocks
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<GuidanceBlock>,
    buffer: String,
    kind: BlockKind,
}

impl BlockBuilder {
    fn push_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn flush(&mut self) {
        let text = decode_entities(&std::mem::take(&mut self.buffer));
        match self.kind {
            BlockKind::Heading => self.push_block(GuidanceBlock::Heading(collapse(&text))),
            BlockKind::Bullet => self.push_block(GuidanceBlock::Bullet(collapse(&text))),
            BlockKind::Flow => self.push_flow(&text),
        }
    }

    /// Untagged text: blank lines split paragraphs, markdown headings and list markers
    /// become their own blocks.
    fn push_flow(&mut self, text: &str) {
        let mut paragraph: Vec<&str> = Vec::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                self.push_paragraph(&mut paragraph);
            } else if line.starts_with('#') {
                self.push_paragraph(&mut paragraph);
                self.push_block(GuidanceBlock::Heading(collapse(line.trim_start_matches('#'))));
            } else if let Some(item) = bullet_text(line) {
                self.push_paragraph(&mut paragraph);
                self.push_block(GuidanceBlock::Bullet(collapse(item)));
            } else {
                paragraph.push(line);
            }
        }
        self.push_paragraph(&mut paragraph);
    }

    fn push_paragraph(&mut self, lines: &mut Vec<&str>) {
        if !lines.is_empty() {
            let text = collapse(&lines.join(" "));
            lines.clear();
            self.push_block(GuidanceBlock::Paragraph(text));
        }
    }

    fn push_block(&mut self, block: GuidanceBlock) {
        let empty = match &block {
            GuidanceBlock::Heading(t) | GuidanceBlock::Bullet(t) | GuidanceBlock::Paragraph(t) => {
                t.is_empty()
            }
        };
        if !empty {
            self.blocks.push(block);
        }
    }
}

fn bullet_text(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest);
        }
    }
    numbered_item().find(line).map(|m| &line[m.end()..])
}

/// Collapses whitespace runs and drops markdown emphasis markers.
fn collapse(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");
    let numeric = numeric_entity().replace_all(&named, |caps: &regex::Captures| {
        let code = &caps[1];
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    // Last, so "&amp;lt;" stays the literal text "&lt;".
    numeric.replace("&amp;", "&")
}
