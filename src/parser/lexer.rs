//! Block delimiter tokenizer
//!
//! Scans a document for the next Gutenberg-style block comment delimiter.
//! Focus: find delimiters quickly without backtracking on hostile input.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Token types for block comment delimiters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Opening delimiter like `<!-- wp:core/group -->`
    Opener,
    /// Closing delimiter like `<!-- /wp:core/group -->`
    Closer,
    /// Self-closing delimiter like `<!-- wp:core/image {"id":1} /-->`
    Void,
}

/// A matched block delimiter with its name, attributes, and byte span
#[derive(Debug, Clone, PartialEq)]
pub struct BlockToken {
    pub kind: TokenKind,
    /// Fully qualified name, e.g. "core/paragraph"
    pub name: String,
    /// Decoded attribute payload; empty when absent or undecodable
    pub attrs: Map<String, Value>,
    /// Byte offset of `<!--`
    pub start: usize,
    /// Byte length of the whole delimiter
    pub length: usize,
}

/// Head of the delimiter pattern: comment opening, optional closer marker,
/// keyword, optional namespace, identifier. The attribute payload and the
/// tail are verified by hand so that matching never backtracks.
fn head_pattern() -> &'static Regex {
    static HEAD: OnceLock<Regex> = OnceLock::new();
    HEAD.get_or_init(|| {
        Regex::new(r"<!--\s+(/)?wp:(?:([a-z][a-z0-9_-]*)/)?([a-z][a-z0-9_-]*)")
            .expect("hard-coded pattern")
    })
}

/// Find the next block delimiter at or after `offset`.
///
/// Returns `None` when no further delimiter exists (the end sentinel).
/// Attribute payloads are decoded opportunistically: anything that fails to
/// parse as a JSON object yields an empty attribute map instead of an error.
/// The malformed-JSON lint rule re-detects such payloads separately.
pub fn next_token(document: &str, offset: usize) -> Option<BlockToken> {
    let bytes = document.as_bytes();
    let mut search = offset;

    while search <= document.len() {
        let caps = head_pattern().captures_at(document, search)?;
        let head = caps.get(0).expect("whole match");
        let start = head.start();
        let mut pos = head.end();

        // Mandatory whitespace between the name and whatever follows.
        let ws = consume_whitespace(bytes, pos);
        if ws == pos {
            search = start + 1;
            continue;
        }
        pos = ws;

        // Optional attribute payload: first `{` through the balanced `}`,
        // followed by mandatory whitespace.
        let mut attrs_text = None;
        if bytes.get(pos) == Some(&b'{') {
            let Some(end) = attribute_span(bytes, pos) else {
                search = start + 1;
                continue;
            };
            let after = consume_whitespace(bytes, end);
            if after == end {
                search = start + 1;
                continue;
            }
            attrs_text = Some(&document[pos..end]);
            pos = after;
        }

        // Optional void marker, then the comment close.
        let is_void = bytes.get(pos) == Some(&b'/');
        if is_void {
            pos += 1;
        }
        if !document[pos..].starts_with("-->") {
            search = start + 1;
            continue;
        }
        let length = pos + 3 - start;

        let is_closer = caps.get(1).is_some();
        let namespace = caps.get(2).map_or("core", |m| m.as_str());
        let name = format!("{}/{}", namespace, &caps[3]);

        let kind = if is_void {
            TokenKind::Void
        } else if is_closer {
            TokenKind::Closer
        } else {
            TokenKind::Opener
        };

        // Closers never carry attributes.
        let attrs = match attrs_text {
            Some(text) if kind != TokenKind::Closer => decode_attributes(text),
            _ => Map::new(),
        };

        return Some(BlockToken {
            kind,
            name,
            attrs,
            start,
            length,
        });
    }

    None
}

fn consume_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Scan a `{…}` span starting at `open`, returning the offset just past the
/// balanced closing brace. Braces inside JSON strings do not count.
fn attribute_span(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

fn decode_attributes(text: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            log::debug!("ignoring undecodable attribute payload: {}", text);
            Map::new()
        }
    }
}
