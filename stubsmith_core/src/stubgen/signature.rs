//! Signature line tokenizer and type-hint validator.
//!
//! Docstrings of compiled functions describe each overload on one line:
//!
//! ```text
//! foo(self: mitsuba.Bitmap, a: int, b: drjit::Internal) -> mitsuba.Bitmap
//! ```
//!
//! [`tokenize`] recovers the `name: type` spans of such a line with a purely
//! textual scan, [`clean_signature_line`] reassembles the line keeping only the
//! hints the stub syntax can express, and [`parse_signature_line`] wraps both
//! into a [`Signature`]. The scan is not bracket-aware: a hint that itself
//! contains an `identifier: ` pattern is split at that pattern. That behavior
//! is relied upon and must stay as is.

use super::model::{ParameterDescriptor, Signature};
use once_cell::sync::Lazy;
use regex::Regex;

/// Substring that marks a docstring line as a signature line.
pub const SIGNATURE_MARKER: &str = ") -> ";
/// Separator between the parameter list and the return annotation.
pub const RETURN_ARROW: &str = " -> ";
/// Token marking a type from a namespace the stub syntax cannot express.
pub const FOREIGN_SCOPE_MARKER: &str = "::";

static HINT_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+: ").expect("Invalid hint start regex"));

static OVERLOAD_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\. ").expect("Invalid overload index regex"));

static SIGNATURE_HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\(").expect("Invalid signature head regex")
});

/// One recovered `name: type` span. `start..end` is the byte range of the
/// type text within the tokenized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintSpan {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Result of scanning one signature line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine {
    pub line: String,
    pub hints: Vec<HintSpan>,
    /// Raw text after the first ` -> `
    pub return_text: Option<String>,
}

/// Parses one docstring signature line into a [`Signature`].
///
/// Returning `None` means the line does not describe a recoverable signature
/// and the overload is skipped.
pub trait SignatureParser {
    fn parse(&self, line: &str, variant: Option<&str>) -> Option<Signature>;
}

/// The textual scanner described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSignatureParser;

impl SignatureParser for HeuristicSignatureParser {
    fn parse(&self, line: &str, variant: Option<&str>) -> Option<Signature> {
        parse_signature_line(line, variant)
    }
}

/// Scan a signature line for `name: type` spans.
///
/// A span starts right after the first lowercase run followed by `: `. It ends
/// two bytes before the next such run (skipping the `, ` separator) or, for
/// the last span, at the first `)` of the remaining text.
pub fn tokenize(line: &str) -> TokenizedLine {
    let mut hints = Vec::new();
    let mut offset = 0;

    while let Some(found) = HINT_START_RE.find(&line[offset..]) {
        let sub = &line[offset..];
        let i = found.end();
        let next = HINT_START_RE.find(&sub[i..]);
        let j = match next {
            Some(next) => floor_char_boundary(sub, (i + next.start()).saturating_sub(2)),
            None => sub.find(')').unwrap_or(sub.len()),
        };

        hints.push(HintSpan {
            name: parameter_name(line, offset + found.end() - 2),
            start: offset + i,
            end: offset + j,
            text: py_slice(sub, i, j).to_string(),
        });

        if next.is_none() || j == 0 {
            break;
        }
        offset += j;
    }

    TokenizedLine {
        line: line.to_string(),
        hints,
        return_text: line
            .find(RETURN_ARROW)
            .map(|arrow| line[arrow + RETURN_ARROW.len()..].to_string()),
    }
}

/// Whether a recovered hint can be emitted.
pub fn is_valid_hint(text: &str) -> bool {
    !text.contains(FOREIGN_SCOPE_MARKER)
}

/// Rebuild the tokenized line, dropping every hint that is not valid.
pub fn reassemble(tokens: &TokenizedLine) -> String {
    let line = tokens.line.as_str();
    let mut result = String::with_capacity(line.len());
    let mut offset = 0;

    for hint in &tokens.hints {
        result.push_str(py_slice(line, offset, hint.start.saturating_sub(2)));
        offset = hint.end;
        if is_valid_hint(&hint.text) {
            result.push_str(": ");
            result.push_str(&hint.text);
        }
    }
    result.push_str(py_slice(line, offset, line.len()));

    result
}

/// Tokenize, validate and rewrite one signature line.
///
/// Invalid parameter hints are dropped, an invalid return annotation is
/// removed together with its arrow, and `.{variant}` is stripped everywhere.
/// A trailing line terminator is preserved.
pub fn clean_signature_line(line: &str, variant: Option<&str>) -> String {
    let (body, terminator) = split_terminator(line);
    let mut result = finish(reassemble(&tokenize(body)), variant);
    result.push_str(terminator);
    result
}

/// Parse a docstring signature line into a [`Signature`].
pub fn parse_signature_line(line: &str, variant: Option<&str>) -> Option<Signature> {
    let trimmed = line.trim();
    let unnumbered = OVERLOAD_INDEX_RE.replace(trimmed, "");
    if !unnumbered.contains(SIGNATURE_MARKER) {
        return None;
    }

    let tokens = tokenize(&unnumbered);
    let cleaned = finish(reassemble(&tokens), variant);

    let name = SIGNATURE_HEAD_RE
        .captures(&cleaned)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())?;

    let parameters = tokens
        .hints
        .iter()
        .map(|hint| ParameterDescriptor {
            name: hint.name.clone(),
            type_hint: (is_valid_hint(&hint.text) && !hint.text.is_empty())
                .then(|| strip_variant(&hint.text, variant)),
        })
        .collect();

    let return_type = cleaned
        .find(RETURN_ARROW)
        .map(|arrow| cleaned[arrow + RETURN_ARROW.len()..].trim().to_string());

    Some(Signature {
        name,
        parameters,
        return_type,
        line: cleaned,
    })
}

fn finish(mut result: String, variant: Option<&str>) -> String {
    if let Some(arrow) = result.find(RETURN_ARROW)
        && result[arrow..].contains(FOREIGN_SCOPE_MARKER)
    {
        result.truncate(arrow);
    }
    strip_variant(&result, variant)
}

fn strip_variant(text: &str, variant: Option<&str>) -> String {
    match variant.filter(|v| !v.is_empty()) {
        Some(variant) => text.replace(&format!(".{}", variant), ""),
        None => text.to_string(),
    }
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Full identifier ending at `end` (the matched lowercase run may be only
/// its tail, as in `self_x: `).
fn parameter_name(line: &str, end: usize) -> String {
    let head = &line[..end];
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(end);
    head[start..].to_string()
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut index = index;
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// `s[start:end]` with Python slice semantics: clamped, empty when reversed.
fn py_slice(s: &str, start: usize, end: usize) -> &str {
    let start = floor_char_boundary(s, start);
    let end = floor_char_boundary(s, end);
    if start >= end { "" } else { &s[start..end] }
}
