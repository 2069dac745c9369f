//! Greedy line wrapping against a measured width.

use crate::font::TextMeasure;
use crate::types::Pt;

pub const EMPTY_CELL_PLACEHOLDER: &str = "-";

/// Wraps `text` into lines no wider than `max_width`.
///
/// Every `\n`-delimited paragraph is wrapped on its own, with an empty line
/// between consecutive paragraphs; a blank paragraph (trailing ones included)
/// becomes one empty line. Missing or blank input yields the placeholder.
pub fn wrap_text(text: Option<&str>, max_width: Pt, measure: &dyn TextMeasure) -> Vec<String> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return vec![EMPTY_CELL_PLACEHOLDER.to_string()];
    };

    let paragraphs: Vec<&str> = text
        .split('\n')
        .map(|p| p.strip_suffix('\r').unwrap_or(p))
        .collect();
    let mut lines = Vec::new();
    for (index, paragraph) in paragraphs.iter().enumerate() {
        wrap_paragraph(paragraph, max_width, measure, &mut lines);
        if index + 1 < paragraphs.len() {
            lines.push(String::new());
        }
    }
    lines
}

fn wrap_paragraph(paragraph: &str, max_width: Pt, measure: &dyn TextMeasure, out: &mut Vec<String>) {
    let trimmed = paragraph.trim();
    if trimmed.is_empty() {
        out.push(String::new());
        return;
    }

    if !trimmed.contains(char::is_whitespace) {
        let mut pieces = break_by_chars(trimmed, max_width, measure);
        out.append(&mut pieces);
        return;
    }

    let mut line = String::new();
    for token in trimmed.split_whitespace() {
        if line.is_empty() {
            place_token(token, max_width, measure, &mut line, out);
            continue;
        }
        let candidate = format!("{line} {token}");
        if measure.measure(&candidate) <= max_width {
            line = candidate;
            continue;
        }
        out.push(std::mem::take(&mut line));
        place_token(token, max_width, measure, &mut line, out);
    }
    if !line.is_empty() {
        out.push(line);
    }
}

// Starts a fresh line with `token`, breaking it by characters when it cannot
// fit on a line of its own. The last piece stays open for following tokens.
fn place_token(
    token: &str,
    max_width: Pt,
    measure: &dyn TextMeasure,
    line: &mut String,
    out: &mut Vec<String>,
) {
    if measure.measure(token) <= max_width {
        line.push_str(token);
        return;
    }
    let mut pieces = break_by_chars(token, max_width, measure);
    if let Some(last) = pieces.pop() {
        out.append(&mut pieces);
        *line = last;
    }
}

// Every piece holds at least one character, so the loop always advances.
fn break_by_chars(text: &str, max_width: Pt, measure: &dyn TextMeasure) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if current.chars().count() > 1 && measure.measure(&current) > max_width {
            current.pop();
            pieces.push(std::mem::replace(&mut current, ch.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
