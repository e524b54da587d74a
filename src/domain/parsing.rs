//! Response decoders, one per task
//!
//! All decoders are pure functions of the model's raw text. None of them can
//! crash the pipeline: the summary and decisions decoders accept any input,
//! and the action-items decoder reports malformed output as a
//! [`ParseFailure`] value.

use crate::domain::models::DecisionList;
use crate::domain::prompts::NO_DECISIONS_PHRASE;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// The action-items decoder could not find a JSON array in the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub reason: String,
    /// The full model output, kept for diagnostics
    pub raw: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not parse action items: {}", self.reason)
    }
}

impl std::error::Error for ParseFailure {}

/// Summary decoder: the trimmed text, unchanged
pub fn decode_summary(raw: &str) -> String {
    raw.trim().to_string()
}

/// How a single line of decisions output is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Nothing left once list markers are removed
    Blank,
    /// The "no decisions" fallback phrase
    NoneDeclared,
    Item(String),
}

/// One leading list marker: `1.`, `12)`, `a)`, `B.`, `-`, `*`, `•` or `+`
fn list_marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\d+[.)]|[A-Za-z][.)]|[-*•+])").expect("list marker pattern is valid")
    })
}

/// Remove stacked leading list markers (`1. - foo`)
///
/// Any marker followed by whitespace or the end of the line counts. Without
/// the space, a numeric marker counts before a non-digit (`1.Adopt`, but not
/// `3.5 release`) and a bullet counts before a letter (`-Freeze`, but not
/// `-5 degrees`). Letter markers always need the space, so `e.g.` stays intact.
fn strip_list_markers(line: &str) -> &str {
    let mut rest = line.trim();
    while let Some(found) = list_marker_pattern().find(rest) {
        let marker = found.as_str();
        let after = &rest[found.end()..];
        let counts = match after.chars().next() {
            None => true,
            Some(c) if c.is_whitespace() => true,
            Some(c) if marker.starts_with(|m: char| m.is_ascii_digit()) => !c.is_ascii_digit(),
            Some(c) if !marker.starts_with(|m: char| m.is_ascii_alphabetic()) => c.is_alphabetic(),
            Some(_) => false,
        };
        if !counts {
            break;
        }
        rest = after.trim_start();
    }
    rest
}

/// Classify one line of decisions output
pub fn classify_line(line: &str) -> LineClass {
    let text = strip_list_markers(line);

    if text.is_empty() {
        LineClass::Blank
    } else if is_no_decisions_phrase(text) {
        LineClass::NoneDeclared
    } else {
        LineClass::Item(text.to_string())
    }
}

fn is_no_decisions_phrase(text: &str) -> bool {
    let normalized = text
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '.' || c.is_whitespace())
        .to_lowercase();
    let sentinel = NO_DECISIONS_PHRASE.trim_end_matches('.').to_lowercase();
    normalized == sentinel || normalized == "no decisions were made"
}

/// Decisions decoder
///
/// Every line that still has text after its list markers are removed is a
/// decision, in order of appearance. The fallback phrase is never returned as
/// a decision; it only sets `none_declared`.
pub fn decode_decisions(raw: &str) -> DecisionList {
    let mut list = DecisionList::default();
    for line in raw.lines() {
        match classify_line(line) {
            LineClass::Blank => {}
            LineClass::NoneDeclared => list.none_declared = true,
            LineClass::Item(text) => list.decisions.push(text),
        }
    }
    // A stray fallback line next to real decisions is noise
    if !list.decisions.is_empty() {
        list.none_declared = false;
    }
    list
}

/// Action-items decoder
///
/// Looks for a JSON array of objects anywhere in the output: Markdown fences
/// and prose before or after the array are tolerated. Each `[` that opens an
/// object list (or an empty list) is tried in order and the first one that
/// parses wins. Trailing commas, truncated output, or a missing array yield a
/// [`ParseFailure`].
pub fn decode_action_items(raw: &str) -> Result<Vec<Value>, ParseFailure> {
    let text = raw.trim();
    let mut first_error: Option<String> = None;

    for start in array_starts(text) {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Vec<Value>>();
        match stream.next() {
            Some(Ok(records)) => return Ok(records),
            Some(Err(e)) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
            None => {}
        }
    }

    Err(ParseFailure {
        reason: first_error.unwrap_or_else(|| "no JSON array found in model output".to_string()),
        raw: raw.to_string(),
    })
}

/// Byte offsets of `[` characters whose next non-whitespace character is `{`
/// or `]`
fn array_starts(text: &str) -> Vec<usize> {
    text.char_indices()
        .filter(|&(_, c)| c == '[')
        .filter(|&(i, _)| {
            matches!(
                text[i + 1..].trim_start().chars().next(),
                Some('{') | Some(']')
            )
        })
        .map(|(i, _)| i)
        .collect()
}
