//! Response parsing: turning a model's free-form answer into a selection.
//!
//! Models asked for JSON do not reliably return JSON. They wrap it in code
//! fences, use single quotes, add prose around it, or answer with a refusal
//! sentence. The parser treats the completion as untrusted input and never
//! fails: anything it cannot read becomes [`SelectionResult::NoSelection`].
//!
//! # Heuristic
//!
//! 1. Trim, and drop every ```` ```json ```` and ```` ``` ```` marker
//! 2. Replace `'` with `"` (corrupts apostrophes in free text)
//! 3. Take the first `{ ... }` span, non-greedy, across newlines
//! 4. Decode it as strict JSON
//! 5. Read the `id` field of the resulting object
//! 6. Trim a string id; render a numeric id as its decimal text
//!
//! Catalog ids are always strings, so step 6 lets `{"id": 42}` and
//! `{"id": " kb-42 "}` resolve instead of silently missing.
//!
//! The first span wins. An answer that quotes an example object before the
//! real one selects the example.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Non-greedy brace span; `(?s)` lets `.` cross newlines.
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("object span pattern is valid"));

/// Outcome of parsing: one collection id, or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "selection", content = "id", rename_all = "snake_case")]
pub enum SelectionResult {
    Selected(String),
    NoSelection,
}

impl SelectionResult {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Selected(id) => Some(id),
            Self::NoSelection => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }
}

impl From<Option<String>> for SelectionResult {
    fn from(id: Option<String>) -> Self {
        match id {
            Some(id) => Self::Selected(id),
            None => Self::NoSelection,
        }
    }
}

/// Why a completion produced no selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("completion was empty")]
    Empty,

    #[error("no brace-delimited object in completion")]
    NoObject,

    #[error("object is not valid JSON: {0}")]
    Malformed(String),

    #[error("decoded value is not a JSON object")]
    NotAnObject,

    #[error("object has no usable \"id\" field")]
    MissingId,
}

/// Narrow seam between the classifier's raw text and the attacher.
///
/// Swap the implementation to harden the heuristic (or to read a
/// structured-output response) without touching the rest of the pipeline.
pub trait SelectionParser: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Parse `raw` into a selection. Must not panic on any input.
    fn parse(&self, raw: &str) -> SelectionResult;
}

/// The default regex + quote-normalization + strict-decode parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicParser;

impl HeuristicParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse, keeping the reason for a miss.
    pub fn try_parse(&self, raw: &str) -> Result<String, ParseFailure> {
        let cleaned = strip_fences(raw);
        if cleaned.is_empty() {
            return Err(ParseFailure::Empty);
        }

        let normalized = cleaned.replace('\'', "\"");

        let span = OBJECT_SPAN
            .find(&normalized)
            .ok_or(ParseFailure::NoObject)?
            .as_str();

        let value: serde_json::Value =
            serde_json::from_str(span).map_err(|e| ParseFailure::Malformed(e.to_string()))?;

        let object = value.as_object().ok_or(ParseFailure::NotAnObject)?;

        match object.get("id") {
            Some(serde_json::Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            _ => Err(ParseFailure::MissingId),
        }
    }
}

impl SelectionParser for HeuristicParser {
    fn name(&self) -> &str {
        "heuristic_json"
    }

    fn parse(&self, raw: &str) -> SelectionResult {
        match self.try_parse(raw) {
            Ok(id) => SelectionResult::Selected(id),
            Err(reason) => {
                debug!(%reason, "No selection parsed from completion");
                SelectionResult::NoSelection
            }
        }
    }
}

/// Remove fence markers anywhere in the text, then trim.
fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}
