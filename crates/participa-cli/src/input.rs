//! Batch and feedback input loading.
//!
//! Batch files come in three formats are accepted, chosen by extension:
//!
//! - `.json`: an array of `{"id": ..., "text": ...}` objects
//! - `.jsonl` / `.ndjson`: one such object per line
//! - anything else: plain text, one request per non-empty line
//!
//! `id` may be a string or a number and may be omitted; blank texts are
//! skipped.

use std::path::Path;

use participa_core::{AnalysisRequest, FeedbackRequest};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid JSON on line {line}: {source}")]
    JsonLine {
        line: usize,
        source: serde_json::Error,
    },
    #[error("no text found in input")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    JsonArray,
    JsonLines,
    PlainText,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::JsonArray,
            Some("jsonl" | "ndjson") => Self::JsonLines,
            _ => Self::PlainText,
        }
    }
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    text: String,
}

impl RawItem {
    fn into_request(self) -> Option<AnalysisRequest> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        let id = match self.id {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Some(AnalysisRequest {
            id,
            text: text.to_string(),
        })
    }
}

pub fn load_requests(path: &Path) -> Result<Vec<AnalysisRequest>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_requests(&content, InputFormat::from_path(path))
}

pub fn parse_requests(
    content: &str,
    format: InputFormat,
) -> Result<Vec<AnalysisRequest>, InputError> {
    let requests: Vec<AnalysisRequest> = match format {
        InputFormat::JsonArray => {
            let items: Vec<RawItem> = serde_json::from_str(content)?;
            items.into_iter().filter_map(RawItem::into_request).collect()
        }
        InputFormat::JsonLines => {
            let mut out = Vec::new();
            for (i, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let item: RawItem = serde_json::from_str(line)
                    .map_err(|source| InputError::JsonLine { line: i + 1, source })?;
                out.extend(item.into_request());
            }
            out
        }
        InputFormat::PlainText => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(AnalysisRequest::new)
            .collect(),
    };

    if requests.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(requests)
}

/// Parse a feedback file. When a value was validated more than once, the
/// last verdict wins.
pub fn parse_feedback(content: &str) -> Result<FeedbackRequest, InputError> {
    let mut request: FeedbackRequest = serde_json::from_str(content)?;
    for entry in std::mem::take(&mut request.entity_feedbacks) {
        request.record(entry);
    }
    Ok(request)
}
