//! Response extractors
//!
//! Each upstream API returns its own JSON shape. An `Extractor` maps a parsed
//! response to a `Quote`, or `None` when the response carries no usable text.

use crate::store::Quote;
use serde::Deserialize;
use serde_json::Value;

/// Author recorded when an API does not name one
pub const UNKNOWN_AUTHOR: &str = "佚名";

/// Per-source response adapter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Extractor {
    /// `{"hitokoto": ..., "from": ...}` (Hitokoto and its mirrors)
    Hitokoto,

    /// `{"data": {"content": ..., "origin": {"author": ...}}}` (Jinrishici)
    Jinrishici,

    /// `{"data": {"content": ..., "origin": ...}}` (xygeng)
    Xygeng,

    /// Arbitrary JSON pointers into the response
    Pointer {
        text: String,
        #[serde(default)]
        author: Option<String>,
    },
}

impl Extractor {
    /// Pulls a quote out of a parsed response
    pub fn extract(&self, data: &Value) -> Option<Quote> {
        let (text, author) = match self {
            Self::Hitokoto => (data.get("hitokoto"), data.get("from")),
            Self::Jinrishici => (
                data.pointer("/data/content"),
                data.pointer("/data/origin/author"),
            ),
            Self::Xygeng => (data.pointer("/data/content"), data.pointer("/data/origin")),
            Self::Pointer { text, author } => (
                data.pointer(text),
                author.as_deref().and_then(|p| data.pointer(p)),
            ),
        };

        let text = text.and_then(Value::as_str)?.trim();
        if text.is_empty() {
            return None;
        }

        Some(Quote::new(text, clean_author(author.and_then(Value::as_str))))
    }
}

/// Strips line breaks and falls back to `UNKNOWN_AUTHOR` when blank
fn clean_author(author: Option<&str>) -> String {
    let author: String = author
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();
    let author = author.trim();
    if author.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        author.to_string()
    }
}
