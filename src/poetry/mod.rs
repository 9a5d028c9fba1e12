//! Poem payload and the remote poem source
//!
//! The payload returned by the poem API is kept as an opaque JSON value so it
//! can be cached and handed back exactly as received. Accessors pull out the
//! well-known fields for display.

pub mod client;

pub use client::{FetchError, JinrishiciClient, PoetrySource, DEFAULT_ENDPOINT};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A poem as returned by the remote API
///
/// The value is passed through untouched; a typical payload looks like
/// `{"content": "...", "origin": {"title": "...", "dynasty": "...",
/// "author": "...", "content": ["...", "..."]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Poem(Value);

impl Poem {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw payload
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The featured line, falling back to a plain `text` field
    pub fn content(&self) -> Option<&str> {
        self.str_field(&["content"])
            .or_else(|| self.str_field(&["text"]))
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field(&["origin", "title"])
    }

    pub fn dynasty(&self) -> Option<&str> {
        self.str_field(&["origin", "dynasty"])
    }

    pub fn author(&self) -> Option<&str> {
        self.str_field(&["origin", "author"])
    }

    /// Lines of the full poem, if the payload carries them
    pub fn lines(&self) -> Vec<&str> {
        self.0
            .pointer("/origin/content")
            .and_then(Value::as_array)
            .map(|lines| lines.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Attribution in the form `dynasty · author`, skipping missing parts
    pub fn attribution(&self) -> Option<String> {
        match (self.dynasty(), self.author()) {
            (Some(dynasty), Some(author)) => Some(format!("{} · {}", dynasty, author)),
            (None, Some(author)) => Some(author.to_string()),
            (Some(dynasty), None) => Some(dynasty.to_string()),
            (None, None) => None,
        }
    }

    /// Renders the poem as plain text for non-interactive output
    pub fn to_plain_text(&self) -> String {
        let mut out = Vec::new();
        if let Some(title) = self.title() {
            out.push(format!("《{}》", title));
        }
        if let Some(attribution) = self.attribution() {
            out.push(attribution);
        }
        let lines = self.lines();
        if !out.is_empty() && (!lines.is_empty() || self.content().is_some()) {
            out.push(String::new());
        }
        if lines.is_empty() {
            if let Some(content) = self.content() {
                out.push(content.to_string());
            }
        } else {
            out.extend(lines.into_iter().map(str::to_string));
        }
        if out.is_empty() {
            return self.0.to_string();
        }
        out.join("\n")
    }

    fn str_field(&self, path: &[&str]) -> Option<&str> {
        let mut node = &self.0;
        for key in path {
            node = node.get(key)?;
        }
        node.as_str()
    }
}

impl From<Value> for Poem {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
