//! Markdown/JSON rendering shared by the wire-level tool wrappers in
//! [`crate::tools`]. The typed operations in the sibling modules return
//! plain Rust structs; this module is the only place that knows how to
//! turn one into text or a `serde_json::Value`.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Markdown,
    Json,
}

impl ResponseFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => ResponseFormat::Json,
            _ => ResponseFormat::Markdown,
        }
    }
}

#[derive(Debug)]
pub enum ToolResponse {
    Markdown(String),
    Json(Value),
}

/// Render `value` per `format`. Markdown rendering is a pretty-printed
/// fenced code block of the same JSON; wire tools that want richer
/// prose-style markdown build their own string and call
/// [`ToolResponse::Markdown`] directly instead of going through this.
pub fn render<T: Serialize>(value: &T, format: ResponseFormat) -> ToolResponse {
    match format {
        ResponseFormat::Json => ToolResponse::Json(serde_json::to_value(value).unwrap_or(Value::Null)),
        ResponseFormat::Markdown => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
            ToolResponse::Markdown(format!("```json\n{pretty}\n```"))
        }
    }
}
