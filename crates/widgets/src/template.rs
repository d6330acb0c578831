//! Template rendering for template-based widgets.

use crate::document::DataRecord;
use anyhow::{Error, anyhow, bail};
use serde_json::Value;

/// Renders template source against a widget's data record.
pub trait TemplateEngine {
    /// # Errors
    /// Fails on malformed templates or unresolved references.
    fn render(&self, source: &str, data: &DataRecord) -> Result<String, Error>;
}

/// Tag-delimited templates:
///
/// - `<%= path %>` writes the value HTML-escaped
/// - `<%- path %>` writes the value unescaped
/// - `<%# ... %>` is a comment
/// - `<%%` writes a literal `<%`
/// - `-%>` drops the newline that follows the tag
///
/// `path` is a dotted lookup into the data record (`user.name`, `items.0`).
/// Statement tags (`<% ... %>`) are rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagTemplates;

impl TemplateEngine for TagTemplates {
    fn render(&self, source: &str, data: &DataRecord) -> Result<String, Error> {
        let mut out = String::with_capacity(source.len());
        let mut rest = source;
        while let Some(open) = rest.find("<%") {
            let (text, tail) = rest.split_at(open);
            out.push_str(text);
            let body = tail.get(2..).unwrap_or_default();
            if let Some(after) = body.strip_prefix('%') {
                out.push_str("<%");
                rest = after;
                continue;
            }
            let close = body
                .find("%>")
                .ok_or_else(|| anyhow!("unterminated `<%` tag"))?;
            let (tag, after) = body.split_at(close);
            let mut after = after.get(2..).unwrap_or_default();
            let (tag, trim_newline) = tag
                .strip_suffix('-')
                .map_or((tag, false), |inner| (inner, true));

            if let Some(path) = tag.strip_prefix('=') {
                escape_into(&mut out, &display(lookup(data, path)?));
            } else if let Some(path) = tag.strip_prefix('-') {
                out.push_str(&display(lookup(data, path)?));
            } else if !tag.starts_with('#') {
                bail!("unsupported statement tag `<%{tag}%>`");
            }

            if trim_newline {
                after = after
                    .strip_prefix("\r\n")
                    .or_else(|| after.strip_prefix('\n'))
                    .unwrap_or(after);
            }
            rest = after;
        }
        out.push_str(rest);
        Ok(out)
    }
}

static NULL: Value = Value::Null;

/// Resolve a dotted path. Only the first segment must exist.
fn lookup<'a>(data: &'a DataRecord, path: &str) -> Result<&'a Value, Error> {
    let path = path.trim();
    let mut segments = path.split('.');
    let head = segments
        .next()
        .filter(|head| !head.is_empty())
        .ok_or_else(|| anyhow!("empty template expression"))?;
    let mut value = data
        .get(head)
        .ok_or_else(|| anyhow!("`{head}` is not defined in the widget data"))?;
    for segment in segments {
        let next = match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };
        match next {
            Some(found) => value = found,
            None => return Ok(&NULL),
        }
    }
    Ok(value)
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
