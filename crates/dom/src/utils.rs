//! Small string helpers shared by queries, matching and serialization

use crate::attributes::{AttributeStore, AttributeValue};
use std::borrow::Cow;

/// Whitespace-separated, ASCII-lowercased class tokens
pub fn class_tokens(value: &str) -> Vec<String> {
    value
        .split_ascii_whitespace()
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Attribute lookup that falls back to an ASCII case-insensitive name match
pub fn attribute_ignore_case<'a>(
    attributes: &'a AttributeStore,
    name: &str,
) -> Option<&'a AttributeValue> {
    attributes.get(name).or_else(|| {
        attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Escape text for use inside a double-quoted XML attribute
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
