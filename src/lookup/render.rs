use serde::Serialize;

/// How the presentation layer should show a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Link,
    Text,
}

const LINK_HEADER_TOKENS: &[&str] = &["link", "url"];
const LINK_SCHEMES: &[&str] = &["http://", "https://"];

/// A value is a link when its header mentions "link"/"url" (any case) and the
/// trimmed value starts with an http(s) scheme.
pub fn classify_value(header: &str, value: &str) -> ValueKind {
    let header = header.to_lowercase();
    let value = value.trim();
    let linkish_header = LINK_HEADER_TOKENS.iter().any(|t| header.contains(t));
    if linkish_header && LINK_SCHEMES.iter().any(|s| value.starts_with(s)) {
        ValueKind::Link
    } else {
        ValueKind::Text
    }
}
