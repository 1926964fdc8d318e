//! Ordered style declaration maps.

use indexmap::IndexMap;
use serde::Serialize;

/// Property name to value, in first-insertion order.
///
/// Overwriting a key keeps its original position, so a cascade that writes
/// the same property twice still serializes deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleMap(IndexMap<String, String>);

impl StyleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Get the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether the map holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overwrite this map's entries with `other`'s.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            let _ = self.insert(key, value);
        }
    }

    /// Render as `key: value;` pairs with kebab-cased keys.
    #[must_use]
    pub fn to_css_text(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}: {v};", to_kebab_case(k)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            let _ = map.insert(k, v);
        }
        map
    }
}

/// Convert a camelCase property name to kebab-case.
///
/// Custom properties (`--name`) and names that are already kebab-case pass
/// through unchanged.
#[must_use]
pub fn to_kebab_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a declaration block body (`color: red; margin: 0`).
///
/// Declarations are split on `;` outside parentheses and quotes; the first
/// `:` separates name from value. Ordinary property names are lower-cased,
/// custom properties keep their case. Returns the parsed map and the raw text
/// of every declaration that was malformed and skipped.
#[must_use]
pub fn parse_declarations(block: &str) -> (StyleMap, Vec<String>) {
    let mut map = StyleMap::new();
    let mut rejected = Vec::new();

    for raw in split_top_level(block, ';') {
        let decl = raw.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((name, value)) = decl.split_once(':') else {
            rejected.push(decl.to_string());
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() || value.is_empty() || name.contains(char::is_whitespace) {
            rejected.push(decl.to_string());
            continue;
        }
        let name = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        let _ = map.insert(name, value);
    }

    (map, rejected)
}

/// Split `text` on `separator` wherever it is not nested inside
/// parentheses, brackets or quotes.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations_basic() {
        let (map, rejected) = parse_declarations("color: red; Margin: 0 auto;");
        assert!(rejected.is_empty());
        assert_eq!(map.get("color"), Some("red"));
        assert_eq!(map.get("margin"), Some("0 auto"));
    }

    #[test]
    fn test_parse_declarations_skips_malformed() {
        let (map, rejected) = parse_declarations("color red; : blue; width: ; height: 2px");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("height"), Some("2px"));
        assert_eq!(rejected, vec!["color red", ": blue", "width:"]);
    }

    #[test]
    fn test_parse_declarations_keeps_nested_semicolons() {
        let (map, _) = parse_declarations("background: url(\"a;b.png\"); --Accent: var(--x, 1px)");
        assert_eq!(map.get("background"), Some("url(\"a;b.png\")"));
        assert_eq!(map.get("--Accent"), Some("var(--x, 1px)"));
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("backgroundColor"), "background-color");
        assert_eq!(to_kebab_case("font-size"), "font-size");
        assert_eq!(to_kebab_case("--mainColor"), "--mainColor");
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut map: StyleMap = [("a", "1"), ("b", "2")].into_iter().collect();
        let _ = map.insert("a", "3");
        assert_eq!(map.to_css_text(), "a: 3; b: 2;");
    }
}
