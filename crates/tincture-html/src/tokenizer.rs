//! Single-pass regex tokenizer for HTML fragments.
//!
//! One alternation regex walks the input left to right and classifies each
//! match as a comment, a declaration (`<!DOCTYPE ...>`), an end tag, a start
//! tag or a text run. Comments and declarations are dropped here; a `<` that
//! starts none of the tag forms is kept as text.
//!
//! Attribute values have the five basic character references (`&quot;`,
//! `&#39;`, `&lt;`, `&gt;`, `&amp;`) decoded. Text runs are kept verbatim.

use std::sync::LazyLock;

use regex::Regex;
use strum_macros::Display;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)(?P<comment><!--.*?-->)|(?P<decl><![^>]*>)|</\s*(?P<end>[A-Za-z][A-Za-z0-9:_-]*)\s*>|<(?P<start>[A-Za-z][A-Za-z0-9:_-]*)(?P<attrs>(?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*(?P<slash>/?)>|(?P<text>[^<]+|<)"#,
    )
    .expect("token pattern is valid")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<name>[^\s"'>/=]+)(?:\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'>]+)))?"#)
        .expect("attribute pattern is valid")
});

/// A name/value pair on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name.
    pub name: String,
    /// Raw value; empty for boolean attributes.
    pub value: String,
}

/// A lexical unit of an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Token {
    /// `<name attr=value>` or `<name/>`.
    StartTag {
        /// Lower-cased tag name.
        name: String,
        /// Attributes in source order.
        attributes: Vec<Attribute>,
        /// Whether the tag ended in `/>`.
        self_closing: bool,
    },
    /// `</name>`.
    EndTag {
        /// Lower-cased tag name.
        name: String,
    },
    /// A run of character data, kept verbatim.
    Text(String),
}

/// Split an HTML fragment into tokens.
///
/// Adjacent text runs are merged, so a stray `<` inside text does not split
/// the surrounding characters into separate tokens.
#[must_use]
pub fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for caps in TOKEN_RE.captures_iter(html) {
        if caps.name("comment").is_some() || caps.name("decl").is_some() {
            continue;
        }

        if let Some(end) = caps.name("end") {
            tokens.push(Token::EndTag {
                name: end.as_str().to_ascii_lowercase(),
            });
        } else if let Some(start) = caps.name("start") {
            tokens.push(Token::StartTag {
                name: start.as_str().to_ascii_lowercase(),
                attributes: caps
                    .name("attrs")
                    .map_or_else(Vec::new, |m| parse_attributes(m.as_str())),
                self_closing: caps.name("slash").is_some_and(|m| !m.as_str().is_empty()),
            });
        } else if let Some(text) = caps.name("text") {
            if let Some(Token::Text(previous)) = tokens.last_mut() {
                previous.push_str(text.as_str());
            } else {
                tokens.push(Token::Text(text.as_str().to_string()));
            }
        }
    }

    tokens
}

/// Parse the attribute section of a start tag.
fn parse_attributes(source: &str) -> Vec<Attribute> {
    ATTR_RE
        .captures_iter(source)
        .filter_map(|caps| {
            let name = caps.name("name")?.as_str().to_ascii_lowercase();
            let value = ["dq", "sq", "bare"]
                .iter()
                .find_map(|group| caps.name(group))
                .map_or_else(String::new, |m| decode_references(m.as_str()));
            Some(Attribute { name, value })
        })
        .collect()
}

/// Character references decoded in attribute values. Decoding is a single
/// left-to-right pass, so `&amp;quot;` yields `&quot;`.
const REFERENCES: [(&str, &str); 6] = [
    ("&quot;", "\""),
    ("&#34;", "\""),
    ("&#39;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

fn decode_references(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match REFERENCES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, decoded)) => {
                out.push_str(decoded);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
