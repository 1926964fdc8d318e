//! CSS parser module.

/// Rule scanning and declaration parsing.
pub mod rules;
/// Selector specificity.
pub mod specificity;

pub use rules::{CssError, CssRule, css_to_rules, strip_comments, try_css_to_rules};
pub use specificity::{SpecificityCounts, specificity};

/// Split `text` on commas that are not nested inside parentheses, brackets
/// or quotes. Parts are trimmed; empty parts are kept so callers can report
/// them.
pub(crate) fn split_top_level_commas(text: &str) -> Vec<&str> {
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
            (None, ',') if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// Collapse whitespace runs outside quotes to a single space and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for c in text.trim().chars() {
        match (quote, c) {
            (None, c) if c.is_whitespace() => {
                pending_space = true;
                continue;
            }
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            _ => {}
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_top_level_commas() {
        assert_eq!(
            split_top_level_commas("h1, p:not(.a, .b), [data-x=\"1,2\"]"),
            vec!["h1", "p:not(.a, .b)", "[data-x=\"1,2\"]"]
        );
        assert_eq!(split_top_level_commas("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_collapse_whitespace_outside_quotes() {
        assert_eq!(
            collapse_whitespace("  ul\n  >  li[title=\"a   b\"]\t a "),
            "ul > li[title=\"a   b\"] a"
        );
    }
}
