//! Stylesheet text to an ordered rule list.
//!
//! The scanner works on comment-free text and recognises three shapes at the
//! top level:
//!
//! - `selector-list { declarations }`, one [`CssRule`] per selector
//! - `@name ... { ... }` block at-rules, skipped whole
//! - `@name ...;` statement at-rules, skipped
//!
//! Braces inside quoted strings are ignored. Unbalanced braces abort the
//! whole sheet.

use serde::Serialize;
use tincture_common::log::Logger;
use tincture_dom::{StyleMap, parse_declarations};

use super::{collapse_whitespace, split_top_level_commas};
use super::specificity::specificity;

const LOG_TAG: &str = "CSS";

/// A single selector with its declaration block.
///
/// A source rule with a selector list produces one `CssRule` per selector,
/// all sharing the same declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssRule {
    /// Whitespace-collapsed selector text.
    pub selector: String,
    /// Declarations in source order.
    pub declarations: StyleMap,
    /// Weighted specificity of `selector`.
    pub specificity: u32,
    /// Position in source order among all emitted rules.
    pub order: usize,
}

/// Why a stylesheet could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    /// A `{` was never closed.
    #[error("block opened at byte {position} is never closed")]
    UnclosedBlock {
        /// Byte offset of the `{` in comment-free text.
        position: usize,
    },
    /// A `}` appeared with no open block.
    #[error("unexpected '}}' at byte {position}")]
    UnexpectedCloseBrace {
        /// Byte offset of the `}` in comment-free text.
        position: usize,
    },
}

/// Parse a stylesheet into rules sorted by `(specificity, order)`.
///
/// Never fails: an unbalanced sheet yields an empty list and an error log.
#[must_use]
pub fn css_to_rules(css: &str, logger: &dyn Logger) -> Vec<CssRule> {
    match try_css_to_rules(css, logger) {
        Ok(rules) => rules,
        Err(err) => {
            logger.error(LOG_TAG, &format!("failed to parse stylesheet: {err}"));
            Vec::new()
        }
    }
}

/// Parse a stylesheet into rules sorted by `(specificity, order)`.
///
/// Malformed declarations and at-rules are skipped and logged.
///
/// # Errors
///
/// Returns a [`CssError`] if braces are unbalanced.
pub fn try_css_to_rules(css: &str, logger: &dyn Logger) -> Result<Vec<CssRule>, CssError> {
    let text = strip_comments(css);
    let mut rules = Vec::new();
    let mut prelude_start = 0;
    let mut quote: Option<char> = None;
    let mut iter = text.char_indices();

    while let Some((i, c)) = iter.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ';') if text[prelude_start..i].trim_start().starts_with('@') => {
                skip_at_rule(text[prelude_start..i].trim(), logger);
                prelude_start = i + 1;
            }
            (None, '}') => return Err(CssError::UnexpectedCloseBrace { position: i }),
            (None, '{') => {
                let close = find_block_end(&text, i)?;
                let prelude = text[prelude_start..i].trim();
                let body = &text[i + 1..close];
                if prelude.starts_with('@') {
                    skip_at_rule(prelude, logger);
                } else {
                    push_style_rule(&mut rules, prelude, body, logger);
                }
                prelude_start = close + 1;
                // Resume after the block.
                while iter.next().is_some_and(|(j, _)| j < close) {}
            }
            _ => {}
        }
    }

    let trailing = text[prelude_start..].trim();
    if !trailing.is_empty() {
        logger.warn(LOG_TAG, &format!("ignoring trailing text without a block: '{trailing}'"));
    }

    rules.sort_by_key(|rule| (rule.specificity, rule.order));
    Ok(rules)
}

/// Remove `/* ... */` comments. An unterminated comment runs to end of input.
#[must_use]
pub fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => rest = "",
        }
    }
    out.push_str(rest);
    out
}

/// Byte index of the `}` matching the `{` at `open`.
fn find_block_end(text: &str, open: usize) -> Result<usize, CssError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (offset, c) in text[open..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + offset);
                }
            }
            _ => {}
        }
    }
    Err(CssError::UnclosedBlock { position: open })
}

fn skip_at_rule(prelude: &str, logger: &dyn Logger) {
    let name = prelude
        .split(|c: char| c.is_whitespace() || c == '(' || c == '{')
        .next()
        .unwrap_or(prelude);
    logger.info(LOG_TAG, &format!("skipping unsupported at-rule {name}"));
}

fn push_style_rule(rules: &mut Vec<CssRule>, prelude: &str, body: &str, logger: &dyn Logger) {
    if body.contains('{') {
        logger.warn(
            LOG_TAG,
            &format!("skipping rule '{prelude}': nested blocks are not supported"),
        );
        return;
    }

    let (declarations, rejected) = parse_declarations(body);
    for decl in rejected {
        logger.debug(LOG_TAG, &format!("skipping malformed declaration '{decl}' in '{prelude}'"));
    }

    let collapsed = collapse_whitespace(prelude);
    for selector in split_top_level_commas(&collapsed) {
        if selector.is_empty() {
            logger.debug(LOG_TAG, &format!("skipping empty selector in '{collapsed}'"));
            continue;
        }
        rules.push(CssRule {
            selector: selector.to_string(),
            declarations: declarations.clone(),
            specificity: specificity(selector),
            order: rules.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincture_common::log::{MemoryLogger, NullLogger, Severity};

    #[test]
    fn test_grouped_selectors_share_declarations() {
        let rules = try_css_to_rules("h1, h2 { color: red }", &NullLogger).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, "h1");
        assert_eq!(rules[1].selector, "h2");
        assert_eq!(rules[0].declarations, rules[1].declarations);
        assert_eq!(rules[1].order, 1);
    }

    #[test]
    fn test_selector_whitespace_kept_inside_quotes() {
        let rules =
            try_css_to_rules("ul\n  > li[title=\"a  b\"] { color: red }", &NullLogger).unwrap();
        assert_eq!(rules[0].selector, "ul > li[title=\"a  b\"]");
        assert_eq!(rules[0].specificity, 12);
    }

    #[test]
    fn test_sorted_by_specificity_then_order() {
        let rules = try_css_to_rules("#a { x: 1 } .b { x: 2 } p { x: 3 } q { x: 4 }", &NullLogger)
            .unwrap();
        let selectors: Vec<&str> = rules.iter().map(|r| r.selector.as_str()).collect();
        assert_eq!(selectors, vec!["p", "q", ".b", "#a"]);
    }

    #[test]
    fn test_comments_and_whitespace() {
        let rules = try_css_to_rules(
            "/* header */ div   >\n p /* inline */ { margin : 0 ; }",
            &NullLogger,
        )
        .unwrap();
        assert_eq!(rules[0].selector, "div > p");
        assert_eq!(rules[0].declarations.get("margin"), Some("0"));
    }

    #[test]
    fn test_at_rules_skipped() {
        let logger = MemoryLogger::new();
        let rules = try_css_to_rules(
            "@import url(\"x.css\"); @media (max-width: 1px) { p { color: red } } a { color: blue }",
            &logger,
        )
        .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, "a");
        assert_eq!(
            logger
                .records()
                .iter()
                .filter(|r| r.severity == Severity::Info)
                .count(),
            2
        );
    }

    #[test]
    fn test_braces_in_strings() {
        let rules = try_css_to_rules("p::after { content: \"}\" }", &NullLogger).unwrap();
        assert_eq!(rules[0].declarations.get("content"), Some("\"}\""));
    }

    #[test]
    fn test_important_kept_literal() {
        let rules = try_css_to_rules("p { color: red !important }", &NullLogger).unwrap();
        assert_eq!(rules[0].declarations.get("color"), Some("red !important"));
    }

    #[test]
    fn test_unbalanced_is_error() {
        assert_eq!(
            try_css_to_rules("p { color: red", &NullLogger),
            Err(CssError::UnclosedBlock { position: 2 })
        );
        assert_eq!(
            try_css_to_rules("p { } }", &NullLogger),
            Err(CssError::UnexpectedCloseBrace { position: 6 })
        );
    }

    #[test]
    fn test_unbalanced_yields_empty_list() {
        let logger = MemoryLogger::new();
        assert!(css_to_rules("a { b: c } d {", &logger).is_empty());
        assert!(logger.has(Severity::Error, LOG_TAG));
    }
}
