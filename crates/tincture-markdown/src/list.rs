//! List items and the stack of open lists.
//!
//! Nesting depth comes from indentation: `(indent + unit / 2) / unit`, so
//! with the default unit of 3 spaces, 0-1 spaces are depth 0 and 2-4 spaces
//! are depth 1. An item can be at most one level deeper than the lists
//! currently open. Nested lists sit directly inside their parent list, next
//! to the `<li>` they follow.

use std::sync::LazyLock;

use regex::Regex;
use strum_macros::Display;

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<marker>[-*+]|\d+[.)])[ \t]+(?P<content>.*)$")
        .expect("list item pattern is valid")
});

/// Bullet glyph of an unordered list, rendered as its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Glyph {
    /// `-`
    #[strum(serialize = "list-dash")]
    Dash,
    /// `*`
    #[strum(serialize = "list-star")]
    Star,
    /// `+`
    #[strum(serialize = "list-plus")]
    Plus,
}

/// Kind of list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `<ul>` with a glyph class.
    Unordered(Glyph),
    /// `<ol>`, no class.
    Ordered,
}

impl ListKind {
    /// Opening tag for a list of this kind.
    #[must_use]
    pub fn open_tag(self) -> String {
        match self {
            Self::Unordered(glyph) => format!("<ul class=\"{glyph}\">"),
            Self::Ordered => "<ol>".to_string(),
        }
    }

    /// Closing tag for a list of this kind.
    #[must_use]
    pub const fn close_tag(self) -> &'static str {
        match self {
            Self::Unordered(_) => "</ul>",
            Self::Ordered => "</ol>",
        }
    }
}

/// A parsed list item line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Requested nesting depth, before clamping.
    pub depth: usize,
    /// List kind from the marker.
    pub kind: ListKind,
    /// Text after the marker.
    pub content: String,
}

impl ListItem {
    /// Parse `line` as a list item using `unit` spaces per level. Tabs count
    /// as one full level.
    #[must_use]
    pub fn parse(line: &str, unit: usize) -> Option<Self> {
        let caps = LIST_ITEM_RE.captures(line)?;
        let unit = unit.max(1);
        let indent: usize = caps["indent"]
            .chars()
            .map(|c| if c == '\t' { unit } else { 1 })
            .sum();
        let kind = match &caps["marker"] {
            "-" => ListKind::Unordered(Glyph::Dash),
            "*" => ListKind::Unordered(Glyph::Star),
            "+" => ListKind::Unordered(Glyph::Plus),
            _ => ListKind::Ordered,
        };
        Some(Self {
            depth: (indent + unit / 2) / unit,
            kind,
            content: caps["content"].to_string(),
        })
    }
}

/// Lists currently open, outermost first.
#[derive(Debug, Default)]
pub struct ListStack {
    open: Vec<ListKind>,
}

impl ListStack {
    /// Whether any list is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    /// Reconcile the stack for `item`, pushing the tags that close and open
    /// lists onto `out`. The caller emits the `<li>` itself.
    pub fn enter(&mut self, item: &ListItem, out: &mut Vec<String>) {
        let target = item.depth.min(self.open.len()) + 1;

        while self.open.len() > target {
            self.pop(out);
        }
        if self.open.len() == target && self.open.last() != Some(&item.kind) {
            self.pop(out);
        }
        while self.open.len() < target {
            out.push(item.kind.open_tag());
            self.open.push(item.kind);
        }
    }

    /// Close every open list.
    pub fn close_all(&mut self, out: &mut Vec<String>) {
        while self.is_open() {
            self.pop(out);
        }
    }

    fn pop(&mut self, out: &mut Vec<String>) {
        if let Some(kind) = self.open.pop() {
            out.push(kind.close_tag().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        let item = ListItem::parse("- a", 3).unwrap();
        assert_eq!(item.kind, ListKind::Unordered(Glyph::Dash));
        assert_eq!(item.depth, 0);
        assert_eq!(item.content, "a");

        assert_eq!(ListItem::parse("* a", 3).unwrap().kind, ListKind::Unordered(Glyph::Star));
        assert_eq!(ListItem::parse("+ a", 3).unwrap().kind, ListKind::Unordered(Glyph::Plus));
        assert_eq!(ListItem::parse("12. a", 3).unwrap().kind, ListKind::Ordered);
        assert_eq!(ListItem::parse("3) a", 3).unwrap().kind, ListKind::Ordered);
    }

    #[test]
    fn test_not_list_items() {
        assert!(ListItem::parse("-a", 3).is_none());
        assert!(ListItem::parse("**bold**", 3).is_none());
        assert!(ListItem::parse("---", 3).is_none());
        assert!(ListItem::parse("1.5 apples", 3).is_none());
    }

    #[test]
    fn test_depth_from_indent() {
        let depth = |line: &str| ListItem::parse(line, 3).unwrap().depth;
        assert_eq!(depth(" - a"), 0);
        assert_eq!(depth("  - a"), 1);
        assert_eq!(depth("   - a"), 1);
        assert_eq!(depth("      - a"), 2);
        assert_eq!(depth("\t- a"), 1);
    }

    #[test]
    fn test_stack_clamps_depth() {
        let mut stack = ListStack::default();
        let mut out = Vec::new();
        stack.enter(&ListItem::parse("         - deep", 3).unwrap(), &mut out);
        assert_eq!(out, vec!["<ul class=\"list-dash\">"]);
    }

    #[test]
    fn test_kind_change_reopens() {
        let mut stack = ListStack::default();
        let mut out = Vec::new();
        stack.enter(&ListItem::parse("- a", 3).unwrap(), &mut out);
        stack.enter(&ListItem::parse("1. b", 3).unwrap(), &mut out);
        stack.close_all(&mut out);
        assert_eq!(out, vec!["<ul class=\"list-dash\">", "</ul>", "<ol>", "</ol>"]);
    }
}
