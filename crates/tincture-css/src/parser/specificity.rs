//! Selector specificity.
//!
//! A selector is split into compounds on combinators (whitespace, `>`, `+`,
//! `~`), and every compound is scanned by leading character:
//!
//! | prefix | counts as          |
//! |--------|--------------------|
//! | `#`    | id                 |
//! | `.`    | class              |
//! | `[`    | attribute          |
//! | `:`    | pseudo-class       |
//! | `::`   | pseudo-element     |
//! | bare   | type (`*` is free) |
//!
//! The parenthesised argument of a pseudo-class is not scanned.

/// Simple selector counts for one selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecificityCounts {
    /// `#id` selectors.
    pub ids: u32,
    /// `.class` selectors.
    pub classes: u32,
    /// `[attr]` selectors.
    pub attributes: u32,
    /// `:pseudo` classes.
    pub pseudo_classes: u32,
    /// Type selectors.
    pub types: u32,
    /// `::pseudo` elements.
    pub pseudo_elements: u32,
}

impl SpecificityCounts {
    /// Count the simple selectors in `selector`.
    #[must_use]
    pub fn of(selector: &str) -> Self {
        let mut counts = Self::default();
        for compound in split_compounds(selector) {
            counts.scan_compound(&compound);
        }
        counts
    }

    /// Weighted sum: ids 100, classes/attributes/pseudo-classes 10,
    /// types/pseudo-elements 1.
    #[must_use]
    pub const fn value(&self) -> u32 {
        100 * self.ids
            + 10 * (self.classes + self.attributes + self.pseudo_classes)
            + self.types
            + self.pseudo_elements
    }

    fn scan_compound(&mut self, compound: &str) {
        let chars: Vec<char> = compound.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '#' => {
                    self.ids += 1;
                    i = skip_name(&chars, i + 1);
                }
                '.' => {
                    self.classes += 1;
                    i = skip_name(&chars, i + 1);
                }
                '[' => {
                    self.attributes += 1;
                    i = skip_past(&chars, i, '[', ']');
                }
                ':' if chars.get(i + 1) == Some(&':') => {
                    self.pseudo_elements += 1;
                    i = skip_name(&chars, i + 2);
                    if chars.get(i) == Some(&'(') {
                        i = skip_past(&chars, i, '(', ')');
                    }
                }
                ':' => {
                    self.pseudo_classes += 1;
                    i = skip_name(&chars, i + 1);
                    if chars.get(i) == Some(&'(') {
                        i = skip_past(&chars, i, '(', ')');
                    }
                }
                '*' => i += 1,
                _ => {
                    self.types += 1;
                    i = skip_name(&chars, i).max(i + 1);
                }
            }
        }
    }
}

/// Specificity of a single (comma-free) selector.
#[must_use]
pub fn specificity(selector: &str) -> u32 {
    SpecificityCounts::of(selector).value()
}

/// Split a selector into compound selectors on top-level combinators.
fn split_compounds(selector: &str) -> Vec<String> {
    let mut compounds = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in selector.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && (c.is_whitespace() || matches!(c, '>' | '+' | '~')) => {
                if !current.is_empty() {
                    compounds.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.is_empty() {
        compounds.push(current);
    }
    compounds
}

/// Index just past the identifier starting at `start`.
fn skip_name(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || matches!(chars[i], '-' | '_' | '\\')) {
        i += 1;
    }
    i
}

/// Index just past the bracket that closes the one at `start`.
fn skip_past(chars: &[char], start: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    for (offset, &c) in chars[start..].iter().enumerate() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return start + offset + 1;
            }
        }
    }
    chars.len()
}
