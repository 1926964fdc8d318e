//! Custom property `var()` substitution.
//!
//! Values are plain text, so a `var(` is located by scanning and its
//! arguments end at the matching `)`. `var(--name, fallback)` takes
//! everything after the first comma as the fallback, including further
//! commas.
//!
//! Resolution is depth-first with an in-progress set. A reference that is
//! unknown, or that would re-enter a variable already being resolved, falls
//! back if it has a fallback and otherwise stays as its literal `var(...)`
//! text. For `--a: var(--b); --b: var(--a)` the inner `var(--a)` closes the
//! cycle, so both variables resolve to `var(--a)`.
//!
//! Every expansion draws on a fixed byte budget. Once it runs out the
//! remaining references stay literal, so a chain that doubles at each level
//! stops growing instead of expanding exponentially.

use tincture_dom::StyleMap;

const VAR_OPEN: &str = "var(";

/// Whether `value` contains a `var()` reference.
#[must_use]
pub fn contains_var(value: &str) -> bool {
    find_var(value, 0).is_some()
}

/// Bytes an expansion may produce or visit before remaining references are
/// left unresolved.
pub const MAX_EXPANDED_LEN: usize = 8 * 1024;

/// Result of [`expand_vars`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The substituted value.
    pub value: String,
    /// Whether [`MAX_EXPANDED_LEN`] ran out and some references were kept
    /// as literal text.
    pub exhausted: bool,
}

/// Substitute every `var()` in `value` from `variables`.
#[must_use]
pub fn substitute_vars(value: &str, variables: &StyleMap) -> String {
    expand_vars(value, variables).value
}

/// Substitute every `var()` in `value`, reporting whether the expansion hit
/// [`MAX_EXPANDED_LEN`].
#[must_use]
pub fn expand_vars(value: &str, variables: &StyleMap) -> Expansion {
    let mut resolver = Resolver {
        variables,
        resolving: Vec::new(),
        budget: MAX_EXPANDED_LEN,
        exhausted: false,
    };
    let value = resolver.substitute(value);
    Expansion {
        value,
        exhausted: resolver.exhausted,
    }
}

struct Resolver<'a> {
    variables: &'a StyleMap,
    /// Variables currently being expanded, outermost first.
    resolving: Vec<String>,
    /// Bytes left to spend on text and reference visits.
    budget: usize,
    exhausted: bool,
}

impl Resolver<'_> {
    fn substitute(&mut self, value: &str) -> String {
        let mut out = String::with_capacity(value.len().min(self.budget));
        let mut cursor = 0;

        while let Some(start) = find_var(value, cursor) {
            let args_start = start + VAR_OPEN.len();
            let Some(close) = find_closing_paren(value, args_start) else {
                break;
            };
            self.push(&mut out, &value[cursor..start]);

            let literal = &value[start..=close];
            let resolved = if self.spend(literal.len()) {
                parse_var_arguments(&value[args_start..close])
                    .and_then(|(name, fallback)| self.resolve_reference(name, fallback))
            } else {
                None
            };
            out.push_str(resolved.as_deref().unwrap_or(literal));
            cursor = close + 1;
        }

        self.push(&mut out, &value[cursor..]);
        out
    }

    fn resolve_reference(&mut self, name: &str, fallback: Option<&str>) -> Option<String> {
        let in_progress = self.resolving.iter().any(|n| n == name);
        if let Some(raw) = self.variables.get(name).filter(|_| !in_progress) {
            self.resolving.push(name.to_string());
            let resolved = self.substitute(raw);
            let _ = self.resolving.pop();
            return Some(resolved);
        }
        fallback.map(|fb| self.substitute(fb))
    }

    fn push(&mut self, out: &mut String, text: &str) {
        self.budget = self.budget.saturating_sub(text.len());
        out.push_str(text);
    }

    /// Take `cost` from the budget; `false` once it is spent.
    fn spend(&mut self, cost: usize) -> bool {
        if self.exhausted || cost > self.budget {
            self.exhausted = true;
            return false;
        }
        self.budget -= cost;
        true
    }
}

/// Split `--name, fallback`; `None` if the first argument is not a custom
/// property name.
fn parse_var_arguments(args: &str) -> Option<(&str, Option<&str>)> {
    let (name, fallback) = match args.split_once(',') {
        Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
        None => (args.trim(), None),
    };
    (name.starts_with("--") && name.len() > 2).then_some((name, fallback))
}

/// Byte index of the next `var(` at or after `from` that starts a function
/// name rather than ending a longer identifier.
fn find_var(value: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(offset) = value[search..].find(VAR_OPEN) {
        let start = search + offset;
        let standalone = value[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        if standalone {
            return Some(start);
        }
        search = start + VAR_OPEN.len();
    }
    None
}

/// Byte index of the `)` closing a function whose arguments start at `from`.
fn find_closing_paren(value: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, c) in value[from..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + offset);
                }
            }
            _ => {}
        }
    }
    None
}
