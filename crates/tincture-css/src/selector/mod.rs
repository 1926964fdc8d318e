//! CSS selector parsing and matching.
//!
//! A selector group is parsed into a [`SelectorChain`]: compound segments
//! joined by descendant (whitespace) or child (`>`) combinators. Matching
//! runs left to right over candidate sets, so `ul > li a` first finds every
//! `ul`, then their `li` children, then every `a` below those.
//!
//! Supported inside a segment: type, `*`, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, `:first-child`, `:last-child`, `:nth-child(odd|even|N)`,
//! `:empty` and `:root`. Anything else marks the segment unsupported and it
//! never matches.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use strum_macros::Display;
use tincture_common::log::Logger;
use tincture_dom::{DomTree, ElementData, NodeId};

use crate::parser::split_top_level_commas;

const LOG_TAG: &str = "Selector";

static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").expect("attribute pattern is valid"));

static PSEUDO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(::?)([A-Za-z][A-Za-z0-9-]*)(?:\(([^)]*)\))?").expect("pseudo pattern is valid")
});

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_-]+)").expect("id pattern is valid"));

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([A-Za-z0-9_-]+)").expect("class pattern is valid"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*|[A-Za-z][A-Za-z0-9-]*)?$").expect("tag pattern is valid"));

/// Relationship between a segment and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Combinator {
    /// First segment of a chain.
    #[strum(serialize = "")]
    None,
    /// Whitespace: any descendant of a previous match.
    #[strum(serialize = " ")]
    Descendant,
    /// `>`: a direct child of a previous match.
    #[strum(serialize = " > ")]
    Child,
}

/// `:nth-child()` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthChild {
    /// `odd`: positions 1, 3, 5, ...
    Odd,
    /// `even`: positions 2, 4, 6, ...
    Even,
    /// An exact 1-based position.
    Index(usize),
}

impl NthChild {
    fn parse(argument: &str) -> Option<Self> {
        match argument.trim().to_ascii_lowercase().as_str() {
            "odd" => Some(Self::Odd),
            "even" => Some(Self::Even),
            other => other.parse().ok().filter(|&n| n > 0).map(Self::Index),
        }
    }

    const fn matches(self, position: usize) -> bool {
        match self {
            Self::Odd => position % 2 == 1,
            Self::Even => position % 2 == 0,
            Self::Index(n) => position == n,
        }
    }
}

/// Structural pseudo-class conditions on a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PseudoFilter {
    /// `:nth-child(...)`.
    pub nth_child: Option<NthChild>,
    /// `:first-child`.
    pub first_child: bool,
    /// `:last-child`.
    pub last_child: bool,
    /// `:empty`.
    pub empty: bool,
    /// `:root`.
    pub root: bool,
}

impl PseudoFilter {
    const fn is_positional(&self) -> bool {
        self.nth_child.is_some() || self.first_child || self.last_child
    }

    /// Record a pseudo-class; returns `false` if it is not supported.
    fn set(&mut self, name: &str, argument: Option<&str>) -> bool {
        match (name, argument) {
            ("first-child", None) => self.first_child = true,
            ("last-child", None) => self.last_child = true,
            ("empty", None) => self.empty = true,
            ("root", None) => self.root = true,
            ("nth-child", Some(argument)) => match NthChild::parse(argument) {
                Some(nth) => self.nth_child = Some(nth),
                None => return false,
            },
            _ => return false,
        }
        true
    }
}

/// `[name]` or `[name=value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    /// Lower-cased attribute name.
    pub name: String,
    /// Required value; `None` tests presence only.
    pub value: Option<String>,
}

/// One compound selector, e.g. `li.item:first-child`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSegment {
    /// Required tag; `None` matches any element.
    pub tag: Option<String>,
    /// Required id.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
    /// Attribute conditions.
    pub attributes: Vec<AttributeFilter>,
    /// Structural pseudo-class conditions.
    pub pseudo: PseudoFilter,
    /// Source text of every part that is not supported.
    pub unsupported: Vec<String>,
}

impl ParsedSegment {
    /// Parse a compound selector by stripping the parts it recognises; what
    /// remains is the tag.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut segment = Self::default();

        for caps in ATTRIBUTE_RE.captures_iter(text) {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            match parse_attribute(inner) {
                Some(filter) => segment.attributes.push(filter),
                None => segment.unsupported.push(format!("[{inner}]")),
            }
        }
        let rest = ATTRIBUTE_RE.replace_all(text, "");

        for caps in PSEUDO_RE.captures_iter(&rest) {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let is_element = caps.get(1).is_some_and(|m| m.as_str() == "::");
            let name = caps
                .get(2)
                .map_or_else(String::new, |m| m.as_str().to_ascii_lowercase());
            let argument = caps.get(3).map(|m| m.as_str());
            if is_element || !segment.pseudo.set(&name, argument) {
                segment.unsupported.push(whole.to_string());
            }
        }
        let rest = PSEUDO_RE.replace_all(&rest, "");

        segment.id = ID_RE
            .captures_iter(&rest)
            .filter_map(|caps| caps.get(1))
            .last()
            .map(|m| m.as_str().to_string());
        let rest = ID_RE.replace_all(&rest, "");

        segment.classes = CLASS_RE
            .captures_iter(&rest)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect();
        let rest = CLASS_RE.replace_all(&rest, "");

        let tag = rest.trim();
        if !TAG_RE.is_match(tag) {
            segment.unsupported.push(tag.to_string());
        } else if !tag.is_empty() && tag != "*" {
            segment.tag = Some(tag.to_ascii_lowercase());
        }

        segment
    }

    /// Whether this segment can ever match.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.unsupported.is_empty()
    }

    /// Whether `node` satisfies every condition of this segment.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.as_element(node) else {
            return false;
        };
        self.is_supported()
            && self.tag.as_ref().is_none_or(|tag| *tag == element.tag)
            && self
                .id
                .as_ref()
                .is_none_or(|id| element.id.as_ref() == Some(id))
            && self.classes.iter().all(|class| element.has_class(class))
            && self
                .attributes
                .iter()
                .all(|filter| attribute_matches(filter, element))
            && pseudo_matches(&self.pseudo, tree, node)
    }
}

fn parse_attribute(inner: &str) -> Option<AttributeFilter> {
    let Some((name, value)) = inner.split_once('=') else {
        let name = inner.trim();
        return valid_attribute_name(name).then(|| AttributeFilter {
            name: name.to_ascii_lowercase(),
            value: None,
        });
    };
    let name = name.trim();
    if !valid_attribute_name(name) {
        return None;
    }
    let value = value.trim();
    let value = ['"', '\'']
        .iter()
        .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value);
    Some(AttributeFilter {
        name: name.to_ascii_lowercase(),
        value: Some(value.to_string()),
    })
}

/// Operator forms like `~=` or `^=` leave their prefix on the name.
fn valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

fn attribute_matches(filter: &AttributeFilter, element: &ElementData) -> bool {
    match (&filter.value, element.attribute(&filter.name)) {
        (None, found) => found.is_some(),
        (Some(expected), Some(found)) => *expected == found,
        (Some(_), None) => false,
    }
}

fn pseudo_matches(pseudo: &PseudoFilter, tree: &DomTree, node: NodeId) -> bool {
    if pseudo.root && tree.parent(node).is_some() {
        return false;
    }
    if pseudo.empty && !tree.children(node).is_empty() {
        return false;
    }
    if !pseudo.is_positional() {
        return true;
    }

    // A node without a parent has no position.
    let Some((index, count)) = tree.element_index(node) else {
        return false;
    };
    (!pseudo.first_child || index == 0)
        && (!pseudo.last_child || index + 1 == count)
        && pseudo.nth_child.is_none_or(|nth| nth.matches(index + 1))
}

/// One step of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    /// How this step relates to the previous one.
    pub combinator: Combinator,
    /// Conditions on the nodes of this step.
    pub segment: ParsedSegment,
}

/// A single comma-free selector as an ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorChain {
    /// Steps from left to right.
    pub steps: Vec<ChainStep>,
}

impl SelectorChain {
    /// Parse one comma-free selector.
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        let mut steps = Vec::new();
        let mut pending = Combinator::None;
        let mut sibling: Option<String> = None;

        for token in split_steps(selector) {
            match token.as_str() {
                ">" => pending = Combinator::Child,
                "+" | "~" => sibling = Some(token),
                _ => {
                    let mut segment = ParsedSegment::parse(&token);
                    if let Some(op) = sibling.take() {
                        segment.unsupported.push(op);
                    }
                    let combinator = if steps.is_empty() {
                        Combinator::None
                    } else if pending == Combinator::Child {
                        Combinator::Child
                    } else {
                        Combinator::Descendant
                    };
                    steps.push(ChainStep {
                        combinator,
                        segment,
                    });
                    pending = Combinator::Descendant;
                }
            }
        }

        Self { steps }
    }

    /// Source text of every unsupported part in the chain.
    #[must_use]
    pub fn unsupported(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|step| step.segment.unsupported.iter().map(String::as_str))
            .collect()
    }

    /// Every node this chain matches, in document order.
    #[must_use]
    pub fn select(&self, tree: &DomTree) -> BTreeSet<NodeId> {
        let mut steps = self.steps.iter();
        let Some(first) = steps.next() else {
            return BTreeSet::new();
        };

        let mut current: BTreeSet<NodeId> = std::iter::once(tree.root())
            .chain(tree.descendants(tree.root()))
            .filter(|&node| first.segment.matches(tree, node))
            .collect();

        for step in steps {
            let mut candidates = BTreeSet::new();
            for &node in &current {
                match step.combinator {
                    Combinator::Child => candidates.extend(tree.element_children(node)),
                    Combinator::Descendant | Combinator::None => {
                        candidates.extend(tree.descendants(node));
                    }
                }
            }
            current = candidates
                .into_iter()
                .filter(|&node| step.segment.matches(tree, node))
                .collect();
        }

        current
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}{}", step.combinator, segment_label(&step.segment))?;
        }
        Ok(())
    }
}

fn segment_label(segment: &ParsedSegment) -> String {
    let mut label = segment.tag.clone().unwrap_or_else(|| "*".to_string());
    if let Some(id) = &segment.id {
        label.push('#');
        label.push_str(id);
    }
    for class in &segment.classes {
        label.push('.');
        label.push_str(class);
    }
    label
}

/// Split a selector into compound segments and combinator tokens.
///
/// Whitespace and `>`, `+`, `~` only separate at the top level; inside
/// brackets, parentheses or quotes they stay part of the segment.
fn split_steps(selector: &str) -> Vec<String> {
    let mut tokens = Vec::new();
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
            (None, c) if depth == 0 && c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                continue;
            }
            (None, '>' | '+' | '~') if depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Parse a selector list into one chain per comma-separated group.
#[must_use]
pub fn parse_selector_groups(selector: &str) -> Vec<SelectorChain> {
    split_top_level_commas(selector)
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(SelectorChain::parse)
        .collect()
}

/// Every element in `tree` matched by `selector`, in document order.
///
/// Groups are unioned without duplicates. Unsupported selector parts are
/// logged once per call at debug severity.
#[must_use]
pub fn select(tree: &DomTree, selector: &str, logger: &dyn Logger) -> Vec<NodeId> {
    let chains = parse_selector_groups(selector);

    let unsupported: Vec<&str> = chains.iter().flat_map(SelectorChain::unsupported).collect();
    if !unsupported.is_empty() {
        logger.debug(
            LOG_TAG,
            &format!(
                "'{selector}' uses unsupported {}; those parts never match",
                unsupported.join(", ")
            ),
        );
    }

    chains
        .iter()
        .flat_map(|chain| chain.select(tree))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
