//! CSS parsing, selector matching and cascade for the Tincture pipeline.
//!
//! # Scope
//!
//! This crate implements:
//! - **Parser**: comment stripping, `selector { declarations }` scanning,
//!   selector lists, specificity weights, at-rules skipped
//! - **Selectors**: type, universal, id, class, `[attr]`, `[attr=value]`,
//!   descendant and child combinators, `:first-child`, `:last-child`,
//!   `:nth-child(odd|even|N)`, `:empty`, `:root`
//! - **Cascade**: specificity-ordered application into each element's
//!   computed style, `:root` custom properties with `var()` substitution
//!
//! # Not Implemented
//!
//! - Sibling combinators (`+`, `~`) and attribute operators other than `=`
//! - Media queries and every other at-rule
//! - `!important` and inheritance
//! - Value parsing; declarations stay as text

/// Cascade application and `var()` substitution.
pub mod cascade;
/// Stylesheet parsing and specificity.
pub mod parser;
/// Selector parsing and matching.
pub mod selector;

pub use cascade::{RootDeclarations, apply_cascade};
pub use parser::{CssError, CssRule, css_to_rules, specificity, try_css_to_rules};
pub use selector::{
    Combinator, ParsedSegment, PseudoFilter, SelectorChain, parse_selector_groups, select,
};
