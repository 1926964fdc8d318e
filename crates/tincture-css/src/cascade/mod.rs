//! Cascade application.
//!
//! Rules arrive sorted by `(specificity, order)`, so applying them in order
//! and overwriting by key leaves the winning declaration in place. `:root`
//! rules are handled first: their custom properties form the variable map
//! used for every `var()` substitution, and their ordinary properties go
//! straight onto the root container.

/// `var()` substitution.
pub mod vars;

use tincture_common::log::Logger;
use tincture_dom::{DomTree, NodeId, StyleMap};

use crate::parser::CssRule;
use crate::selector::select;
use vars::{MAX_EXPANDED_LEN, contains_var, expand_vars};

const LOG_TAG: &str = "Cascade";

/// Selector text that marks a variable-defining rule.
const ROOT_SELECTOR: &str = ":root";

/// Custom and ordinary declarations collected from `:root` rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootDeclarations {
    /// `--name` declarations, the variable map.
    pub variables: StyleMap,
    /// Every other declaration, applied to the root container.
    pub properties: StyleMap,
}

impl RootDeclarations {
    /// Collect declarations from every `:root` rule in `rules`, in order.
    #[must_use]
    pub fn collect(rules: &[CssRule]) -> Self {
        let mut root = Self::default();
        for rule in rules.iter().filter(|rule| is_root_rule(rule)) {
            for (key, value) in rule.declarations.iter() {
                let target = if key.starts_with("--") {
                    &mut root.variables
                } else {
                    &mut root.properties
                };
                let _ = target.insert(key, value);
            }
        }
        root
    }
}

fn is_root_rule(rule: &CssRule) -> bool {
    rule.selector.trim() == ROOT_SELECTOR
}

/// Apply `rules` to `tree`, filling every matched element's computed style.
///
/// Values are written with `var()` references already substituted from the
/// `:root` variables; unresolved references stay as literal text and are
/// logged at debug severity.
#[must_use]
pub fn apply_cascade(rules: &[CssRule], mut tree: DomTree, logger: &dyn Logger) -> DomTree {
    let root = RootDeclarations::collect(rules);
    logger.debug(
        LOG_TAG,
        &format!("{} root variables defined", root.variables.len()),
    );

    let root_id = tree.root();
    merge_declarations(&mut tree, root_id, &root.properties, &root.variables, logger);

    for rule in rules.iter().filter(|rule| !is_root_rule(rule)) {
        let matched = select(&tree, &rule.selector, logger);
        logger.debug(
            LOG_TAG,
            &format!("'{}' matched {} element(s)", rule.selector, matched.len()),
        );
        for node in matched {
            merge_declarations(&mut tree, node, &rule.declarations, &root.variables, logger);
        }
    }

    tree
}

fn merge_declarations(
    tree: &mut DomTree,
    node: NodeId,
    declarations: &StyleMap,
    variables: &StyleMap,
    logger: &dyn Logger,
) {
    let Some(element) = tree.as_element_mut(node) else {
        return;
    };
    for (key, value) in declarations.iter() {
        let expansion = expand_vars(value, variables);
        let resolved = expansion.value;
        if expansion.exhausted {
            logger.debug(
                LOG_TAG,
                &format!(
                    "'{key}: {value}' expanded past {MAX_EXPANDED_LEN} bytes; \
                     remaining variables left unresolved"
                ),
            );
        } else if contains_var(&resolved) {
            logger.debug(
                LOG_TAG,
                &format!("unresolved variable in '{key}: {value}' left as '{resolved}'"),
            );
        }
        let _ = element.computed_style.insert(key, resolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::try_css_to_rules;
    use tincture_common::log::NullLogger;
    use tincture_dom::ElementData;

    #[test]
    fn test_root_declarations_split() {
        let rules =
            try_css_to_rules(":root { --accent: red; color: black } :root { --gap: 1px }", &NullLogger)
                .unwrap();
        let root = RootDeclarations::collect(&rules);
        assert_eq!(root.variables.get("--accent"), Some("red"));
        assert_eq!(root.variables.get("--gap"), Some("1px"));
        assert_eq!(root.properties.get("color"), Some("black"));
        assert_eq!(root.properties.len(), 1);
    }

    #[test]
    fn test_root_properties_applied_to_root() {
        let rules = try_css_to_rules(":root { font-family: serif }", &NullLogger).unwrap();
        let tree = apply_cascade(&rules, DomTree::new(), &NullLogger);
        let root = tree.as_element(NodeId::ROOT).unwrap();
        assert_eq!(root.computed_style.get("font-family"), Some("serif"));
    }

    #[test]
    fn test_vars_substituted_in_rule_values() {
        let rules = try_css_to_rules(
            ":root { --accent: teal } p { border: 1px solid var(--accent) }",
            &NullLogger,
        )
        .unwrap();
        let mut tree = DomTree::new();
        let p = tree.append_element(NodeId::ROOT, ElementData::new("p"));
        let tree = apply_cascade(&rules, tree, &NullLogger);
        assert_eq!(
            tree.as_element(p).unwrap().computed_style.get("border"),
            Some("1px solid teal")
        );
    }
}
