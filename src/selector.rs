//! Selector resolution
//!
//! Selectors map an application's declared placement intent to concrete
//! nodes. Two forms exist, tagged by their leading sigil:
//!
//! - `#name` matches the single node with that exact name
//! - `.label` matches every node carrying that label
//!
//! Any other leading character is a syntax error, rejected at resolution
//! time rather than silently ignored.

use crate::error::{FlotillaError, FlotillaResult};
use crate::models::Node;
use std::collections::BTreeMap;

/// A parsed placement selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `#name`: exact node-name match, at most one target
    Node(String),
    /// `.label`: every node carrying the label, zero or more targets
    Label(String),
}

impl Selector {
    /// Parse a selector string
    ///
    /// The suffix after the sigil must be non-empty.
    pub fn parse(raw: &str) -> FlotillaResult<Self> {
        let invalid = || FlotillaError::InvalidSelector {
            selector: raw.to_string(),
        };

        if let Some(name) = raw.strip_prefix('#') {
            if name.is_empty() {
                return Err(invalid());
            }
            Ok(Selector::Node(name.to_string()))
        } else if let Some(label) = raw.strip_prefix('.') {
            if label.is_empty() {
                return Err(invalid());
            }
            Ok(Selector::Label(label.to_string()))
        } else {
            Err(invalid())
        }
    }

    /// Whether the given node is matched by this selector
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Selector::Node(name) => node.name == *name,
            Selector::Label(label) => node.has_label(label),
        }
    }
}

/// Resolve one selector against a node set
///
/// Returns matched nodes in the node set's natural order; `#name` yields at
/// most one. An empty result is not an error here - the caller decides
/// whether empty means misconfiguration.
pub fn resolve<'a>(selector: &str, nodes: &'a [Node]) -> FlotillaResult<Vec<&'a Node>> {
    let parsed = Selector::parse(selector)?;
    let mut result = Vec::new();
    for node in nodes {
        if parsed.matches(node) {
            result.push(node);
            if matches!(parsed, Selector::Node(_)) {
                break;
            }
        }
    }
    Ok(result)
}

/// Resolve the union of several selectors against a node set
///
/// Every selector must match at least one node; an unmatched selector fails
/// the whole resolution because it overwhelmingly indicates
/// misconfiguration. The union is deduplicated by node name and returned
/// sorted by name, so repeated resolution against unchanged input yields an
/// identical ordered result and deploy order stays stable across runs.
pub fn resolve_all<'a>(selectors: &[String], nodes: &'a [Node]) -> FlotillaResult<Vec<&'a Node>> {
    let mut union: BTreeMap<&str, &Node> = BTreeMap::new();
    for selector in selectors {
        let matched = resolve(selector, nodes)?;
        if matched.is_empty() {
            return Err(FlotillaError::UnmatchedSelector {
                selector: selector.clone(),
            });
        }
        for node in matched {
            union.insert(node.name.as_str(), node);
        }
    }
    Ok(union.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, labels: &[&str]) -> Node {
        Node {
            name: name.to_string(),
            host: format!("{name}.local"),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn fleet() -> Vec<Node> {
        vec![
            node("charlie", &["sensor", "ble"]),
            node("alpha", &["sensor"]),
            node("bravo", &["gateway"]),
        ]
    }

    #[test]
    fn test_parse_rejects_bare_word() {
        let err = Selector::parse("gateway").unwrap_err();
        assert!(matches!(err, FlotillaError::InvalidSelector { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_suffix() {
        assert!(Selector::parse("#").is_err());
        assert!(Selector::parse(".").is_err());
    }

    #[test]
    fn test_resolve_name_selector_single_match() {
        let nodes = fleet();
        let result = resolve("#alpha", &nodes).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "alpha");
    }

    #[test]
    fn test_resolve_name_selector_no_match_is_empty_not_error() {
        let nodes = fleet();
        let result = resolve("#delta", &nodes).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_resolve_label_selector_preserves_node_order() {
        let nodes = fleet();
        let result = resolve(".sensor", &nodes).unwrap();
        let names: Vec<_> = result.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["charlie", "alpha"]);
    }

    #[test]
    fn test_resolve_all_union_is_sorted_and_deduplicated() {
        let nodes = fleet();
        // "#charlie" and ".sensor" both match charlie; the union holds it once.
        let selectors = vec!["#charlie".to_string(), ".sensor".to_string()];
        let result = resolve_all(&selectors, &nodes).unwrap();
        let names: Vec<_> = result.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "charlie"]);
    }

    #[test]
    fn test_resolve_all_order_insensitive() {
        let nodes = fleet();
        let forward = vec![".sensor".to_string(), ".gateway".to_string()];
        let backward = vec![".gateway".to_string(), ".sensor".to_string()];

        let a: Vec<String> = resolve_all(&forward, &nodes)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        let b: Vec<String> = resolve_all(&backward, &nodes)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_all_fails_on_unmatched_selector() {
        let nodes = fleet();
        // ".sensor" matches, ".gpu" does not - the whole resolution fails.
        let selectors = vec![".sensor".to_string(), ".gpu".to_string()];
        let err = resolve_all(&selectors, &nodes).unwrap_err();
        match err {
            FlotillaError::UnmatchedSelector { selector } => assert_eq!(selector, ".gpu"),
            other => panic!("expected UnmatchedSelector, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_all_propagates_syntax_error() {
        let nodes = fleet();
        let selectors = vec![".sensor".to_string(), "bogus".to_string()];
        let err = resolve_all(&selectors, &nodes).unwrap_err();
        assert!(matches!(err, FlotillaError::InvalidSelector { .. }));
    }
}
