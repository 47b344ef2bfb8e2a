//! Property tests for selector resolution.

use proptest::prelude::*;

use flotilla::models::Node;
use flotilla::selector::{resolve, resolve_all};

const LABELS: &[&str] = &["sensor", "gateway", "builder", "camera"];

fn node_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9-]{0,11}").unwrap()
}

/// A fleet of nodes with unique names and random label subsets
fn fleet() -> impl Strategy<Value = Vec<Node>> {
    proptest::collection::btree_set(node_name(), 1..=8).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let count = names.len();
        proptest::collection::vec(proptest::collection::vec(0..LABELS.len(), 0..=3), count)
            .prop_map(move |label_picks| {
                names
                    .iter()
                    .zip(label_picks)
                    .map(|(name, picks)| {
                        let mut labels: Vec<String> =
                            picks.iter().map(|&i| LABELS[i].to_string()).collect();
                        labels.sort();
                        labels.dedup();
                        Node {
                            name: name.clone(),
                            host: format!("{name}.local"),
                            labels,
                        }
                    })
                    .collect()
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `.L` returns exactly the nodes whose labels contain L.
    #[test]
    fn property_label_selector_matches_exactly(nodes in fleet(), label_idx in 0..LABELS.len()) {
        let label = LABELS[label_idx];
        let matched = resolve(&format!(".{label}"), &nodes).unwrap();

        let expected: Vec<&str> = nodes
            .iter()
            .filter(|n| n.labels.iter().any(|l| l == label))
            .map(|n| n.name.as_str())
            .collect();
        let actual: Vec<&str> = matched.iter().map(|n| n.name.as_str()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// PROPERTY: `#X` returns at most one node, and its name is X.
    #[test]
    fn property_name_selector_returns_at_most_one(nodes in fleet(), name in node_name()) {
        let matched = resolve(&format!("#{name}"), &nodes).unwrap();
        prop_assert!(matched.len() <= 1);
        if let Some(node) = matched.first() {
            prop_assert_eq!(&node.name, &name);
        }
    }

    /// PROPERTY: `resolve_all` is insensitive to selector order and
    /// idempotent on unchanged input.
    #[test]
    fn property_resolve_all_is_deterministic(nodes in fleet()) {
        // Select every node by name so no selector is unmatched.
        let mut selectors: Vec<String> = nodes.iter().map(|n| format!("#{}", n.name)).collect();

        let forward: Vec<String> = resolve_all(&selectors, &nodes)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();

        selectors.reverse();
        let backward: Vec<String> = resolve_all(&selectors, &nodes)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        prop_assert_eq!(&forward, &backward);

        let again: Vec<String> = resolve_all(&selectors, &nodes)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        prop_assert_eq!(&backward, &again);

        // The union is sorted by node name.
        let mut sorted = forward.clone();
        sorted.sort();
        prop_assert_eq!(forward, sorted);
    }

    /// PROPERTY: one unmatched selector fails the whole resolution even if
    /// every other selector matches.
    #[test]
    fn property_unmatched_selector_fails_resolution(nodes in fleet()) {
        let mut selectors: Vec<String> = nodes.iter().map(|n| format!("#{}", n.name)).collect();
        // Node names never contain an underscore, so this cannot match.
        selectors.push("#never_a_node".to_string());

        prop_assert!(resolve_all(&selectors, &nodes).is_err());
    }

    /// PROPERTY: resolution never panics on arbitrary selector input.
    #[test]
    fn property_resolve_never_panics(nodes in fleet(), raw in ".{0,24}") {
        let _ = resolve(&raw, &nodes);
    }
}
