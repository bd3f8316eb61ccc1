//! Property tests for graph export and ordering

use std::collections::{BTreeMap, BTreeSet};

use modgraph::DependencyGraph;
use proptest::prelude::*;

/// Module names, including ones that collide with the edge-list syntax
fn module_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z][a-z0-9_.]{0,8}",
        1 => Just("#raw".to_string()),
        1 => Just("a -> b".to_string()),
        1 => Just(" padded ".to_string()),
        1 => Just("\"quoted\"".to_string()),
        1 => Just(String::new()),
        1 => "\\PC{0,6}",
        1 => any::<String>(),
    ]
}

/// Acyclic graphs where a module may only depend on modules before it
fn acyclic_graph() -> impl Strategy<Value = DependencyGraph> {
    proptest::collection::btree_set(module_name(), 1..12)
        .prop_flat_map(|names| {
            let size = names.len();
            (
                Just(names.into_iter().collect::<Vec<_>>()),
                proptest::collection::vec(proptest::collection::vec(any::<bool>(), size), size),
            )
        })
        .prop_map(|(names, matrix)| {
            let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            for (i, row) in matrix.iter().enumerate() {
                let deps = row
                    .iter()
                    .take(i)
                    .enumerate()
                    .filter(|&(_, &edge)| edge)
                    .map(|(j, _)| names[j].clone())
                    .collect();
                adjacency.insert(names[i].clone(), deps);
            }
            DependencyGraph::from_adjacency(adjacency)
        })
}

proptest! {
    #[test]
    fn edge_list_text_reparses_to_same_graph(graph in acyclic_graph()) {
        let text = graph.to_edge_list();
        prop_assert_eq!(DependencyGraph::from_edge_list(&text).unwrap(), graph);
    }

    #[test]
    fn load_order_places_dependencies_first(graph in acyclic_graph()) {
        let order = graph.load_order().unwrap();
        prop_assert_eq!(order.len(), graph.len());

        let position: BTreeMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        for (module, dep) in graph.edges() {
            prop_assert!(position[dep] < position[module]);
        }
    }
}
