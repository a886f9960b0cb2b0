use canopy_model::expansion::{collapse_group, expand_group};
use canopy_model::{
    ModelGraph, ProcessingConfig, RawGraph, RawNode, check_invariants, process_raw_graph,
    split_large_groups,
};
use proptest::prelude::*;

const NAMESPACES: [&str; 5] = ["", "a", "a/b", "c", "a/b/d"];

#[derive(Debug, Clone)]
struct Input {
    namespaces: Vec<usize>,
    hidden: Vec<bool>,
    edges: Vec<(usize, usize)>,
    threshold: usize,
}

impl Input {
    fn raw(&self) -> RawGraph {
        let mut raw = RawGraph::new("prop");
        for (i, &ns) in self.namespaces.iter().enumerate() {
            let mut node = RawNode::new(format!("n{i}")).in_namespace(NAMESPACES[ns]);
            node.hidden = self.hidden.get(i).copied().unwrap_or(false);
            raw.push_node(node);
        }
        let n = self.namespaces.len();
        for &(u, v) in &self.edges {
            if u < n && v < n && u != v {
                raw.add_dependency(format!("n{u}"), format!("n{v}"));
            }
        }
        raw
    }

    fn graph(&self) -> ModelGraph {
        let config = ProcessingConfig::default().with_max_children_per_group(self.threshold);
        process_raw_graph(&self.raw(), &config).unwrap()
    }
}

fn input() -> impl Strategy<Value = Input> {
    (
        prop::collection::vec(0usize..NAMESPACES.len(), 1..80),
        prop::collection::vec(prop::bool::weighted(0.1), 80),
        prop::collection::vec((0usize..80, 0usize..80), 0..160),
        2usize..8,
    )
        .prop_map(|(namespaces, hidden, edges, threshold)| Input {
            namespaces,
            hidden,
            edges,
            threshold,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn processed_graphs_keep_their_structure(input in input()) {
        let graph = input.graph();
        prop_assert!(check_invariants(&graph).is_ok(), "{:?}", check_invariants(&graph));
        prop_assert_eq!(graph.assets().count(), input.namespaces.len());
        for node in graph.nodes() {
            prop_assert_eq!(node.level(), graph.lineage(node.id()).len() - 1);
        }
    }

    #[test]
    fn every_scope_respects_the_threshold(input in input()) {
        let graph = input.graph();
        prop_assert!(graph.root_node_ids.len() <= input.threshold);
        for group in graph.groups() {
            prop_assert!(group.children_ids.len() <= input.threshold, "{}", group.id);
        }
    }

    #[test]
    fn resplitting_is_a_no_op(input in input()) {
        let mut graph = input.graph();
        let before = serde_json::to_value(&graph).unwrap();
        prop_assert_eq!(split_large_groups(&mut graph, input.threshold), 0);
        prop_assert_eq!(serde_json::to_value(&graph).unwrap(), before);
    }

    #[test]
    fn descendant_sets_are_consistent(input in input()) {
        let graph = input.graph();
        let range = graph.descendant_asset_count_range;
        prop_assert_eq!(range.is_some(), graph.groups().count() > 0);
        for group in graph.groups() {
            for id in &group.descendants_asset_node_ids {
                prop_assert!(group.descendants_node_ids.contains(id));
                prop_assert!(graph.asset(id).is_some_and(|a| !a.hidden));
            }
            if let Some(range) = range {
                prop_assert!(range.contains(group.descendants_asset_node_ids.len()));
            }
        }
    }

    #[test]
    fn expand_collapse_round_trips(input in input(), pick in any::<prop::sample::Index>()) {
        let mut graph = input.graph();
        let ids = graph.group_ids();
        prop_assume!(!ids.is_empty());
        let id = &ids[pick.index(ids.len())];

        let fresh = serde_json::to_value(&graph).unwrap();
        expand_group(&mut graph, id, false).unwrap();
        collapse_group(&mut graph, id, false).unwrap();
        prop_assert!(graph.groups().all(|g| !g.expanded));
        prop_assert_eq!(serde_json::to_value(&graph).unwrap(), fresh);
    }

    #[test]
    fn expand_collapse_round_trips_from_partly_expanded_graphs(
        input in input(),
        opened in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut graph = input.graph();
        let ids = graph.group_ids();
        prop_assume!(!ids.is_empty());
        for ix in &opened {
            expand_group(&mut graph, &ids[ix.index(ids.len())], false).unwrap();
        }
        let collapsed: Vec<&String> = ids
            .iter()
            .filter(|id| graph.group(id).is_some_and(|g| !g.expanded))
            .collect();
        prop_assume!(!collapsed.is_empty());
        let id = collapsed[pick.index(collapsed.len())].clone();

        let flags = |graph: &ModelGraph| -> Vec<(String, bool)> {
            graph.groups().map(|g| (g.id.clone(), g.expanded)).collect()
        };
        let before = flags(&graph);
        expand_group(&mut graph, &id, false).unwrap();
        collapse_group(&mut graph, &id, false).unwrap();
        prop_assert_eq!(flags(&graph), before);
    }
}
