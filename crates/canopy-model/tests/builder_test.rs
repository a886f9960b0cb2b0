use canopy_model::{
    GROUP_ID_MARKER, ModelNode, NodeNamespace, ProcessingConfig, RawGraph, RawNode,
    StructuralDefect, build_model_graph, check_invariants, find_structural_defects,
    process_raw_graph,
};

fn chain_in_group() -> RawGraph {
    let mut raw = RawGraph::new("chain");
    raw.push_node(RawNode::new("a").in_namespace("g"))
        .push_node(RawNode::new("b").in_namespace("g"))
        .push_node(RawNode::new("c").in_namespace("g"));
    raw.add_dependency("a", "b").add_dependency("b", "c");
    raw
}

#[test]
fn chain_in_one_namespace_becomes_one_group_with_three_assets() {
    let config = ProcessingConfig::default().with_max_children_per_group(10);
    let graph = process_raw_graph(&chain_in_group(), &config).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.root_node_ids, vec!["g".to_string()]);
    assert!(graph.artificial_group_node_ids.is_empty());

    let group = graph.group("g").unwrap();
    assert_eq!(group.label, "g");
    assert_eq!(group.level, 0);
    assert!(!group.expanded);
    assert_eq!(group.children_ids, vec!["a", "b", "c"]);
    assert_eq!(group.descendants_asset_node_ids, vec!["a", "b", "c"]);

    for (id, ns) in [("a", "g/a"), ("b", "g/b"), ("c", "g/c")] {
        let asset = graph.asset(id).unwrap();
        assert_eq!(asset.namespace, ns);
        assert_eq!(asset.level, 1);
        assert_eq!(asset.parent_id.as_deref(), Some("g"));
        assert_eq!(asset.label, id);
    }

    let b = graph.asset("b").unwrap();
    assert_eq!(b.incoming_edges.len(), 1);
    assert_eq!(b.incoming_edges[0].source_node_id, "a");
    assert_eq!(b.outgoing_edges.len(), 1);
    assert_eq!(b.outgoing_edges[0].target_node_id, "c");

    check_invariants(&graph).unwrap();
}

#[test]
fn assets_without_namespace_are_level_zero_roots() {
    let mut raw = RawGraph::new("flat");
    raw.push_node(RawNode::new("x")).push_node(RawNode::new("y"));
    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());

    assert_eq!(graph.root_node_ids, vec!["x", "y"]);
    let x = graph.asset("x").unwrap();
    assert_eq!(x.namespace, "x");
    assert_eq!(x.level, 0);
    assert!(x.parent_id.is_none());
    assert_eq!(graph.groups().count(), 0);
}

#[test]
fn nested_namespaces_create_one_group_per_prefix() {
    let mut raw = RawGraph::new("nested");
    raw.push_node(RawNode::new("n").in_namespace("a/b"))
        .push_node(RawNode::new("m").in_namespace("a/b"))
        .push_node(RawNode::new("k").in_namespace("a"));
    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());

    assert_eq!(graph.groups().count(), 2);
    let outer = graph.group("a").unwrap();
    assert_eq!(outer.level, 0);
    assert_eq!(outer.children_ids, vec!["a/b", "k"]);
    let inner = graph.group("a/b").unwrap();
    assert_eq!(inner.label, "b");
    assert_eq!(inner.level, 1);
    assert_eq!(inner.parent_id.as_deref(), Some("a"));
    assert_eq!(inner.children_ids, vec!["n", "m"]);

    let n = graph.asset("n").unwrap();
    assert_eq!(n.namespace, "a/b/n");
    assert_eq!(n.level, 2);
    assert_eq!(graph.asset("k").unwrap().level, 1);
    check_invariants(&graph).unwrap();
}

#[test]
fn grouping_can_be_disabled() {
    let config = ProcessingConfig {
        group_by_namespace: false,
        ..Default::default()
    };
    let graph = build_model_graph(&chain_in_group(), &NodeNamespace, &config);
    assert_eq!(graph.groups().count(), 0);
    assert_eq!(graph.root_node_ids, vec!["a", "b", "c"]);
}

#[test]
fn hidden_assets_join_groups_created_by_visible_nodes() {
    let mut raw = RawGraph::new("hidden");
    raw.push_node(RawNode::new("h").in_namespace("a/b").hidden())
        .push_node(RawNode::new("x").in_namespace("a/b"));
    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());

    let groups: Vec<(&str, usize)> = graph.groups().map(|g| (g.id.as_str(), g.level)).collect();
    assert_eq!(groups, vec![("a", 0), ("a/b", 1)]);
    let h = graph.asset("h").unwrap();
    assert!(h.hidden);
    assert_eq!(h.namespace, "a/b/h");
    assert_eq!(h.level, 2);
    assert_eq!(h.parent_id.as_deref(), Some("a/b"));
    assert_eq!(graph.group("a/b").unwrap().children_ids, vec!["h", "x"]);
    assert_eq!(graph.root_node_ids, vec!["a"]);
    check_invariants(&graph).unwrap();
}

#[test]
fn hidden_assets_never_create_groups() {
    let mut raw = RawGraph::new("hidden");
    raw.push_node(RawNode::new("a").in_namespace("g"))
        .push_node(RawNode::new("h").in_namespace("g/inner").hidden())
        .push_node(RawNode::new("k").in_namespace("other").hidden());
    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());

    assert_eq!(graph.group_ids(), vec!["g"]);
    let h = graph.asset("h").unwrap();
    assert_eq!(h.parent_id.as_deref(), Some("g"));
    assert_eq!(h.namespace, "g/h");
    let k = graph.asset("k").unwrap();
    assert!(k.parent_id.is_none());
    assert_eq!(k.namespace, "k");
    assert_eq!(graph.root_node_ids, vec!["g", "k"]);
}

#[test]
fn dangling_and_duplicate_edges_are_dropped() {
    let mut raw = RawGraph::new("edges");
    raw.push_node(RawNode::new("a")).push_node(RawNode::new("b"));
    raw.add_dependency("ghost", "a")
        .add_dependency("a", "ghost")
        .add_dependency("a", "b")
        .add_dependency("a", "b");
    raw.downstream.insert("a".to_string(), vec!["b".to_string()]);

    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());
    let a = graph.asset("a").unwrap();
    assert!(a.incoming_edges.is_empty());
    assert_eq!(a.outgoing_edges.len(), 1);
    assert_eq!(graph.asset("b").unwrap().incoming_edges.len(), 1);
    check_invariants(&graph).unwrap();
}

#[test]
fn downstream_map_produces_edges() {
    let mut raw = RawGraph::new("down");
    raw.push_node(RawNode::new("a")).push_node(RawNode::new("b"));
    raw.downstream.insert("a".to_string(), vec!["b".to_string()]);

    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());
    assert_eq!(graph.asset("a").unwrap().outgoing_edges[0].target_node_id, "b");
    assert_eq!(graph.asset("b").unwrap().incoming_edges[0].source_node_id, "a");
}

#[test]
fn group_id_colliding_with_an_asset_id_gets_the_marker() {
    let mut raw = RawGraph::new("collide");
    raw.push_node(RawNode::new("x").in_namespace("g"))
        .push_node(RawNode::new("g"));
    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());

    let group_id = format!("g{GROUP_ID_MARKER}");
    let group = graph.group(&group_id).unwrap();
    assert_eq!(group.namespace, "g");
    assert_eq!(group.label, "g");
    assert!(matches!(graph.node("g"), Some(ModelNode::Asset(_))));
    assert_eq!(graph.asset("x").unwrap().parent_id.as_deref(), Some(group_id.as_str()));
    check_invariants(&graph).unwrap();
}

#[test]
fn custom_resolver_decides_the_group_path() {
    let mut raw = RawGraph::new("custom");
    let mut node = RawNode::new("a");
    node.attrs.insert("team".to_string(), "core".to_string());
    raw.push_node(node).push_node(RawNode::new("b"));

    let by_team = |n: &RawNode| n.attrs.get("team").cloned().unwrap_or_default();
    let graph = build_model_graph(&raw, &by_team, &ProcessingConfig::default());

    assert_eq!(graph.root_node_ids, vec!["core", "b"]);
    assert_eq!(graph.asset("a").unwrap().namespace, "core/a");
}

#[test]
fn structural_defects_are_reported_but_do_not_stop_the_build() {
    let mut raw = RawGraph::new("defects");
    raw.push_node(RawNode::new("a"))
        .push_node(RawNode::new(""))
        .push_node(RawNode::new("a").in_namespace("elsewhere"))
        .push_node(RawNode::new("a"));

    let defects = find_structural_defects(&raw);
    assert_eq!(
        defects,
        vec![
            StructuralDefect::EmptyNodeId { index: 1 },
            StructuralDefect::DuplicateNodeId {
                id: "a".to_string()
            },
        ]
    );

    let graph = build_model_graph(&raw, &NodeNamespace, &ProcessingConfig::default());
    assert_eq!(graph.asset("a").unwrap().namespace, "a");
    assert!(graph.group("elsewhere").is_none());
    check_invariants(&graph).unwrap();
}

#[test]
fn raw_graph_reads_camel_case_json() {
    let raw = RawGraph::from_json_str(
        r#"{
            "id": "json",
            "nodes": [
                {"id": "a", "namespace": "g", "label": "Asset A"},
                {"id": "b", "hidden": true, "attrs": {"kind": "source"}}
            ],
            "upstream": {"a": ["b"]}
        }"#,
    )
    .unwrap();

    assert_eq!(raw.nodes.len(), 2);
    assert_eq!(raw.nodes[0].label.as_deref(), Some("Asset A"));
    assert!(raw.nodes[1].hidden);
    assert_eq!(raw.nodes[1].attrs.get("kind").map(String::as_str), Some("source"));
    assert_eq!(raw.upstream.get("a"), Some(&vec!["b".to_string()]));
    assert!(raw.downstream.is_empty());
}

#[test]
fn invalid_threshold_is_rejected_by_the_pipeline() {
    let config = ProcessingConfig::default().with_max_children_per_group(1);
    let err = process_raw_graph(&chain_in_group(), &config).unwrap_err();
    assert!(err.to_string().contains("maxChildrenPerGroup"));

    let parsed = ProcessingConfig::from_json_str(r#"{"maxChildrenPerGroup": 0}"#);
    assert!(parsed.is_err());
    let parsed = ProcessingConfig::from_json_str(r#"{"groupByNamespace": false}"#).unwrap();
    assert!(!parsed.group_by_namespace);
    assert_eq!(parsed.max_children_per_group, 200);
}
