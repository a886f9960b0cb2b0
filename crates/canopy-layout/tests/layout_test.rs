use canopy_layout::{
    Error, ExpansionEngine, LayeredLayout, LayoutConfig, LayoutEngine, RelayoutOptions,
    Relayouter,
};
use canopy_model::{ModelGraph, Point, ProcessingConfig, RawGraph, RawNode, process_raw_graph};

fn graph(raw: &RawGraph) -> ModelGraph {
    process_raw_graph(raw, &ProcessingConfig::default()).unwrap()
}

fn offset(graph: &ModelGraph, id: &str) -> Point {
    graph.node(id).unwrap().geometry().local_offset.unwrap()
}

fn global(graph: &ModelGraph, id: &str) -> Point {
    graph.node(id).unwrap().geometry().global_position.unwrap()
}

#[test]
fn chain_is_laid_out_one_rank_per_row() {
    let mut raw = RawGraph::new("chain");
    raw.push_node(RawNode::new("a"))
        .push_node(RawNode::new("b"))
        .push_node(RawNode::new("c"));
    raw.add_dependency("a", "b").add_dependency("b", "c");
    let mut g = graph(&raw);

    LayeredLayout::default().layout(&mut g, None).unwrap();

    assert_eq!(offset(&g, "a"), Point { x: 0.0, y: 0.0 });
    assert_eq!(offset(&g, "b"), Point { x: 0.0, y: 90.0 });
    assert_eq!(offset(&g, "c"), Point { x: 0.0, y: 180.0 });
    assert_eq!(global(&g, "c"), Point { x: 0.0, y: 180.0 });
    assert_eq!(g.node("a").unwrap().geometry().width, Some(120.0));

    let edges = &g.edges_by_group_node_ids[""];
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].source_node_id, "a");
    assert_eq!(edges[0].target_node_id, "b");
    assert_eq!(
        edges[0].points,
        vec![Point { x: 60.0, y: 40.0 }, Point { x: 60.0, y: 90.0 }]
    );
}

#[test]
fn unconnected_siblings_share_a_row() {
    let mut raw = RawGraph::new("row");
    raw.push_node(RawNode::new("x")).push_node(RawNode::new("y"));
    let mut g = graph(&raw);

    LayeredLayout::default().layout(&mut g, None).unwrap();
    assert_eq!(offset(&g, "x"), Point { x: 0.0, y: 0.0 });
    assert_eq!(offset(&g, "y"), Point { x: 140.0, y: 0.0 });
    assert!(g.edges_by_group_node_ids[""].is_empty());
}

#[test]
fn expanded_groups_are_sized_from_their_content() {
    let mut raw = RawGraph::new("group");
    raw.push_node(RawNode::new("a").in_namespace("g"))
        .push_node(RawNode::new("b").in_namespace("g"));
    raw.add_dependency("a", "b");
    let mut g = graph(&raw);
    g.group_mut("g").unwrap().expanded = true;

    LayeredLayout::default().layout(&mut g, None).unwrap();

    let geometry = g.node("g").unwrap().geometry();
    assert_eq!(geometry.width, Some(160.0));
    assert_eq!(geometry.height, Some(186.0));
    assert_eq!(global(&g, "a"), Point { x: 16.0, y: 40.0 });
    assert_eq!(global(&g, "b"), Point { x: 16.0, y: 130.0 });
    assert_eq!(g.edges_by_group_node_ids["g"].len(), 1);
}

#[test]
fn collapsed_groups_use_the_fixed_group_size() {
    let mut raw = RawGraph::new("collapsed");
    raw.push_node(RawNode::new("a").in_namespace("g"));
    let mut g = graph(&raw);

    LayeredLayout::default().layout(&mut g, None).unwrap();
    let geometry = g.node("g").unwrap().geometry();
    assert_eq!((geometry.width, geometry.height), (Some(160.0), Some(48.0)));
    assert!(g.node("a").unwrap().geometry().local_offset.is_none());
}

#[test]
fn hidden_assets_get_no_geometry() {
    let mut raw = RawGraph::new("hidden");
    raw.push_node(RawNode::new("a"))
        .push_node(RawNode::new("h").hidden());
    let mut g = graph(&raw);

    LayeredLayout::default().layout(&mut g, None).unwrap();
    assert!(!g.node("h").unwrap().geometry().is_sized());
    assert!(g.node("a").unwrap().geometry().is_sized());
}

#[test]
fn group_scopes_must_exist_and_be_expanded() {
    let mut raw = RawGraph::new("scopes");
    raw.push_node(RawNode::new("a").in_namespace("g"));
    let mut g = graph(&raw);
    let engine = LayeredLayout::default();

    assert!(matches!(
        engine.layout(&mut g, Some("missing")),
        Err(Error::UnknownScope { .. })
    ));
    assert!(matches!(
        engine.layout(&mut g, Some("g")),
        Err(Error::CollapsedScope { .. })
    ));

    g.group_mut("g").unwrap().expanded = true;
    engine.layout(&mut g, Some("g")).unwrap();
    assert!(g.node("g").unwrap().geometry().is_sized());
    assert!(g.node("a").unwrap().geometry().is_sized());
}

#[test]
fn invalid_config_fails_the_layout() {
    let mut raw = RawGraph::new("cfg");
    raw.push_node(RawNode::new("a"));
    let mut g = graph(&raw);
    let engine = LayeredLayout::new(LayoutConfig {
        node_sep: -1.0,
        ..Default::default()
    });
    assert!(matches!(
        engine.layout(&mut g, None),
        Err(Error::InvalidConfig { .. })
    ));

    let parsed = LayoutConfig::from_json_str(r#"{"nodeSep": 5}"#).unwrap();
    assert_eq!(parsed.node_sep, 5.0);
    assert_eq!(parsed.rank_sep, LayoutConfig::default().rank_sep);
    assert!(LayoutConfig::from_json_str(r#"{"rankSep": -2}"#).is_err());
}

fn nested() -> ModelGraph {
    let mut raw = RawGraph::new("nested");
    raw.push_node(RawNode::new("n").in_namespace("a/b"))
        .push_node(RawNode::new("m").in_namespace("a/b"))
        .push_node(RawNode::new("k").in_namespace("s"));
    raw.add_dependency("n", "m");
    graph(&raw)
}

#[test]
fn relayouter_expands_and_lays_out() {
    let engine = Relayouter::new(LayeredLayout::default());
    let mut g = nested();

    let deepest = engine.expand_group(&mut g, Some("a"), false).unwrap();
    assert_eq!(deepest, vec!["a/b"]);
    assert!(g.node("n").unwrap().geometry().global_position.is_some());

    let deepest = engine.collapse_group(&mut g, Some("a"), false).unwrap();
    assert!(deepest.is_empty());
    assert!(!g.group("a").unwrap().expanded);
    assert!(!g.group("a/b").unwrap().expanded);
    assert!(!g.edges_by_group_node_ids.contains_key("a/b"));

    let deepest = engine.expand_group(&mut g, None, false).unwrap();
    assert_eq!(deepest, vec!["a/b", "s"]);
    let deepest = engine.collapse_group(&mut g, None, false).unwrap();
    assert!(deepest.is_empty());
}

#[test]
fn relayout_resets_and_reveals_targets() {
    let engine = Relayouter::new(LayeredLayout::default());
    let mut g = nested();
    engine.expand_group(&mut g, Some("s"), false).unwrap();

    let options = RelayoutOptions {
        target_deepest_group_ids_to_expand: vec!["a/b".to_string(), "missing".to_string()],
        clear_all_expand_states: true,
    };
    let deepest = engine.relayout(&mut g, &options).unwrap();
    assert_eq!(deepest, vec!["a/b"]);
    assert!(!g.group("s").unwrap().expanded);
    assert!(g.group("a").unwrap().expanded);
}

#[test]
fn relayouter_propagates_model_errors() {
    let engine = Relayouter::new(LayeredLayout::default());
    let mut g = nested();
    assert!(matches!(
        engine.expand_group(&mut g, Some("n"), false),
        Err(Error::Model(canopy_model::Error::NotAGroup { .. }))
    ));
}
