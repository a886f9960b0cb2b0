#![forbid(unsafe_code)]

//! Model-graph construction for canopy.
//!
//! A flat dependency graph ([`RawGraph`]) is turned into a hierarchical [`ModelGraph`] in four
//! phases: namespace grouping ([`build_model_graph`]), layout connectivity
//! ([`generate_layout_graph_edges`]), large-group splitting ([`split_large_groups`]) and
//! descendant aggregation ([`populate_descendants`]). [`process_raw_graph`] runs all of them;
//! callers that report progress between phases (the worker) invoke them one by one.

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod expansion;
pub mod model;
pub mod partition;
pub mod raw;
pub mod validate;

pub use aggregate::populate_descendants;
pub use builder::{NamespaceResolver, NodeNamespace, build_model_graph};
pub use config::{DEFAULT_MAX_CHILDREN_PER_GROUP, MIN_CHILDREN_PER_GROUP, ProcessingConfig};
pub use connectivity::generate_layout_graph_edges;
pub use error::{Error, Result};
pub use model::{
    AssetNode, DescendantCountRange, GROUP_ID_MARKER, Geometry, GroupNode, IncomingEdge,
    LayoutGraphEdges, ModelEdge, ModelGraph, ModelNode, OutgoingEdge, Point, ROOT_SCOPE,
};
pub use partition::split_large_groups;
pub use raw::{RawGraph, RawNode};
pub use validate::{StructuralDefect, check_invariants, find_structural_defects};

/// Runs the whole construction pipeline with the default namespace resolver.
pub fn process_raw_graph(raw: &RawGraph, config: &ProcessingConfig) -> Result<ModelGraph> {
    config.validate()?;
    let mut graph = build_model_graph(raw, &NodeNamespace, config);
    generate_layout_graph_edges(&mut graph);
    split_large_groups(&mut graph, config.max_children_per_group);
    populate_descendants(&mut graph);
    Ok(graph)
}
