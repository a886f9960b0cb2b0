//! Directed graph container used by `canopy` for per-scope subgraphs.
//!
//! The model graph itself is a tree of groups with edges on the leaves. Whenever an algorithm
//! needs to reason about the siblings of one scope (partitioning, ranking), it projects them
//! into this container first.

mod graph;

pub use graph::{Graph, alg};
