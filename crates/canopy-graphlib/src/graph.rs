//! Graph container.
//!
//! Nodes and edges keep insertion order, which every caller relies on for deterministic
//! output. Adjacency lists are maintained eagerly: the graphs built here are small, built once
//! per scope and queried many times.

pub mod alg;

use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Directed graph over the sibling ids of one scope. Parallel edges collapse into one.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<String>,
    node_index: HashMap<String, usize>,
    edges: HashSet<(usize, usize)>,
    out_adj: Vec<Vec<usize>>,
    in_adj: Vec<Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Adds `id` if it is new and returns its insertion index.
    pub fn add_node(&mut self, id: impl Into<String>) -> usize {
        let id = id.into();
        if let Some(&ix) = self.node_index.get(&id) {
            return ix;
        }
        let ix = self.nodes.len();
        self.nodes.push(id.clone());
        self.node_index.insert(id, ix);
        self.out_adj.push(Vec::new());
        self.in_adj.push(Vec::new());
        ix
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Adds `v -> w`, creating missing endpoints. Returns `false` if the edge already existed.
    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> bool {
        let v_ix = self.add_node(v);
        let w_ix = self.add_node(w);
        if !self.edges.insert((v_ix, w_ix)) {
            return false;
        }
        self.out_adj[v_ix].push(w_ix);
        self.in_adj[w_ix].push(v_ix);
        true
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        self.neighbors(v, &self.out_adj)
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        self.neighbors(v, &self.in_adj)
    }

    fn neighbors<'a>(&'a self, v: &str, adj: &'a [Vec<usize>]) -> Vec<&'a str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        adj[v_ix].iter().map(|&ix| self.nodes[ix].as_str()).collect()
    }

    pub fn in_degree(&self, v: &str) -> usize {
        self.node_index
            .get(v)
            .map(|&ix| self.in_adj[ix].len())
            .unwrap_or(0)
    }

    /// Nodes without incoming edges, in insertion order.
    pub fn sources(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .zip(&self.in_adj)
            .filter(|(_, preds)| preds.is_empty())
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
