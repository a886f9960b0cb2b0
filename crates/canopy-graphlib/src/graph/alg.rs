//! Traversal helpers.

use super::Graph;
use rustc_hash::FxHashSet as HashSet;

/// Depth-first preorder from `roots`, visiting each node once.
///
/// Produces the same order as the naive recursive DFS (successors in insertion order) but uses
/// an explicit stack, so long chains cannot overflow the call stack.
pub fn preorder(g: &Graph, roots: &[&str]) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::default();
    let mut out: Vec<String> = Vec::new();
    for &root in roots {
        if !g.has_node(root) {
            continue;
        }
        let mut stack: Vec<&str> = vec![root];
        while let Some(v) = stack.pop() {
            if !visited.insert(v) {
                continue;
            }
            out.push(v.to_string());
            let succ = g.successors(v);
            for &w in succ.iter().rev() {
                if !visited.contains(w) {
                    stack.push(w);
                }
            }
        }
    }
    out
}

/// Preorder that covers every node: sources first, then any node left unvisited (members of
/// cycles without an entry point), in insertion order.
pub fn preorder_all(g: &Graph) -> Vec<String> {
    let mut roots: Vec<&str> = g.sources();
    roots.extend(g.nodes());
    preorder(g, &roots)
}
