//! Rank assignment (longest path from the sources).

use canopy_graphlib::Graph;
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

/// Assigns every node the length of the longest path reaching it, sources at rank 0.
///
/// Cycles are tolerated: when no node with all predecessors ranked is left, the first unranked
/// node in insertion order is released, ignoring its unranked predecessors (the back edges).
pub fn longest_path_ranks(g: &Graph) -> HashMap<String, usize> {
    let mut pending: HashMap<&str, usize> = g.nodes().map(|v| (v, g.in_degree(v))).collect();
    let mut ranks: HashMap<String, usize> = HashMap::default();
    let mut queue: VecDeque<&str> = g.sources().into_iter().collect();
    let mut unranked = g.nodes();

    while ranks.len() < g.node_count() {
        let Some(v) = queue.pop_front() else {
            let Some(next) = unranked.find(|v| !ranks.contains_key(*v)) else {
                break;
            };
            queue.push_back(next);
            continue;
        };
        if ranks.contains_key(v) {
            continue;
        }
        let rank = g
            .predecessors(v)
            .into_iter()
            .filter_map(|u| ranks.get(u))
            .map(|r| r + 1)
            .max()
            .unwrap_or(0);
        ranks.insert(v.to_string(), rank);

        for w in g.successors(v) {
            if let Some(count) = pending.get_mut(w) {
                *count = count.saturating_sub(1);
                if *count == 0 && !ranks.contains_key(w) {
                    queue.push_back(w);
                }
            }
        }
    }
    ranks
}
