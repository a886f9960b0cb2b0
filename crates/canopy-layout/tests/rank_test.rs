use canopy_graphlib::Graph;
use canopy_layout::rank::longest_path_ranks;

#[test]
fn ranks_follow_the_longest_path() {
    let mut g = Graph::new();
    g.set_edge("a", "b");
    g.set_edge("a", "c");
    g.set_edge("b", "d");
    g.set_edge("c", "d");
    g.set_edge("a", "d");
    g.set_edge("d", "e");
    g.add_node("lonely");

    let ranks = longest_path_ranks(&g);
    assert_eq!(ranks["a"], 0);
    assert_eq!(ranks["b"], 1);
    assert_eq!(ranks["c"], 1);
    assert_eq!(ranks["d"], 2);
    assert_eq!(ranks["e"], 3);
    assert_eq!(ranks["lonely"], 0);
}

#[test]
fn cycles_are_broken_in_insertion_order() {
    let mut g = Graph::new();
    g.set_edge("s", "a");
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("c", "a");

    let ranks = longest_path_ranks(&g);
    assert_eq!(ranks.len(), 4);
    assert_eq!(ranks["s"], 0);
    assert_eq!(ranks["a"], 1);
    assert_eq!(ranks["b"], 2);
    assert_eq!(ranks["c"], 3);
}

#[test]
fn a_graph_that_is_only_a_cycle_still_gets_ranks() {
    let mut g = Graph::new();
    g.set_edge("x", "y");
    g.set_edge("y", "x");

    let ranks = longest_path_ranks(&g);
    assert_eq!(ranks["x"], 0);
    assert_eq!(ranks["y"], 1);
}

#[test]
fn long_chains_do_not_recurse() {
    let mut g = Graph::new();
    for i in 1..20_000 {
        g.set_edge(format!("n{}", i - 1), format!("n{i}"));
    }
    let ranks = longest_path_ranks(&g);
    assert_eq!(ranks["n19999"], 19_999);
}
