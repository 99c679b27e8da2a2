//! Stable topological ordering of the compiled node arena.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Linearize the graph with Kahn's algorithm.
///
/// Among nodes that are ready at the same time, the lowest node index wins.
/// Node indices are assigned in declaration order, so the output is
/// deterministic and stays as close to author intent as the edges allow;
/// the external root is index 0 and therefore always first.
///
/// If some nodes are never freed the graph contains a cycle; the smallest
/// node index left with unsatisfied dependencies is returned for
/// diagnostics.
pub(crate) fn topological_order<N, E>(
    graph: &Graph<N, E>,
) -> Result<Vec<NodeIndex>, NodeIndex> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.edges_directed(node, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<NodeIndex>> = graph
        .node_indices()
        .filter(|node| in_degree[node.index()] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for edge in graph.edges_directed(node, Direction::Outgoing) {
            let target = edge.target();
            in_degree[target.index()] -= 1;
            if in_degree[target.index()] == 0 {
                ready.push(Reverse(target));
            }
        }
    }

    if order.len() != graph.node_count() {
        let offender = graph
            .node_indices()
            .find(|node| in_degree[node.index()] > 0)
            .expect("graph with missing nodes must have a blocked node");
        return Err(offender);
    }
    Ok(order)
}
