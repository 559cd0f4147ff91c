//! Network depth: the longest directed-BFS eccentricity in the graph.

use std::collections::{HashSet, VecDeque};

use super::graph::TopologyGraph;

/// Maximum hop depth reachable by directed BFS from any node. The
/// visited set guarantees termination on cyclic topologies. Returns 0
/// for an empty graph.
pub fn network_depth(graph: &TopologyGraph) -> usize {
    let mut max_depth = 0;

    for start in graph.nodes() {
        let mut visited: HashSet<&str> = HashSet::from([start.as_str()]);
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start.as_str(), 0)]);

        while let Some((node, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);

            if let Some(neighbors) = graph.neighbors_out(node) {
                for neighbor in neighbors {
                    if visited.insert(neighbor.as_str()) {
                        queue.push_back((neighbor.as_str(), depth + 1));
                    }
                }
            }
        }
    }

    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hops(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_graph_depth_zero() {
        assert_eq!(network_depth(&TopologyGraph::new()), 0);
    }

    #[test]
    fn test_chain_depth() {
        let mut graph = TopologyGraph::new();
        graph.add_route(&hops(&["A", "B", "C", "D"]));
        assert_eq!(network_depth(&graph), 3);
    }

    #[test]
    fn test_cycle_terminates_with_finite_depth() {
        let mut graph = TopologyGraph::new();
        graph.add_route(&hops(&["A", "B", "C", "A"]));

        let depth = network_depth(&graph);
        assert!(depth <= graph.node_count() - 1);
        assert_eq!(depth, 2);
    }

    #[test]
    fn test_direction_is_respected() {
        // B->A only; no path A->B, so depth from A is 0
        let mut graph = TopologyGraph::new();
        graph.add_route(&hops(&["B", "A"]));
        assert_eq!(network_depth(&graph), 1);
    }
}
