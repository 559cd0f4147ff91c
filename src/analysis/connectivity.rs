//! Weak connectivity, path-length metrics, and bounded betweenness
//! centrality.
//!
//! All traversals are iterative with explicit visited sets; mesh
//! topologies contain cycles and recursion is never used. Exact
//! all-pairs BFS is acceptable at mesh scale (tens of nodes).

use std::collections::{HashMap, HashSet, VecDeque};

use super::graph::TopologyGraph;
use super::types::{CentralityReport, ConnectivityReport, GraphMetric};

/// Betweenness centrality is skipped above this node count. Not an
/// error: the report carries a null node and a zero score instead.
pub const CENTRALITY_NODE_LIMIT: usize = 50;

/// Weakly connected components over the undirected projection,
/// found with iterative BFS.
pub fn weakly_connected_components(graph: &TopologyGraph) -> Vec<HashSet<String>> {
    let adj = graph.undirected_adjacency();
    let mut visited: HashSet<String> = HashSet::new();
    let mut components: Vec<HashSet<String>> = Vec::new();

    for start in adj.keys() {
        if visited.contains(start) {
            continue;
        }

        let mut component: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::from([start.clone()]);

        while let Some(node) = queue.pop_front() {
            if !visited.insert(node.clone()) {
                continue;
            }
            component.insert(node.clone());

            if let Some(neighbors) = adj.get(&node) {
                for neighbor in neighbors {
                    if !visited.contains(neighbor) {
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }

        components.push(component);
    }

    components
}

/// Connectivity metrics. Diameter and average path length are computed
/// over the undirected projection and only when the graph is a single
/// weak component; otherwise both degrade to the `Disconnected`
/// sentinel rather than a number.
pub fn analyze_connectivity(graph: &TopologyGraph) -> ConnectivityReport {
    if graph.is_empty() {
        return ConnectivityReport {
            is_connected: false,
            component_count: 0,
            diameter: GraphMetric::disconnected(),
            avg_path_length: GraphMetric::disconnected(),
        };
    }

    let component_count = weakly_connected_components(graph).len();
    let is_connected = component_count == 1;

    if !is_connected {
        return ConnectivityReport {
            is_connected,
            component_count,
            diameter: GraphMetric::disconnected(),
            avg_path_length: GraphMetric::disconnected(),
        };
    }

    let adj = graph.undirected_adjacency();
    let n = adj.len();
    let mut diameter: u32 = 0;
    let mut distance_sum: u64 = 0;

    for start in adj.keys() {
        for dist in bfs_distances(&adj, start).into_values() {
            diameter = diameter.max(dist);
            distance_sum += u64::from(dist);
        }
    }

    let avg_path_length = if n < 2 {
        0.0
    } else {
        distance_sum as f64 / (n * (n - 1)) as f64
    };

    ConnectivityReport {
        is_connected,
        component_count,
        diameter: GraphMetric::Hops(diameter),
        avg_path_length: GraphMetric::Mean(avg_path_length),
    }
}

/// BFS hop distances from `start` to every reachable node (start excluded).
fn bfs_distances(
    adj: &HashMap<String, HashSet<String>>,
    start: &str,
) -> HashMap<String, u32> {
    let mut dist: HashMap<String, u32> = HashMap::new();
    let mut queue: VecDeque<(String, u32)> = VecDeque::from([(start.to_string(), 0)]);
    let mut visited: HashSet<String> = HashSet::from([start.to_string()]);

    while let Some((node, d)) = queue.pop_front() {
        if node != start {
            dist.insert(node.clone(), d);
        }
        if let Some(neighbors) = adj.get(&node) {
            for neighbor in neighbors {
                if visited.insert(neighbor.clone()) {
                    queue.push_back((neighbor.clone(), d + 1));
                }
            }
        }
    }

    dist
}

/// Betweenness centrality over the directed graph (Brandes), reported
/// as the single most central node and its score. Guarded at
/// [`CENTRALITY_NODE_LIMIT`] nodes; tripping the guard yields a null
/// node and a zero score. Scores are normalized by (n-1)(n-2), matching
/// the directed-graph convention of the historical output.
pub fn analyze_centrality(graph: &TopologyGraph) -> CentralityReport {
    let n = graph.node_count();
    if n == 0 || n > CENTRALITY_NODE_LIMIT {
        return CentralityReport {
            most_central_node: None,
            score: 0.0,
        };
    }

    // Arena indices: sort IDs once so ties break deterministically.
    let mut ids: Vec<&String> = graph.nodes().iter().collect();
    ids.sort();
    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let adj: Vec<Vec<usize>> = ids
        .iter()
        .map(|id| {
            let mut out: Vec<usize> = graph
                .neighbors_out(id)
                .map(|set| set.iter().map(|t| index[t.as_str()]).collect())
                .unwrap_or_default();
            out.sort_unstable();
            out
        })
        .collect();

    let mut betweenness = vec![0.0_f64; n];

    for s in 0..n {
        // Forward phase: BFS shortest-path counts and predecessor lists
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1_i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue: VecDeque<usize> = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adj[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        // Back-propagation of pair dependencies
        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                betweenness[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / (((n - 1) * (n - 2)) as f64);
        for b in &mut betweenness {
            *b *= scale;
        }
    }

    let mut best = 0;
    for i in 1..n {
        if betweenness[i] > betweenness[best] {
            best = i;
        }
    }

    CentralityReport {
        most_central_node: Some(ids[best].clone()),
        score: betweenness[best],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hops(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_component_metrics() {
        // Path A - B - C (undirected projection of A->B->C)
        let mut graph = TopologyGraph::new();
        graph.add_route(&hops(&["A", "B", "C"]));

        let report = analyze_connectivity(&graph);
        assert!(report.is_connected);
        assert_eq!(report.component_count, 1);
        assert_eq!(report.diameter, GraphMetric::Hops(2));
        // Distances: AB=1, AC=2, BC=1 each way; mean = 8/6
        assert_eq!(report.avg_path_length, GraphMetric::Mean(8.0 / 6.0));
    }

    #[test]
    fn test_disconnected_sentinel() {
        let mut graph = TopologyGraph::new();
        graph.add_route(&hops(&["A", "B"]));
        graph.add_route(&hops(&["C", "D"]));

        let report = analyze_connectivity(&graph);
        assert!(!report.is_connected);
        assert_eq!(report.component_count, 2);
        assert_eq!(report.diameter, GraphMetric::disconnected());
        assert_eq!(report.avg_path_length, GraphMetric::disconnected());
    }

    #[test]
    fn test_empty_graph() {
        let graph = TopologyGraph::new();
        let report = analyze_connectivity(&graph);
        assert!(!report.is_connected);
        assert_eq!(report.component_count, 0);
    }

    #[test]
    fn test_components_on_cyclic_graph() {
        let mut graph = TopologyGraph::new();
        graph.add_route(&hops(&["A", "B", "C", "A"]));
        graph.add_route(&hops(&["X", "Y"]));

        let components = weakly_connected_components(&graph);
        assert_eq!(components.len(), 2);
        let sizes: Vec<usize> = {
            let mut s: Vec<usize> = components.iter().map(|c| c.len()).collect();
            s.sort_unstable();
            s
        };
        assert_eq!(sizes, vec![2, 3]);
    }

    #[test]
    fn test_centrality_on_directed_path() {
        // A->B->C: only B lies on a shortest path (A to C).
        // Normalized for n=3 by (n-1)(n-2)=2: score 0.5.
        let mut graph = TopologyGraph::new();
        graph.add_route(&hops(&["A", "B", "C"]));

        let report = analyze_centrality(&graph);
        assert_eq!(report.most_central_node.as_deref(), Some("B"));
        assert!((report.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_centrality_computed_for_ten_nodes() {
        let mut graph = TopologyGraph::new();
        let ids: Vec<String> = (0..10).map(|i| format!("n{:02}", i)).collect();
        graph.add_route(&ids);

        let report = analyze_centrality(&graph);
        assert!(report.most_central_node.is_some());
        assert!(report.score > 0.0);
    }

    #[test]
    fn test_centrality_guard_at_fifty_one_nodes() {
        let mut graph = TopologyGraph::new();
        let ids: Vec<String> = (0..51).map(|i| format!("n{:02}", i)).collect();
        graph.add_route(&ids);
        assert_eq!(graph.node_count(), 51);

        let report = analyze_centrality(&graph);
        assert!(report.most_central_node.is_none());
        assert_eq!(report.score, 0.0);
    }
}
