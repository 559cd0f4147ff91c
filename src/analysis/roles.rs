//! Per-node degree computation and role classification.
//!
//! Degrees count distinct neighbors, never edge weight sums: a node
//! probed through the same link a hundred times still has degree one
//! on that side. Roles follow the total-degree thresholds used by the
//! mesh dashboards (>2 hub, 1-2 relay).

use std::collections::HashMap;

use super::graph::TopologyGraph;
use super::types::{NodeReport, Role};

/// Role from unweighted total degree.
pub fn classify(total_degree: usize) -> Role {
    if total_degree > 2 {
        Role::Hub
    } else if total_degree >= 1 {
        Role::Relay
    } else {
        Role::End
    }
}

/// Friendly label for a node: the mapped name when known, otherwise
/// the raw ID without its leading `!`.
pub fn display_name(names: &HashMap<String, String>, id: &str) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| id.trim_start_matches('!').to_string())
}

/// Compute degree and role for every node in the graph, sorted by
/// total degree descending (most connected first), then by ID.
pub fn classify_nodes(graph: &TopologyGraph, names: &HashMap<String, String>) -> Vec<NodeReport> {
    let mut reports: Vec<NodeReport> = graph
        .nodes()
        .iter()
        .map(|id| {
            let out_degree = graph.neighbors_out(id).map_or(0, |n| n.len());
            let in_degree = graph.neighbors_in(id).map_or(0, |n| n.len());
            let total_degree = out_degree + in_degree;
            NodeReport {
                id: id.clone(),
                display_name: display_name(names, id),
                out_degree,
                in_degree,
                total_degree,
                role: classify(total_degree),
            }
        })
        .collect();

    reports.sort_by(|a, b| {
        b.total_degree
            .cmp(&a.total_degree)
            .then_with(|| a.id.cmp(&b.id))
    });
    reports
}
